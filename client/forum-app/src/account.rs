//! Account flows: registration, sign-in, sign-out

use std::fmt;
use std::sync::Arc;

use error_types::validation::rules::require_non_blank;
use error_types::{ClientError, ClientResult, ValidationError};
use forum_api::{AuthUser, ForumApi, ImageUpload, LoginRequest, RegisterRequest};
use session_store::{SessionHandle, UserProfile};
use tracing::{info, warn};
use validator::Validate;

const FORM_FIELDS: &[&str] = &["username", "email", "password"];

/// Sign-up form
#[derive(Clone, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl RegistrationForm {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Blank fields first, then format rules
    pub fn check(&self) -> Result<(), ValidationError> {
        require_non_blank("username", &self.username)?;
        require_non_blank("email", &self.email)?;
        require_non_blank("password", &self.password)?;

        self.validate().map_err(|errors| {
            let field_errors = errors.field_errors();
            let field = FORM_FIELDS
                .iter()
                .copied()
                .find(|f| field_errors.contains_key(*f))
                .unwrap_or("form");
            let reason = field_errors
                .get(field)
                .and_then(|errs| errs.first())
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .unwrap_or_else(|| errors.to_string());
            ValidationError::Invalid { field, reason }
        })
    }
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What happened after a successful registration
#[derive(Debug, Default)]
pub struct RegistrationOutcome {
    /// URL of the uploaded profile picture
    pub profile_image_url: Option<String>,
    /// Why the profile picture could not be uploaded; the account exists anyway
    pub profile_upload_error: Option<ClientError>,
}

/// Convert the user object of a login response into the persisted profile
pub fn profile_from_auth_user(user: AuthUser) -> UserProfile {
    UserProfile {
        id: user.id,
        username: user.username,
        email: user.email,
        profile_picture_url: user.profile_picture_url,
    }
}

pub struct AccountService {
    api: Arc<ForumApi>,
    session: SessionHandle,
}

impl AccountService {
    pub fn new(api: Arc<ForumApi>, session: SessionHandle) -> Self {
        Self { api, session }
    }

    /// Create an account and optionally upload its profile picture.
    ///
    /// The user is not signed in afterwards. A failed picture upload does not
    /// fail the registration; it is reported in the outcome.
    pub async fn register(
        &self,
        form: &RegistrationForm,
        profile_image: Option<&ImageUpload>,
    ) -> ClientResult<RegistrationOutcome> {
        form.check()?;

        self.api
            .register(&RegisterRequest {
                username: form.username.trim().to_string(),
                email: form.email.trim().to_string(),
                password: form.password.clone(),
            })
            .await?;
        info!(username = %form.username.trim(), "Account registered");

        let login = self
            .api
            .login(&LoginRequest {
                identifier: form.email.trim().to_string(),
                password: form.password.clone(),
            })
            .await?;

        let mut outcome = RegistrationOutcome::default();
        if let Some(image) = profile_image {
            match self.api.upload_profile_picture(&login.token, image).await {
                Ok(uploaded) => {
                    info!(image_url = %uploaded.image_url, "Profile picture uploaded");
                    outcome.profile_image_url = Some(uploaded.image_url);
                }
                Err(e) => {
                    warn!(error = %e, "Profile picture upload failed");
                    outcome.profile_upload_error = Some(ClientError::upload(e));
                }
            }
        }

        Ok(outcome)
    }

    /// Log in and start a session. Returns the signed-in profile when the
    /// backend sent one.
    pub async fn sign_in(&self, identifier: &str, password: &str) -> ClientResult<Option<UserProfile>> {
        require_non_blank("identifier", identifier)?;
        require_non_blank("password", password)?;

        let login = self
            .api
            .login(&LoginRequest {
                identifier: identifier.trim().to_string(),
                password: password.to_string(),
            })
            .await?;

        if login.token.trim().is_empty() {
            return Err(ClientError::Decode("login response carried an empty token".to_string()));
        }

        let profile = login.user.map(profile_from_auth_user);
        self.session.sign_in(login.token, profile.clone()).await;

        Ok(profile)
    }

    pub async fn sign_out(&self) {
        self.session.sign_out().await;
    }
}
