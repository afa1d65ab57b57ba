//! HTTP client for the forum REST API

use std::time::Instant;

use config_core::ApiConfig;
use error_types::{ClientError, ClientResult};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::models::{
    FavoriteToggle, LikeRecord, LikeToggle, LoginRequest, LoginResponse, NewPost, Post, PostId,
    RegisterRequest, UploadedImage, UserId,
};
use crate::upload::ImageUpload;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Multipart field names expected by the upload endpoints
const POST_IMAGE_FIELD: &str = "postImage";
const PROFILE_PICTURE_FIELD: &str = "profilePicture";

/// Forum backend client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ForumApi {
    http: Client,
    base_url: Url,
}

impl ForumApi {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let base_url = config
            .base_url()
            .map_err(|e| ClientError::Config(format!("Invalid API base URL: {}", e)))?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::transport("Failed to create HTTP client", e))?;

        info!(base_url = %base_url, "Forum API client initialized");

        Ok(Self { http, base_url })
    }

    /// Client with default settings for the given backend
    pub fn with_base_url(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::new(&ApiConfig::new(base_url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a media path returned by the backend (`/uploads/...`) to a full URL.
    /// Absolute URLs are returned unchanged.
    pub fn media_url(&self, path: &str) -> String {
        if Url::parse(path).is_ok() {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let raw = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| ClientError::Config(format!("Invalid endpoint {}: {}", raw, e)))
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    fn authed(&self, method: Method, path: &str, token: &str) -> ClientResult<RequestBuilder> {
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    /// Send a request, tagging it with a fresh request id, and classify
    /// non-success responses.
    async fn send(&self, builder: RequestBuilder, operation: &'static str) -> ClientResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        debug!(request_id = %request_id, operation, "Sending request");

        let response = builder
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| {
                warn!(request_id = %request_id, operation, error = %e, "Request failed");
                ClientError::from(e)
            })?;

        let status = response.status();
        debug!(
            request_id = %request_id,
            operation,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Response received"
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ClientError::from_response(status.as_u16(), &body);
        debug!(request_id = %request_id, operation, error = %error, "Backend rejected request");
        Err(error)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// `GET /posts?q=<term>`; an empty term lists every post.
    pub async fn list_posts(&self, search_term: &str) -> ClientResult<Vec<Post>> {
        let builder = self
            .request(Method::GET, "/posts")?
            .query(&[("q", search_term)]);
        let response = self.send(builder, "list_posts").await?;
        Self::read_json(response).await
    }

    /// `GET /users/{id}/likes`
    pub async fn user_likes(&self, token: &str, user_id: UserId) -> ClientResult<Vec<LikeRecord>> {
        let builder = self.authed(Method::GET, &format!("/users/{}/likes", user_id), token)?;
        let response = self.send(builder, "user_likes").await?;
        Self::read_json(response).await
    }

    /// `POST /posts`
    pub async fn create_post(&self, token: &str, post: &NewPost) -> ClientResult<Post> {
        let builder = self.authed(Method::POST, "/posts", token)?.json(post);
        let response = self.send(builder, "create_post").await?;
        Self::read_json(response).await
    }

    /// `POST /posts/{id}/like`; the backend reports the resulting state.
    pub async fn toggle_like(&self, token: &str, post_id: PostId) -> ClientResult<LikeToggle> {
        let builder = self
            .authed(Method::POST, &format!("/posts/{}/like", post_id), token)?
            .json(&serde_json::json!({}));
        let response = self.send(builder, "toggle_like").await?;
        Self::read_json(response).await
    }

    /// `POST /posts/{id}/favorite`
    pub async fn toggle_favorite(&self, token: &str, post_id: PostId) -> ClientResult<FavoriteToggle> {
        let builder = self
            .authed(Method::POST, &format!("/posts/{}/favorite", post_id), token)?
            .json(&serde_json::json!({}));
        let response = self.send(builder, "toggle_favorite").await?;
        Self::read_json(response).await
    }

    /// `POST /upload/post-image`
    pub async fn upload_post_image(
        &self,
        token: &str,
        image: &ImageUpload,
    ) -> ClientResult<UploadedImage> {
        self.upload("/upload/post-image", POST_IMAGE_FIELD, token, image, "upload_post_image")
            .await
    }

    /// `POST /upload/profile-picture`
    pub async fn upload_profile_picture(
        &self,
        token: &str,
        image: &ImageUpload,
    ) -> ClientResult<UploadedImage> {
        self.upload(
            "/upload/profile-picture",
            PROFILE_PICTURE_FIELD,
            token,
            image,
            "upload_profile_picture",
        )
        .await
    }

    async fn upload(
        &self,
        path: &str,
        field: &'static str,
        token: &str,
        image: &ImageUpload,
        operation: &'static str,
    ) -> ClientResult<UploadedImage> {
        if !image.is_allowed_type() {
            warn!(mime_type = %image.mime_type, "Uploading image with unusual content type");
        }

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)?;
        let form = Form::new().part(field, part);

        let builder = self.authed(Method::POST, path, token)?.multipart(form);
        let response = self.send(builder, operation).await?;
        Self::read_json(response).await
    }

    /// `POST /auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        let builder = self.request(Method::POST, "/auth/register")?.json(request);
        self.send(builder, "register").await?;
        Ok(())
    }

    /// `POST /auth/login`
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        let builder = self.request(Method::POST, "/auth/login")?.json(request);
        let response = self.send(builder, "login").await?;
        Self::read_json(response).await
    }
}
