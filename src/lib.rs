//! devsocial client
//!
//! Umbrella crate re-exporting the client workspace for embedders and the
//! end-to-end tests.

pub use config_core as config;
pub use error_types as errors;
pub use forum_api as api;
pub use forum_app as app;
pub use session_store as session;

pub use error_types::{ClientError, ClientResult};
pub use forum_app::{AccountService, FeedController, ForumApp, PostDraft, RegistrationForm};
