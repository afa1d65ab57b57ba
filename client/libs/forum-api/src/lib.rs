//! REST client for the devsocial forum backend
//!
//! Thin, typed wrapper over the backend's JSON endpoints. Every call returns
//! a [`ClientResult`]; non-success responses are classified by
//! [`ClientError::from_response`] so callers can tell authorization failures
//! from other backend errors.
//!
//! The client holds no session state. Authenticated calls take the bearer
//! token as an argument.

pub mod client;
pub mod models;
pub mod upload;

pub use client::ForumApi;
pub use error_types::{ClientError, ClientResult};
pub use models::{
    AuthUser, FavoriteToggle, LikeRecord, LikeToggle, LoginRequest, LoginResponse, NewPost,
    Post, PostId, RegisterRequest, UploadedImage, UserId,
};
pub use upload::ImageUpload;
