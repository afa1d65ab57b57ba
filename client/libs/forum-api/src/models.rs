//! Wire models of the forum REST API

use serde::{Deserialize, Deserializer, Serialize};

pub type PostId = i64;
pub type UserId = i64;

/// A post as listed by `GET /posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments_count: u64,
    #[serde(rename = "username", default)]
    pub author_username: String,
    #[serde(rename = "profile_picture_url", default)]
    pub author_profile_picture_url: Option<String>,
}

/// Accept `3`, `"3"` or `null` for aggregate counts
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
        Missing(Option<()>),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid count: {:?}", s))),
        Count::Missing(_) => Ok(0),
    }
}

/// Entry of `GET /users/{id}/likes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRecord {
    pub post_id: PostId,
}

/// Response of `POST /posts/{id}/like`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    pub liked: bool,
}

/// Response of `POST /posts/{id}/favorite`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteToggle {
    #[serde(default)]
    pub message: String,
    /// Resulting state, when the backend reports it
    #[serde(default)]
    pub favorited: Option<bool>,
}

/// Body of `POST /posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    /// Sent as `null` when the post has no image
    pub image_url: Option<String>,
}

/// Response of the upload endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Body of `POST /auth/register`
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/login`; `identifier` is a username or an email
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Response of `POST /auth/login`
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// User object returned alongside a login token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}
