//! Search-filtered feed with likes, favorites and post creation

pub mod controller;
pub mod draft;
pub mod interactions;

pub use controller::{FeedController, FeedPage, FeedView, FetchOutcome};
pub use draft::PostDraft;
pub use interactions::{FavoriteMap, InteractionMap, LikeMap};
