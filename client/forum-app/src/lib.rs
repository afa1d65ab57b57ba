//! devsocial forum client
//!
//! Wires the session store and the forum API into the two services the UI
//! talks to: the [`FeedController`] (search-filtered feed, likes, favorites,
//! post creation) and the [`AccountService`] (registration and sign-in).
//!
//! Both services receive the same [`session_store::SessionHandle`]. Any
//! 401/403 on a feed mutation signs the user out through it.

pub mod account;
pub mod app;
pub mod feed;

pub use account::{AccountService, RegistrationForm, RegistrationOutcome};
pub use app::ForumApp;
pub use feed::{FeedController, FeedPage, FeedView, FetchOutcome, PostDraft};
