//! Client session store
//!
//! Holds the session token (and the signed-in user's profile) in memory,
//! mirrors it to durable local storage, and notifies subscribers whenever it
//! changes. Components that make authenticated calls receive a
//! [`SessionHandle`] instead of reaching for shared global state.
//!
//! Storage failures never block the user: they are logged and the in-memory
//! session keeps working for the current run.

pub mod kv;
pub mod profile;
pub mod session;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use profile::{UserId, UserProfile};
pub use session::{SessionHandle, SessionState, SessionStore, PROFILE_KEY, TOKEN_KEY};
