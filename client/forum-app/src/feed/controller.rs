//! Feed controller
//!
//! Owns the feed view state and drives every feed operation against the
//! backend. View state only changes after the backend has answered.
//!
//! Concurrent fetches are ordered by a monotonically increasing sequence
//! number: a fetch applies its result only if no newer fetch started while it
//! was in flight. Like state is only applied while the session that looked
//! it up is still the current one.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use error_types::{ClientError, ClientResult};
use forum_api::{FavoriteToggle, ForumApi, NewPost, Post, PostId, UserId};
use parking_lot::RwLock;
use session_store::{SessionHandle, SessionState};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::draft::PostDraft;
use super::interactions::{FavoriteMap, LikeMap};

/// Snapshot of what the feed screen shows
#[derive(Debug, Clone, Default)]
pub struct FeedView {
    /// Posts in backend order
    pub posts: Vec<Post>,
    pub likes: LikeMap,
    /// Only holds entries the backend explicitly reported
    pub favorites: FavoriteMap,
    /// Term of the most recently started fetch
    pub search_term: String,
    pub is_loading: bool,
    pub is_submitting: bool,
    /// Sequence number of the fetch whose result is displayed; 0 before any
    pub last_fetch_seq: u64,
}

impl FeedView {
    pub fn post(&self, post_id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    pub fn is_liked(&self, post_id: PostId) -> bool {
        self.likes.is_set(post_id)
    }

    pub fn is_favorited(&self, post_id: PostId) -> bool {
        self.favorites.is_set(post_id)
    }
}

/// Result of one feed fetch
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub seq: u64,
    pub search_term: String,
    pub posts: Vec<Post>,
    pub likes: LikeMap,
}

/// Whether a fetch's page made it into the view
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Applied(FeedPage),
    /// A newer fetch started meanwhile; the view was left alone
    Superseded(FeedPage),
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn page(&self) -> &FeedPage {
        match self {
            Self::Applied(page) | Self::Superseded(page) => page,
        }
    }

    pub fn into_page(self) -> FeedPage {
        match self {
            Self::Applied(page) | Self::Superseded(page) => page,
        }
    }
}

/// Tracks one in-flight submission; `is_submitting` stays set until the last
/// one exits
struct SubmittingGuard<'a> {
    view: &'a RwLock<FeedView>,
    in_flight: &'a AtomicUsize,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(view: &'a RwLock<FeedView>, in_flight: &'a AtomicUsize) -> Self {
        let mut state = view.write();
        in_flight.fetch_add(1, Ordering::SeqCst);
        state.is_submitting = true;
        Self { view, in_flight }
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.view.write();
        let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        state.is_submitting = remaining > 0;
    }
}

/// Who the session belongs to, as far as interaction state is concerned
type SessionIdentity = (Option<String>, Option<UserId>);

pub struct FeedController {
    api: Arc<ForumApi>,
    session: SessionHandle,
    view: RwLock<FeedView>,
    fetch_seq: AtomicU64,
    submissions: AtomicUsize,
}

impl FeedController {
    pub fn new(api: Arc<ForumApi>, session: SessionHandle) -> Self {
        Self {
            api,
            session,
            view: RwLock::new(FeedView::default()),
            fetch_seq: AtomicU64::new(0),
            submissions: AtomicUsize::new(0),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Current view state
    pub fn view(&self) -> FeedView {
        self.view.read().clone()
    }

    /// Fetch posts matching `search_term` (empty = all posts) and, when the
    /// user is known, their like state.
    ///
    /// A failed like lookup leaves the like mapping empty and never fails the
    /// fetch. Likes looked up under a session that has since changed are
    /// dropped.
    pub async fn fetch_feed(
        &self,
        search_term: &str,
        current_user_id: Option<UserId>,
    ) -> ClientResult<FetchOutcome> {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut view = self.view.write();
            view.is_loading = true;
            view.search_term = search_term.to_string();
        }
        debug!(seq, search_term, "Fetching feed");

        let token = self.session.token();
        let (posts, mut likes) = tokio::join!(
            self.api.list_posts(search_term),
            self.load_likes(token.as_deref(), current_user_id)
        );

        let mut view = self.view.write();
        let is_latest = seq == self.fetch_seq.load(Ordering::SeqCst);
        if self.session.token() != token && !likes.is_empty() {
            debug!(seq, "Session changed during fetch, dropping like state");
            likes = LikeMap::new();
        }

        let posts = match posts {
            Ok(posts) => posts,
            Err(e) => {
                if is_latest {
                    view.is_loading = false;
                }
                warn!(seq, error = %e, "Failed to fetch feed");
                return Err(e);
            }
        };

        let page = FeedPage {
            seq,
            search_term: search_term.to_string(),
            posts,
            likes,
        };

        if !is_latest {
            debug!(seq, "Discarding superseded feed result");
            return Ok(FetchOutcome::Superseded(page));
        }

        view.posts = page.posts.clone();
        view.likes = page.likes.clone();
        view.is_loading = false;
        view.last_fetch_seq = seq;
        info!(seq, posts = page.posts.len(), liked = page.likes.len(), "Feed updated");

        Ok(FetchOutcome::Applied(page))
    }

    /// Refetch with the current search term and session user
    pub async fn refresh(&self) -> ClientResult<FetchOutcome> {
        let search_term = self.view.read().search_term.clone();
        self.fetch_feed(&search_term, self.session.current_user_id())
            .await
    }

    async fn load_likes(&self, token: Option<&str>, user_id: Option<UserId>) -> LikeMap {
        let Some(user_id) = user_id else {
            return LikeMap::new();
        };
        let Some(token) = token else {
            debug!(user_id, "No session token, skipping like lookup");
            return LikeMap::new();
        };

        match self.api.user_likes(token, user_id).await {
            Ok(records) => LikeMap::from_likes(&records),
            Err(e) => {
                warn!(user_id, error = %e, "Failed to load user likes");
                LikeMap::new()
            }
        }
    }

    /// Create a post, uploading its image first when there is one.
    ///
    /// Validation happens before any request. A failed upload aborts the
    /// operation without creating the post. On success the feed is refetched;
    /// a failed refetch is logged only.
    pub async fn create_post(&self, draft: PostDraft) -> ClientResult<Post> {
        draft.validate()?;
        let token = self.session.token().ok_or(ClientError::SignInRequired)?;

        let created = {
            let _submitting = SubmittingGuard::enter(&self.view, &self.submissions);
            self.submit_post(&token, &draft).await
        };

        let post = match created {
            Ok(post) => post,
            Err(e) => {
                self.enforce_auth_policy(&e, "create_post").await;
                return Err(e);
            }
        };
        info!(post_id = post.id, "Post created");

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Feed refresh after post creation failed");
        }

        Ok(post)
    }

    async fn submit_post(&self, token: &str, draft: &PostDraft) -> ClientResult<Post> {
        let image_url = match &draft.image {
            Some(image) => {
                let uploaded = self
                    .api
                    .upload_post_image(token, image)
                    .await
                    .map_err(ClientError::upload)?;
                Some(uploaded.image_url)
            }
            None => None,
        };

        let new_post = NewPost {
            title: draft.title.clone(),
            content: draft.content.clone(),
            image_url,
        };
        self.api.create_post(token, &new_post).await
    }

    /// Toggle the like on a post and return the resulting state.
    ///
    /// The like mapping and the post's counter change only after the backend
    /// confirms.
    pub async fn toggle_like(&self, post_id: PostId) -> ClientResult<bool> {
        let token = self.session.token().ok_or(ClientError::SignInRequired)?;

        let liked = match self.api.toggle_like(&token, post_id).await {
            Ok(toggle) => toggle.liked,
            Err(e) => {
                self.enforce_auth_policy(&e, "toggle_like").await;
                return Err(e);
            }
        };

        let mut view = self.view.write();
        view.likes.set(post_id, liked);
        if let Some(post) = view.posts.iter_mut().find(|p| p.id == post_id) {
            post.likes_count = if liked {
                post.likes_count.saturating_add(1)
            } else {
                post.likes_count.saturating_sub(1)
            };
        }
        debug!(post_id, liked, "Like toggled");

        Ok(liked)
    }

    /// Toggle the favorite on a post. The returned message is meant for a
    /// transient confirmation. Favorite state is recorded only when the
    /// backend reports it.
    pub async fn toggle_favorite(&self, post_id: PostId) -> ClientResult<FavoriteToggle> {
        let token = self.session.token().ok_or(ClientError::SignInRequired)?;

        let toggle = match self.api.toggle_favorite(&token, post_id).await {
            Ok(toggle) => toggle,
            Err(e) => {
                self.enforce_auth_policy(&e, "toggle_favorite").await;
                return Err(e);
            }
        };

        if let Some(favorited) = toggle.favorited {
            self.view.write().favorites.set(post_id, favorited);
        }
        debug!(post_id, favorited = ?toggle.favorited, "Favorite toggled");

        Ok(toggle)
    }

    /// A 401/403 on a mutation ends the local session
    async fn enforce_auth_policy(&self, error: &ClientError, operation: &'static str) {
        if error.is_auth_failure() {
            warn!(operation, status = ?error.status(), "Session rejected by backend, signing out");
            self.session.sign_out().await;
        }
    }

    fn clear_user_state(&self) {
        let mut view = self.view.write();
        view.likes.clear();
        view.favorites.clear();
    }

    /// Clear like and favorite state whenever the session signs out or
    /// passes to another token or user.
    ///
    /// The task ends when the controller is dropped.
    pub fn watch_session(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.session.subscribe();
        let mut identity = identity_of(&changes.borrow_and_update());
        let controller: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let current = identity_of(&changes.borrow_and_update());
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                if current != identity {
                    debug!(
                        signed_in = current.0.is_some(),
                        user_id = ?current.1,
                        "Session changed, clearing interaction state"
                    );
                    controller.clear_user_state();
                    identity = current;
                }
            }
        })
    }
}

fn identity_of(state: &SessionState) -> SessionIdentity {
    (state.token.clone(), state.user_id())
}
