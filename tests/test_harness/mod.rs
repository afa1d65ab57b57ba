//! Test Harness Module
//!
//! Provides an in-process forum backend for end-to-end tests:
//! - Stateful mock of every REST endpoint the client uses
//! - Bearer token issuing and revocation
//! - Helpers to build a client app pointed at it

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use config_core::ClientConfig;
use forum_app::ForumApp;
use parking_lot::Mutex;
use serde_json::{json, Value};
use session_store::MemoryStore;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[derive(Debug, Clone)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
struct PostRow {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    image_url: Option<String>,
}

#[derive(Debug, Default)]
struct ForumState {
    users: Vec<UserRow>,
    posts: Vec<PostRow>,
    tokens: HashMap<String, i64>,
    likes: HashSet<(i64, i64)>,
    favorites: HashSet<(i64, i64)>,
    uploads: u32,
    next_token: u32,
}

impl ForumState {
    fn user_for(&self, request: &Request) -> Option<i64> {
        let header = request.headers.get("authorization")?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?;
        self.tokens.get(token).copied()
    }

    fn post_json(&self, post: &PostRow) -> Value {
        let author = self.users.iter().find(|u| u.id == post.user_id);
        let likes = self.likes.iter().filter(|(_, p)| *p == post.id).count();
        json!({
            "id": post.id,
            "title": post.title,
            "content": post.content,
            "image_url": post.image_url,
            // Aggregates arrive as strings, as from node-postgres
            "likes_count": likes.to_string(),
            "comments_count": "0",
            "username": author.map(|u| u.username.clone()),
            "profile_picture_url": null
        })
    }
}

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"message": "Token inválido ou expirado."}))
}

fn post_id_from(request: &Request) -> Option<i64> {
    request.url.path().split('/').nth(2)?.parse().ok()
}

/// Stateful stand-in for the forum backend
pub struct MockForum {
    pub server: MockServer,
    state: Arc<Mutex<ForumState>>,
}

impl MockForum {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(ForumState::default()));
        let forum = Self { server, state };
        forum.mount().await;
        forum
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_base_url(self.uri())
    }

    /// App on a throwaway in-memory store
    pub async fn app(&self) -> ForumApp {
        ForumApp::with_storage(self.config(), Arc::new(MemoryStore::new()))
            .await
            .expect("Failed to start app")
    }

    /// App persisting its session under `data_dir`
    pub async fn app_in(&self, data_dir: &Path) -> ForumApp {
        let mut config = self.config();
        config.storage.data_dir = data_dir.to_path_buf();
        ForumApp::bootstrap(config).await.expect("Failed to start app")
    }

    /// Invalidate every issued token, as if they all expired
    pub fn revoke_all_tokens(&self) {
        self.state.lock().tokens.clear();
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().posts.len()
    }

    pub fn upload_count(&self) -> u32 {
        self.state.lock().uploads
    }

    async fn mount(&self) {
        let state = self.state.clone();
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(move |request: &Request| {
                let body: Value = match serde_json::from_slice(&request.body) {
                    Ok(body) => body,
                    Err(_) => return ResponseTemplate::new(400),
                };
                let mut state = state.lock();
                let email = body["email"].as_str().unwrap_or_default().to_string();
                if state.users.iter().any(|u| u.email == email) {
                    return ResponseTemplate::new(409)
                        .set_body_json(json!({"message": "Email já cadastrado."}));
                }
                let id = state.users.len() as i64 + 1;
                state.users.push(UserRow {
                    id,
                    username: body["username"].as_str().unwrap_or_default().to_string(),
                    email,
                    password: body["password"].as_str().unwrap_or_default().to_string(),
                });
                ResponseTemplate::new(201).set_body_json(json!({"message": "Usuário criado.", "userId": id}))
            })
            .mount(&self.server)
            .await;

        let state = self.state.clone();
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(move |request: &Request| {
                let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
                let identifier = body["identifier"].as_str().unwrap_or_default();
                let password = body["password"].as_str().unwrap_or_default();

                let mut state = state.lock();
                let user = state
                    .users
                    .iter()
                    .find(|u| (u.email == identifier || u.username == identifier) && u.password == password)
                    .cloned();
                let Some(user) = user else {
                    return ResponseTemplate::new(401)
                        .set_body_json(json!({"message": "Credenciais inválidas."}));
                };

                state.next_token += 1;
                let token = format!("token-{}-{}", user.id, state.next_token);
                state.tokens.insert(token.clone(), user.id);
                ResponseTemplate::new(200).set_body_json(json!({
                    "token": token,
                    "user": {"id": user.id, "username": user.username, "email": user.email}
                }))
            })
            .mount(&self.server)
            .await;

        let state = self.state.clone();
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(move |request: &Request| {
                let term = request
                    .url
                    .query_pairs()
                    .find(|(k, _)| k == "q")
                    .map(|(_, v)| v.to_lowercase())
                    .unwrap_or_default();
                let state = state.lock();
                // Newest first
                let posts: Vec<Value> = state
                    .posts
                    .iter()
                    .rev()
                    .filter(|p| {
                        term.is_empty()
                            || p.title.to_lowercase().contains(&term)
                            || p.content.to_lowercase().contains(&term)
                    })
                    .map(|p| state.post_json(p))
                    .collect();
                ResponseTemplate::new(200).set_body_json(posts)
            })
            .mount(&self.server)
            .await;

        let state = self.state.clone();
        Mock::given(method("POST"))
            .and(path("/posts"))
            .respond_with(move |request: &Request| {
                let mut state = state.lock();
                let Some(user_id) = state.user_for(request) else {
                    return unauthorized();
                };
                let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
                let post = PostRow {
                    id: state.posts.len() as i64 + 1,
                    user_id,
                    title: body["title"].as_str().unwrap_or_default().to_string(),
                    content: body["content"].as_str().unwrap_or_default().to_string(),
                    image_url: body["image_url"].as_str().map(str::to_string),
                };
                let response = state.post_json(&post);
                state.posts.push(post);
                ResponseTemplate::new(201).set_body_json(response)
            })
            .mount(&self.server)
            .await;

        let state = self.state.clone();
        Mock::given(method("GET"))
            .and(path_regex(r"^/users/\d+/likes$"))
            .respond_with(move |request: &Request| {
                let state = state.lock();
                if state.user_for(request).is_none() {
                    return unauthorized();
                }
                let user_id: i64 = request
                    .url
                    .path()
                    .split('/')
                    .nth(2)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default();
                let likes: Vec<Value> = state
                    .likes
                    .iter()
                    .filter(|(u, _)| *u == user_id)
                    .map(|(_, p)| json!({"post_id": p}))
                    .collect();
                ResponseTemplate::new(200).set_body_json(likes)
            })
            .mount(&self.server)
            .await;

        let state = self.state.clone();
        Mock::given(method("POST"))
            .and(path_regex(r"^/posts/\d+/like$"))
            .respond_with(move |request: &Request| {
                let mut state = state.lock();
                let Some(user_id) = state.user_for(request) else {
                    return unauthorized();
                };
                let Some(post_id) = post_id_from(request) else {
                    return ResponseTemplate::new(400);
                };
                let liked = if state.likes.remove(&(user_id, post_id)) {
                    false
                } else {
                    state.likes.insert((user_id, post_id));
                    true
                };
                ResponseTemplate::new(200).set_body_json(json!({"liked": liked}))
            })
            .mount(&self.server)
            .await;

        let state = self.state.clone();
        Mock::given(method("POST"))
            .and(path_regex(r"^/posts/\d+/favorite$"))
            .respond_with(move |request: &Request| {
                let mut state = state.lock();
                let Some(user_id) = state.user_for(request) else {
                    return unauthorized();
                };
                let Some(post_id) = post_id_from(request) else {
                    return ResponseTemplate::new(400);
                };
                let message = if state.favorites.remove(&(user_id, post_id)) {
                    "Post removido dos favoritos."
                } else {
                    state.favorites.insert((user_id, post_id));
                    "Post adicionado aos favoritos."
                };
                ResponseTemplate::new(200).set_body_json(json!({"message": message}))
            })
            .mount(&self.server)
            .await;

        let state = self.state.clone();
        Mock::given(method("POST"))
            .and(path_regex(r"^/upload/(post-image|profile-picture)$"))
            .respond_with(move |request: &Request| {
                let mut state = state.lock();
                if state.user_for(request).is_none() {
                    return unauthorized();
                }
                state.uploads += 1;
                let url = format!("/uploads/{}.jpg", state.uploads);
                ResponseTemplate::new(200).set_body_json(json!({"imageUrl": url}))
            })
            .mount(&self.server)
            .await;
    }
}
