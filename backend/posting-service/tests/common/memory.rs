//! In-memory doubles for the storage ports and external collaborators.
//!
//! `MemoryStore` emulates the constraints the PostgreSQL schema enforces
//! (foreign keys, unique pairs, unique tag names) and stages transaction
//! writes until commit.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use posting_service::auth::RevocationStore;
use posting_service::clients::{BlobStore, LabelDetector};
use posting_service::error::AppError;
use posting_service::models::{DetectedLabel, FeedRow, NewPost, PageRequest, PostRow};
use posting_service::repository::{
    FeedStore, PostStore, PostWriteTx, SocialGraphStore, StoreError, TagStore,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, String>,
    posts: Vec<PostRow>,
    tags: Vec<(Uuid, String)>,
    post_tags: Vec<(Uuid, Uuid)>,
    follows: Vec<(Uuid, Uuid)>,
    /// (user_id, post_id)
    likes: Vec<(Uuid, Uuid)>,
    clock: i64,
}

impl State {
    /// Strictly increasing timestamps so ordering is deterministic
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.timestamp_opt(1_700_000_000 + self.clock, 0).unwrap()
    }

    fn feed_row(&self, post: &PostRow, viewer_id: Uuid) -> FeedRow {
        FeedRow {
            id: post.id,
            user_id: post.user_id,
            email: self.users.get(&post.user_id).cloned().unwrap_or_default(),
            image_url: post.image_url.clone(),
            content: post.content.clone(),
            created_at: post.created_at,
            like_cnt: self.likes.iter().filter(|(_, p)| *p == post.id).count() as i64,
            is_liked: self.likes.contains(&(viewer_id, post.id)),
        }
    }
}

#[derive(Default)]
struct Faults {
    fail_tag_links: bool,
    aborted_links: u32,
    unavailable: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    faults: Arc<Mutex<Faults>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().users.insert(id, email.to_string());
        id
    }

    /// Make every `link_tag` fail with a query error
    pub fn fail_tag_links(&self, fail: bool) {
        self.faults.lock().unwrap().fail_tag_links = fail;
    }

    /// Make the next `count` calls to `link_tag` fail as if the database had
    /// picked the transaction as a deadlock victim
    pub fn abort_next_links(&self, count: u32) {
        self.faults.lock().unwrap().aborted_links = count;
    }

    /// Make every operation fail as if the pool timed out
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.lock().unwrap().unavailable = unavailable;
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().unwrap().posts.len()
    }

    pub fn tag_count(&self) -> usize {
        self.state.lock().unwrap().tags.len()
    }

    pub fn post_tag_count(&self) -> usize {
        self.state.lock().unwrap().post_tags.len()
    }

    pub fn like_count(&self) -> usize {
        self.state.lock().unwrap().likes.len()
    }

    pub fn follow_exists(&self, follower_id: Uuid, followee_id: Uuid) -> bool {
        self.state
            .lock()
            .unwrap()
            .follows
            .contains(&(follower_id, followee_id))
    }

    /// Tag names linked to a post, alphabetical
    pub fn tags_of(&self, post_id: Uuid) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut names: Vec<String> = state
            .post_tags
            .iter()
            .filter(|(p, _)| *p == post_id)
            .filter_map(|(_, t)| state.tags.iter().find(|(id, _)| id == t))
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.faults.lock().unwrap().unavailable {
            Err(StoreError::Unavailable(
                "pool timed out while waiting for an open connection".into(),
            ))
        } else {
            Ok(())
        }
    }
}

struct MemoryTx {
    store: MemoryStore,
    posts: Vec<PostRow>,
    tags: Vec<(Uuid, String)>,
    links: Vec<(Uuid, Uuid)>,
}

impl MemoryTx {
    fn staged_or_committed_tag(&self, name: &str) -> Option<Uuid> {
        if let Some((id, _)) = self.tags.iter().find(|(_, n)| n == name) {
            return Some(*id);
        }
        let state = self.store.state.lock().unwrap();
        state.tags.iter().find(|(_, n)| n == name).map(|(id, _)| *id)
    }
}

#[async_trait]
impl TagStore for MemoryTx {
    async fn find_tag_id(&mut self, name: &str) -> Result<Option<Uuid>, StoreError> {
        self.store.check_available()?;
        Ok(self.staged_or_committed_tag(name))
    }

    async fn insert_tag(&mut self, name: &str) -> Result<Option<Uuid>, StoreError> {
        self.store.check_available()?;
        if self.staged_or_committed_tag(name).is_some() {
            return Ok(None);
        }
        let id = Uuid::new_v4();
        self.tags.push((id, name.to_string()));
        Ok(Some(id))
    }
}

#[async_trait]
impl PostWriteTx for MemoryTx {
    async fn insert_post(&mut self, post: &NewPost) -> Result<PostRow, StoreError> {
        self.store.check_available()?;
        let mut state = self.store.state.lock().unwrap();
        if !state.users.contains_key(&post.user_id) {
            return Err(StoreError::ForeignKeyViolation(
                "insert on table \"posts\" violates foreign key constraint \"posts_user_id_fkey\""
                    .into(),
            ));
        }
        let row = PostRow {
            id: post.id,
            user_id: post.user_id,
            image_url: post.image_url.clone(),
            content: post.content.clone(),
            created_at: state.next_timestamp(),
            updated_at: None,
        };
        drop(state);

        self.posts.push(row.clone());
        Ok(row)
    }

    async fn link_tag(&mut self, post_id: Uuid, tag_id: Uuid) -> Result<(), StoreError> {
        self.store.check_available()?;
        {
            let mut faults = self.store.faults.lock().unwrap();
            if faults.fail_tag_links {
                return Err(StoreError::Query("injected post_tags failure".into()));
            }
            if faults.aborted_links > 0 {
                faults.aborted_links -= 1;
                return Err(StoreError::TransactionAborted("deadlock detected".into()));
            }
        }
        if self.links.contains(&(post_id, tag_id)) {
            return Err(StoreError::UniqueViolation(
                "duplicate key value violates unique constraint \"post_tags_pkey\"".into(),
            ));
        }
        let tag_known = self.tags.iter().any(|(id, _)| *id == tag_id)
            || self.store.state.lock().unwrap().tags.iter().any(|(id, _)| *id == tag_id);
        if !self.posts.iter().any(|p| p.id == post_id) || !tag_known {
            return Err(StoreError::ForeignKeyViolation("post_tags foreign key".into()));
        }
        self.links.push((post_id, tag_id));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.store.check_available()?;
        let mut state = self.store.state.lock().unwrap();
        if self
            .tags
            .iter()
            .any(|(_, name)| state.tags.iter().any(|(_, n)| n == name))
        {
            return Err(StoreError::UniqueViolation(
                "duplicate key value violates unique constraint \"tags_name_key\"".into(),
            ));
        }
        state.tags.extend(self.tags.iter().cloned());
        state.posts.extend(self.posts.iter().cloned());
        state.post_tags.extend(self.links.iter().cloned());
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn PostWriteTx>, StoreError> {
        self.check_available()?;
        Ok(Box::new(MemoryTx {
            store: self.clone(),
            posts: Vec::new(),
            tags: Vec::new(),
            links: Vec::new(),
        }))
    }

    async fn update_post_content(
        &self,
        owner_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Option<PostRow>, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let updated_at = state.next_timestamp();
        let Some(post) = state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id && p.user_id == owner_id)
        else {
            return Ok(None);
        };
        post.content = content.to_string();
        post.updated_at = Some(updated_at);
        Ok(Some(post.clone()))
    }

    async fn delete_post_cascade(&self, owner_id: Uuid, post_id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        if !state
            .posts
            .iter()
            .any(|p| p.id == post_id && p.user_id == owner_id)
        {
            return Ok(false);
        }
        state.post_tags.retain(|(p, _)| *p != post_id);
        state.likes.retain(|(_, p)| *p != post_id);
        state.posts.retain(|p| p.id != post_id);
        Ok(true)
    }
}

fn window<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl FeedStore for MemoryStore {
    async fn posts_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<PostRow>, StoreError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let mut posts: Vec<PostRow> = state
            .posts
            .iter()
            .filter(|p| p.user_id == owner_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(window(posts, page))
    }

    async fn followed_feed(
        &self,
        viewer_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<FeedRow>, StoreError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let mut posts: Vec<&PostRow> = state
            .posts
            .iter()
            .filter(|p| state.follows.contains(&(viewer_id, p.user_id)))
            .collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        let rows = posts
            .into_iter()
            .map(|p| state.feed_row(p, viewer_id))
            .collect();
        Ok(window(rows, page))
    }

    async fn post_detail(
        &self,
        viewer_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<FeedRow>, StoreError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| state.feed_row(p, viewer_id)))
    }

    async fn post_tag_names(&self, post_id: Uuid) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        Ok(self.tags_of(post_id))
    }
}

#[async_trait]
impl SocialGraphStore for MemoryStore {
    async fn insert_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(&follower_id) || !state.users.contains_key(&followee_id) {
            return Err(StoreError::ForeignKeyViolation("follows foreign key".into()));
        }
        if state.follows.contains(&(follower_id, followee_id)) {
            return Ok(false);
        }
        state.follows.push((follower_id, followee_id));
        Ok(true)
    }

    async fn delete_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let before = state.follows.len();
        state.follows.retain(|edge| *edge != (follower_id, followee_id));
        Ok(state.follows.len() < before)
    }

    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(&user_id) || !state.posts.iter().any(|p| p.id == post_id) {
            return Err(StoreError::ForeignKeyViolation("likes foreign key".into()));
        }
        if state.likes.contains(&(user_id, post_id)) {
            return Ok(false);
        }
        state.likes.push((user_id, post_id));
        Ok(true)
    }

    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let before = state.likes.len();
        state.likes.retain(|edge| *edge != (user_id, post_id));
        Ok(state.likes.len() < before)
    }
}

// =============================================================================
// Blob store / detector / revocation doubles
// =============================================================================

pub const CDN_BASE: &str = "https://cdn.test";

#[derive(Default)]
pub struct FakeBlobStore {
    fail: bool,
    uploads: Mutex<Vec<(String, usize, String)>>,
}

impl FakeBlobStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// (key, size, content type) of every successful upload
    pub fn uploads(&self) -> Vec<(String, usize, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        if self.fail {
            return Err(AppError::Storage("bucket unreachable".into()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), bytes.len(), content_type.to_string()));
        Ok(format!("{}/{}", CDN_BASE, key))
    }
}

pub enum DetectorBehavior {
    Labels(Vec<DetectedLabel>),
    Fail,
    Hang,
}

pub struct FakeDetector {
    behavior: DetectorBehavior,
    calls: Mutex<Vec<String>>,
}

impl FakeDetector {
    pub fn with_labels(labels: &[(&str, f32)]) -> Self {
        Self::new(DetectorBehavior::Labels(
            labels
                .iter()
                .map(|(name, confidence)| DetectedLabel::new(*name, *confidence))
                .collect(),
        ))
    }

    pub fn failing() -> Self {
        Self::new(DetectorBehavior::Fail)
    }

    pub fn hanging() -> Self {
        Self::new(DetectorBehavior::Hang)
    }

    fn new(behavior: DetectorBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Keys the detector was asked about
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LabelDetector for FakeDetector {
    async fn detect(&self, key: &str) -> Result<Vec<DetectedLabel>, AppError> {
        self.calls.lock().unwrap().push(key.to_string());
        match &self.behavior {
            DetectorBehavior::Labels(labels) => Ok(labels.clone()),
            DetectorBehavior::Fail => Err(AppError::Detection("throttled".into())),
            DetectorBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryRevocationStore {
    revoked: Mutex<HashMap<String, DateTime<Utc>>>,
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        self.revoked
            .lock()
            .unwrap()
            .insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        Ok(self
            .revoked
            .lock()
            .unwrap()
            .get(jti)
            .map(|exp| *exp > Utc::now())
            .unwrap_or(false))
    }
}
