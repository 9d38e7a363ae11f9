#![allow(dead_code)]

pub mod memory;

use jsonwebtoken::{encode, EncodingKey, Header};
use memory::{FakeBlobStore, FakeDetector, MemoryRevocationStore, MemoryStore};
use posting_service::auth::{Claims, JwtValidator, RevocationStore};
use posting_service::handlers::AppState;
use posting_service::middleware::JwtAuthMiddleware;
use posting_service::services::{
    FeedQueryService, PostIngestionService, PostService, SocialGraphGate,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "posting-service-test-secret-0123456789";

/// SOI/EOI framed bytes; the fakes never decode them
pub const JPEG_BYTES: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9,
];

/// Services wired to in-memory doubles
pub struct TestHarness {
    pub store: MemoryStore,
    pub blobs: Arc<FakeBlobStore>,
    pub detector: Arc<FakeDetector>,
    pub revocations: Arc<MemoryRevocationStore>,
    pub ingestion: Arc<PostIngestionService>,
    pub posts: PostService,
    pub feed: FeedQueryService,
    pub graph: SocialGraphGate,
}

impl TestHarness {
    pub fn new(detector: FakeDetector) -> Self {
        Self::build(FakeBlobStore::default(), detector, Duration::from_secs(5))
    }

    pub fn build(blobs: FakeBlobStore, detector: FakeDetector, call_timeout: Duration) -> Self {
        let store = MemoryStore::new();
        let blobs = Arc::new(blobs);
        let detector = Arc::new(detector);
        let shared = Arc::new(store.clone());

        let ingestion = Arc::new(PostIngestionService::new(
            shared.clone(),
            blobs.clone(),
            detector.clone(),
            call_timeout,
        ));

        Self {
            posts: PostService::new(shared.clone()),
            feed: FeedQueryService::new(shared.clone()),
            graph: SocialGraphGate::new(shared),
            store,
            blobs,
            detector,
            revocations: Arc::new(MemoryRevocationStore::default()),
            ingestion,
        }
    }

    pub fn app_state(&self) -> AppState {
        let revocations: Arc<dyn RevocationStore> = self.revocations.clone();
        AppState {
            ingestion: self.ingestion.clone(),
            posts: self.posts.clone(),
            feed: self.feed.clone(),
            graph: self.graph.clone(),
            revocations,
        }
    }

    pub fn auth_middleware(&self) -> JwtAuthMiddleware {
        let revocations: Arc<dyn RevocationStore> = self.revocations.clone();
        JwtAuthMiddleware::new(
            Arc::new(JwtValidator::new(TEST_JWT_SECRET.as_bytes())),
            revocations,
        )
    }
}

/// HS256 token for `user_id` valid for an hour, with a fresh session id
pub fn mint_token(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token encoding")
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
