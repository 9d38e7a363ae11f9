/// Business logic layer for posting-service
pub mod feed;
pub mod ingestion;
pub mod posts;
pub mod social_graph;
pub mod tag_catalog;

pub use feed::FeedQueryService;
pub use ingestion::PostIngestionService;
pub use posts::PostService;
pub use social_graph::SocialGraphGate;
pub use tag_catalog::TagCatalog;
