pub mod config;
pub mod db;
pub mod feed;
pub mod media;
pub mod models;
pub mod sync;
pub mod tickets;
mod utils;

pub use config::AppConfig;
pub use db::Store;
pub use feed::{EventFeed, FeedError, HttpFeed};
pub use media::MediaStore;
pub use models::{ExternalEvent, LocalEventRecord};
pub use sync::{StaleDeletePolicy, SyncError, SyncJob, SyncOutcome};
