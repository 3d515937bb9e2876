use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::Store;
use crate::feed::{EventFeed, FeedError};
use crate::media::MediaStore;
use crate::models::{storage_datetime, ExternalEvent, LocalEventRecord, MapError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("image store error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Map(#[from] MapError),
}

/// What to do with the stale-event snapshot when the feed answers with an
/// HTTP error response instead of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleDeletePolicy {
    /// Delete nothing; a failed fetch says nothing about upstream deletions.
    #[default]
    SkipOnFeedError,
    /// Run the deletion phase against the full snapshot anyway, dropping
    /// every live event whenever the feed errors.
    RunOnFeedError,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub created: usize,
    pub deleted: usize,
}

/// One reconciliation pass over the feed: create records for events newly
/// seen upstream, delete live records whose external id has disappeared.
/// Existing records are never updated.
pub struct SyncJob<'a, F: EventFeed> {
    feed: &'a F,
    store: &'a Store,
    media: &'a MediaStore,
    policy: StaleDeletePolicy,
}

impl<'a, F: EventFeed> SyncJob<'a, F> {
    pub fn new(
        feed: &'a F,
        store: &'a Store,
        media: &'a MediaStore,
        policy: StaleDeletePolicy,
    ) -> Self {
        Self {
            feed,
            store,
            media,
            policy,
        }
    }

    pub fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let now = storage_datetime(Utc::now());
        let mut snapshot = self.store.live_external_ids(&now)?;

        let events = match self.feed.fetch_events() {
            Ok(events) => events,
            Err(FeedError::Status(code)) => {
                warn!(code, "feed returned an error response");
                match self.policy {
                    StaleDeletePolicy::SkipOnFeedError => return Ok(SyncOutcome::default()),
                    StaleDeletePolicy::RunOnFeedError => Vec::new(),
                }
            }
            // Transport and decode failures abort before any store write.
            Err(err) => return Err(err.into()),
        };

        let mut created = 0;
        for event in &events {
            if self.store.has_event(&event.id)? {
                // Still in the feed; it must not reach the deletion phase.
                snapshot.remove(&event.id);
                continue;
            }
            self.create_event(event, &mut snapshot)?;
            created += 1;
        }

        // Whatever is left in the snapshot was live locally but is gone
        // from the feed.
        let deleted = if snapshot.is_empty() {
            0
        } else {
            self.store.delete_by_external_ids(&snapshot)?
        };

        info!(created, deleted, "sync pass finished");
        Ok(SyncOutcome { created, deleted })
    }

    fn create_event(
        &self,
        event: &ExternalEvent,
        snapshot: &mut HashSet<String>,
    ) -> Result<(), SyncError> {
        let image = self.feed.fetch_image(&event.image)?;
        let image_path = self.media.store_image(&event.id, &image)?;
        let record =
            LocalEventRecord::from_feed(event, &image_path.to_string_lossy(), Utc::now())?;
        self.store.insert_event(&record)?;
        snapshot.remove(&event.id);
        Ok(())
    }
}
