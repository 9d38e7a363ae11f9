/// Tag catalog: free-text labels to stable tag ids
///
/// Names are normalized (trimmed, lowercased) before lookup. Two ingestions
/// racing on the same unseen label are settled by the unique constraint on
/// `tags.name`: the loser's insert yields nothing and it re-fetches the
/// winner's id. Only that race is retried here. Any store error leaves the
/// caller's transaction unusable, so it is returned for the caller to retry
/// with a fresh transaction.
use crate::error::AppError;
use crate::metrics::posting::TAG_RESOLUTION_RETRIES_TOTAL;
use crate::repository::{StoreError, TagStore};
use tracing::debug;
use uuid::Uuid;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct TagCatalog {
    max_attempts: u32,
}

impl Default for TagCatalog {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl TagCatalog {
    /// Normalized tag name, or `None` for a blank label
    pub fn normalize(label: &str) -> Option<String> {
        let name = label.trim().to_lowercase();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Resolve a label to its tag id, creating the tag on first sighting
    pub async fn resolve<S>(&self, store: &mut S, label: &str) -> Result<Uuid, AppError>
    where
        S: TagStore + ?Sized,
    {
        let name = Self::normalize(label)
            .ok_or_else(|| AppError::Validation("tag label must not be blank".to_string()))?;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                TAG_RESOLUTION_RETRIES_TOTAL.inc();
            }

            if let Some(id) = store.find_tag_id(&name).await? {
                return Ok(id);
            }

            match store.insert_tag(&name).await {
                Ok(Some(id)) => {
                    debug!(tag = %name, tag_id = %id, "Created tag");
                    return Ok(id);
                }
                Ok(None) | Err(StoreError::UniqueViolation(_)) => {
                    debug!(tag = %name, attempt, "Tag created concurrently, re-fetching");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::StoreUnavailable(format!(
            "could not resolve tag '{}' after {} attempts",
            name, self.max_attempts
        )))
    }
}
