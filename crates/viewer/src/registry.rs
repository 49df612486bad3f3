//! Severity discovery
//!
//! The set of known severities is derived from the counter store on
//! every refresh; the registry holds no state of its own. The scan is
//! cursor-paginated - never one unbounded call - and each observed
//! severity gets the viewer consumer group created lazily, with
//! "already exists" treated as success.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use sift_protocol::SEVERITY_COUNTER_SET;
use sift_store::{LogStore, Result};

/// Read-through view of the observed severities
pub struct SeverityRegistry {
    store: Arc<dyn LogStore>,
    group: String,
}

impl SeverityRegistry {
    /// Create a registry that provisions `group` on discovered topics
    pub fn new(store: Arc<dyn LogStore>, group: impl Into<String>) -> Self {
        Self {
            store,
            group: group.into(),
        }
    }

    /// Scan the counter store and return every known severity
    ///
    /// A severity whose topic has not materialized yet is still
    /// reported; its group creation is retried on the next refresh.
    pub async fn refresh(&self) -> Result<BTreeSet<String>> {
        let mut severities = BTreeSet::new();
        let mut cursor = 0;

        loop {
            let (next, members) = self.store.scan_set(SEVERITY_COUNTER_SET, cursor).await?;

            for severity in members {
                if severities.insert(severity.clone()) {
                    // Lazy group provisioning; duplicate creation is
                    // success, and a missing topic just waits for the
                    // splitter to catch up.
                    if let Err(err) = self.store.create_group(&severity, &self.group, false).await
                    {
                        debug!(
                            topic = %severity,
                            error = %err,
                            "viewer group not created yet"
                        );
                    }
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(severities)
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
