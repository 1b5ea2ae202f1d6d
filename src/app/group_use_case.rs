use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::ports::GroupApiPort;
use crate::error::{Result, ValidationError};
use crate::types::Location;

/// Group-level operations that are not tied to an upload.
pub struct GroupSyncUseCase {
    api: Arc<dyn GroupApiPort>,
}

impl GroupSyncUseCase {
    pub fn new(api: Arc<dyn GroupApiPort>) -> Self {
        Self { api }
    }

    /// Groups known for a district/block. A failed lookup is logged and counts as zero.
    pub async fn count(&self, location: &Location) -> std::result::Result<u64, ValidationError> {
        if !location.is_complete() {
            return Err(ValidationError::MissingLocation);
        }
        match self.api.group_count(&location.lowercased()).await {
            Ok(count) => Ok(count),
            Err(e) => {
                warn!(error = %e, "Group count lookup failed");
                Ok(0)
            }
        }
    }

    /// Starts a backend-side resync of every group.
    pub async fn sync(&self) -> Result<Value> {
        let reply = self.api.sync_groups().await?;
        info!("Group sync started");
        Ok(reply)
    }
}
