//! LeagueStateService port - league state の正本（source of truth）

use async_trait::async_trait;

use crate::domain::{LeagueState, ServiceError, StatePatch};

/// Read and atomically patch the single league-state record.
///
/// `update_current_state` must apply the whole patch or nothing.
#[async_trait]
pub trait LeagueStateService: Send + Sync {
    async fn get_current_state(&self) -> Result<LeagueState, ServiceError>;

    async fn update_current_state(&self, patch: StatePatch) -> Result<LeagueState, ServiceError>;
}
