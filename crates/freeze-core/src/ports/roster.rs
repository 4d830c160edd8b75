//! RosterService port - 選手の所属変更

use async_trait::async_trait;

use crate::domain::{PlayerId, ServiceError, TeamId};

#[async_trait]
pub trait RosterService: Send + Sync {
    async fn update_player_team(
        &self,
        player_id: PlayerId,
        new_team_id: TeamId,
    ) -> Result<(), ServiceError>;
}
