//! StandingsService port - 勝敗記録の参照（読み取り専用）

use async_trait::async_trait;

use crate::domain::{ServiceError, TeamStandings};

#[async_trait]
pub trait StandingsService: Send + Sync {
    async fn get_team_standings(
        &self,
        team_abbrev: &str,
        season: u32,
    ) -> Result<TeamStandings, ServiceError>;
}
