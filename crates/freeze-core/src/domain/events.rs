//! Domain events - 監査ログ用のイベント
//!
//! Emitted for every freeze/thaw transition and every contest resolution.
//! The `EventSink` port decides where they go.

use serde::Serialize;

use super::ids::{MoveId, TeamId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LeagueEvent {
    FreezeBegan {
        season: u32,
        week: u32,
    },
    FreezeEnded {
        season: u32,
        week: u32,
        winners: usize,
        losers: usize,
    },
    ContestResolved {
        player: String,
        /// `None` when every claimant lost a contest elsewhere in its move.
        winner: Option<ContestEntry>,
        losers: Vec<ContestEntry>,
    },
}

/// One claimant in a contest, with the priority it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContestEntry {
    pub move_id: MoveId,
    pub team_id: TeamId,
    pub team_abbrev: String,
    pub win_percentage: f64,
    pub tiebreaker: f64,
}

impl LeagueEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FreezeBegan { .. } => "freeze_began",
            Self::FreezeEnded { .. } => "freeze_ended",
            Self::ContestResolved { .. } => "contest_resolved",
        }
    }
}
