//! League state: the one shared record the two orchestrators mutate.

use serde::{Deserialize, Serialize};

/// Current season/week and whether the transaction freeze is active.
///
/// `week` と `freeze` は必ず orchestrator 経由でまとめて更新される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueState {
    pub season: u32,
    pub week: u32,
    pub freeze: bool,
    /// Last week in which trades are accepted.
    pub trade_deadline: u32,
    /// First playoff week; the regular season is every week before it.
    pub playoffs_begin: u32,
}

impl LeagueState {
    pub fn is_regular_season_week(&self, week: u32) -> bool {
        week >= 1 && week < self.playoffs_begin
    }

    /// Apply a patch locally (used by in-memory stores).
    pub fn apply(&mut self, patch: &StatePatch) {
        if let Some(week) = patch.week {
            self.week = week;
        }
        if let Some(freeze) = patch.freeze {
            self.freeze = freeze;
        }
    }
}

/// Partial update sent to the league-state service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePatch {
    pub week: Option<u32>,
    pub freeze: Option<bool>,
}

impl StatePatch {
    /// `week += 1, freeze = true`
    pub fn begin_freeze(current_week: u32) -> Self {
        Self {
            week: Some(current_week.saturating_add(1)),
            freeze: Some(true),
        }
    }

    pub fn end_freeze() -> Self {
        Self {
            week: None,
            freeze: Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> LeagueState {
        LeagueState {
            season: 12,
            week: 5,
            freeze: false,
            trade_deadline: 14,
            playoffs_begin: 19,
        }
    }

    #[test]
    fn begin_freeze_patch_moves_week_and_flag_together() {
        let mut s = state();
        s.apply(&StatePatch::begin_freeze(s.week));
        assert_eq!(s.week, 6);
        assert!(s.freeze);

        s.apply(&StatePatch::end_freeze());
        assert_eq!(s.week, 6);
        assert!(!s.freeze);
    }

    #[test]
    fn begin_freeze_at_max_week_does_not_overflow() {
        assert_eq!(StatePatch::begin_freeze(u32::MAX).week, Some(u32::MAX));
    }

    #[test]
    fn regular_season_stops_before_playoffs() {
        let s = state();
        assert!(!s.is_regular_season_week(0));
        assert!(s.is_regular_season_week(1));
        assert!(s.is_regular_season_week(18));
        assert!(!s.is_regular_season_week(19));
    }
}
