//! Regular transaction executor.
//!
//! Applies the week's non-frozen moves one at a time. A failed move is logged
//! and counted, never raised; the next move is attempted regardless.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::ports::{RosterService, TransactionService};

/// Default pause between two roster updates.
pub const DEFAULT_PACING: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct RegularExecutor {
    transactions: Arc<dyn TransactionService>,
    roster: Arc<dyn RosterService>,
    pacing: Duration,
}

impl RegularExecutor {
    pub fn new(
        transactions: Arc<dyn TransactionService>,
        roster: Arc<dyn RosterService>,
        pacing: Duration,
    ) -> Self {
        Self {
            transactions,
            roster,
            pacing,
        }
    }

    /// Apply every pending, non-frozen move of `week`.
    pub async fn run(&self, season: u32, week: u32) -> ExecutionSummary {
        let moves = match self
            .transactions
            .get_regular_transactions_by_week(season, week, week.saturating_add(1))
            .await
        {
            Ok(moves) => moves,
            Err(err) => {
                // 一覧が取れない = 何もすることがない
                warn!(season, week, error = %err, "regular transactions unavailable; nothing to run");
                return ExecutionSummary::default();
            }
        };

        let mut summary = ExecutionSummary::default();
        for (i, t) in moves.iter().filter(|t| !t.frozen && t.is_pending()).enumerate() {
            if i > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            summary.attempted += 1;
            match self.roster.update_player_team(t.player.id, t.to_team.id).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    info!(
                        move_id = %t.move_id,
                        player = %t.player.name,
                        from = %t.from_team.abbrev,
                        to = %t.to_team.abbrev,
                        "transaction applied"
                    );
                }
                Err(err) => {
                    summary.failed += 1;
                    error!(
                        move_id = %t.move_id,
                        player = %t.player.name,
                        player_id = %t.player.id,
                        to = %t.to_team.abbrev,
                        error = %err,
                        "transaction failed"
                    );
                }
            }
        }

        info!(
            season,
            week,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "regular transactions processed"
        );
        summary
    }
}
