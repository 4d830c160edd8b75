//! Freeze-end (thaw): resolve queued claims, then lift the freeze.
//!
//! # フロー
//! 1. 今週の frozen transaction を取得
//! 2. 0 件なら 4 へ
//! 3. resolver で勝者/敗者を決定 → 敗者は cancel + DM、勝者は unfreeze + ログ投稿
//! 4. league state を `freeze = false` に更新
//! 5. freeze 終了をアナウンス
//!
//! Step 4 only runs after every cancel/unfreeze of step 3 has been issued.
//! Clearing the flag earlier would open a window where unresolved claims
//! look like ordinary moves.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::messages;
use super::resolver::ContestResolver;
use crate::config::ChannelConfig;
use crate::domain::{FreezeError, LeagueEvent, LeagueState, MoveId, StatePatch, Transaction, UserId};
use crate::ports::{EventSink, LeagueStateService, Notifier, TransactionService};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreezeEndReport {
    pub season: u32,
    pub week: u32,
    pub winners: BTreeSet<MoveId>,
    pub losers: BTreeSet<MoveId>,
    /// Move groups whose cancel/unfreeze call failed.
    pub failed_updates: usize,
    pub announced: bool,
}

pub struct FreezeEnd {
    league: Arc<dyn LeagueStateService>,
    transactions: Arc<dyn TransactionService>,
    resolver: ContestResolver,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventSink>,
    channels: ChannelConfig,
}

impl FreezeEnd {
    pub fn new(
        league: Arc<dyn LeagueStateService>,
        transactions: Arc<dyn TransactionService>,
        resolver: ContestResolver,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn EventSink>,
        channels: ChannelConfig,
    ) -> Self {
        Self {
            league,
            transactions,
            resolver,
            notifier,
            events,
            channels,
        }
    }

    pub async fn run(&self, current: &LeagueState) -> Result<FreezeEndReport, FreezeError> {
        let (season, week) = (current.season, current.week);
        let frozen = self
            .transactions
            .get_frozen_transactions_by_week(season, week, week.saturating_add(1))
            .await
            .map_err(|source| FreezeError::FrozenTransactions {
                season,
                week,
                source,
            })?;

        let mut report = FreezeEndReport {
            season,
            week,
            ..Default::default()
        };

        if frozen.is_empty() {
            info!(season, week, "no frozen transactions to resolve");
        } else {
            self.settle(&frozen, &mut report).await;
        }

        // 解決がすべて終わってから freeze を解除する
        let state = self
            .league
            .update_current_state(StatePatch::end_freeze())
            .await
            .map_err(FreezeError::StateUpdate)?;

        info!(
            season,
            week,
            winners = report.winners.len(),
            losers = report.losers.len(),
            "freeze ended"
        );
        self.events.emit(LeagueEvent::FreezeEnded {
            season,
            week,
            winners: report.winners.len(),
            losers: report.losers.len(),
        });

        let message =
            messages::freeze_end_announcement(&state, report.winners.len(), report.losers.len());
        report.announced = match self
            .notifier
            .post_announcement(&self.channels.announcements, &message)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "freeze-end announcement failed");
                false
            }
        };

        Ok(report)
    }

    async fn settle(&self, frozen: &[Transaction], report: &mut FreezeEndReport) {
        let resolution = self.resolver.resolve(frozen, report.season).await;

        for contest in &resolution.contests {
            info!(
                player = %contest.player,
                winner = ?contest.winner.as_ref().map(|w| &w.move_id),
                losers = contest.losers.len(),
                "contest resolved"
            );
            self.events.emit(LeagueEvent::ContestResolved {
                player: contest.player.clone(),
                winner: contest.winner.clone(),
                losers: contest.losers.clone(),
            });
        }

        let mut groups: BTreeMap<&MoveId, Vec<&Transaction>> = BTreeMap::new();
        for t in frozen {
            groups.entry(&t.move_id).or_default().push(t);
        }

        for move_id in &resolution.losers {
            let moves = groups.get(move_id).map(Vec::as_slice).unwrap_or_default();
            match self.transactions.cancel_transaction(move_id).await {
                Ok(true) => {}
                Ok(false) => warn!(move_id = %move_id, "cancel matched no transactions"),
                Err(err) => {
                    report.failed_updates += 1;
                    error!(move_id = %move_id, error = %err, "cancel failed");
                    continue;
                }
            }
            self.notify_lost_claim(move_id, moves).await;
        }

        for move_id in &resolution.winners {
            let moves = groups.get(move_id).map(Vec::as_slice).unwrap_or_default();
            match self.transactions.unfreeze_transaction(move_id).await {
                Ok(true) => {}
                Ok(false) => warn!(move_id = %move_id, "unfreeze matched no transactions"),
                Err(err) => {
                    report.failed_updates += 1;
                    error!(move_id = %move_id, error = %err, "unfreeze failed");
                    continue;
                }
            }
            let entry = messages::transaction_log_entry(report.week, move_id, moves);
            if let Err(err) = self
                .notifier
                .post_announcement(&self.channels.transaction_log, &entry)
                .await
            {
                warn!(move_id = %move_id, error = %err, "transaction log post failed");
            }
        }

        report.winners = resolution.winners;
        report.losers = resolution.losers;
    }

    /// DM every manager of the team(s) the lost move was claiming for.
    async fn notify_lost_claim(&self, move_id: &MoveId, moves: &[&Transaction]) {
        let managers: BTreeSet<UserId> = moves
            .iter()
            .filter(|t| t.is_claim())
            .flat_map(|t| t.to_team.manager_ids.iter().copied())
            .collect();

        let message = messages::lost_claim_message(move_id, moves);
        for user_id in managers {
            if let Err(err) = self.notifier.direct_message(user_id, &message).await {
                warn!(move_id = %move_id, %user_id, error = %err, "lost-claim DM failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TeamStandings, TransactionStatus};
    use crate::impls::{InMemoryLeague, RecordingEventSink};
    use crate::ports::ZeroTiebreak;
    use crate::testkit::{frozen_claim, league_state, manager_of};

    fn orchestrator(league: &InMemoryLeague, events: Arc<RecordingEventSink>) -> FreezeEnd {
        let shared = Arc::new(league.clone());
        FreezeEnd::new(
            shared.clone(),
            shared.clone(),
            ContestResolver::new(shared.clone(), Arc::new(ZeroTiebreak)),
            shared,
            events,
            ChannelConfig::default(),
        )
    }

    async fn contested_league() -> InMemoryLeague {
        let league = InMemoryLeague::new(league_state(6, true));
        league.set_standings("NYY", TeamStandings::new(7, 3)).await;
        league.set_standings("BOS", TeamStandings::new(3, 7)).await;
        league.insert_transaction(frozen_claim("m-nyy", 1, "J. Doe", 10, "NYY", 6)).await;
        league.insert_transaction(frozen_claim("m-bos", 1, "J. Doe", 11, "BOS", 6)).await;
        league.insert_transaction(frozen_claim("m-solo", 2, "R. Roe", 10, "NYY", 6)).await;
        league
    }

    #[tokio::test]
    async fn empty_week_still_lifts_freeze_and_announces() {
        let league = InMemoryLeague::new(league_state(6, true));
        let events = Arc::new(RecordingEventSink::new());

        let report = orchestrator(&league, events.clone())
            .run(&league_state(6, true))
            .await
            .unwrap();

        assert!(report.winners.is_empty() && report.losers.is_empty());
        assert_eq!(league.league_state().await, Some(league_state(6, false)));
        assert_eq!(league.announcements_in("announcements").await.len(), 1);
        let calls = league.calls().await;
        assert!(calls.cancelled.is_empty());
        assert!(calls.unfrozen.is_empty());
        assert_eq!(events.events().len(), 1);
    }

    #[tokio::test]
    async fn losers_cancelled_winners_unfrozen() {
        let league = contested_league().await;

        let report = orchestrator(&league, Arc::new(RecordingEventSink::new()))
            .run(&league_state(6, true))
            .await
            .unwrap();

        let calls = league.calls().await;
        assert_eq!(calls.cancelled, vec![MoveId::from("m-nyy")]);
        assert_eq!(calls.unfrozen.len(), 2);
        assert_eq!(report.failed_updates, 0);

        for t in league.transactions().await {
            match t.move_id.as_str() {
                "m-nyy" => assert_eq!(t.status, TransactionStatus::Cancelled),
                _ => assert!(!t.frozen),
            }
        }
    }

    #[tokio::test]
    async fn loser_manager_gets_a_dm_and_winner_gets_a_log_entry() {
        let league = contested_league().await;

        orchestrator(&league, Arc::new(RecordingEventSink::new()))
            .run(&league_state(6, true))
            .await
            .unwrap();

        let dms = league.direct_messages_to(manager_of(10)).await;
        assert_eq!(dms.len(), 1);
        assert!(dms[0].contains("m-nyy"));
        assert!(league.direct_messages_to(manager_of(11)).await.is_empty());

        let log = league.announcements_in("transaction-log").await;
        assert_eq!(log.len(), 2);
        assert!(log.iter().any(|m| m.contains("m-bos") && m.contains("J. Doe")));
    }

    #[tokio::test]
    async fn freeze_is_cleared_only_after_every_commit_and_cancel() {
        let league = contested_league().await;

        orchestrator(&league, Arc::new(RecordingEventSink::new()))
            .run(&league_state(6, true))
            .await
            .unwrap();

        // state update は最後の 1 回だけ、かつ freeze=false
        let calls = league.calls().await;
        assert_eq!(calls.state_updates, vec![StatePatch::end_freeze()]);
        assert!(league.get_frozen_transactions_by_week(12, 6, 7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn contest_resolutions_are_audited() {
        let league = contested_league().await;
        let events = Arc::new(RecordingEventSink::new());

        orchestrator(&league, events.clone())
            .run(&league_state(6, true))
            .await
            .unwrap();

        let events = events.events();
        assert!(matches!(
            &events[0],
            LeagueEvent::ContestResolved { player, winner: Some(w), losers }
                if player == "J. Doe" && w.team_abbrev == "BOS" && losers.len() == 1
        ));
        assert!(matches!(events.last(), Some(LeagueEvent::FreezeEnded { winners: 2, losers: 1, .. })));
    }

    #[tokio::test]
    async fn failed_cancel_is_isolated_and_freeze_still_clears() {
        let league = contested_league().await;
        league.fail_cancel_for(&MoveId::from("m-nyy")).await;

        let report = orchestrator(&league, Arc::new(RecordingEventSink::new()))
            .run(&league_state(6, true))
            .await
            .unwrap();

        assert_eq!(report.failed_updates, 1);
        let calls = league.calls().await;
        assert!(calls.cancelled.is_empty());
        assert_eq!(calls.unfrozen.len(), 2);
        // 失敗した group には DM を送らない
        assert!(league.direct_messages_to(manager_of(10)).await.is_empty());
        assert_eq!(calls.state_updates, vec![StatePatch::end_freeze()]);
        assert_eq!(league.league_state().await, Some(league_state(6, false)));
    }

    #[tokio::test]
    async fn failed_unfreeze_is_isolated_and_freeze_still_clears() {
        let league = contested_league().await;
        league.fail_unfreeze_for(&MoveId::from("m-bos")).await;

        let report = orchestrator(&league, Arc::new(RecordingEventSink::new()))
            .run(&league_state(6, true))
            .await
            .unwrap();

        assert_eq!(report.failed_updates, 1);
        let calls = league.calls().await;
        assert_eq!(calls.cancelled, vec![MoveId::from("m-nyy")]);
        assert_eq!(calls.unfrozen, vec![MoveId::from("m-solo")]);
        assert_eq!(league.direct_messages_to(manager_of(10)).await.len(), 1);

        let log = league.announcements_in("transaction-log").await;
        assert_eq!(log.len(), 1);
        assert!(log[0].contains("m-solo"));
        assert!(!log.iter().any(|m| m.contains("m-bos")));

        assert_eq!(calls.state_updates, vec![StatePatch::end_freeze()]);
        assert_eq!(league.league_state().await, Some(league_state(6, false)));
        assert_eq!(league.announcements_in("announcements").await.len(), 1);
    }

    #[tokio::test]
    async fn unreadable_frozen_list_keeps_freeze_on() {
        let league = contested_league().await;
        league.fail_transaction_reads(true).await;

        let err = orchestrator(&league, Arc::new(RecordingEventSink::new()))
            .run(&league_state(6, true))
            .await
            .unwrap_err();

        assert!(matches!(err, FreezeError::FrozenTransactions { week: 6, .. }));
        assert_eq!(league.league_state().await, Some(league_state(6, true)));
    }

    #[tokio::test]
    async fn state_update_failure_is_reported_after_resolution() {
        let league = contested_league().await;
        league.fail_state_updates(true).await;

        let err = orchestrator(&league, Arc::new(RecordingEventSink::new()))
            .run(&league_state(6, true))
            .await
            .unwrap_err();

        assert!(matches!(err, FreezeError::StateUpdate(_)));
        assert!(league.league_state().await.unwrap().freeze);
        assert!(league.announcements_in("announcements").await.is_empty());
    }
}
