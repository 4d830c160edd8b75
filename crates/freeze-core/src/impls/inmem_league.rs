//! InMemoryLeague - 開発用・テスト用の外部サービス一式
//!
//! 一つの struct で全ての collaborator port を実装する:
//! league state, transactions, standings, rosters, notifications.
//!
//! # 学習ポイント
//! - tokio::sync::Mutex で状態を一箇所に集約（single source of truth）
//! - 故障注入（fault injection）で orchestrator の失敗経路をテスト
//! - 呼び出し履歴（CallLog）で「何回 cancel したか」などを検証

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{
    LeagueState, MoveId, PlayerId, ServiceError, StatePatch, TeamId, TeamStandings, Transaction,
    UserId,
};
use crate::ports::{
    LeagueStateService, Notifier, RosterService, StandingsService, TransactionService,
};

/// A message the in-memory notifier was asked to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Announcement { channel: String, message: String },
    Direct { user_id: UserId, message: String },
    Cleared { channel: String },
}

/// Mutating calls received, in order.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    pub state_updates: Vec<StatePatch>,
    pub cancelled: Vec<MoveId>,
    pub unfrozen: Vec<MoveId>,
    pub roster_updates: Vec<(PlayerId, TeamId)>,
}

#[derive(Debug, Default)]
struct Faults {
    state_read: bool,
    state_update: bool,
    transaction_reads: bool,
    notifier: bool,
    standings: HashSet<String>,
    roster_players: HashSet<PlayerId>,
    cancel_moves: HashSet<MoveId>,
    unfreeze_moves: HashSet<MoveId>,
}

/// Seed data for a dev run (`freeze --seed league.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueSnapshot {
    pub state: LeagueState,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Keyed by team abbreviation.
    #[serde(default)]
    pub standings: HashMap<String, TeamStandings>,
}

#[derive(Debug, Default)]
struct InMemoryLeagueState {
    league: Option<LeagueState>,
    transactions: Vec<Transaction>,
    standings: HashMap<String, TeamStandings>,
    rosters: HashMap<PlayerId, TeamId>,
    messages: Vec<SentMessage>,
    calls: CallLog,
    faults: Faults,
}

impl InMemoryLeagueState {
    fn select(
        &self,
        season: u32,
        week_start: u32,
        week_end: u32,
        frozen: bool,
    ) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| {
                t.season == season
                    && (week_start..week_end).contains(&t.week)
                    && t.frozen == frozen
                    && t.is_pending()
            })
            .cloned()
            .collect()
    }
}

/// In-memory implementation of every collaborator port.
///
/// Cloning shares the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeague {
    state: Arc<Mutex<InMemoryLeagueState>>,
}

impl InMemoryLeague {
    pub fn new(league: LeagueState) -> Self {
        let state = InMemoryLeagueState {
            league: Some(league),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn from_snapshot(snapshot: LeagueSnapshot) -> Self {
        let state = InMemoryLeagueState {
            league: Some(snapshot.state),
            transactions: snapshot.transactions,
            standings: snapshot.standings,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    // ---- seeding ----

    pub async fn insert_transaction(&self, transaction: Transaction) {
        self.state.lock().await.transactions.push(transaction);
    }

    pub async fn set_standings(&self, abbrev: &str, standings: TeamStandings) {
        self.state
            .lock()
            .await
            .standings
            .insert(abbrev.to_string(), standings);
    }

    /// Overwrite league state directly, bypassing the call log.
    pub async fn set_league_state(&self, league: Option<LeagueState>) {
        self.state.lock().await.league = league;
    }

    // ---- fault injection ----

    pub async fn fail_state_reads(&self, fail: bool) {
        self.state.lock().await.faults.state_read = fail;
    }

    pub async fn fail_state_updates(&self, fail: bool) {
        self.state.lock().await.faults.state_update = fail;
    }

    pub async fn fail_transaction_reads(&self, fail: bool) {
        self.state.lock().await.faults.transaction_reads = fail;
    }

    pub async fn fail_notifications(&self, fail: bool) {
        self.state.lock().await.faults.notifier = fail;
    }

    pub async fn fail_standings_for(&self, abbrev: &str) {
        self.state
            .lock()
            .await
            .faults
            .standings
            .insert(abbrev.to_string());
    }

    pub async fn fail_roster_update_for(&self, player_id: PlayerId) {
        self.state.lock().await.faults.roster_players.insert(player_id);
    }

    pub async fn fail_cancel_for(&self, move_id: &MoveId) {
        self.state
            .lock()
            .await
            .faults
            .cancel_moves
            .insert(move_id.clone());
    }

    pub async fn fail_unfreeze_for(&self, move_id: &MoveId) {
        self.state
            .lock()
            .await
            .faults
            .unfreeze_moves
            .insert(move_id.clone());
    }

    // ---- inspection ----

    pub async fn league_state(&self) -> Option<LeagueState> {
        self.state.lock().await.league.clone()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }

    pub async fn messages(&self) -> Vec<SentMessage> {
        self.state.lock().await.messages.clone()
    }

    pub async fn calls(&self) -> CallLog {
        self.state.lock().await.calls.clone()
    }

    pub async fn player_team(&self, player_id: PlayerId) -> Option<TeamId> {
        self.state.lock().await.rosters.get(&player_id).copied()
    }

    pub async fn announcements_in(&self, channel: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .messages
            .iter()
            .filter_map(|m| match m {
                SentMessage::Announcement { channel: c, message } if c == channel => {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub async fn direct_messages_to(&self, user_id: UserId) -> Vec<String> {
        self.state
            .lock()
            .await
            .messages
            .iter()
            .filter_map(|m| match m {
                SentMessage::Direct { user_id: u, message } if *u == user_id => {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl LeagueStateService for InMemoryLeague {
    async fn get_current_state(&self) -> Result<LeagueState, ServiceError> {
        let state = self.state.lock().await;
        if state.faults.state_read {
            return Err(ServiceError::unavailable("league state", "injected read fault"));
        }
        state
            .league
            .clone()
            .ok_or_else(|| ServiceError::unavailable("league state", "no current state"))
    }

    async fn update_current_state(&self, patch: StatePatch) -> Result<LeagueState, ServiceError> {
        let mut state = self.state.lock().await;
        if state.faults.state_update {
            return Err(ServiceError::rejected("league state", "injected update fault"));
        }
        let Some(league) = state.league.as_mut() else {
            return Err(ServiceError::unavailable("league state", "no current state"));
        };
        league.apply(&patch);
        let updated = league.clone();
        state.calls.state_updates.push(patch);
        Ok(updated)
    }
}

#[async_trait]
impl TransactionService for InMemoryLeague {
    async fn get_frozen_transactions_by_week(
        &self,
        season: u32,
        week_start: u32,
        week_end: u32,
    ) -> Result<Vec<Transaction>, ServiceError> {
        let state = self.state.lock().await;
        if state.faults.transaction_reads {
            return Err(ServiceError::unavailable("transactions", "injected read fault"));
        }
        Ok(state.select(season, week_start, week_end, true))
    }

    async fn get_regular_transactions_by_week(
        &self,
        season: u32,
        week_start: u32,
        week_end: u32,
    ) -> Result<Vec<Transaction>, ServiceError> {
        let state = self.state.lock().await;
        if state.faults.transaction_reads {
            return Err(ServiceError::unavailable("transactions", "injected read fault"));
        }
        Ok(state.select(season, week_start, week_end, false))
    }

    async fn cancel_transaction(&self, move_id: &MoveId) -> Result<bool, ServiceError> {
        let mut state = self.state.lock().await;
        if state.faults.cancel_moves.contains(move_id) {
            return Err(ServiceError::rejected("transactions", format!("cancel of {move_id} refused")));
        }
        let mut matched = false;
        for t in state.transactions.iter_mut().filter(|t| &t.move_id == move_id) {
            t.cancel();
            matched = true;
        }
        state.calls.cancelled.push(move_id.clone());
        Ok(matched)
    }

    async fn unfreeze_transaction(&self, move_id: &MoveId) -> Result<bool, ServiceError> {
        let mut state = self.state.lock().await;
        if state.faults.unfreeze_moves.contains(move_id) {
            return Err(ServiceError::rejected("transactions", format!("unfreeze of {move_id} refused")));
        }
        let mut matched = false;
        for t in state
            .transactions
            .iter_mut()
            .filter(|t| &t.move_id == move_id && t.is_pending())
        {
            t.unfreeze();
            matched = true;
        }
        state.calls.unfrozen.push(move_id.clone());
        Ok(matched)
    }
}

#[async_trait]
impl StandingsService for InMemoryLeague {
    async fn get_team_standings(
        &self,
        team_abbrev: &str,
        _season: u32,
    ) -> Result<TeamStandings, ServiceError> {
        let state = self.state.lock().await;
        if state.faults.standings.contains(team_abbrev) {
            return Err(ServiceError::unavailable("standings", "injected lookup fault"));
        }
        state
            .standings
            .get(team_abbrev)
            .copied()
            .ok_or_else(|| ServiceError::unavailable("standings", format!("no record for {team_abbrev}")))
    }
}

#[async_trait]
impl RosterService for InMemoryLeague {
    async fn update_player_team(
        &self,
        player_id: PlayerId,
        new_team_id: TeamId,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        if state.faults.roster_players.contains(&player_id) {
            return Err(ServiceError::rejected("roster", "injected update fault"));
        }
        state.rosters.insert(player_id, new_team_id);
        state.calls.roster_updates.push((player_id, new_team_id));
        Ok(())
    }
}

#[async_trait]
impl Notifier for InMemoryLeague {
    async fn post_announcement(&self, channel: &str, message: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        if state.faults.notifier {
            return Err(ServiceError::unavailable("notifier", "injected send fault"));
        }
        info!(channel, message, "announcement");
        state.messages.push(SentMessage::Announcement {
            channel: channel.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    async fn direct_message(&self, user_id: UserId, message: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        if state.faults.notifier {
            return Err(ServiceError::unavailable("notifier", "injected send fault"));
        }
        info!(%user_id, message, "direct message");
        state.messages.push(SentMessage::Direct {
            user_id,
            message: message.to_string(),
        });
        Ok(())
    }

    async fn clear_channel(&self, channel: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        if state.faults.notifier {
            return Err(ServiceError::unavailable("notifier", "injected send fault"));
        }
        state.messages.push(SentMessage::Cleared {
            channel: channel.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{frozen_claim, league_state};

    #[tokio::test]
    async fn update_applies_patch_and_records_call() {
        let league = InMemoryLeague::new(league_state(5, false));
        let updated = league
            .update_current_state(StatePatch::begin_freeze(5))
            .await
            .unwrap();
        assert_eq!(updated.week, 6);
        assert!(updated.freeze);
        assert_eq!(league.calls().await.state_updates.len(), 1);
    }

    #[tokio::test]
    async fn failed_update_leaves_state_untouched() {
        let league = InMemoryLeague::new(league_state(5, false));
        league.fail_state_updates(true).await;

        let err = league
            .update_current_state(StatePatch::begin_freeze(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Rejected { .. }));
        assert_eq!(league.league_state().await, Some(league_state(5, false)));
    }

    #[tokio::test]
    async fn cancel_and_unfreeze_act_on_whole_move_group() {
        let league = InMemoryLeague::new(league_state(5, true));
        league.insert_transaction(frozen_claim("m1", 1, "A", 10, "NYY", 5)).await;
        league.insert_transaction(frozen_claim("m1", 2, "B", 10, "NYY", 5)).await;
        league.insert_transaction(frozen_claim("m2", 3, "C", 11, "BOS", 5)).await;

        assert!(league.cancel_transaction(&MoveId::from("m1")).await.unwrap());
        assert!(league.unfreeze_transaction(&MoveId::from("m2")).await.unwrap());
        assert!(!league.cancel_transaction(&MoveId::from("nope")).await.unwrap());

        let frozen = league.get_frozen_transactions_by_week(12, 5, 6).await.unwrap();
        assert!(frozen.is_empty());
        let regular = league.get_regular_transactions_by_week(12, 5, 6).await.unwrap();
        assert_eq!(regular.len(), 1);
        assert_eq!(regular[0].move_id, MoveId::from("m2"));
    }

    #[tokio::test]
    async fn week_range_is_half_open() {
        let league = InMemoryLeague::new(league_state(5, true));
        league.insert_transaction(frozen_claim("m5", 1, "A", 10, "NYY", 5)).await;
        league.insert_transaction(frozen_claim("m6", 2, "B", 10, "NYY", 6)).await;

        let got = league.get_frozen_transactions_by_week(12, 5, 6).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].move_id, MoveId::from("m5"));
    }

    #[test]
    fn snapshot_parses_from_json() {
        let json = r#"{
            "state": {"season": 12, "week": 5, "freeze": false, "trade_deadline": 14, "playoffs_begin": 19},
            "standings": {"NYY": {"wins": 3, "losses": 1}}
        }"#;
        let snapshot: LeagueSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.state.week, 5);
        assert!(snapshot.transactions.is_empty());
        assert_eq!(snapshot.standings["NYY"], TeamStandings::new(3, 1));
    }
}
