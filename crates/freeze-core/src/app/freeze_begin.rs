//! Freeze-begin: advance the week, start the freeze, run queued regular moves.
//!
//! # フロー
//! 1. league state を `week += 1, freeze = true` に更新（失敗したら全体を中止）
//! 2. 新しい週の regular transaction を実行
//! 3. freeze 開始をアナウンス
//! 4. レギュラーシーズン中なら weekly info を投稿
//!
//! Once step 1 succeeds the rest is best effort: failures are logged and
//! never undo the state change.

use std::sync::Arc;

use tracing::{info, warn};

use super::executor::{ExecutionSummary, RegularExecutor};
use super::messages;
use crate::config::ChannelConfig;
use crate::domain::{FreezeError, LeagueEvent, LeagueState, StatePatch};
use crate::ports::{EventSink, LeagueStateService, Notifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezeBeginReport {
    /// State after the transition.
    pub state: LeagueState,
    pub executed: ExecutionSummary,
    pub announced: bool,
    pub weekly_info_posted: bool,
}

pub struct FreezeBegin {
    league: Arc<dyn LeagueStateService>,
    executor: RegularExecutor,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventSink>,
    channels: ChannelConfig,
}

impl FreezeBegin {
    pub fn new(
        league: Arc<dyn LeagueStateService>,
        executor: RegularExecutor,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn EventSink>,
        channels: ChannelConfig,
    ) -> Self {
        Self {
            league,
            executor,
            notifier,
            events,
            channels,
        }
    }

    pub async fn run(&self, current: &LeagueState) -> Result<FreezeBeginReport, FreezeError> {
        let state = self
            .league
            .update_current_state(StatePatch::begin_freeze(current.week))
            .await
            .map_err(FreezeError::StateUpdate)?;

        info!(season = state.season, week = state.week, "freeze began");
        self.events.emit(LeagueEvent::FreezeBegan {
            season: state.season,
            week: state.week,
        });

        let executed = self.executor.run(state.season, state.week).await;

        let announced = match self
            .notifier
            .post_announcement(
                &self.channels.announcements,
                &messages::freeze_begin_announcement(&state),
            )
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "freeze-begin announcement failed");
                false
            }
        };

        let weekly_info_posted = if state.is_regular_season_week(state.week) {
            self.post_weekly_info(&state).await
        } else {
            false
        };

        Ok(FreezeBeginReport {
            state,
            executed,
            announced,
            weekly_info_posted,
        })
    }

    async fn post_weekly_info(&self, state: &LeagueState) -> bool {
        let channel = &self.channels.weekly_info;
        if let Err(err) = self.notifier.clear_channel(channel).await {
            warn!(channel = %channel, error = %err, "could not clear weekly info channel");
            return false;
        }
        match self
            .notifier
            .post_announcement(channel, &messages::weekly_info(state))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(channel = %channel, error = %err, "weekly info post failed");
                false
            }
        }
    }
}
