//! Scheduler - 週次の freeze/thaw トリガー
//!
//! Every tick reads the league state and the local wall clock and decides
//! whether a transition is due:
//!
//! - Monday, hour 0, not frozen  → freeze-begin
//! - Saturday, hour 0, frozen    → freeze-end
//!
//! The state itself says whether a transition has happened. `SchedulerRunState`
//! only stops a transition from firing again on later ticks of the same hour,
//! and throttles operator alerts to one per failure episode.
//!
//! The guard is written after the orchestrator returns, never before.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::freeze_begin::FreezeBegin;
use super::freeze_end::FreezeEnd;
use super::messages;
use crate::domain::{FreezeError, LeagueState, UserId};
use crate::ports::{Clock, LeagueStateService, Notifier};

/// Process-local guard state, passed into and returned from every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerRunState {
    /// Pre-increment week of the last successful freeze-begin.
    pub last_freeze_week: Option<u32>,
    pub last_thaw_week: Option<u32>,
    pub error_notification_sent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    FreezeBegin,
    FreezeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Offseason,
    StateUnavailable,
    Idle,
    Transitioned(Transition),
    Failed,
}

/// Which transition, if any, is due right now.
pub fn due_transition(
    state: &LeagueState,
    now: NaiveDateTime,
    run: &SchedulerRunState,
) -> Option<Transition> {
    if now.hour() != 0 {
        return None;
    }
    match now.weekday() {
        Weekday::Mon if !state.freeze && run.last_freeze_week != Some(state.week) => {
            Some(Transition::FreezeBegin)
        }
        Weekday::Sat if state.freeze && run.last_thaw_week != Some(state.week) => {
            Some(Transition::FreezeEnd)
        }
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub tick_interval: Duration,
    pub offseason: bool,
    pub operator: Option<UserId>,
}

pub struct Scheduler {
    league: Arc<dyn LeagueStateService>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    freeze_begin: FreezeBegin,
    freeze_end: FreezeEnd,
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(
        league: Arc<dyn LeagueStateService>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        freeze_begin: FreezeBegin,
        freeze_end: FreezeEnd,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            league,
            notifier,
            clock,
            freeze_begin,
            freeze_end,
            settings,
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Evaluate one tick. Never fails: errors are logged and reported here.
    pub async fn tick(&self, mut run: SchedulerRunState) -> (SchedulerRunState, TickOutcome) {
        match self.try_tick(&mut run).await {
            Ok(outcome) => (run, outcome),
            Err(err) => {
                self.report_failure(&mut run, &err).await;
                (run, TickOutcome::Failed)
            }
        }
    }

    async fn try_tick(&self, run: &mut SchedulerRunState) -> Result<TickOutcome, FreezeError> {
        if self.settings.offseason {
            debug!("offseason mode; tick skipped");
            return Ok(TickOutcome::Offseason);
        }

        let state = match self.league.get_current_state().await {
            Ok(state) => state,
            Err(err) => {
                // 次の tick で再試行
                warn!(error = %err, "league state unavailable; tick skipped");
                return Ok(TickOutcome::StateUnavailable);
            }
        };

        let now = self.clock.now();
        let Some(transition) = due_transition(&state, now, run) else {
            return Ok(TickOutcome::Idle);
        };

        info!(?transition, season = state.season, week = state.week, %now, "transition due");
        match transition {
            Transition::FreezeBegin => {
                let report = self.freeze_begin.run(&state).await?;
                info!(
                    week = report.state.week,
                    executed = report.executed.succeeded,
                    failed = report.executed.failed,
                    "freeze-begin complete"
                );
                run.last_freeze_week = Some(state.week);
            }
            Transition::FreezeEnd => {
                let report = self.freeze_end.run(&state).await?;
                info!(
                    week = report.week,
                    winners = report.winners.len(),
                    losers = report.losers.len(),
                    failed_updates = report.failed_updates,
                    "freeze-end complete"
                );
                run.last_thaw_week = Some(state.week);
            }
        }
        run.error_notification_sent = false;
        Ok(TickOutcome::Transitioned(transition))
    }

    async fn report_failure(&self, run: &mut SchedulerRunState, err: &FreezeError) {
        error!(error = %err, "scheduler tick failed");
        if run.error_notification_sent {
            return;
        }
        let Some(operator) = self.settings.operator else {
            return;
        };
        match self
            .notifier
            .direct_message(operator, &messages::operator_alert(&err.to_string()))
            .await
        {
            Ok(()) => run.error_notification_sent = true,
            Err(send_err) => warn!(error = %send_err, "operator alert failed"),
        }
    }

    /// Tick forever until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// Each tick runs in its own task so that a panic inside it becomes a
    /// reported failure instead of killing the loop. A tick in flight is
    /// always allowed to finish.
    pub async fn run(
        self: Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> SchedulerRunState {
        let mut ticker = tokio::time::interval(self.settings.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut run = SchedulerRunState::default();

        info!(interval = ?self.settings.tick_interval, offseason = self.settings.offseason, "scheduler started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let handle = tokio::spawn({
                let scheduler = Arc::clone(&self);
                let run = run.clone();
                async move { scheduler.tick(run).await }
            });

            run = match handle.await {
                Ok((next, _outcome)) => next,
                Err(join_err) => {
                    let err = FreezeError::TickPanicked(join_err.to_string());
                    self.report_failure(&mut run, &err).await;
                    run
                }
            };
        }

        info!("scheduler stopped");
        run
    }
}
