//! AppBuilder - ports をつないで Scheduler を組み立てる
//!
//! # Fail-fast 設計
//! - 必須の port（league state / transactions / standings / roster / notifier）が
//!   1 つでも欠けていれば build() 時に BuildError を返す
//! - Clock / EventSink / TiebreakSource は省略時に本番用の実装を使う

use std::sync::Arc;

use super::executor::RegularExecutor;
use super::freeze_begin::FreezeBegin;
use super::freeze_end::FreezeEnd;
use super::resolver::ContestResolver;
use super::scheduler::{Scheduler, SchedulerSettings};
use crate::config::Config;
use crate::impls::{InMemoryLeague, TracingEventSink};
use crate::ports::{
    Clock, EventSink, LeagueStateService, Notifier, RosterService, SeededTiebreak,
    StandingsService, SystemClock, TiebreakSource, TransactionService,
};

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing services: {0:?}. These ports must be provided before build().")]
    MissingServices(Vec<&'static str>),
}

/// # 使用例
/// ```ignore
/// let scheduler = AppBuilder::new(config)
///     .with_in_memory(league)
///     .build()?;
/// ```
pub struct AppBuilder {
    config: Config,
    league: Option<Arc<dyn LeagueStateService>>,
    transactions: Option<Arc<dyn TransactionService>>,
    standings: Option<Arc<dyn StandingsService>>,
    roster: Option<Arc<dyn RosterService>>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Option<Arc<dyn Clock>>,
    events: Option<Arc<dyn EventSink>>,
    tiebreak: Option<Arc<dyn TiebreakSource>>,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            league: None,
            transactions: None,
            standings: None,
            roster: None,
            notifier: None,
            clock: None,
            events: None,
            tiebreak: None,
        }
    }

    pub fn league_state(mut self, service: Arc<dyn LeagueStateService>) -> Self {
        self.league = Some(service);
        self
    }

    pub fn transactions(mut self, service: Arc<dyn TransactionService>) -> Self {
        self.transactions = Some(service);
        self
    }

    pub fn standings(mut self, service: Arc<dyn StandingsService>) -> Self {
        self.standings = Some(service);
        self
    }

    pub fn roster(mut self, service: Arc<dyn RosterService>) -> Self {
        self.roster = Some(service);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn tiebreak(mut self, tiebreak: Arc<dyn TiebreakSource>) -> Self {
        self.tiebreak = Some(tiebreak);
        self
    }

    /// Use one in-memory league for every collaborator port.
    pub fn with_in_memory(self, league: InMemoryLeague) -> Self {
        let shared = Arc::new(league);
        self.league_state(shared.clone())
            .transactions(shared.clone())
            .standings(shared.clone())
            .roster(shared.clone())
            .notifier(shared)
    }

    pub fn build(self) -> Result<Scheduler, BuildError> {
        let mut missing = Vec::new();
        if self.league.is_none() {
            missing.push("league_state");
        }
        if self.transactions.is_none() {
            missing.push("transactions");
        }
        if self.standings.is_none() {
            missing.push("standings");
        }
        if self.roster.is_none() {
            missing.push("roster");
        }
        if self.notifier.is_none() {
            missing.push("notifier");
        }

        let (Some(league), Some(transactions), Some(standings), Some(roster), Some(notifier)) = (
            self.league,
            self.transactions,
            self.standings,
            self.roster,
            self.notifier,
        ) else {
            return Err(BuildError::MissingServices(missing));
        };

        let config = self.config;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let events = self.events.unwrap_or_else(|| Arc::new(TracingEventSink));
        let tiebreak = self.tiebreak.unwrap_or_else(|| match config.resolver.seed {
            Some(seed) => Arc::new(SeededTiebreak::from_seed(seed)),
            None => Arc::new(SeededTiebreak::from_entropy()),
        });

        let freeze_begin = FreezeBegin::new(
            league.clone(),
            RegularExecutor::new(transactions.clone(), roster, config.executor.pacing()),
            notifier.clone(),
            events.clone(),
            config.channels.clone(),
        );
        let freeze_end = FreezeEnd::new(
            league.clone(),
            transactions,
            ContestResolver::new(standings, tiebreak),
            notifier.clone(),
            events,
            config.channels.clone(),
        );

        Ok(Scheduler::new(
            league,
            notifier,
            clock,
            freeze_begin,
            freeze_end,
            SchedulerSettings {
                tick_interval: config.scheduler.tick_interval(),
                offseason: config.scheduler.offseason,
                operator: config.operator.user_id,
            },
        ))
    }
}
