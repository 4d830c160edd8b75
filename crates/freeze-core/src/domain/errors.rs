//! Errors - エラー型と分類
//!
//! - `ServiceError`: 外部サービス呼び出しの失敗（一時的 or 拒否）
//! - `FreezeError`: 1 tick / 1 orchestrator 実行を失敗させるエラー

use thiserror::Error;

/// Failure of a single collaborator call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached or returned nothing usable.
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    /// The service answered but refused the request.
    #[error("{service} rejected request: {reason}")]
    Rejected {
        service: &'static str,
        reason: String,
    },
}

impl ServiceError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            reason: reason.into(),
        }
    }

    pub fn rejected(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            service,
            reason: reason.into(),
        }
    }
}

/// Error that aborts one orchestrator run or one scheduler tick.
#[derive(Debug, Error)]
pub enum FreezeError {
    #[error("league state update failed: {0}")]
    StateUpdate(#[source] ServiceError),

    #[error("frozen transactions unavailable for season {season} week {week}: {source}")]
    FrozenTransactions {
        season: u32,
        week: u32,
        #[source]
        source: ServiceError,
    },

    #[error("scheduler tick panicked: {0}")]
    TickPanicked(String),
}
