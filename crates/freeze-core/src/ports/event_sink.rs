//! EventSink port - 監査イベントの記録
//!
//! 実装:
//! - `impls::TracingEventSink`: tracing の `audit` target に構造化ログとして出力
//! - `impls::RecordingEventSink`: テスト用にメモリへ蓄積

use crate::domain::LeagueEvent;

/// EventSink はドメインイベントを記録
///
/// Emitting must never fail the caller, so there is no `Result` here.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LeagueEvent);
}
