//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryLeague**: 全 collaborator port のインメモリ実装（故障注入つき）
//! - **TracingEventSink / RecordingEventSink**: 監査イベントの出力先
//!
//! # 本番用実装
//! league store / chat platform への実装は別クレートに配置します。

pub mod event_sink;
pub mod inmem_league;

// 主要な型を再エクスポート
pub use self::event_sink::{RecordingEventSink, TracingEventSink};
pub use self::inmem_league::{CallLog, InMemoryLeague, LeagueSnapshot, SentMessage};
