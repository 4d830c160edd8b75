//! freeze-core
//!
//! Weekly freeze/thaw cycle for a fantasy baseball league.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, league state, transactions, standings, errors, events）
//! - **ports**: 抽象化レイヤー（LeagueStateService, TransactionService, Notifier, Clock, など）
//! - **app**: アプリケーションロジック（scheduler, freeze_begin, freeze_end, resolver, executor）
//! - **impls**: 実装（InMemoryLeague など開発用、TracingEventSink）
//! - **config**: TOML 設定と logging の初期化

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

#[cfg(test)]
mod testkit;
