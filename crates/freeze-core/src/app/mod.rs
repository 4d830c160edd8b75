//! App - アプリケーション層
//!
//! ports を組み合わせて週次の freeze/thaw サイクルを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: ports のワイヤリングと Scheduler の構築
//! - **Scheduler**: 定期 tick で freeze-begin / freeze-end を起動
//! - **FreezeBegin** / **FreezeEnd**: 各遷移のオーケストレーション
//! - **ContestResolver**: 競合 claim の勝者決定（純粋ロジック）
//! - **RegularExecutor**: 通常 transaction の逐次実行

pub mod builder;
pub mod executor;
pub mod freeze_begin;
pub mod freeze_end;
pub mod messages;
pub mod resolver;
pub mod scheduler;

// 主要な型を再エクスポート
pub use self::builder::{AppBuilder, BuildError};
pub use self::executor::{ExecutionSummary, RegularExecutor};
pub use self::freeze_begin::{FreezeBegin, FreezeBeginReport};
pub use self::freeze_end::{FreezeEnd, FreezeEndReport};
pub use self::resolver::{ContestOutcome, ContestResolver, Resolution};
pub use self::scheduler::{
    Scheduler, SchedulerRunState, SchedulerSettings, TickOutcome, Transition, due_transition,
};
