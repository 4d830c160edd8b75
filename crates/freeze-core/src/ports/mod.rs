//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（league-state store, transaction store, standings,
//! roster mutation, chat platform）へのインターフェースを提供し、
//! orchestration ロジックをネットワークなしでテストできるようにします。

pub mod clock;
pub mod event_sink;
pub mod league_state;
pub mod notifier;
pub mod roster;
pub mod standings;
pub mod tiebreak;
pub mod transaction_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::league_state::LeagueStateService;
pub use self::notifier::Notifier;
pub use self::roster::RosterService;
pub use self::standings::StandingsService;
pub use self::tiebreak::{SeededTiebreak, TiebreakSource, ZeroTiebreak};
pub use self::transaction_store::TransactionService;
