//! Domain model (ids, league state, transactions, standings, events, errors).

pub mod errors;
pub mod events;
pub mod ids;
pub mod league;
pub mod standings;
pub mod transaction;

pub use self::errors::{FreezeError, ServiceError};
pub use self::events::{ContestEntry, LeagueEvent};
pub use self::ids::{MoveId, PlayerId, TeamId, UserId};
pub use self::league::{LeagueState, StatePatch};
pub use self::standings::TeamStandings;
pub use self::transaction::{
    FREE_AGENT_ABBREV, Player, Team, Transaction, TransactionStatus, normalize_player_name,
};
