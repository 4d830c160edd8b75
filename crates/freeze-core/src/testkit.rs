//! Shared fixtures for unit tests.

use crate::domain::{
    FREE_AGENT_ABBREV, LeagueState, MoveId, Player, PlayerId, Team, TeamId, Transaction,
    TransactionStatus, UserId,
};

pub const SEASON: u32 = 12;

pub fn league_state(week: u32, freeze: bool) -> LeagueState {
    LeagueState {
        season: SEASON,
        week,
        freeze,
        trade_deadline: 14,
        playoffs_begin: 19,
    }
}

/// Manager of team `id` is user `id * 100`.
pub fn manager_of(team_id: u64) -> UserId {
    UserId::new(team_id * 100)
}

pub fn team(id: u64, abbrev: &str) -> Team {
    Team {
        id: TeamId::new(id),
        abbrev: abbrev.to_string(),
        name: format!("{abbrev} club"),
        manager_ids: vec![manager_of(id)],
        parent_abbrev: None,
    }
}

pub fn affiliate(id: u64, abbrev: &str, parent: &str) -> Team {
    Team {
        parent_abbrev: Some(parent.to_string()),
        ..team(id, abbrev)
    }
}

pub fn free_agents() -> Team {
    Team {
        manager_ids: vec![],
        ..team(0, FREE_AGENT_ABBREV)
    }
}

pub fn transaction(
    move_id: &str,
    player_id: u64,
    player_name: &str,
    from: Team,
    to: Team,
    week: u32,
    frozen: bool,
) -> Transaction {
    Transaction {
        move_id: MoveId::from(move_id),
        season: SEASON,
        week,
        player: Player {
            id: PlayerId::new(player_id),
            name: player_name.to_string(),
        },
        from_team: from,
        to_team: to,
        frozen,
        status: TransactionStatus::Pending,
    }
}

/// Free-agent pickup by `team_abbrev`, queued during the freeze.
pub fn frozen_claim(
    move_id: &str,
    player_id: u64,
    player_name: &str,
    team_id: u64,
    team_abbrev: &str,
    week: u32,
) -> Transaction {
    transaction(
        move_id,
        player_id,
        player_name,
        free_agents(),
        team(team_id, team_abbrev),
        week,
        true,
    )
}
