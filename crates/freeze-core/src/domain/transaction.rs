//! Transaction model: one player moving from one roster to another.
//!
//! A claim submitted during the freeze may contain several of these, all
//! sharing a `MoveId`. The external store owns the records; this crate only
//! reads them and asks the store to cancel / unfreeze whole move groups.

use serde::{Deserialize, Serialize};

use super::ids::{MoveId, PlayerId, TeamId, UserId};

/// Abbreviation of the free-agent pool.
pub const FREE_AGENT_ABBREV: &str = "FA";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    /// Contest grouping key: trimmed, lower-cased, whitespace collapsed.
    pub fn normalized_name(&self) -> String {
        normalize_player_name(&self.name)
    }
}

pub fn normalize_player_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub abbrev: String,
    pub name: String,
    #[serde(default)]
    pub manager_ids: Vec<UserId>,
    /// Set for affiliate rosters (minor league, injured list).
    #[serde(default)]
    pub parent_abbrev: Option<String>,
}

impl Team {
    pub fn is_free_agent_pool(&self) -> bool {
        self.abbrev.eq_ignore_ascii_case(FREE_AGENT_ABBREV)
    }

    pub fn is_affiliate(&self) -> bool {
        self.parent_abbrev.is_some()
    }

    /// The abbreviation whose record counts for this roster.
    ///
    /// Affiliate rosters borrow their parent club's record.
    pub fn standings_abbrev(&self) -> &str {
        self.parent_abbrev.as_deref().unwrap_or(&self.abbrev)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Committed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub move_id: MoveId,
    pub season: u32,
    pub week: u32,
    pub player: Player,
    pub from_team: Team,
    pub to_team: Team,
    pub frozen: bool,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Whether this row is a claim on the player (destination is a real team).
    pub fn is_claim(&self) -> bool {
        !self.to_team.is_free_agent_pool()
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn cancel(&mut self) {
        self.status = TransactionStatus::Cancelled;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    pub fn commit(&mut self) {
        self.status = TransactionStatus::Committed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(abbrev: &str, parent: Option<&str>) -> Team {
        Team {
            id: TeamId::new(1),
            abbrev: abbrev.to_string(),
            name: abbrev.to_string(),
            manager_ids: vec![],
            parent_abbrev: parent.map(str::to_string),
        }
    }

    #[test]
    fn normalized_name_ignores_case_and_spacing() {
        assert_eq!(normalize_player_name("  J.   Doe "), "j. doe");
        assert_eq!(normalize_player_name("J. DOE"), "j. doe");
    }

    #[test]
    fn affiliate_uses_parent_standings() {
        assert_eq!(team("NYYMIL", Some("NYY")).standings_abbrev(), "NYY");
        assert_eq!(team("NYY", None).standings_abbrev(), "NYY");
        assert!(team("NYYMIL", Some("NYY")).is_affiliate());
    }

    #[test]
    fn free_agent_pool_is_case_insensitive() {
        assert!(team("FA", None).is_free_agent_pool());
        assert!(team("fa", None).is_free_agent_pool());
        assert!(!team("FAL", None).is_free_agent_pool());
    }
}
