//! Team standings snapshot, read only during contest resolution.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStandings {
    pub wins: u32,
    pub losses: u32,
}

impl TeamStandings {
    pub fn new(wins: u32, losses: u32) -> Self {
        Self { wins, losses }
    }

    /// `wins / (wins + losses)`, or `0.0` before any game has been played.
    pub fn win_percentage(&self) -> f64 {
        let games = self.wins + self.losses;
        if games == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_percentage_of_empty_record_is_zero() {
        assert_eq!(TeamStandings::new(0, 0).win_percentage(), 0.0);
    }

    #[test]
    fn win_percentage_is_wins_over_games() {
        assert_eq!(TeamStandings::new(3, 1).win_percentage(), 0.75);
        assert_eq!(TeamStandings::new(0, 4).win_percentage(), 0.0);
    }
}
