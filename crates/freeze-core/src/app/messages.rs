//! Text of everything the orchestrators post.

use crate::domain::{LeagueState, MoveId, Transaction};

pub fn freeze_begin_announcement(state: &LeagueState) -> String {
    let mut msg = format!(
        "Season {} week {} has begun. The transaction freeze is now in effect: \
         moves submitted from now until Saturday are queued and resolved at the thaw.",
        state.season, state.week
    );
    if state.week == state.trade_deadline {
        msg.push_str(" This is the final week to make trades.");
    } else if state.week == state.trade_deadline + 1 {
        msg.push_str(" The trade deadline has passed.");
    }
    msg
}

pub fn freeze_end_announcement(state: &LeagueState, committed: usize, cancelled: usize) -> String {
    format!(
        "The freeze for season {} week {} is over. {committed} move(s) processed, \
         {cancelled} contested claim(s) lost. Transactions are open.",
        state.season, state.week
    )
}

/// 奇数週は Night 始まり、偶数週は Day 始まり
pub fn game_pattern(week: u32) -> &'static str {
    if week % 2 == 1 {
        "Night · Day · Night · Day"
    } else {
        "Day · Night · Day · Night"
    }
}

pub fn weekly_info(state: &LeagueState) -> String {
    format!(
        "Season {} · Week {}\nGame times: {}",
        state.season,
        state.week,
        game_pattern(state.week)
    )
}

/// One transaction-log entry for a committed move group.
pub fn transaction_log_entry(week: u32, move_id: &MoveId, moves: &[&Transaction]) -> String {
    let team = moves
        .iter()
        .find(|t| t.is_claim())
        .or(moves.first())
        .map(|t| t.to_team.abbrev.as_str())
        .unwrap_or("?");

    let mut msg = format!("Week {week} transaction ({team}, move {move_id}):");
    for t in moves {
        msg.push_str(&format!(
            "\n{}: {} → {}",
            t.player.name, t.from_team.abbrev, t.to_team.abbrev
        ));
    }
    msg
}

pub fn lost_claim_message(move_id: &MoveId, moves: &[&Transaction]) -> String {
    let players: Vec<&str> = moves.iter().map(|t| t.player.name.as_str()).collect();
    format!(
        "Your move {move_id} ({}) was cancelled: another team had priority on a contested \
         player. Priority goes to the team with the worse record.",
        players.join(", ")
    )
}

pub fn operator_alert(error: &str) -> String {
    format!("Freeze scheduler error: {error}. Further alerts are muted until the next successful transition.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{frozen_claim, league_state};

    #[test]
    fn deadline_week_is_called_out() {
        let mut state = league_state(14, true);
        assert!(freeze_begin_announcement(&state).contains("final week to make trades"));

        state.week = 15;
        assert!(freeze_begin_announcement(&state).contains("deadline has passed"));

        state.week = 6;
        assert!(!freeze_begin_announcement(&state).contains("trade"));
    }

    #[test]
    fn pattern_alternates_by_week() {
        assert_ne!(game_pattern(5), game_pattern(6));
        assert_eq!(game_pattern(5), game_pattern(7));
    }

    #[test]
    fn log_entry_lists_every_player() {
        let a = frozen_claim("m1", 1, "A. One", 10, "NYY", 6);
        let b = frozen_claim("m1", 2, "B. Two", 10, "NYY", 6);
        let msg = transaction_log_entry(6, &a.move_id, &[&a, &b]);

        assert!(msg.starts_with("Week 6 transaction (NYY, move m1)"));
        assert!(msg.contains("A. One: FA → NYY"));
        assert!(msg.contains("B. Two: FA → NYY"));
    }
}
