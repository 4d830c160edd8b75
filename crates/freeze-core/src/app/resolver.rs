//! Contested-claim resolution.
//!
//! Given every frozen transaction of the week, decide which move groups are
//! committed and which are cancelled. Worse record gets priority: the claim
//! with the lowest win percentage wins a contested player, and a tiny random
//! term only separates exact ties.
//!
//! The resolver reads standings but never writes anything. Callers apply the
//! returned `Resolution` themselves.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{ContestEntry, MoveId, Transaction};
use crate::ports::{StandingsService, TiebreakSource};

/// Jitter from the `TiebreakSource` is scaled by this before being added to
/// the win percentage. Win-percentage gaps in a real season are at least an
/// order of magnitude larger.
pub const TIEBREAK_SCALE: f64 = 1e-4;

/// One contesting claim and the priority it was ranked by.
#[derive(Debug, Clone)]
pub struct TransactionPriority<'a> {
    pub transaction: &'a Transaction,
    pub win_percentage: f64,
    pub tiebreaker: f64,
    /// The standings lookup failed; the claim ranks behind every other one.
    pub standings_missing: bool,
}

impl TransactionPriority<'_> {
    fn entry(&self) -> ContestEntry {
        ContestEntry {
            move_id: self.transaction.move_id.clone(),
            team_id: self.transaction.to_team.id,
            team_abbrev: self.transaction.to_team.abbrev.clone(),
            win_percentage: self.win_percentage,
            tiebreaker: self.tiebreaker,
        }
    }

    /// Lower ranks first.
    fn rank_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.standings_missing
            .cmp(&other.standings_missing)
            .then(self.tiebreaker.total_cmp(&other.tiebreaker))
    }
}

/// Outcome of one player with more than one claim.
#[derive(Debug, Clone, PartialEq)]
pub struct ContestOutcome {
    pub player: String,
    pub winner: Option<ContestEntry>,
    pub losers: Vec<ContestEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub winners: BTreeSet<MoveId>,
    pub losers: BTreeSet<MoveId>,
    pub contests: Vec<ContestOutcome>,
}

/// Claims on one player, best priority first.
struct Contest<'a> {
    player: String,
    ranked: Vec<TransactionPriority<'a>>,
}

pub struct ContestResolver {
    standings: Arc<dyn StandingsService>,
    tiebreak: Arc<dyn TiebreakSource>,
}

impl ContestResolver {
    pub fn new(standings: Arc<dyn StandingsService>, tiebreak: Arc<dyn TiebreakSource>) -> Self {
        Self {
            standings,
            tiebreak,
        }
    }

    pub async fn resolve(&self, transactions: &[Transaction], season: u32) -> Resolution {
        // 選手名（正規化済み）ごとにクレームをまとめる。BTreeMap なので処理順は決定的。
        let mut by_player: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
        for t in transactions.iter().filter(|t| t.is_claim()) {
            let claims = by_player.entry(t.player.normalized_name()).or_default();
            // 同じ move が同じ選手を二重に含んでいても 1 件として数える
            if !claims.iter().any(|c| c.move_id == t.move_id) {
                claims.push(t);
            }
        }

        let mut contests = Vec::with_capacity(by_player.len());
        for claims in by_player.into_values() {
            contests.push(self.rank(claims, season).await);
        }

        let mut resolution = settle(&contests);

        // A move with no team-destination claim has nothing to contest.
        for t in transactions {
            if !resolution.losers.contains(&t.move_id)
                && !transactions
                    .iter()
                    .any(|o| o.move_id == t.move_id && o.is_claim())
            {
                resolution.winners.insert(t.move_id.clone());
            }
        }

        resolution
    }

    async fn rank<'a>(&self, claims: Vec<&'a Transaction>, season: u32) -> Contest<'a> {
        let player = claims
            .first()
            .map(|t| t.player.name.clone())
            .unwrap_or_default();

        if claims.len() == 1 {
            let ranked = claims
                .into_iter()
                .map(|transaction| TransactionPriority {
                    transaction,
                    win_percentage: 0.0,
                    tiebreaker: 0.0,
                    standings_missing: false,
                })
                .collect();
            return Contest { player, ranked };
        }

        let mut ranked = Vec::with_capacity(claims.len());
        for transaction in claims {
            ranked.push(self.priority(transaction, season).await);
        }
        // stable sort: 完全に同値なら提出順
        ranked.sort_by(|a, b| a.rank_cmp(b));

        debug!(
            player = %player,
            claims = ranked.len(),
            "ranked contested claims"
        );
        Contest { player, ranked }
    }

    async fn priority<'a>(&self, transaction: &'a Transaction, season: u32) -> TransactionPriority<'a> {
        let abbrev = transaction.to_team.standings_abbrev();
        let (win_percentage, standings_missing) =
            match self.standings.get_team_standings(abbrev, season).await {
                Ok(standings) => (standings.win_percentage(), false),
                Err(err) => {
                    warn!(
                        move_id = %transaction.move_id,
                        team = abbrev,
                        error = %err,
                        "standings lookup failed; claim ranked last"
                    );
                    (0.0, true)
                }
            };

        TransactionPriority {
            transaction,
            win_percentage,
            tiebreaker: win_percentage + self.tiebreak.jitter() * TIEBREAK_SCALE,
            standings_missing,
        }
    }
}

/// Pick one winner per player while keeping move groups atomic.
///
/// Each round takes the best eligible claimant of every contest. A move that
/// is the pick for one player but beaten for another cannot both win and
/// lose. Of all such moves, the one holding the worst-ranked beaten claim is
/// disqualified everywhere and the round is repeated. One move per round, so
/// two crossing moves never knock each other out. At the fixed point every
/// move is either a pick wherever it claimed, or a loser.
fn settle(contests: &[Contest<'_>]) -> Resolution {
    let mut disqualified: BTreeSet<MoveId> = BTreeSet::new();

    let picks = loop {
        let picks: Vec<Option<&TransactionPriority<'_>>> = contests
            .iter()
            .map(|c| {
                c.ranked
                    .iter()
                    .find(|p| !disqualified.contains(&p.transaction.move_id))
            })
            .collect();

        let picked: BTreeSet<&MoveId> = picks
            .iter()
            .flatten()
            .map(|p| &p.transaction.move_id)
            .collect();
        let picked = &picked;

        // 負けた側の claim のうち最も順位が低いもの。同順位なら MoveId が大きい方。
        let worst_conflict = contests
            .iter()
            .zip(&picks)
            .flat_map(|(contest, pick)| {
                let pick_id = pick.map(|p| &p.transaction.move_id);
                contest.ranked.iter().filter(move |p| {
                    let id = &p.transaction.move_id;
                    Some(id) != pick_id && picked.contains(id)
                })
            })
            .max_by(|a, b| {
                a.rank_cmp(b)
                    .then_with(|| a.transaction.move_id.cmp(&b.transaction.move_id))
            });

        match worst_conflict {
            Some(p) => {
                debug!(move_id = %p.transaction.move_id, "move group split across contests; disqualified");
                disqualified.insert(p.transaction.move_id.clone());
            }
            None => break picks,
        }
    };

    let mut resolution = Resolution::default();
    for (contest, pick) in contests.iter().zip(&picks) {
        let pick_id = pick.map(|p| &p.transaction.move_id);
        if let Some(id) = pick_id {
            resolution.winners.insert(id.clone());
        }
        let losers: Vec<&TransactionPriority<'_>> = contest
            .ranked
            .iter()
            .filter(|p| Some(&p.transaction.move_id) != pick_id)
            .collect();
        for p in &losers {
            resolution.losers.insert(p.transaction.move_id.clone());
        }

        if contest.ranked.len() > 1 {
            resolution.contests.push(ContestOutcome {
                player: contest.player.clone(),
                winner: pick.map(TransactionPriority::entry),
                losers: losers.into_iter().map(TransactionPriority::entry).collect(),
            });
        }
    }
    resolution
}
