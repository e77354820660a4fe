//! Pick scoring and leaderboard aggregation.
//!
//! Everything here is pure: it takes fights and picks that were already loaded
//! and never touches the database, so it can run from any handler or test.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    fight::{Fight, FightResult},
    leaderboard::LeaderboardEntry,
    pick::{Pick, VictoryMethod},
};

/// Points awarded per pick. The bonuses stack: the method bonus needs the
/// winner right and the round bonus needs both winner and method right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub winner_points: u32,
    pub method_bonus: u32,
    pub round_bonus: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            winner_points: 1,
            method_bonus: 1,
            round_bonus: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PickOutcome {
    pub winner_correct: bool,
    pub method_correct: bool,
    pub round_correct: bool,
    pub points: u64,
    /// Winner, method and round all correct, i.e. the fight's full score.
    pub perfect: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaderboardError {
    #[error("pick {pick_id} references unknown fight {fight_id}")]
    UnknownFight { pick_id: String, fight_id: i64 },

    #[error("pick {pick_id} names event {pick_event} but fight {fight_id} belongs to event {fight_event}")]
    EventMismatch {
        pick_id: String,
        fight_id: i64,
        pick_event: i64,
        fight_event: i64,
    },

    #[error("user {user_id} has more than one pick for fight {fight_id}")]
    DuplicatePick { user_id: String, fight_id: i64 },
}

pub fn score_pick(pick: &Pick, result: &FightResult, policy: &ScoringPolicy) -> PickOutcome {
    // draws and no contests pay nobody
    let Some(winner) = result.winner else {
        return PickOutcome::default();
    };
    if pick.picked_corner != winner {
        return PickOutcome::default();
    }

    let mut outcome = PickOutcome {
        winner_correct: true,
        points: u64::from(policy.winner_points),
        ..PickOutcome::default()
    };

    outcome.method_correct = VictoryMethod::normalize(&result.method) == Some(pick.picked_method);
    if outcome.method_correct {
        outcome.points += u64::from(policy.method_bonus);
        outcome.round_correct = matches!(
            (pick.picked_round, result.round),
            (Some(picked), Some(actual)) if picked == actual
        );
        if outcome.round_correct {
            outcome.points += u64::from(policy.round_bonus);
        }
        outcome.perfect = outcome.round_correct;
    }

    outcome
}

#[derive(Default)]
struct Tally {
    points: u64,
    picks_total: u32,
    picks_evaluated: u32,
    picks_correct: u32,
    perfect_picks: u32,
}

/// Ranks every user that has at least one pick.
///
/// Order is total points descending, then correct picks descending, then user
/// id ascending, so the same inputs always give the same ranking regardless of
/// the order they were loaded in. Picks on fights without a result count
/// towards `picks_total` only.
pub fn compute_leaderboard(
    fights: &[Fight],
    picks: &[Pick],
    policy: &ScoringPolicy,
) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
    let fights_by_id: HashMap<i64, &Fight> = fights.iter().map(|f| (f.id, f)).collect();
    let mut seen: HashSet<(&str, i64)> = HashSet::with_capacity(picks.len());
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

    for pick in picks {
        let fight = fights_by_id
            .get(&pick.fight_id)
            .ok_or_else(|| LeaderboardError::UnknownFight {
                pick_id: pick.id.clone(),
                fight_id: pick.fight_id,
            })?;

        if fight.event_id != pick.event_id {
            return Err(LeaderboardError::EventMismatch {
                pick_id: pick.id.clone(),
                fight_id: fight.id,
                pick_event: pick.event_id,
                fight_event: fight.event_id,
            });
        }

        if !seen.insert((pick.user_id.as_str(), pick.fight_id)) {
            return Err(LeaderboardError::DuplicatePick {
                user_id: pick.user_id.clone(),
                fight_id: pick.fight_id,
            });
        }

        let tally = tallies.entry(pick.user_id.as_str()).or_default();
        tally.picks_total += 1;

        if let Some(result) = &fight.result {
            let outcome = score_pick(pick, result, policy);
            tally.picks_evaluated += 1;
            tally.points = tally.points.saturating_add(outcome.points);
            if outcome.winner_correct {
                tally.picks_correct += 1;
            }
            if outcome.perfect {
                tally.perfect_picks += 1;
            }
        }
    }

    let mut entries: Vec<LeaderboardEntry> = tallies
        .into_iter()
        .map(|(user_id, t)| LeaderboardEntry {
            rank: 0,
            user_id: user_id.to_string(),
            total_points: t.points,
            picks_total: t.picks_total,
            picks_evaluated: t.picks_evaluated,
            picks_correct: t.picks_correct,
            perfect_picks: t.perfect_picks,
            accuracy: if t.picks_evaluated == 0 {
                0.0
            } else {
                f64::from(t.picks_correct) / f64::from(t.picks_evaluated)
            },
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| b.picks_correct.cmp(&a.picks_correct))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx as u32 + 1;
    }

    Ok(entries)
}
