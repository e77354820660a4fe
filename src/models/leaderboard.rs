use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One ranked row, derived from fights and picks. Never stored.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub total_points: u64,
    pub picks_total: u32,
    /// Picks whose fight has a result.
    pub picks_evaluated: u32,
    pub picks_correct: u32,
    pub perfect_picks: u32,
    pub accuracy: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct LeaderboardEntryResponse {
    pub rank: u32,
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub total_points: u64,
    pub picks_total: u32,
    pub picks_evaluated: u32,
    pub picks_correct: u32,
    pub perfect_picks: u32,
    pub accuracy: f64,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub scope: String, // "all_time", a year, or "event:{id}"
    pub entries: Vec<LeaderboardEntryResponse>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UserPositionResponse {
    pub rank: Option<u32>,
    pub entry: Option<LeaderboardEntryResponse>,
}
