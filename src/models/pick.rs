use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::fight::Corner;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
pub enum VictoryMethod {
    #[serde(rename = "KO/TKO")]
    KoTko,
    #[serde(rename = "SUB")]
    Sub,
    #[serde(rename = "DEC")]
    Dec,
}

impl VictoryMethod {
    /// Maps a free-form result method ("TKO", "Submission", "U-DEC", ...) onto
    /// the methods a pick can name. DQ and other outcomes map to nothing.
    pub fn normalize(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        if upper.contains("KO") {
            Some(VictoryMethod::KoTko)
        } else if upper.contains("SUB") {
            Some(VictoryMethod::Sub)
        } else if upper.contains("DEC") {
            Some(VictoryMethod::Dec)
        } else {
            None
        }
    }
}

/// A user's prediction for one fight. At most one exists per (user, fight),
/// guaranteed by the `_id` being `"{user_id}:{fight_id}"`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Pick {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub event_id: i64,
    pub fight_id: i64,
    pub picked_corner: Corner,
    pub picked_method: VictoryMethod,
    pub picked_round: Option<i32>,
    #[serde(default)]
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Pick {
    pub fn make_id(user_id: &str, fight_id: i64) -> String {
        format!("{user_id}:{fight_id}")
    }
}

#[derive(Deserialize, ToSchema)]
pub struct PickCreate {
    pub event_id: i64,
    pub fight_id: i64,
    pub picked_corner: Corner,
    pub picked_method: VictoryMethod,
    pub picked_round: Option<i32>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PickResponse {
    pub id: String,
    pub event_id: i64,
    pub fight_id: i64,
    pub picked_corner: Corner,
    pub picked_method: VictoryMethod,
    pub picked_round: Option<i32>,
    pub locked: bool,
    /// `None` until the fight has a result.
    pub is_correct: Option<bool>,
    pub points_awarded: u64,
    pub created_at: String,
    pub updated_at: Option<String>,
}
