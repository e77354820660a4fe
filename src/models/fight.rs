use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Red,
    Blue,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FightStatus {
    Scheduled,
    Completed,
}

impl FightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FightStatus::Scheduled => "scheduled",
            FightStatus::Completed => "completed",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct Fighter {
    pub name: String,
    pub nickname: Option<String>,
    pub nationality: Option<String>,
    pub record: Option<String>, // "27-1-0"
    pub ranking: Option<i32>,
    pub profile_image_url: Option<String>,
}

/// Official outcome of a fight. `winner` is `None` for draws and no contests.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct FightResult {
    pub winner: Option<Corner>,
    pub method: String,
    pub round: Option<i32>,
    pub time: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Fight {
    #[serde(rename = "_id")]
    pub id: i64,
    pub event_id: i64,
    pub weight_class: String,
    pub rounds_scheduled: i32,
    #[serde(default)]
    pub is_title_fight: bool,
    pub status: FightStatus,
    pub red: Fighter,
    pub blue: Fighter,
    pub result: Option<FightResult>,
    #[serde(default)]
    pub picks_locked: bool,
    #[serde(default)]
    pub picks_lock_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

impl Fight {
    pub fn is_finalized(&self) -> bool {
        self.result.is_some()
    }

    pub fn pick_lock_reason(&self, now: DateTime<Utc>) -> Option<&'static str> {
        if self.is_finalized() {
            return Some("Fight already has a result");
        }
        if self.picks_locked {
            return Some("Picks are locked for this fight");
        }
        let closes_at = self.picks_lock_time.or(self.start_time);
        match closes_at {
            Some(at) if at <= now => Some("Picks closed for this fight"),
            _ => None,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateFightRequest {
    pub id: i64,
    pub weight_class: String,
    pub rounds_scheduled: i32,
    #[serde(default)]
    pub is_title_fight: bool,
    pub red: Fighter,
    pub blue: Fighter,
    pub start_time: Option<DateTime<Utc>>,
}

impl CreateFightRequest {
    pub fn into_fight(self, event_id: i64) -> Fight {
        Fight {
            id: self.id,
            event_id,
            weight_class: self.weight_class,
            rounds_scheduled: self.rounds_scheduled,
            is_title_fight: self.is_title_fight,
            status: FightStatus::Scheduled,
            red: self.red,
            blue: self.blue,
            result: None,
            picks_locked: false,
            picks_lock_time: None,
            start_time: self.start_time,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct FightResponse {
    pub id: i64,
    pub event_id: i64,
    pub weight_class: String,
    pub rounds_scheduled: i32,
    pub is_title_fight: bool,
    pub status: FightStatus,
    pub red: Fighter,
    pub blue: Fighter,
    pub result: Option<FightResult>,
    pub picks_locked: bool,
    pub start_time: Option<String>,
}

impl From<Fight> for FightResponse {
    fn from(f: Fight) -> Self {
        FightResponse {
            id: f.id,
            event_id: f.event_id,
            weight_class: f.weight_class,
            rounds_scheduled: f.rounds_scheduled,
            is_title_fight: f.is_title_fight,
            status: f.status,
            red: f.red,
            blue: f.blue,
            result: f.result,
            picks_locked: f.picks_locked,
            start_time: f.start_time.map(|d| d.to_rfc3339()),
        }
    }
}
