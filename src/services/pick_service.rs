use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Collection, Database,
};
use tracing::{debug, info};

use crate::db::is_duplicate_key;
use crate::error::AppError;
use crate::models::{
    fight::Fight,
    pick::{Pick, PickCreate, PickResponse, VictoryMethod},
};
use crate::services::{
    event_service::EventService,
    scoring::{score_pick, ScoringPolicy},
};

const MAX_ROUNDS: i32 = 5;

pub struct PickService {
    collection: Collection<Pick>,
    event_service: Arc<EventService>,
    policy: ScoringPolicy,
}

impl PickService {
    pub fn new(db: Arc<Database>, event_service: Arc<EventService>, policy: ScoringPolicy) -> Self {
        Self {
            collection: db.collection("picks"),
            event_service,
            policy,
        }
    }

    /// Creates the caller's pick for a fight, or replaces it while the fight
    /// is still open.
    pub async fn create_or_update_pick(&self, user_id: &str, data: PickCreate) -> Result<Pick, AppError> {
        let now = Utc::now();

        let event = self.event_service.get_event(data.event_id).await?;
        let fight = self.event_service.get_fight(data.fight_id).await?;
        if fight.event_id != event.id {
            return Err(AppError::BadRequest(
                "Fight does not belong to the specified event".to_string(),
            ));
        }

        if let Some(reason) = event.pick_lock_reason(now).or_else(|| fight.pick_lock_reason(now)) {
            return Err(AppError::Locked(reason.to_string()));
        }

        let pick_id = Pick::make_id(user_id, fight.id);
        let existing = self.collection.find_one(doc! { "_id": &pick_id }).await?;
        if existing.as_ref().is_some_and(|p| p.locked) {
            return Err(AppError::Locked("This pick has been locked".to_string()));
        }

        validate_selection(&data, &fight)?;

        match existing {
            Some(mut pick) => {
                pick.picked_corner = data.picked_corner;
                pick.picked_method = data.picked_method;
                pick.picked_round = data.picked_round;
                pick.updated_at = Some(now);
                let result = self
                    .collection
                    .replace_one(doc! { "_id": &pick.id, "locked": false }, &pick)
                    .await?;
                if result.matched_count == 0 {
                    return Err(AppError::Locked("This pick has been locked".to_string()));
                }
                debug!(pick_id = %pick.id, "pick updated");
                Ok(pick)
            }
            None => {
                let pick = Pick {
                    id: pick_id,
                    user_id: user_id.to_string(),
                    event_id: event.id,
                    fight_id: fight.id,
                    picked_corner: data.picked_corner,
                    picked_method: data.picked_method,
                    picked_round: data.picked_round,
                    locked: false,
                    created_at: now,
                    updated_at: None,
                };
                match self.collection.insert_one(&pick).await {
                    Ok(_) => {
                        debug!(pick_id = %pick.id, "pick created");
                        Ok(pick)
                    }
                    Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(
                        "Pick was submitted concurrently, retry".to_string(),
                    )),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    pub async fn get_user_picks_for_event(&self, user_id: &str, event_id: i64) -> Result<Vec<Pick>, AppError> {
        let picks = self
            .collection
            .find(doc! { "user_id": user_id, "event_id": event_id })
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(picks)
    }

    pub async fn get_all_user_picks(&self, user_id: &str, limit: i64) -> Result<Vec<Pick>, AppError> {
        let picks = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(picks)
    }

    pub async fn picks_for_event(&self, event_id: i64) -> Result<Vec<Pick>, AppError> {
        self.find_picks(doc! { "event_id": event_id }).await
    }

    pub async fn picks_for_events(&self, event_ids: &[i64]) -> Result<Vec<Pick>, AppError> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_picks(doc! { "event_id": { "$in": event_ids } }).await
    }

    pub async fn all_picks(&self) -> Result<Vec<Pick>, AppError> {
        self.find_picks(doc! {}).await
    }

    async fn find_picks(&self, filter: Document) -> Result<Vec<Pick>, AppError> {
        let picks = self.collection.find(filter).await?.try_collect().await?;
        Ok(picks)
    }

    /// Sets the `locked` flag on every pick of an event. Returns how many changed.
    pub async fn set_event_picks_locked(&self, event_id: i64, locked: bool) -> Result<u64, AppError> {
        let result = self
            .collection
            .update_many(doc! { "event_id": event_id }, doc! { "$set": { "locked": locked } })
            .await?;
        info!(event_id, locked, count = result.modified_count, "event picks lock changed");
        Ok(result.modified_count)
    }

    pub async fn set_fight_picks_locked(&self, fight_id: i64, locked: bool) -> Result<u64, AppError> {
        let result = self
            .collection
            .update_many(doc! { "fight_id": fight_id }, doc! { "$set": { "locked": locked } })
            .await?;
        info!(fight_id, locked, count = result.modified_count, "fight picks lock changed");
        Ok(result.modified_count)
    }

    /// Attaches the scored outcome of each pick whose fight has a result.
    pub async fn describe(&self, picks: Vec<Pick>) -> Result<Vec<PickResponse>, AppError> {
        let mut fight_ids: Vec<i64> = picks.iter().map(|p| p.fight_id).collect();
        fight_ids.sort_unstable();
        fight_ids.dedup();

        let fights: HashMap<i64, Fight> = self
            .event_service
            .fights_by_ids(&fight_ids)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        Ok(picks
            .into_iter()
            .map(|pick| {
                let outcome = fights
                    .get(&pick.fight_id)
                    .and_then(|f| f.result.as_ref())
                    .map(|result| score_pick(&pick, result, &self.policy));
                PickResponse {
                    is_correct: outcome.map(|o| o.winner_correct),
                    points_awarded: outcome.map_or(0, |o| o.points),
                    id: pick.id,
                    event_id: pick.event_id,
                    fight_id: pick.fight_id,
                    picked_corner: pick.picked_corner,
                    picked_method: pick.picked_method,
                    picked_round: pick.picked_round,
                    locked: pick.locked,
                    created_at: pick.created_at.to_rfc3339(),
                    updated_at: pick.updated_at.map(|d| d.to_rfc3339()),
                }
            })
            .collect())
    }
}

/// Checks the predicted method/round against the fight's format.
pub fn validate_selection(data: &PickCreate, fight: &Fight) -> Result<(), AppError> {
    let Some(round) = data.picked_round else {
        return Ok(());
    };

    if data.picked_method == VictoryMethod::Dec {
        return Err(AppError::BadRequest(
            "Round cannot be specified for DEC method".to_string(),
        ));
    }
    if !(1..=MAX_ROUNDS).contains(&round) {
        return Err(AppError::BadRequest(format!(
            "Round must be between 1 and {MAX_ROUNDS}"
        )));
    }
    if round > fight.rounds_scheduled {
        return Err(AppError::BadRequest(format!(
            "Fight is scheduled for {} rounds",
            fight.rounds_scheduled
        )));
    }
    Ok(())
}
