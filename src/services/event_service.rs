use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::ReturnDocument,
    Collection, Database,
};
use tracing::info;

use crate::db::is_duplicate_key;
use crate::error::AppError;
use crate::models::{
    event::{year_date_pattern, Event, EventStatus},
    fight::{Fight, FightResult, FightStatus},
};

/// Read and admin access to events and the fights on their cards.
pub struct EventService {
    events: Collection<Event>,
    fights: Collection<Fight>,
}

impl EventService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            events: db.collection("events"),
            fights: db.collection("fights"),
        }
    }

    pub async fn get_event(&self, event_id: i64) -> Result<Event, AppError> {
        self.events
            .find_one(doc! { "_id": event_id })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))
    }

    pub async fn get_upcoming_events(&self, limit: i64) -> Result<Vec<Event>, AppError> {
        let events = self
            .events
            .find(doc! { "status": EventStatus::Scheduled.as_str() })
            .sort(doc! { "date": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(events)
    }

    pub async fn get_recent_completed(&self, limit: i64) -> Result<Vec<Event>, AppError> {
        let events = self
            .events
            .find(doc! { "status": EventStatus::Completed.as_str() })
            .sort(doc! { "date": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(events)
    }

    /// Without a status filter: upcoming cards first, then recent results,
    /// at most `limit` in total. Cancelled cards only show up when asked for.
    pub async fn get_events_by_status(&self, status: Option<EventStatus>, limit: i64) -> Result<Vec<Event>, AppError> {
        match status {
            Some(EventStatus::Scheduled) => self.get_upcoming_events(limit).await,
            Some(EventStatus::Completed) => self.get_recent_completed(limit).await,
            Some(EventStatus::Cancelled) => {
                let events = self
                    .events
                    .find(doc! { "status": EventStatus::Cancelled.as_str() })
                    .sort(doc! { "date": -1 })
                    .limit(limit)
                    .await?
                    .try_collect()
                    .await?;
                Ok(events)
            }
            None => {
                let mut events = self.get_upcoming_events(limit).await?;
                let remaining = limit - events.len() as i64;
                if remaining > 0 {
                    events.extend(self.get_recent_completed(remaining).await?);
                }
                Ok(events)
            }
        }
    }

    pub async fn event_ids_for_year(&self, year: i32) -> Result<Vec<i64>, AppError> {
        let events: Vec<Event> = self
            .events
            .find(doc! { "date": { "$regex": year_date_pattern(year) } })
            .await?
            .try_collect()
            .await?;
        Ok(events.into_iter().map(|e| e.id).collect())
    }

    pub async fn get_fight(&self, fight_id: i64) -> Result<Fight, AppError> {
        self.fights
            .find_one(doc! { "_id": fight_id })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fight {fight_id} not found")))
    }

    pub async fn get_event_fights(&self, event_id: i64) -> Result<Vec<Fight>, AppError> {
        self.get_event(event_id).await?;
        self.fights_for_event(event_id).await
    }

    pub async fn fights_for_event(&self, event_id: i64) -> Result<Vec<Fight>, AppError> {
        self.find_fights(doc! { "event_id": event_id }).await
    }

    pub async fn fights_for_events(&self, event_ids: &[i64]) -> Result<Vec<Fight>, AppError> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_fights(doc! { "event_id": { "$in": event_ids } }).await
    }

    pub async fn fights_by_ids(&self, fight_ids: &[i64]) -> Result<Vec<Fight>, AppError> {
        if fight_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_fights(doc! { "_id": { "$in": fight_ids } }).await
    }

    pub async fn all_fights(&self) -> Result<Vec<Fight>, AppError> {
        self.find_fights(doc! {}).await
    }

    async fn find_fights(&self, filter: Document) -> Result<Vec<Fight>, AppError> {
        let fights = self
            .fights
            .find(filter)
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(fights)
    }

    pub async fn create_event(&self, event: Event) -> Result<Event, AppError> {
        match self.events.insert_one(&event).await {
            Ok(_) => {
                info!(event_id = event.id, name = %event.name, "event created");
                Ok(event)
            }
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(format!("Event {} already exists", event.id))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create_fight(&self, fight: Fight) -> Result<Fight, AppError> {
        self.get_event(fight.event_id).await?;
        if fight.rounds_scheduled < 1 || fight.rounds_scheduled > 5 {
            return Err(AppError::BadRequest("rounds_scheduled must be between 1 and 5".to_string()));
        }

        match self.fights.insert_one(&fight).await {
            Ok(_) => {}
            Err(e) if is_duplicate_key(&e) => {
                return Err(AppError::Conflict(format!("Fight {} already exists", fight.id)));
            }
            Err(e) => return Err(e.into()),
        }

        self.events
            .update_one(doc! { "_id": fight.event_id }, doc! { "$inc": { "total_fights": 1 } })
            .await?;

        info!(fight_id = fight.id, event_id = fight.event_id, "fight added to card");
        Ok(fight)
    }

    pub async fn set_fight_result(&self, fight_id: i64, result: FightResult) -> Result<Fight, AppError> {
        let result_bson = bson::to_bson(&result)?;
        let fight = self
            .fights
            .find_one_and_update(
                doc! { "_id": fight_id },
                doc! { "$set": { "result": result_bson, "status": FightStatus::Completed.as_str() } },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fight {fight_id} not found")))?;

        info!(fight_id, winner = ?result.winner, method = %result.method, "fight result recorded");
        Ok(fight)
    }

    pub async fn clear_fight_result(&self, fight_id: i64) -> Result<Fight, AppError> {
        let fight = self.get_fight(fight_id).await?;
        if fight.result.is_none() {
            return Err(AppError::BadRequest(format!("Fight {fight_id} has no result recorded")));
        }

        let fight = self
            .fights
            .find_one_and_update(
                doc! { "_id": fight_id },
                doc! { "$set": { "result": null, "status": FightStatus::Scheduled.as_str() } },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fight {fight_id} not found")))?;

        info!(fight_id, "fight result cleared");
        Ok(fight)
    }

    pub async fn set_event_lock(&self, event_id: i64, locked: bool) -> Result<(), AppError> {
        let result = self
            .events
            .update_one(doc! { "_id": event_id }, doc! { "$set": { "picks_locked": locked } })
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Event {event_id} not found")));
        }
        Ok(())
    }

    pub async fn set_fight_lock(&self, fight_id: i64, locked: bool) -> Result<(), AppError> {
        let result = self
            .fights
            .update_one(doc! { "_id": fight_id }, doc! { "$set": { "picks_locked": locked } })
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Fight {fight_id} not found")));
        }
        Ok(())
    }

    /// Returns the names of the fields that were changed.
    pub async fn update_event_timing(
        &self,
        event_id: i64,
        date: Option<NaiveDate>,
        picks_lock_date: Option<DateTime<Utc>>,
    ) -> Result<Vec<String>, AppError> {
        let mut update = Document::new();
        if let Some(date) = date {
            update.insert("date", bson::to_bson(&date)?);
        }
        if let Some(lock) = picks_lock_date {
            update.insert("picks_lock_date", bson::to_bson(&lock)?);
        }
        self.apply_timing(&self.events, event_id, "Event", update).await
    }

    pub async fn update_fight_timing(
        &self,
        fight_id: i64,
        start_time: Option<DateTime<Utc>>,
        picks_lock_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<String>, AppError> {
        let mut update = Document::new();
        if let Some(start) = start_time {
            update.insert("start_time", bson::to_bson(&start)?);
        }
        if let Some(lock) = picks_lock_time {
            update.insert("picks_lock_time", bson::to_bson(&lock)?);
        }
        self.apply_timing(&self.fights, fight_id, "Fight", update).await
    }

    async fn apply_timing<T: Send + Sync>(
        &self,
        collection: &Collection<T>,
        id: i64,
        kind: &str,
        update: Document,
    ) -> Result<Vec<String>, AppError> {
        if update.is_empty() {
            return Err(AppError::BadRequest("Provide at least one field to update".to_string()));
        }
        let fields: Vec<String> = update.keys().cloned().collect();

        let result = collection
            .update_one(doc! { "_id": id }, doc! { "$set": update })
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("{kind} {id} not found")));
        }

        info!(id, kind, ?fields, "timing updated");
        Ok(fields)
    }
}
