use std::sync::Arc;

use tracing::debug;

use crate::error::AppError;
use crate::models::leaderboard::{LeaderboardEntry, LeaderboardEntryResponse};
use crate::services::{
    event_service::EventService,
    pick_service::PickService,
    scoring::{compute_leaderboard, ScoringPolicy},
    user_service::UserService,
};

/// Loads fights and picks from the stores and ranks them on every request.
pub struct LeaderboardService {
    event_service: Arc<EventService>,
    pick_service: Arc<PickService>,
    user_service: Arc<UserService>,
    policy: ScoringPolicy,
}

impl LeaderboardService {
    pub fn new(
        event_service: Arc<EventService>,
        pick_service: Arc<PickService>,
        user_service: Arc<UserService>,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            event_service,
            pick_service,
            user_service,
            policy,
        }
    }

    pub async fn global_leaderboard(&self, year: Option<i32>) -> Result<Vec<LeaderboardEntry>, AppError> {
        // Picks are read before fights. Fights are never deleted, so every
        // pick loaded here still finds its fight even if a card grows between
        // the two reads.
        let (picks, fights) = match year {
            None => {
                let picks = self.pick_service.all_picks().await?;
                (picks, self.event_service.all_fights().await?)
            }
            Some(year) => {
                let event_ids = self.event_service.event_ids_for_year(year).await?;
                let picks = self.pick_service.picks_for_events(&event_ids).await?;
                (picks, self.event_service.fights_for_events(&event_ids).await?)
            }
        };

        let entries = compute_leaderboard(&fights, &picks, &self.policy)?;
        debug!(?year, fights = fights.len(), picks = picks.len(), users = entries.len(), "global leaderboard computed");
        Ok(entries)
    }

    pub async fn event_leaderboard(&self, event_id: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        self.event_service.get_event(event_id).await?;
        let picks = self.pick_service.picks_for_event(event_id).await?;
        let fights = self.event_service.fights_for_event(event_id).await?;

        let entries = compute_leaderboard(&fights, &picks, &self.policy)?;
        debug!(event_id, users = entries.len(), "event leaderboard computed");
        Ok(entries)
    }

    /// The caller's row of the global board, or `None` if they never picked.
    pub async fn user_position(&self, user_id: &str, year: Option<i32>) -> Result<Option<LeaderboardEntry>, AppError> {
        let entries = self.global_leaderboard(year).await?;
        Ok(entries.into_iter().find(|e| e.user_id == user_id))
    }

    /// Keeps the first `limit` rows and attaches display names.
    pub async fn decorate(
        &self,
        entries: Vec<LeaderboardEntry>,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntryResponse>, AppError> {
        let entries: Vec<LeaderboardEntry> = entries.into_iter().take(limit).collect();
        let user_ids: Vec<String> = entries.iter().map(|e| e.user_id.clone()).collect();
        let users = self.user_service.users_by_ids(&user_ids).await?;

        Ok(entries
            .into_iter()
            .map(|e| {
                let user = users.get(&e.user_id);
                LeaderboardEntryResponse {
                    username: user.map_or_else(|| "Unknown".to_string(), |u| u.name.clone()),
                    avatar_url: user.and_then(|u| u.profile_picture.clone()),
                    rank: e.rank,
                    user_id: e.user_id,
                    total_points: e.total_points,
                    picks_total: e.picks_total,
                    picks_evaluated: e.picks_evaluated,
                    picks_correct: e.picks_correct,
                    perfect_picks: e.perfect_picks,
                    accuracy: e.accuracy,
                }
            })
            .collect())
    }
}
