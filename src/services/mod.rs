pub mod event_service;
pub mod leaderboard_service;
pub mod pick_service;
pub mod scoring;
pub mod user_service;
