pub mod event;
pub mod fight;
pub mod leaderboard;
pub mod pick;
pub mod user;
