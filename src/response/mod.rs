//! Response types for the Steam Web API accessors in [`crate::api`].

mod app;
mod player;

pub use app::{AchievementPercentage, App, AppNewsItem};
pub use player::{Friend, PlayerSummary};
