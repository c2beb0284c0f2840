// Stats proxy: per-player current-season goal lookups against the NHL
// `api-web` landing document.

pub mod client;
pub mod error;
pub mod landing;

use async_trait::async_trait;
use blues_core::{PlayerGoals, PlayerId};

pub use client::{NhlClient, StatsProxy};
pub use error::{Result, StatsError};

/// Anything that can resolve a player's current-season goal count.
///
/// A failed lookup is reported as `Err`, never as a zero; substituting a
/// default is the caller's decision.
#[async_trait]
pub trait GoalSource: Send + Sync {
    async fn player_goals(&self, player_id: PlayerId) -> Result<PlayerGoals>;
}
