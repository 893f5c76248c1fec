//! Goals and the daily habits that feed them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::request::{with_fallback, RequestError, RequestService, Sourced};
use crate::client::services::demo;
use crate::procedure;

const LIST_TIMEOUT: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub completed_today: bool,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Completion, 0.0..=1.0
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub habits: Vec<Habit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRef {
    pub habit_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletion {
    pub habit_id: Uuid,
    pub streak: u32,
    /// Tokens earned for this completion
    pub reward: f64,
}

procedure!(ListGoals, "goals", "list", () => Vec<Goal>);
procedure!(CompleteHabit, "goals", "completeHabit", HabitRef => HabitCompletion);

#[derive(Debug, Clone)]
pub struct GoalsService {
    base: RequestService,
}

impl GoalsService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn list(&self) -> Sourced<Vec<Goal>> {
        let base = self.base.clone();
        with_fallback(
            async move { base.call::<ListGoals>(&()).await },
            LIST_TIMEOUT,
            demo::goals,
        )
        .await
    }

    pub async fn complete_habit(&self, habit_id: Uuid) -> Result<HabitCompletion, RequestError> {
        self.base.call::<CompleteHabit>(&HabitRef { habit_id }).await
    }
}
