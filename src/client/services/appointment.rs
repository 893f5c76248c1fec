//! Appointments and check-in.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::request::{with_fallback, RequestError, RequestService, Sourced};
use crate::client::services::demo;
use crate::procedure;

const UPCOMING_TIMEOUT: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    CheckedIn,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub provider_name: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRef {
    pub appointment_id: Uuid,
}

procedure!(Upcoming, "appointment", "getUpcoming", () => Vec<Appointment>);
procedure!(CheckIn, "appointment", "checkIn", AppointmentRef => Appointment);

#[derive(Debug, Clone)]
pub struct AppointmentService {
    base: RequestService,
}

impl AppointmentService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    /// Upcoming appointments, soonest first
    pub async fn upcoming(&self) -> Sourced<Vec<Appointment>> {
        let base = self.base.clone();
        with_fallback(
            async move {
                let mut appointments = base.call::<Upcoming>(&()).await?;
                appointments.sort_by_key(|a| a.scheduled_at);
                Ok::<_, RequestError>(appointments)
            },
            UPCOMING_TIMEOUT,
            demo::appointments,
        )
        .await
    }

    pub async fn check_in(&self, appointment_id: Uuid) -> Result<Appointment, RequestError> {
        self.base
            .call::<CheckIn>(&AppointmentRef { appointment_id })
            .await
    }
}
