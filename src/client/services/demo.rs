//! Demo data served when a fallback-enabled read is slow or failing.
//!
//! Ids are fixed so the UI keeps stable keys across fallbacks.

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use crate::client::services::admin::PlatformAnalytics;
use crate::client::services::appointment::{Appointment, AppointmentStatus};
use crate::client::services::goals::{Goal, Habit};
use crate::client::services::health::{BloodPressure, HealthMetrics};
use crate::client::services::notification::Notification;
use crate::client::services::user::{Role, UserProfile};
use crate::client::services::wallet::{TransactionKind, WalletBalance, WalletTransaction};

fn id(n: u128) -> Uuid {
    Uuid::from_u128(0xd3_0000 + n)
}

pub fn user_profile() -> UserProfile {
    UserProfile {
        id: id(1),
        email: "demo.patient@rdm.health".to_string(),
        name: "Demo Patient".to_string(),
        role: Role::Patient,
        wallet_address: None,
        created_at: Utc::now() - TimeDelta::days(90),
    }
}

pub fn wallet_balance() -> WalletBalance {
    WalletBalance {
        balance: 1250.0,
        pending: 75.0,
        address: None,
    }
}

pub fn wallet_transactions() -> Vec<WalletTransaction> {
    let now = Utc::now();
    vec![
        WalletTransaction {
            id: id(10),
            kind: TransactionKind::Earned,
            amount: 25.0,
            description: "Medication adherence streak".to_string(),
            created_at: now - TimeDelta::hours(3),
        },
        WalletTransaction {
            id: id(11),
            kind: TransactionKind::Earned,
            amount: 50.0,
            description: "Appointment attended".to_string(),
            created_at: now - TimeDelta::days(1),
        },
        WalletTransaction {
            id: id(12),
            kind: TransactionKind::Redeemed,
            amount: 100.0,
            description: "Pharmacy voucher".to_string(),
            created_at: now - TimeDelta::days(4),
        },
    ]
}

pub fn platform_analytics() -> PlatformAnalytics {
    PlatformAnalytics {
        total_patients: 1284,
        active_patients: 967,
        average_adherence: 0.82,
        tokens_distributed: 184_250.0,
        claims_pending: 14,
    }
}

pub fn goals() -> Vec<Goal> {
    vec![
        Goal {
            id: id(20),
            title: "Walk 8,000 steps a day".to_string(),
            description: "Build up daily activity over four weeks".to_string(),
            progress: 0.6,
            target_date: Some(Utc::now() + TimeDelta::days(12)),
            habits: vec![Habit {
                id: id(21),
                name: "Morning walk".to_string(),
                completed_today: false,
                streak: 9,
            }],
        },
        Goal {
            id: id(22),
            title: "Never miss an evening dose".to_string(),
            description: String::new(),
            progress: 0.9,
            target_date: None,
            habits: vec![Habit {
                id: id(23),
                name: "Evening medication".to_string(),
                completed_today: true,
                streak: 27,
            }],
        },
    ]
}

pub fn health_metrics() -> HealthMetrics {
    HealthMetrics {
        heart_rate: Some(68),
        blood_pressure: Some(BloodPressure {
            systolic: 120,
            diastolic: 80,
        }),
        weight_kg: Some(72.5),
        steps: Some(6421),
        recorded_at: Some(Utc::now() - TimeDelta::hours(1)),
    }
}

pub fn appointments() -> Vec<Appointment> {
    let now = Utc::now();
    vec![
        Appointment {
            id: id(30),
            provider_name: "Dr. Rivera".to_string(),
            scheduled_at: now + TimeDelta::days(2),
            location: "Clinic A, Room 4".to_string(),
            status: AppointmentStatus::Scheduled,
        },
        Appointment {
            id: id(31),
            provider_name: "Dr. Okafor".to_string(),
            scheduled_at: now + TimeDelta::days(9),
            location: "Telehealth".to_string(),
            status: AppointmentStatus::Scheduled,
        },
    ]
}

pub fn notifications() -> Vec<Notification> {
    let now = Utc::now();
    vec![
        Notification {
            id: id(40),
            title: "Evening dose due".to_string(),
            body: "Take your 20:00 medication to keep your streak.".to_string(),
            read: false,
            created_at: now - TimeDelta::minutes(15),
        },
        Notification {
            id: id(41),
            title: "You earned 25 RDM".to_string(),
            body: "Seven days of perfect adherence.".to_string(),
            read: true,
            created_at: now - TimeDelta::hours(3),
        },
    ]
}
