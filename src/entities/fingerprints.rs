use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::restaurants::ServiceWindow;

/// Anonymous device identity, scoped to one restaurant.
/// Unique per (hash, restaurant_id). `expires_at` is a privacy retention
/// deadline enforced by the advisory cleanup task, not by the request path.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fingerprints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Client-derived device hash, at least 32 characters.
    pub hash: String,
    pub restaurant_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    /// Restaurant-local calendar day of the last accepted review.
    pub last_played_on: Option<NaiveDate>,
    pub last_played_window: Option<ServiceWindow>,
    pub notify_email: Option<String>,
    pub notify_phone: Option<String>,
}

impl Model {
    /// Whether a review was already accepted for the given local day and window.
    pub fn has_played(&self, day: NaiveDate, window: ServiceWindow) -> bool {
        self.last_played_on == Some(day) && self.last_played_window == Some(window)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(day: Option<NaiveDate>, window: Option<ServiceWindow>) -> Model {
        Model {
            id: 1,
            hash: "a".repeat(32),
            restaurant_id: 7,
            created_at: None,
            expires_at: Utc::now(),
            last_played_on: day,
            last_played_window: window,
            notify_email: None,
            notify_phone: None,
        }
    }

    #[test]
    fn test_fresh_fingerprint_has_not_played() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let f = fingerprint(None, None);
        assert!(!f.has_played(today, ServiceWindow::Lunch));
    }

    #[test]
    fn test_same_day_same_window_counts_as_played() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let f = fingerprint(Some(today), Some(ServiceWindow::Lunch));
        assert!(f.has_played(today, ServiceWindow::Lunch));
    }

    #[test]
    fn test_other_window_or_day_does_not_count() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let yesterday = today.pred_opt().unwrap();
        let f = fingerprint(Some(today), Some(ServiceWindow::Lunch));
        assert!(!f.has_played(today, ServiceWindow::Dinner));
        let f = fingerprint(Some(yesterday), Some(ServiceWindow::Lunch));
        assert!(!f.has_played(today, ServiceWindow::Lunch));
    }
}
