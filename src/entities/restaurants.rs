use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Named participation window within a restaurant's day.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "service_window")]
#[serde(rename_all = "snake_case")]
pub enum ServiceWindow {
    #[sea_orm(string_value = "lunch")]
    Lunch,
    #[sea_orm(string_value = "dinner")]
    Dinner,
}

impl std::fmt::Display for ServiceWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceWindow::Lunch => write!(f, "lunch"),
            ServiceWindow::Dinner => write!(f, "dinner"),
        }
    }
}

/// Restaurant directory entry (owned by the external directory; read-only here).
/// Service windows are [start, end) in restaurant-local time; a window whose
/// end is earlier than its start crosses midnight.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Geofence radius in meters.
    pub geofence_radius_m: f64,
    /// Fixed offset from UTC; the directory updates it on DST changes.
    pub utc_offset_minutes: i32,
    pub lunch_start: NaiveTime,
    pub lunch_end: NaiveTime,
    pub dinner_start: NaiveTime,
    pub dinner_end: NaiveTime,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Current restaurant-local wall clock.
    pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        (now + Duration::minutes(self.utc_offset_minutes as i64)).naive_utc()
    }

    /// Which service window (if any) is open at the given instant.
    pub fn window_at(&self, now: DateTime<Utc>) -> Option<ServiceWindow> {
        let t = self.local_now(now).time();
        if in_window(t, self.lunch_start, self.lunch_end) {
            Some(ServiceWindow::Lunch)
        } else if in_window(t, self.dinner_start, self.dinner_end) {
            Some(ServiceWindow::Dinner)
        } else {
            None
        }
    }
}

/// [start, end) membership; start == end is an always-closed window.
fn in_window(t: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        t >= start && t < end
    } else {
        // crosses midnight, e.g. 18:00 - 00:30
        t >= start || t < end
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn restaurant(offset_minutes: i32) -> Model {
        Model {
            id: 1,
            name: "Chez Test".into(),
            latitude: 48.8566,
            longitude: 2.3522,
            geofence_radius_m: 100.0,
            utc_offset_minutes: offset_minutes,
            lunch_start: t(11, 30),
            lunch_end: t(14, 30),
            dinner_start: t(18, 30),
            dinner_end: t(23, 0),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2026, 8, 25)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_window_at_lunch_and_dinner() {
        let r = restaurant(0);
        assert_eq!(r.window_at(utc(12, 0)), Some(ServiceWindow::Lunch));
        assert_eq!(r.window_at(utc(19, 45)), Some(ServiceWindow::Dinner));
        assert_eq!(r.window_at(utc(16, 0)), None);
        assert_eq!(r.window_at(utc(3, 0)), None);
    }

    #[test]
    fn test_window_bounds_are_half_open() {
        let r = restaurant(0);
        assert_eq!(r.window_at(utc(11, 30)), Some(ServiceWindow::Lunch));
        assert_eq!(r.window_at(utc(14, 30)), None);
    }

    #[test]
    fn test_window_respects_utc_offset() {
        // UTC+2: 10:30 UTC is 12:30 local
        let r = restaurant(120);
        assert_eq!(r.window_at(utc(10, 30)), Some(ServiceWindow::Lunch));
        assert_eq!(r.window_at(utc(12, 30)), None);
    }

    #[test]
    fn test_window_crossing_midnight() {
        let mut r = restaurant(0);
        r.dinner_start = t(19, 0);
        r.dinner_end = t(0, 30);
        assert_eq!(r.window_at(utc(23, 45)), Some(ServiceWindow::Dinner));
        assert_eq!(r.window_at(utc(0, 15)), Some(ServiceWindow::Dinner));
        assert_eq!(r.window_at(utc(0, 30)), None);
    }

    #[test]
    fn test_zero_length_window_is_closed() {
        let mut r = restaurant(0);
        r.lunch_start = t(12, 0);
        r.lunch_end = t(12, 0);
        assert_eq!(r.window_at(utc(12, 0)), None);
    }
}
