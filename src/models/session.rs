use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::ServiceWindow;

/// Resolve-or-create a fingerprint for one restaurant.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Client-derived device hash, at least 32 characters. The engine does
    /// not validate how it was derived, only its uniqueness scope.
    pub device_hash: String,
    pub restaurant_id: i64,
}

/// Why a visitor may not play right now. Distinct from losing a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateDenyReason {
    ServiceClosed,
    AlreadyPlayed,
    DistanceExceeded,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    pub fingerprint_id: i64,
    /// Whether this device may submit a review and draw right now.
    pub can_play: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<GateDenyReason>,
    /// Currently open service window, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<ServiceWindow>,
}

/// Geofence + service-window probe.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EligibilityRequest {
    pub restaurant_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EligibilityResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<GateDenyReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<ServiceWindow>,
    /// Great-circle distance between the visitor and the restaurant.
    pub distance_m: f64,
    pub max_distance_m: f64,
}

/// Review acceptance trigger; the review text itself lives in the external
/// feedback store, this call records the played-mark.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    pub fingerprint_id: i64,
    pub restaurant_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmitReviewResponse {
    pub window: ServiceWindow,
    /// Restaurant-local calendar day the played-mark was recorded for.
    pub played_on: NaiveDate,
}
