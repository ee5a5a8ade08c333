use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RedeemClaimRequest {
    /// Redemption code as typed by staff; casing and separators are
    /// normalized before lookup.
    pub code: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RedeemClaimResponse {
    pub prize_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize_description: Option<String>,
    pub redeemed_at: DateTime<Utc>,
}
