use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::prize_entity;
use crate::services::IssuedClaim;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SpinRequest {
    pub fingerprint_id: i64,
    pub restaurant_id: i64,
}

/// Prize details handed to a winner, including the redemption code.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WonPrize {
    pub prize_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of one draw. A losing draw and an exhausted pool both serialize
/// as `won: false`; neither is an error.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpinResponse {
    pub won: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize: Option<WonPrize>,
}

impl SpinResponse {
    pub fn lost() -> Self {
        SpinResponse {
            won: false,
            prize: None,
        }
    }

    pub fn won(prize: &prize_entity::Model, issued: IssuedClaim) -> Self {
        SpinResponse {
            won: true,
            prize: Some(WonPrize {
                prize_name: prize.name.clone(),
                description: prize.description.clone(),
                code: issued.code,
                expires_at: issued.expires_at,
            }),
        }
    }
}
