use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of an issued claim. `Pending` is the only initial state;
/// `Claimed` and `Expired` are terminal.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "claim_status")]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "claimed")]
    Claimed,
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Pending => write!(f, "pending"),
            ClaimStatus::Claimed => write!(f, "claimed"),
            ClaimStatus::Expired => write!(f, "expired"),
        }
    }
}

/// One issued reward. Created exactly once per winning draw, in the same
/// transaction as its pool's increment; never deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prize_claims")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Globally unique redemption code, stored upper-cased and grouped.
    pub code: String,
    pub prize_id: i64,
    pub pool_id: i64,
    pub fingerprint_id: i64,
    pub restaurant_id: i64,
    pub status: ClaimStatus,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::prizes::Entity",
        from = "Column::PrizeId",
        to = "super::prizes::Column::Id"
    )]
    Prize,
    #[sea_orm(
        belongs_to = "super::daily_prize_pools::Entity",
        from = "Column::PoolId",
        to = "super::daily_prize_pools::Column::Id"
    )]
    Pool,
}

impl Related<super::prizes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prize.def()
    }
}

impl Related<super::daily_prize_pools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pool.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_expired_boundary() {
        let issued = Utc::now();
        let claim = Model {
            id: 1,
            code: "ABCD-EFGH-JKLM".into(),
            prize_id: 1,
            pool_id: 1,
            fingerprint_id: 1,
            restaurant_id: 1,
            status: ClaimStatus::Pending,
            issued_at: issued,
            expires_at: issued + Duration::days(7),
            redeemed_at: None,
        };
        assert!(!claim.is_expired(issued + Duration::days(7)));
        assert!(claim.is_expired(issued + Duration::days(8)));
    }
}
