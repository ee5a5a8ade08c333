use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Restaurant-configured reward definition (edited by staff tooling,
/// read-only from the engine's perspective).
///
/// `probability` is a threshold in [0, 1] tested against one shared draw,
/// not a share of a normalized distribution; see `services::draw_service`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Win threshold in [0, 1].
    pub probability: f64,
    /// Daily inventory cap (NULL = uncapped, the pool falls back to the
    /// configured default allocation).
    pub max_per_day: Option<i32>,
    /// Weekly cap across all of the week's pools (NULL = uncapped).
    pub max_per_week: Option<i32>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daily_prize_pools::Entity")]
    DailyPrizePool,
}

impl Related<super::daily_prize_pools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyPrizePool.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
