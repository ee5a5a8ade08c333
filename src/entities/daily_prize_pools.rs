use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Day-scoped inventory instance of one prize. Created lazily, at most once
/// per (prize_id, pool_date). `claimed` only ever moves through the claim
/// ledger's conditional increment, so `claimed <= allocated` holds always.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_prize_pools")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub prize_id: i64,
    pub restaurant_id: i64,
    pub pool_date: NaiveDate,
    pub allocated: i32,
    pub claimed: i32,
    pub created_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn remaining(&self) -> i32 {
        self.allocated - self.claimed
    }

    pub fn is_drawable(&self) -> bool {
        self.claimed < self.allocated
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
}

impl Related<super::prizes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prize.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(allocated: i32, claimed: i32) -> Model {
        Model {
            id: 1,
            prize_id: 1,
            restaurant_id: 1,
            pool_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            allocated,
            claimed,
            created_at: None,
        }
    }

    #[test]
    fn test_remaining_counts_down() {
        assert_eq!(pool(10, 0).remaining(), 10);
        assert_eq!(pool(10, 7).remaining(), 3);
    }

    #[test]
    fn test_full_pool_is_not_drawable() {
        assert!(pool(10, 9).is_drawable());
        assert!(!pool(10, 10).is_drawable());
        assert!(!pool(0, 0).is_drawable());
    }
}
