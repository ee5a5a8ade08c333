use crate::config::RewardConfig;
use crate::entities::{daily_prize_pool_entity as pools, prize_entity as prizes};
use crate::error::AppResult;
use chrono::{Datelike, Duration, NaiveDate};
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use std::collections::HashMap;

/// One drawable pool with its prize definition.
#[derive(Debug, Clone)]
pub struct AvailablePool {
    pub prize: prizes::Model,
    pub pool: pools::Model,
    pub remaining: i32,
}

/// Pool Manager: provisions each active prize's bounded today's-pool and
/// exposes the drawable subset. Never mutates `claimed`; that is the claim
/// ledger's job, under its own transaction.
#[derive(Clone)]
pub struct PoolService {
    pool: DatabaseConnection,
    reward: RewardConfig,
}

impl PoolService {
    pub fn new(pool: DatabaseConnection, reward: RewardConfig) -> Self {
        Self { pool, reward }
    }

    /// Ensure a pool row exists for every active prize of the restaurant for
    /// `today`. Idempotent under concurrency: the (prize_id, pool_date)
    /// unique index plus do-nothing conflict handling makes the first writer
    /// win and later writers observe the same row.
    pub async fn ensure_today_pools(&self, restaurant_id: i64, today: NaiveDate) -> AppResult<()> {
        let active_prizes = prizes::Entity::find()
            .filter(prizes::Column::RestaurantId.eq(restaurant_id))
            .filter(prizes::Column::IsActive.eq(true))
            .all(&self.pool)
            .await?;

        for prize in active_prizes {
            let allocated = prize
                .max_per_day
                .unwrap_or(self.reward.default_daily_allocation);

            let insert = pools::Entity::insert(pools::ActiveModel {
                prize_id: Set(prize.id),
                restaurant_id: Set(restaurant_id),
                pool_date: Set(today),
                allocated: Set(allocated),
                claimed: Set(0),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::columns([pools::Column::PrizeId, pools::Column::PoolDate])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.pool)
            .await;

            match insert {
                Ok(_) => {}
                // lost the creation race; the existing row is the pool
                Err(DbErr::RecordNotInserted) => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Pools drawable right now: prize active, `claimed < allocated`, and
    /// the prize's weekly cap (if any) not yet reached.
    pub async fn available_pools(
        &self,
        restaurant_id: i64,
        today: NaiveDate,
    ) -> AppResult<Vec<AvailablePool>> {
        let rows = pools::Entity::find()
            .filter(pools::Column::RestaurantId.eq(restaurant_id))
            .filter(pools::Column::PoolDate.eq(today))
            .filter(Expr::col(pools::Column::Claimed).lt(Expr::col(pools::Column::Allocated)))
            .find_also_related(prizes::Entity)
            .all(&self.pool)
            .await?;

        let needs_week_totals = rows
            .iter()
            .any(|(_, p)| p.as_ref().is_some_and(|p| p.max_per_week.is_some()));
        let week_claimed = if needs_week_totals {
            self.week_claimed(restaurant_id, today).await?
        } else {
            HashMap::new()
        };

        let mut available = Vec::with_capacity(rows.len());
        for (pool, prize) in rows {
            let Some(prize) = prize else { continue };
            if !prize.is_active {
                continue;
            }
            if let Some(cap) = prize.max_per_week
                && week_claimed.get(&prize.id).copied().unwrap_or(0) >= cap as i64
            {
                continue;
            }
            available.push(AvailablePool {
                remaining: pool.remaining(),
                prize,
                pool,
            });
        }

        Ok(available)
    }

    /// Summed `claimed` per prize over the current week's pools (Monday-based).
    async fn week_claimed(
        &self,
        restaurant_id: i64,
        today: NaiveDate,
    ) -> AppResult<HashMap<i64, i64>> {
        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);

        let rows = pools::Entity::find()
            .filter(pools::Column::RestaurantId.eq(restaurant_id))
            .filter(pools::Column::PoolDate.gte(week_start))
            .filter(pools::Column::PoolDate.lte(today))
            .all(&self.pool)
            .await?;

        let mut totals: HashMap<i64, i64> = HashMap::new();
        for row in rows {
            *totals.entry(row.prize_id).or_insert(0) += row.claimed as i64;
        }
        Ok(totals)
    }
}
