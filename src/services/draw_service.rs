use crate::config::RewardConfig;
use crate::error::{AppError, AppResult};
use crate::models::SpinResponse;
use crate::services::{AvailablePool, ClaimService, IdentityService, PoolService};
use chrono::Utc;
use rand::Rng;
use std::cmp::Ordering;

/// Select at most one prize from the available pools for a draw value `r`
/// in [0, 1).
///
/// Contract (kept bit-for-bit compatible with the deployed behavior): pools
/// are walked in descending prize probability, ties broken by ascending
/// prize id, and the first prize whose probability is `>= r` wins. Each
/// probability is an independent threshold against the one shared draw, NOT
/// a share of a normalized distribution; a later prize never absorbs
/// probability mass from an earlier one. Do not "fix" this without a
/// product decision.
pub fn select_prize(pools: &[AvailablePool], r: f64) -> Option<&AvailablePool> {
    let mut ordered: Vec<&AvailablePool> = pools.iter().collect();
    ordered.sort_by(|a, b| {
        b.prize
            .probability
            .partial_cmp(&a.prize.probability)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.prize.id.cmp(&b.prize.id))
    });
    ordered.into_iter().find(|p| p.prize.probability >= r)
}

/// Draw Engine: one weighted random selection per spin, plus the
/// orchestration around it (gating, pool provisioning, bounded retry on
/// allocation conflicts).
#[derive(Clone)]
pub struct DrawService {
    identity_service: IdentityService,
    pool_service: PoolService,
    claim_service: ClaimService,
    reward: RewardConfig,
}

impl DrawService {
    pub fn new(
        identity_service: IdentityService,
        pool_service: PoolService,
        claim_service: ClaimService,
        reward: RewardConfig,
    ) -> Self {
        Self {
            identity_service,
            pool_service,
            claim_service,
            reward,
        }
    }

    /// Execute one draw for a fingerprint that submitted a review in the
    /// current service window. Outcome is either a winning claim or
    /// `won: false`; an exhausted pool set is a normal no-win, not an error.
    pub async fn spin(&self, fingerprint_id: i64, restaurant_id: i64) -> AppResult<SpinResponse> {
        let restaurant = self.identity_service.load_restaurant(restaurant_id).await?;
        let fingerprint = self
            .identity_service
            .load_fingerprint(fingerprint_id, restaurant_id)
            .await?;

        let now = Utc::now();
        let window = restaurant.window_at(now).ok_or(AppError::ServiceClosed)?;
        let today = restaurant.local_now(now).date();

        if !fingerprint.has_played(today, window) {
            return Err(AppError::ValidationError(
                "A review must be accepted before drawing".to_string(),
            ));
        }

        self.pool_service
            .ensure_today_pools(restaurant_id, today)
            .await?;

        for attempt in 1..=self.reward.draw_max_attempts {
            let pools = self
                .pool_service
                .available_pools(restaurant_id, today)
                .await?;
            if pools.is_empty() {
                return Ok(SpinResponse::lost());
            }

            let r: f64 = rand::thread_rng().gen_range(0.0..1.0);
            let Some(selected) = select_prize(&pools, r) else {
                return Ok(SpinResponse::lost());
            };

            match self
                .claim_service
                .issue_claim(restaurant_id, selected.prize.id, selected.pool.id, fingerprint_id)
                .await
            {
                Ok(issued) => {
                    log::info!(
                        "Fingerprint {fingerprint_id} won prize {} at restaurant {restaurant_id}",
                        selected.prize.id
                    );
                    return Ok(SpinResponse::won(&selected.prize, issued));
                }
                Err(AppError::AllocationConflict) => {
                    // pool filled by a concurrent winner; re-draw against
                    // refreshed pool state
                    log::debug!(
                        "Pool {} filled during draw, attempt {attempt} of {}",
                        selected.pool.id,
                        self.reward.draw_max_attempts
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::AllocationConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        daily_prize_pool_entity as pools, fingerprint_entity as fingerprints,
        prize_entity as prizes, restaurant_entity as restaurants,
    };
    use chrono::{Duration, NaiveDate, NaiveTime};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn available(id: i64, probability: f64, allocated: i32, claimed: i32) -> AvailablePool {
        let prize = prizes::Model {
            id,
            restaurant_id: 1,
            name: format!("Prize {id}"),
            description: None,
            probability,
            max_per_day: Some(allocated),
            max_per_week: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        };
        let pool = pools::Model {
            id: id * 10,
            prize_id: id,
            restaurant_id: 1,
            pool_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            allocated,
            claimed,
            created_at: None,
        };
        AvailablePool {
            remaining: pool.remaining(),
            prize,
            pool,
        }
    }

    #[test]
    fn test_empty_pool_set_is_no_win() {
        assert!(select_prize(&[], 0.1).is_none());
    }

    #[test]
    fn test_first_threshold_match_in_descending_order_wins() {
        let set = vec![available(2, 0.5, 10, 0), available(1, 0.9, 10, 0)];
        // 0.9 is tested first; 0.9 >= 0.7
        assert_eq!(select_prize(&set, 0.7).unwrap().prize.id, 1);
        // both thresholds pass, the higher-probability prize still wins
        assert_eq!(select_prize(&set, 0.3).unwrap().prize.id, 1);
        // nothing reaches 0.95
        assert!(select_prize(&set, 0.95).is_none());
    }

    #[test]
    fn test_selection_is_deterministic_for_fixed_r() {
        let set = vec![
            available(3, 0.25, 5, 0),
            available(1, 0.25, 5, 0),
            available(2, 0.8, 5, 0),
        ];
        for _ in 0..10 {
            assert_eq!(select_prize(&set, 0.5).unwrap().prize.id, 2);
        }
    }

    #[test]
    fn test_ties_break_by_ascending_prize_id() {
        let set = vec![available(5, 0.5, 5, 0), available(3, 0.5, 5, 0)];
        assert_eq!(select_prize(&set, 0.2).unwrap().prize.id, 3);
    }

    #[test]
    fn test_probability_one_always_wins_while_pool_lasts() {
        // the 11th unit never reaches selection because the pool manager
        // stops listing an exhausted pool; here probability 1.0 must win
        // for any r in [0, 1)
        let set = vec![available(1, 1.0, 10, 9)];
        for r in [0.0, 0.25, 0.5, 0.999_999] {
            assert_eq!(select_prize(&set, r).unwrap().prize.id, 1);
        }
    }

    #[test]
    fn test_zero_probability_only_wins_on_zero_draw() {
        let set = vec![available(1, 0.0, 5, 0)];
        assert_eq!(select_prize(&set, 0.0).unwrap().prize.id, 1);
        assert!(select_prize(&set, 0.000_001).is_none());
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // lunch + dinner cover the full day, so a window is always open
    fn all_day_restaurant() -> restaurants::Model {
        restaurants::Model {
            id: 1,
            name: "Chez Test".into(),
            latitude: 48.8566,
            longitude: 2.3522,
            geofence_radius_m: 100.0,
            utc_offset_minutes: 0,
            lunch_start: t(0, 0),
            lunch_end: t(12, 0),
            dinner_start: t(12, 0),
            dinner_end: t(0, 0),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn draw_service(db: DatabaseConnection) -> DrawService {
        let reward = RewardConfig::default();
        DrawService::new(
            IdentityService::new(db.clone(), reward.clone()),
            PoolService::new(db.clone(), reward.clone()),
            ClaimService::new(db, reward.clone()),
            reward,
        )
    }

    #[tokio::test]
    async fn test_spin_redraws_on_conflict_and_surfaces_exhaustion() {
        // every issuance loses the pool race (the conditional increment
        // touches no row); the spin re-draws draw_max_attempts times, then
        // reports the conflict instead of hanging or erroring early
        let now = Utc::now();
        let restaurant = all_day_restaurant();
        let today = restaurant.local_now(now).date();
        let window = restaurant.window_at(now).unwrap();

        let fingerprint = fingerprints::Model {
            id: 5,
            hash: "f".repeat(32),
            restaurant_id: 1,
            created_at: None,
            expires_at: now + Duration::days(90),
            last_played_on: Some(today),
            last_played_window: Some(window),
            notify_email: None,
            notify_phone: None,
        };
        let prize = prizes::Model {
            id: 2,
            restaurant_id: 1,
            name: "Dessert".into(),
            description: None,
            probability: 1.0,
            max_per_day: Some(5),
            max_per_week: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        };
        let pool = pools::Model {
            id: 10,
            prize_id: 2,
            restaurant_id: 1,
            pool_date: today,
            allocated: 5,
            claimed: 4,
            created_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[restaurant]])
            .append_query_results([[fingerprint]])
            .append_query_results([[prize.clone()]])
            // today's pool row already exists, the provisioning insert is a no-op
            .append_query_results([Vec::<pools::Model>::new()])
            .append_query_results([
                vec![(pool.clone(), prize.clone())],
                vec![(pool.clone(), prize.clone())],
                vec![(pool, prize)],
            ])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let result = draw_service(db).spin(5, 1).await;
        assert!(matches!(result, Err(AppError::AllocationConflict)));
    }
}
