use crate::config::RewardConfig;
use crate::entities::{
    ClaimStatus, daily_prize_pool_entity as pools, prize_claim_entity as claims,
    prize_entity as prizes,
};
use crate::error::{AppError, AppResult};
use crate::models::RedeemClaimResponse;
use crate::utils::{generate_claim_code, normalize_claim_code};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr, TransactionTrait,
};

/// Issuance attempts abandoned after this many unique-code collisions.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// A freshly issued, not yet redeemed claim.
#[derive(Debug, Clone)]
pub struct IssuedClaim {
    pub claim_id: i64,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of one issuance transaction. Code collisions are expected and
/// recoverable, so they are data, not errors.
enum IssueAttempt {
    Issued(claims::Model),
    /// the generated code is already held; transaction rolled back
    CodeCollision,
    /// the pool filled up between selection and commit
    PoolFull,
}

/// Claim Ledger: makes winning atomic (claim row + pool increment in one
/// transaction) and redemption exactly-once.
#[derive(Clone)]
pub struct ClaimService {
    pool: DatabaseConnection,
    reward: RewardConfig,
}

impl ClaimService {
    pub fn new(pool: DatabaseConnection, reward: RewardConfig) -> Self {
        Self { pool, reward }
    }

    /// Issue a claim against a pool, as one atomic unit:
    /// 1. conditionally increment the pool's `claimed` (guarded by
    ///    `claimed < allocated` at commit time),
    /// 2. generate a globally unique redemption code,
    /// 3. insert the PENDING claim row.
    ///
    /// A failed conditional increment means the pool filled up between
    /// selection and commit; the whole issuance rolls back and the caller
    /// re-runs the draw against refreshed pool state.
    pub async fn issue_claim(
        &self,
        restaurant_id: i64,
        prize_id: i64,
        pool_id: i64,
        fingerprint_id: i64,
    ) -> AppResult<IssuedClaim> {
        let now = Utc::now();
        let expires_at = now + Duration::days(self.reward.claim_expiry_days);

        for _ in 0..MAX_CODE_ATTEMPTS {
            let attempt = self
                .try_issue(restaurant_id, prize_id, pool_id, fingerprint_id, now, expires_at)
                .await?;
            match attempt {
                IssueAttempt::Issued(claim) => {
                    log::info!(
                        "Issued claim {} (prize {prize_id}, pool {pool_id}) to fingerprint {fingerprint_id}",
                        claim.id
                    );
                    return Ok(IssuedClaim {
                        claim_id: claim.id,
                        code: claim.code,
                        expires_at,
                    });
                }
                IssueAttempt::CodeCollision => continue,
                IssueAttempt::PoolFull => return Err(AppError::AllocationConflict),
            }
        }

        Err(AppError::InternalError(
            "Could not generate a unique redemption code".to_string(),
        ))
    }

    /// One issuance transaction: conditional pool increment, code
    /// uniqueness pre-check, claim insert. A collision at either point
    /// rolls the whole transaction back (a unique violation poisons it on
    /// Postgres), so the retry in `issue_claim` re-runs the increment too.
    async fn try_issue(
        &self,
        restaurant_id: i64,
        prize_id: i64,
        pool_id: i64,
        fingerprint_id: i64,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<IssueAttempt> {
        let txn = self.pool.begin().await?;

        let increment = pools::Entity::update_many()
            .col_expr(
                pools::Column::Claimed,
                Expr::col(pools::Column::Claimed).add(1),
            )
            .filter(pools::Column::Id.eq(pool_id))
            .filter(Expr::col(pools::Column::Claimed).lt(Expr::col(pools::Column::Allocated)))
            .exec(&txn)
            .await?;

        if increment.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(IssueAttempt::PoolFull);
        }

        let code = generate_claim_code();
        let taken = claims::Entity::find()
            .filter(claims::Column::Code.eq(code.clone()))
            .count(&txn)
            .await?;
        if taken > 0 {
            txn.rollback().await?;
            return Ok(IssueAttempt::CodeCollision);
        }

        let inserted = claims::ActiveModel {
            code: Set(code),
            prize_id: Set(prize_id),
            pool_id: Set(pool_id),
            fingerprint_id: Set(fingerprint_id),
            restaurant_id: Set(restaurant_id),
            status: Set(ClaimStatus::Pending),
            issued_at: Set(now),
            expires_at: Set(expires_at),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        match inserted {
            Ok(claim) => {
                txn.commit().await?;
                Ok(IssueAttempt::Issued(claim))
            }
            // a concurrent issuance committed the same code between the
            // pre-check and the insert; the unique index is the arbiter
            Err(err) if is_unique_violation(&err) => {
                txn.rollback().await?;
                Ok(IssueAttempt::CodeCollision)
            }
            Err(err) => {
                txn.rollback().await?;
                Err(err.into())
            }
        }
    }

    /// Redeem a code exactly once. Expiry is applied lazily at read time;
    /// both the expiry transition and the redemption itself are single
    /// conditional updates, so two simultaneous redemptions cannot both
    /// succeed.
    pub async fn redeem(&self, raw_code: &str) -> AppResult<RedeemClaimResponse> {
        let Some(code) = normalize_claim_code(raw_code) else {
            // malformed input cannot match any stored code
            return Err(AppError::ClaimNotFound);
        };
        let now = Utc::now();

        let found = claims::Entity::find()
            .filter(claims::Column::Code.eq(code))
            .find_also_related(prizes::Entity)
            .one(&self.pool)
            .await?;
        let Some((claim, prize)) = found else {
            return Err(AppError::ClaimNotFound);
        };

        match claim.status {
            ClaimStatus::Claimed => Err(AppError::ClaimAlreadyRedeemed),
            ClaimStatus::Expired => Err(AppError::ClaimExpired),
            ClaimStatus::Pending if claim.is_expired(now) => {
                claims::Entity::update_many()
                    .set(claims::ActiveModel {
                        status: Set(ClaimStatus::Expired),
                        ..Default::default()
                    })
                    .filter(claims::Column::Id.eq(claim.id))
                    .filter(claims::Column::Status.eq(ClaimStatus::Pending))
                    .exec(&self.pool)
                    .await?;
                Err(AppError::ClaimExpired)
            }
            ClaimStatus::Pending => {
                let result = claims::Entity::update_many()
                    .set(claims::ActiveModel {
                        status: Set(ClaimStatus::Claimed),
                        redeemed_at: Set(Some(now)),
                        ..Default::default()
                    })
                    .filter(claims::Column::Id.eq(claim.id))
                    .filter(claims::Column::Status.eq(ClaimStatus::Pending))
                    .exec(&self.pool)
                    .await?;

                if result.rows_affected == 0 {
                    // lost the race; report whatever terminal state won
                    let current = claims::Entity::find_by_id(claim.id).one(&self.pool).await?;
                    return match current.map(|c| c.status) {
                        Some(ClaimStatus::Claimed) => Err(AppError::ClaimAlreadyRedeemed),
                        Some(ClaimStatus::Expired) => Err(AppError::ClaimExpired),
                        _ => Err(AppError::InternalError(
                            "Claim vanished during redemption".to_string(),
                        )),
                    };
                }

                let prize = prize.ok_or_else(|| {
                    AppError::InternalError("Claim references a missing prize".to_string())
                })?;

                log::info!("Claim {} redeemed (prize {})", claim.id, prize.id);

                Ok(RedeemClaimResponse {
                    prize_name: prize.name,
                    prize_description: prize.description,
                    redeemed_at: now,
                })
            }
        }
    }

    /// Transition long-overdue PENDING claims to EXPIRED. Advisory; the
    /// redemption path already expires lazily, so this only tidies rows
    /// nobody ever tried to redeem.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = claims::Entity::update_many()
            .set(claims::ActiveModel {
                status: Set(ClaimStatus::Expired),
                ..Default::default()
            })
            .filter(claims::Column::Status.eq(ClaimStatus::Pending))
            .filter(claims::Column::ExpiresAt.lt(now))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }

}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::from(n))])
    }

    fn claim_row(id: i64, code: &str) -> claims::Model {
        claims::Model {
            id,
            code: code.to_string(),
            prize_id: 2,
            pool_id: 10,
            fingerprint_id: 5,
            restaurant_id: 1,
            status: ClaimStatus::Pending,
            issued_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(7),
            redeemed_at: None,
        }
    }

    #[tokio::test]
    async fn test_full_pool_rolls_back_and_reports_conflict() {
        // the conditional increment touches no row once claimed == allocated
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let service = ClaimService::new(db, RewardConfig::default());

        let result = service.issue_claim(1, 2, 10, 5).await;
        assert!(matches!(result, Err(AppError::AllocationConflict)));
    }

    #[tokio::test]
    async fn test_issue_claim_returns_committed_claim() {
        let row = claim_row(42, "ABCD-EFGH-JKLM");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 42,
                rows_affected: 1,
            }])
            .append_query_results([[count_row(0)]])
            .append_query_results([[row.clone()]])
            .into_connection();
        let service = ClaimService::new(db, RewardConfig::default());

        let issued = service.issue_claim(1, 2, 10, 5).await.unwrap();
        assert_eq!(issued.claim_id, 42);
        assert_eq!(issued.code, row.code);
    }

    #[tokio::test]
    async fn test_code_collision_retries_the_whole_transaction() {
        // first attempt finds the code taken and rolls back (increment
        // included); the second attempt succeeds end to end
        let row = claim_row(43, "WXYZ-2345-6789");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .append_query_results([[count_row(1)]])
            .append_query_results([[count_row(0)]])
            .append_query_results([[row.clone()]])
            .into_connection();
        let service = ClaimService::new(db, RewardConfig::default());

        let issued = service.issue_claim(1, 2, 10, 5).await.unwrap();
        assert_eq!(issued.claim_id, 43);
    }
}
