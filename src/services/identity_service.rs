use crate::config::RewardConfig;
use crate::entities::{
    ServiceWindow, fingerprint_entity as fingerprints, restaurant_entity as restaurants,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    EligibilityResponse, GateDenyReason, SessionResponse, SubmitReviewResponse,
};
use crate::utils::haversine_distance_m;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

/// Minimum accepted length of the client-derived device hash.
const MIN_HASH_LEN: usize = 32;

/// Identity Gate: resolves anonymous visitors to restaurant-scoped
/// fingerprints and decides whether they may participate right now.
#[derive(Clone)]
pub struct IdentityService {
    pool: DatabaseConnection,
    reward: RewardConfig,
}

impl IdentityService {
    pub fn new(pool: DatabaseConnection, reward: RewardConfig) -> Self {
        Self { pool, reward }
    }

    /// Resolve the fingerprint for (device hash, restaurant), creating it on
    /// first contact, and report current play eligibility.
    pub async fn resolve_or_create(
        &self,
        device_hash: &str,
        restaurant_id: i64,
    ) -> AppResult<SessionResponse> {
        if device_hash.len() < MIN_HASH_LEN {
            return Err(AppError::ValidationError(format!(
                "Device hash must be at least {MIN_HASH_LEN} characters"
            )));
        }

        let restaurant = self.load_restaurant(restaurant_id).await?;
        let now = Utc::now();
        let fingerprint = self
            .ensure_fingerprint(device_hash, restaurant_id, now)
            .await?;

        let window = restaurant.window_at(now);
        let (can_play, reason) = match window {
            None => (false, Some(GateDenyReason::ServiceClosed)),
            Some(w) => {
                let today = restaurant.local_now(now).date();
                if fingerprint.has_played(today, w) {
                    (false, Some(GateDenyReason::AlreadyPlayed))
                } else {
                    (true, None)
                }
            }
        };

        Ok(SessionResponse {
            fingerprint_id: fingerprint.id,
            can_play,
            reason,
            window,
        })
    }

    /// Geofence + service-window probe. Rejections are ordinary outcomes in
    /// the response body, not errors.
    pub async fn check_eligibility(
        &self,
        restaurant_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<EligibilityResponse> {
        let restaurant = self.load_restaurant(restaurant_id).await?;
        let now = Utc::now();

        let distance_m =
            haversine_distance_m(latitude, longitude, restaurant.latitude, restaurant.longitude);
        let window = restaurant.window_at(now);

        let reason = if distance_m > restaurant.geofence_radius_m {
            Some(GateDenyReason::DistanceExceeded)
        } else if window.is_none() {
            Some(GateDenyReason::ServiceClosed)
        } else {
            None
        };

        Ok(EligibilityResponse {
            allowed: reason.is_none(),
            reason,
            window,
            distance_m,
            max_distance_m: restaurant.geofence_radius_m,
        })
    }

    /// Record the played-mark when a review is accepted. The eligibility
    /// check and the write are one conditional update, so of two concurrent
    /// submissions from the same device exactly one wins and the other gets
    /// `AlreadyPlayed`.
    pub async fn mark_played(
        &self,
        fingerprint_id: i64,
        restaurant_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<SubmitReviewResponse> {
        let restaurant = self.load_restaurant(restaurant_id).await?;
        let fingerprint = self.load_fingerprint(fingerprint_id, restaurant_id).await?;
        let now = Utc::now();

        let distance_m =
            haversine_distance_m(latitude, longitude, restaurant.latitude, restaurant.longitude);
        if distance_m > restaurant.geofence_radius_m {
            return Err(AppError::GeofenceViolation {
                distance_m,
                max_distance_m: restaurant.geofence_radius_m,
            });
        }

        let window = restaurant.window_at(now).ok_or(AppError::ServiceClosed)?;
        let today = restaurant.local_now(now).date();

        let result = fingerprints::Entity::update_many()
            .set(fingerprints::ActiveModel {
                last_played_on: Set(Some(today)),
                last_played_window: Set(Some(window)),
                ..Default::default()
            })
            .filter(fingerprints::Column::Id.eq(fingerprint.id))
            .filter(not_yet_played(today, window))
            .exec(&self.pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::AlreadyPlayed);
        }

        log::info!(
            "Fingerprint {} played restaurant {} ({} window, {})",
            fingerprint.id,
            restaurant_id,
            window,
            today
        );

        Ok(SubmitReviewResponse {
            window,
            played_on: today,
        })
    }

    /// Load a fingerprint and verify it belongs to the restaurant.
    pub async fn load_fingerprint(
        &self,
        fingerprint_id: i64,
        restaurant_id: i64,
    ) -> AppResult<fingerprints::Model> {
        let fingerprint = fingerprints::Entity::find_by_id(fingerprint_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InvalidSession("Unknown fingerprint".to_string()))?;

        if fingerprint.restaurant_id != restaurant_id {
            return Err(AppError::InvalidSession(
                "Fingerprint does not belong to this restaurant".to_string(),
            ));
        }
        Ok(fingerprint)
    }

    pub async fn load_restaurant(&self, restaurant_id: i64) -> AppResult<restaurants::Model> {
        restaurants::Entity::find_by_id(restaurant_id)
            .one(&self.pool)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Restaurant {restaurant_id} not found")))
    }

    /// Delete fingerprints past their retention deadline. Advisory; called
    /// from the cleanup task only.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = fingerprints::Entity::delete_many()
            .filter(fingerprints::Column::ExpiresAt.lt(now))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }

    async fn ensure_fingerprint(
        &self,
        device_hash: &str,
        restaurant_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<fingerprints::Model> {
        if let Some(existing) = self.find_fingerprint(device_hash, restaurant_id).await? {
            return Ok(existing);
        }

        // First contact. Two concurrent first contacts race on the unique
        // (hash, restaurant_id) index; the loser reads the winner's row.
        let insert = fingerprints::Entity::insert(fingerprints::ActiveModel {
            hash: Set(device_hash.to_string()),
            restaurant_id: Set(restaurant_id),
            expires_at: Set(now + Duration::days(self.reward.fingerprint_retention_days)),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                fingerprints::Column::Hash,
                fingerprints::Column::RestaurantId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(&self.pool)
        .await;

        match insert {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        self.find_fingerprint(device_hash, restaurant_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalError("Fingerprint disappeared after insert".to_string())
            })
    }

    async fn find_fingerprint(
        &self,
        device_hash: &str,
        restaurant_id: i64,
    ) -> AppResult<Option<fingerprints::Model>> {
        Ok(fingerprints::Entity::find()
            .filter(fingerprints::Column::Hash.eq(device_hash))
            .filter(fingerprints::Column::RestaurantId.eq(restaurant_id))
            .one(&self.pool)
            .await?)
    }
}

/// Matches fingerprints that have NOT yet played (today, window). The played
/// columns are NULL until the first accepted review, and in SQL a negated
/// equality over NULL is NULL, not true; the IS NULL branches keep fresh
/// fingerprints inside the update.
fn not_yet_played(today: NaiveDate, window: ServiceWindow) -> Condition {
    Condition::any()
        .add(fingerprints::Column::LastPlayedOn.is_null())
        .add(fingerprints::Column::LastPlayedOn.ne(today))
        .add(fingerprints::Column::LastPlayedWindow.is_null())
        .add(fingerprints::Column::LastPlayedWindow.ne(window))
}
