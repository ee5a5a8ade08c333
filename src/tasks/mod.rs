//! Background scheduled tasks for the application.
//!
//! The only recurring job is the advisory cleanup: purging fingerprints past
//! their privacy retention deadline and expiring long-overdue PENDING claims.
//! Both are restartable, share no mutable state with the request path, and
//! use the same conditional writes as the request path, so their absence or
//! failure cannot break the allocation invariants.

use crate::config::CleanupConfig;
use crate::services::{ClaimService, IdentityService};
use chrono::Utc;

/// Spawn all background tasks. Detaches via `tokio::spawn`; does not block.
pub fn spawn_all(
    identity_service: IdentityService,
    claim_service: ClaimService,
    cleanup: CleanupConfig,
) {
    let interval = std::time::Duration::from_secs(cleanup.interval_secs);

    tokio::spawn(async move {
        loop {
            let now = Utc::now();

            match identity_service.purge_expired(now).await {
                Ok(n) if n > 0 => log::info!("Purged expired fingerprints: {n}"),
                Ok(_) => {}
                Err(e) => log::error!("Failed to purge expired fingerprints: {e:?}"),
            }

            match claim_service.expire_overdue(now).await {
                Ok(n) if n > 0 => log::info!("Expired overdue claims: {n}"),
                Ok(_) => {}
                Err(e) => log::error!("Failed to expire overdue claims: {e:?}"),
            }

            tokio::time::sleep(interval).await;
        }
    });
}
