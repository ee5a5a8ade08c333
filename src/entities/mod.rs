pub mod daily_prize_pools;
pub mod fingerprints;
pub mod prize_claims;
pub mod prizes;
pub mod restaurants;

pub use daily_prize_pools as daily_prize_pool_entity;
pub use fingerprints as fingerprint_entity;
pub use prize_claims as prize_claim_entity;
pub use prizes as prize_entity;
pub use restaurants as restaurant_entity;

pub use prize_claims::ClaimStatus;
pub use restaurants::ServiceWindow;
