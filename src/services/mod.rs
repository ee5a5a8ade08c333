pub mod claim_service;
pub mod draw_service;
pub mod identity_service;
pub mod pool_service;

pub use claim_service::{ClaimService, IssuedClaim};
pub use draw_service::{DrawService, select_prize};
pub use identity_service::IdentityService;
pub use pool_service::{AvailablePool, PoolService};
