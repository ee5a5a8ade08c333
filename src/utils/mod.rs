pub mod claim_code;
pub mod geo;

pub use claim_code::{generate_claim_code, normalize_claim_code};
pub use geo::haversine_distance_m;
