pub mod claim;
pub mod play;

pub use claim::claim_config;
pub use play::play_config;
