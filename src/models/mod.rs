pub mod claim;
pub mod session;
pub mod spin;

pub use claim::*;
pub use session::*;
pub use spin::*;
