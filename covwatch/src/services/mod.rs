mod driver;
mod frontier;

pub use driver::{FrontierDriver, PassReport};
pub use frontier::AccountFrontier;
