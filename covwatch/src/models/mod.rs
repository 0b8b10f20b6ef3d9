mod analysis;
mod context;
mod post;
mod search;

pub use analysis::*;
pub use context::*;
pub use post::*;
pub use search::*;
