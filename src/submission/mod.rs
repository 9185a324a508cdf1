//! Plant submissions and their documentation

mod documentation;
mod metrics;
mod plant;

pub use documentation::*;
pub use metrics::*;
pub use plant::*;
