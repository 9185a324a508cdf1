//! Prize distribution, claims and the hall of fame

mod distributor;
mod legacy;

pub use distributor::*;
pub use legacy::*;
