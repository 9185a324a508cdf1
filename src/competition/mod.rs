//! Competition aggregate, entries and their supporting types
//!
//! `Competition` is the single owner of everything that happens inside one contest. The
//! service wraps each competition in its own lock; the aggregate itself is plain data with
//! methods that validate before they mutate.

mod aggregate;
mod clock;
mod entry;
mod ids;
mod metadata;

pub use aggregate::*;
pub use clock::*;
pub use entry::*;
pub use ids::*;
pub use metadata::*;
