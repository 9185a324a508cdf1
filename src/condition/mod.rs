//! Condition parsing and evaluation module
//!
//! Disqualification criteria are written as short expressions over submission
//! metrics, like `"THC>35 | CTM?[3,4]"`, and evaluated against a `PlantSubmission`.

mod ast;
pub mod cache;
mod evaluator;
pub mod parser;

#[cfg(test)]
mod property_tests;

pub use ast::*;
pub use cache::*;
pub use evaluator::*;
pub use parser::*;
