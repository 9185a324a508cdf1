//! Process-wide condition parse cache

use crate::condition::ast::AstNode;
use crate::condition::{evaluator, parser};
use crate::error::Result;
use crate::submission::PlantSubmission;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

static CONDITION_CACHE: Lazy<RwLock<AHashMap<String, AstNode>>> =
    Lazy::new(|| RwLock::new(AHashMap::with_capacity(256)));

/// Get or parse a condition string, using cache for repeated conditions
#[inline]
pub fn get_or_parse(condition: &str) -> Result<AstNode> {
    {
        let cache = CONDITION_CACHE.read();
        if let Some(ast) = cache.get(condition) {
            return Ok(ast.clone());
        }
    }

    let ast = parser::parse(condition)?;
    CONDITION_CACHE
        .write()
        .insert(condition.to_string(), ast.clone());

    Ok(ast)
}

/// Check a condition against a submission; an empty condition never matches
#[inline]
pub fn check_condition(condition: &str, submission: &PlantSubmission) -> Result<bool> {
    if condition.trim().is_empty() {
        return Ok(false);
    }

    let ast = get_or_parse(condition)?;
    Ok(evaluator::check(&ast, submission))
}

/// Clear the condition cache
pub fn clear_cache() {
    CONDITION_CACHE.write().clear();
}

pub fn cache_size() -> usize {
    CONDITION_CACHE.read().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::test_support::sample_submission;

    #[test]
    fn test_cache_hit() {
        let s = sample_submission();
        let condition = "THC>21 & AGE?[75]";

        clear_cache();
        assert!(check_condition(condition, &s).unwrap());
        // Only this test clears, so the entry just inserted is still there
        assert!(cache_size() >= 1);

        assert!(check_condition(condition, &s).unwrap());
        assert_eq!(get_or_parse(condition).unwrap(), parser::parse(condition).unwrap());
    }

    #[test]
    fn test_empty_condition_never_matches() {
        let s = sample_submission();
        assert!(!check_condition("", &s).unwrap());
        assert!(!check_condition("   ", &s).unwrap());
    }

    #[test]
    fn test_invalid_condition_not_cached() {
        let s = sample_submission();
        assert!(check_condition("NOPE>1", &s).is_err());
        assert!(get_or_parse("NOPE>1").is_err());
    }
}
