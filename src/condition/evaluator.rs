//! Condition evaluator

use crate::condition::ast::{AstNode, ConditionValue, Operator, SingleCondition};
use crate::submission::{PlantSubmission, PropertyValue};

/// Evaluate an AST against a plant submission
pub fn check(ast: &AstNode, submission: &PlantSubmission) -> bool {
    match ast {
        AstNode::Single(cond) => check_single(cond, submission),
        AstNode::And(left, right) => check(left, submission) && check(right, submission),
        AstNode::Or(left, right) => check(left, submission) || check(right, submission),
    }
}

fn check_single(cond: &SingleCondition, submission: &PlantSubmission) -> bool {
    match (submission.metric(&cond.metric), &cond.value) {
        (PropertyValue::Number(pv), ConditionValue::Integer(cv)) => {
            compare(pv, *cv as f64, cond.operator)
        }
        (PropertyValue::Number(pv), ConditionValue::Float(cv)) => compare(pv, *cv, cond.operator),
        (PropertyValue::Number(pv), ConditionValue::Array(arr)) => {
            let found = whole(pv).is_some_and(|v| arr.contains(&v));
            match cond.operator {
                Operator::IncludesAny => found,
                Operator::ExcludesAll => !found,
                _ => false,
            }
        }

        // `=` / `!=` on a list mean "contains" / "does not contain"
        (PropertyValue::List(list), ConditionValue::Integer(cv)) => match cond.operator {
            Operator::Equal => list.contains(cv),
            Operator::NotEqual => !list.contains(cv),
            _ => false,
        },
        (PropertyValue::List(list), ConditionValue::Array(arr)) => match cond.operator {
            Operator::IncludesAny => list.iter().any(|v| arr.contains(v)),
            Operator::ExcludesAll => list.iter().all(|v| !arr.contains(v)),
            _ => false,
        },

        _ => false,
    }
}

fn compare(pv: f64, cv: f64, operator: Operator) -> bool {
    match operator {
        Operator::Greater => pv > cv,
        Operator::Less => pv < cv,
        Operator::GreaterEqual => pv >= cv,
        Operator::LessEqual => pv <= cv,
        Operator::Equal => pv == cv,
        Operator::NotEqual => pv != cv,
        Operator::IncludesAny | Operator::ExcludesAll => false,
    }
}

/// Integral metric value usable for array membership
fn whole(value: f64) -> Option<i32> {
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}
