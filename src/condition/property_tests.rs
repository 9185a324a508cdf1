//! Property tests for condition parsing and evaluation

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use crate::competition::PlantId;
use crate::condition::ast::{AstNode, ConditionValue, Operator};
use crate::condition::cache::check_condition;
use crate::condition::evaluator::check;
use crate::condition::parser::parse;
use crate::submission::{
    AromaProfile, CannabinoidProfile, PlantSubmission, PropertyValue, TerpeneProfile,
    VisualProfile,
};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators
// ═══════════════════════════════════════════════════════════════════════════

fn numeric_metric_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("AGE"),
        Just("YLD"),
        Just("THC"),
        Just("CBD"),
        Just("CBG"),
        Just("CBN"),
        Just("TRP"),
        Just("TRC"),
        Just("CLR"),
        Just("STC"),
        Just("ARI"),
        Just("ARC"),
    ]
}

fn comparison_operator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(">"),
        Just("<"),
        Just(">="),
        Just("<="),
        Just("="),
        Just("!="),
    ]
}

fn simple_condition_strategy() -> impl Strategy<Value = String> {
    (
        numeric_metric_strategy(),
        comparison_operator_strategy(),
        -10..=120i32,
    )
        .prop_map(|(metric, op, val)| format!("{}{}{}", metric, op, val))
}

fn submission_strategy() -> impl Strategy<Value = PlantSubmission> {
    (
        0..=200u32,
        0..=500u32,
        (0..=40u32, 0..=20u32, 0..=5u32, 0..=5u32),
        (0..=100u32, 0..=100u32, 0..=100u32),
        (0..=100u32, 0..=100u32),
        prop::collection::vec(1..=20i32, 0..=4),
    )
        .prop_map(
            |(age, yld, (thc, cbd, cbg, cbn), (trc, clr, stc), (ari, arc), contaminants)| {
                PlantSubmission {
                    plant_id: PlantId::new("prop-plant"),
                    strain_name: "Prop Kush".into(),
                    plant_age_days: age,
                    yield_grams: yld as f64,
                    cannabinoids: CannabinoidProfile {
                        thc: thc as f64,
                        cbd: cbd as f64,
                        cbg: cbg as f64,
                        cbn: cbn as f64,
                    },
                    terpenes: TerpeneProfile {
                        dominant: vec![],
                        total_percent: 2.0,
                    },
                    visual: VisualProfile {
                        trichome_density: trc as f64,
                        color_score: clr as f64,
                        structure_score: stc as f64,
                    },
                    aroma: AromaProfile {
                        intensity: ari as f64,
                        complexity: arc as f64,
                        notes: vec![],
                    },
                    contaminants,
                    captured_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
                }
            },
        )
}

fn number(submission: &PlantSubmission, metric: &str) -> f64 {
    match submission.metric(metric) {
        PropertyValue::Number(v) => v,
        PropertyValue::List(_) => panic!("{} is a list metric", metric),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn prop_simple_condition_parses(cond in simple_condition_strategy()) {
        prop_assert!(parse(&cond).is_ok(), "Failed to parse: {}", cond);
    }

    #[test]
    fn prop_parsed_condition_structure(
        metric in numeric_metric_strategy(),
        val in -100..=100i32
    ) {
        match parse(&format!("{} >= {}", metric, val)).unwrap() {
            AstNode::Single(single) => {
                prop_assert_eq!(single.metric.as_str(), metric);
                prop_assert_eq!(single.operator, Operator::GreaterEqual);
                prop_assert_eq!(single.value, ConditionValue::Integer(val));
            }
            other => prop_assert!(false, "Expected single condition, got {:?}", other),
        }
    }

    /// Comparison operators agree with f64 comparison of the metric
    #[test]
    fn prop_comparison_operators(
        metric in numeric_metric_strategy(),
        threshold in -10..=120i32,
        submission in submission_strategy()
    ) {
        let v = number(&submission, metric);
        let t = threshold as f64;
        let cases = [
            (">", v > t),
            ("<", v < t),
            (">=", v >= t),
            ("<=", v <= t),
            ("=", v == t),
            ("!=", v != t),
        ];
        for (op, expected) in cases {
            let ast = parse(&format!("{}{}{}", metric, op, threshold)).unwrap();
            prop_assert_eq!(check(&ast, &submission), expected, "{}{}{} with {}", metric, op, threshold, v);
        }
    }

    #[test]
    fn prop_and_or_evaluation(
        thc_threshold in 0..=40i32,
        yield_threshold in 0..=500i32,
        submission in submission_strategy()
    ) {
        let thc = submission.cannabinoids.thc;
        let yld = submission.yield_grams;

        let and = parse(&format!("THC>={} & YLD<{}", thc_threshold, yield_threshold)).unwrap();
        prop_assert_eq!(
            check(&and, &submission),
            thc >= thc_threshold as f64 && yld < yield_threshold as f64
        );

        let or = parse(&format!("THC>={} | YLD<{}", thc_threshold, yield_threshold)).unwrap();
        prop_assert_eq!(
            check(&or, &submission),
            thc >= thc_threshold as f64 || yld < yield_threshold as f64
        );
    }

    #[test]
    fn prop_contaminant_operators(
        submission in submission_strategy(),
        codes in prop::collection::vec(1..=20i32, 1..=3)
    ) {
        let arr = codes.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");
        let any = submission.contaminants.iter().any(|c| codes.contains(c));

        let includes = parse(&format!("CTM?[{}]", arr)).unwrap();
        prop_assert_eq!(check(&includes, &submission), any);

        let excludes = parse(&format!("CTM![{}]", arr)).unwrap();
        prop_assert_eq!(check(&excludes, &submission), !any);
    }

    /// The rendered form of a parsed expression parses back to the same tree
    #[test]
    fn prop_display_reparses(
        a in simple_condition_strategy(),
        b in simple_condition_strategy(),
        c in simple_condition_strategy()
    ) {
        let ast = parse(&format!("{} | ({} & {})", a, b, c)).unwrap();
        prop_assert_eq!(parse(&ast.to_string()).unwrap(), ast);
    }

    #[test]
    fn prop_cache_consistency(
        cond in simple_condition_strategy(),
        submission in submission_strategy()
    ) {
        let direct = check(&parse(&cond).unwrap(), &submission);
        let first = check_condition(&cond, &submission).unwrap();
        let second = check_condition(&cond, &submission).unwrap();

        prop_assert_eq!(direct, first);
        prop_assert_eq!(first, second);
    }
}
