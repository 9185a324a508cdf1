//! Abstract Syntax Tree for condition expressions

use std::fmt;

/// AST node for condition expressions
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Single comparison like "THC>30"
    Single(SingleCondition),
    And(Box<AstNode>, Box<AstNode>),
    Or(Box<AstNode>, Box<AstNode>),
}

impl AstNode {
    /// Metric codes referenced anywhere in the expression, in order of appearance
    pub fn metrics(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_metrics(&mut out);
        out
    }

    fn collect_metrics<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            AstNode::Single(cond) => out.push(cond.metric.as_str()),
            AstNode::And(left, right) | AstNode::Or(left, right) => {
                left.collect_metrics(out);
                right.collect_metrics(out);
            }
        }
    }
}

/// Single comparison between a submission metric and a literal
#[derive(Debug, Clone, PartialEq)]
pub struct SingleCondition {
    pub metric: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>=`
    GreaterEqual,
    /// `<=`
    LessEqual,
    /// `=`; on a list metric, "contains"
    Equal,
    /// `!=`; on a list metric, "does not contain"
    NotEqual,
    /// `?`, includes any of
    IncludesAny,
    /// `!`, excludes all of
    ExcludesAll,
}

impl Operator {
    /// Two-character symbols come first so `>=` is not read as `>`
    pub(crate) const SYMBOLS: [(&'static str, Operator); 8] = [
        (">=", Operator::GreaterEqual),
        ("<=", Operator::LessEqual),
        ("!=", Operator::NotEqual),
        (">", Operator::Greater),
        ("<", Operator::Less),
        ("=", Operator::Equal),
        ("?", Operator::IncludesAny),
        ("!", Operator::ExcludesAll),
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::IncludesAny => "?",
            Operator::ExcludesAll => "!",
        }
    }
}

/// Literal on the right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Integer(i32),
    Float(f64),
    Array(Vec<i32>),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Integer(i) => write!(f, "{}", i),
            ConditionValue::Float(x) => write!(f, "{}", x),
            ConditionValue::Array(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(","))
            }
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Single(cond) => {
                write!(f, "{}{}{}", cond.metric, cond.operator.symbol(), cond.value)
            }
            AstNode::And(left, right) => write!(f, "({} & {})", left, right),
            AstNode::Or(left, right) => write!(f, "({} | {})", left, right),
        }
    }
}
