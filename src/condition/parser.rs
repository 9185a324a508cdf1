//! Condition string parser
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term ('|' term)*
//! term    := factor ('&' factor)*
//! factor  := '(' expr ')' | compare
//! compare := METRIC OP VALUE
//! ```

use crate::condition::ast::{AstNode, ConditionValue, Operator, SingleCondition};
use crate::error::{CompetitionError, Result};
use crate::submission::METRIC_CODES;

/// Parse a condition string into an AST
pub fn parse(condition: &str) -> Result<AstNode> {
    let condition = condition.trim();
    if condition.is_empty() {
        return Err(invalid("empty condition"));
    }

    let tokens = tokenize(condition)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let ast = parser.expr()?;
    match parser.peek() {
        None => Ok(ast),
        Some(token) => Err(invalid(&format!("unexpected {:?} in '{}'", token, condition))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Compare(String),
    And,
    Or,
    Open,
    Close,
}

fn tokenize(condition: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut depth: i32 = 0;

    for c in condition.chars() {
        let token = match c {
            '&' => Token::And,
            '|' => Token::Or,
            '(' => {
                depth += 1;
                Token::Open
            }
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(invalid("unbalanced parentheses"));
                }
                Token::Close
            }
            c if c.is_whitespace() => continue,
            c => {
                word.push(c);
                continue;
            }
        };
        flush(&mut word, &mut tokens);
        tokens.push(token);
    }
    flush(&mut word, &mut tokens);

    if depth != 0 {
        return Err(invalid("unbalanced parentheses"));
    }

    Ok(tokens)
}

fn flush(word: &mut String, tokens: &mut Vec<Token>) {
    if !word.is_empty() {
        tokens.push(Token::Compare(std::mem::take(word)));
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<AstNode> {
        let mut node = self.term()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.term()?;
            node = AstNode::Or(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<AstNode> {
        let mut node = self.factor()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.factor()?;
            node = AstNode::And(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn factor(&mut self) -> Result<AstNode> {
        match self.next() {
            Some(Token::Open) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(invalid("expected ')'")),
                }
            }
            Some(Token::Compare(text)) => parse_comparison(text),
            Some(other) => Err(invalid(&format!("unexpected {:?}", other))),
            None => Err(invalid("unexpected end of condition")),
        }
    }
}

fn parse_comparison(text: &str) -> Result<AstNode> {
    let (pos, symbol, operator) = Operator::SYMBOLS
        .iter()
        .filter_map(|(symbol, op)| text.find(symbol).map(|pos| (pos, *symbol, *op)))
        .min_by_key(|(pos, symbol, _)| (*pos, std::cmp::Reverse(symbol.len())))
        .ok_or_else(|| invalid(&format!("no operator found in '{}'", text)))?;

    let metric = &text[..pos];
    if !METRIC_CODES.contains(&metric) {
        return Err(invalid(&format!("unknown metric '{}' in '{}'", metric, text)));
    }

    let value = parse_value(&text[pos + symbol.len()..])?;
    if matches!(operator, Operator::IncludesAny | Operator::ExcludesAll)
        && !matches!(value, ConditionValue::Array(_))
    {
        return Err(invalid(&format!("'{}' expects an array in '{}'", symbol, text)));
    }

    Ok(AstNode::Single(SingleCondition {
        metric: metric.to_string(),
        operator,
        value,
    }))
}

fn parse_value(text: &str) -> Result<ConditionValue> {
    if text.is_empty() {
        return Err(invalid("missing value"));
    }

    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return inner
            .split(',')
            .map(|s| s.trim().parse::<i32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(ConditionValue::Array)
            .map_err(|_| invalid(&format!("invalid array '{}'", text)));
    }

    if let Ok(i) = text.parse::<i32>() {
        return Ok(ConditionValue::Integer(i));
    }
    match text.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(ConditionValue::Float(x)),
        _ => Err(invalid(&format!("invalid value '{}'", text))),
    }
}

fn invalid(message: &str) -> CompetitionError {
    CompetitionError::InvalidCondition(message.to_string())
}
