//! Condition evaluation and numeric parameter parsing.
//!
//! A condition is exactly one comparison, `<flag> <op> <value>`, with the
//! three parts separated by whitespace:
//!
//! | op   | holds when          |
//! |------|---------------------|
//! | `==` | flag equals value   |
//! | `<`  | flag is below value |
//!
//! There is no boolean composition and no precedence.

use super::error::{Result, ScriptError};
use super::flags::FlagStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
}

impl CompareOp {
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "==" => Ok(CompareOp::Eq),
            "<" => Ok(CompareOp::Lt),
            other => Err(ScriptError::UnsupportedOperator(other.to_owned())),
        }
    }

    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Lt => lhs < rhs,
        }
    }
}

/// Evaluate `expr` against `flags`.
///
/// The flag name is checked first, then the operator, then the literal.
pub fn evaluate(flags: &FlagStore, expr: &str) -> Result<bool> {
    let tokens: Vec<&str> = expr.split_whitespace().collect();
    let &[name, op, literal] = tokens.as_slice() else {
        return Err(ScriptError::MalformedCondition(expr.to_owned()));
    };
    let lhs = flags.get(name)?;
    let op = CompareOp::parse(op)?;
    let rhs = parse_int(literal)?;
    Ok(op.holds(lhs, rhs))
}

/// Parse a base-10 signed integer parameter (surrounding whitespace allowed).
pub fn parse_int(s: &str) -> Result<i64> {
    s.trim()
        .parse()
        .map_err(|_| ScriptError::MalformedNumber(s.to_owned()))
}

/// Parse a finite decimal parameter (surrounding whitespace allowed).
pub fn parse_float(s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ScriptError::MalformedNumber(s.to_owned())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
