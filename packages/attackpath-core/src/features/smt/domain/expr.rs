//! Symbolic constraint language
//!
//! The fragment the policy compiler emits: string equality and prefix,
//! integer comparison against constants, boolean equality, and the usual
//! connectives. Variables are identified by name *and* sort, so a string
//! `port` and an integer `port` are distinct.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Variable sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Str,
    Int,
    Bool,
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => write!(f, "String"),
            Self::Int => write!(f, "Int"),
            Self::Bool => write!(f, "Bool"),
        }
    }
}

/// Sorted symbolic variable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymVar {
    pub name: String,
    pub sort: Sort,
}

impl SymVar {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort: Sort::Str,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort: Sort::Int,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort: Sort::Bool,
        }
    }
}

/// Integer comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl ComparisonOp {
    /// Operator with the complementary truth table
    pub fn negate(self) -> Self {
        match self {
            Self::Eq => Self::Neq,
            Self::Neq => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Ge => Self::Lt,
            Self::Gt => Self::Le,
            Self::Le => Self::Gt,
        }
    }

    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Neq => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Gt => lhs > rhs,
            Self::Le => lhs <= rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "=="),
            Self::Neq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Gt => write!(f, ">"),
            Self::Le => write!(f, "<="),
            Self::Ge => write!(f, ">="),
        }
    }
}

/// Boolean constraint expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymExpr {
    Const(bool),
    /// `var == literal` over strings
    StrEq { var: String, value: String },
    /// `literal` is a prefix of `var`
    StrPrefix { var: String, prefix: String },
    /// `var <op> constant` over integers
    IntCmp {
        var: String,
        op: ComparisonOp,
        value: i64,
    },
    /// `var == literal` over booleans
    BoolEq { var: String, value: bool },
    And(Vec<SymExpr>),
    Or(Vec<SymExpr>),
    Not(Box<SymExpr>),
}

impl SymExpr {
    pub fn str_eq(var: impl Into<String>, value: impl Into<String>) -> Self {
        SymExpr::StrEq {
            var: var.into(),
            value: value.into(),
        }
    }

    pub fn str_prefix(var: impl Into<String>, prefix: impl Into<String>) -> Self {
        SymExpr::StrPrefix {
            var: var.into(),
            prefix: prefix.into(),
        }
    }

    pub fn int_cmp(var: impl Into<String>, op: ComparisonOp, value: i64) -> Self {
        SymExpr::IntCmp {
            var: var.into(),
            op,
            value,
        }
    }

    pub fn bool_eq(var: impl Into<String>, value: bool) -> Self {
        SymExpr::BoolEq {
            var: var.into(),
            value,
        }
    }

    /// Conjunction; empty is `true`, a single operand is returned as-is
    pub fn and(mut operands: Vec<SymExpr>) -> Self {
        match operands.len() {
            0 => SymExpr::Const(true),
            1 => operands.remove(0),
            _ => SymExpr::And(operands),
        }
    }

    /// Disjunction; empty is `false`, a single operand is returned as-is
    pub fn or(mut operands: Vec<SymExpr>) -> Self {
        match operands.len() {
            0 => SymExpr::Const(false),
            1 => operands.remove(0),
            _ => SymExpr::Or(operands),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: SymExpr) -> Self {
        match expr {
            SymExpr::Const(b) => SymExpr::Const(!b),
            SymExpr::Not(inner) => *inner,
            other => SymExpr::Not(Box::new(other)),
        }
    }

    /// Every variable mentioned, deduplicated, in first-seen order
    pub fn variables(&self) -> Vec<SymVar> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<SymVar>) {
        let var = match self {
            SymExpr::Const(_) => None,
            SymExpr::StrEq { var, .. } | SymExpr::StrPrefix { var, .. } => {
                Some(SymVar::string(var.as_str()))
            }
            SymExpr::IntCmp { var, .. } => Some(SymVar::int(var.as_str())),
            SymExpr::BoolEq { var, .. } => Some(SymVar::boolean(var.as_str())),
            SymExpr::And(items) | SymExpr::Or(items) => {
                for item in items {
                    item.collect_vars(out);
                }
                None
            }
            SymExpr::Not(inner) => {
                inner.collect_vars(out);
                None
            }
        };
        if let Some(var) = var {
            if !out.contains(&var) {
                out.push(var);
            }
        }
    }
}

/// SMT-LIB-flavoured rendering, for logs and explanations
impl fmt::Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymExpr::Const(b) => write!(f, "{}", b),
            SymExpr::StrEq { var, value } => write!(f, "(= {} {:?})", var, value),
            SymExpr::StrPrefix { var, prefix } => write!(f, "(prefixof {:?} {})", prefix, var),
            SymExpr::IntCmp { var, op, value } => write!(f, "({} {} {})", op, var, value),
            SymExpr::BoolEq { var, value } => write!(f, "(= {} {})", var, value),
            SymExpr::And(items) | SymExpr::Or(items) => {
                let head = if matches!(self, SymExpr::And(_)) { "and" } else { "or" };
                write!(f, "({}", head)?;
                for item in items {
                    write!(f, " {}", item)?;
                }
                write!(f, ")")
            }
            SymExpr::Not(inner) => write!(f, "(not {})", inner),
        }
    }
}
