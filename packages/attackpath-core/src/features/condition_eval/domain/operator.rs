//! Condition operators and key parsing
//!
//! A condition key is `Operator:field` or a bare `field` (equality). The
//! operator set is closed; anything else resolves to an error that callers
//! treat as a failing key.

use super::error::ConditionError;
use serde::{Deserialize, Serialize};

/// Supported comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    StringEquals,
    StringNotEquals,
    StringEqualsIgnoreCase,
    StringLike,
    StringNotLike,
    IpAddress,
    NotIpAddress,
    NumericEquals,
    NumericNotEquals,
    NumericGreaterThan,
    NumericGreaterThanEquals,
    NumericLessThan,
    NumericLessThanEquals,
    NumericDateGreaterThan,
    NumericDateLessThan,
    ArnLike,
    ArnNotLike,
    Bool,
}

/// Operator family, decides how both sides are cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    String,
    Ip,
    Numeric,
    Date,
    Arn,
    Bool,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 18] = [
        Self::StringEquals,
        Self::StringNotEquals,
        Self::StringEqualsIgnoreCase,
        Self::StringLike,
        Self::StringNotLike,
        Self::IpAddress,
        Self::NotIpAddress,
        Self::NumericEquals,
        Self::NumericNotEquals,
        Self::NumericGreaterThan,
        Self::NumericGreaterThanEquals,
        Self::NumericLessThan,
        Self::NumericLessThanEquals,
        Self::NumericDateGreaterThan,
        Self::NumericDateLessThan,
        Self::ArnLike,
        Self::ArnNotLike,
        Self::Bool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StringEquals => "StringEquals",
            Self::StringNotEquals => "StringNotEquals",
            Self::StringEqualsIgnoreCase => "StringEqualsIgnoreCase",
            Self::StringLike => "StringLike",
            Self::StringNotLike => "StringNotLike",
            Self::IpAddress => "IpAddress",
            Self::NotIpAddress => "NotIpAddress",
            Self::NumericEquals => "NumericEquals",
            Self::NumericNotEquals => "NumericNotEquals",
            Self::NumericGreaterThan => "NumericGreaterThan",
            Self::NumericGreaterThanEquals => "NumericGreaterThanEquals",
            Self::NumericLessThan => "NumericLessThan",
            Self::NumericLessThanEquals => "NumericLessThanEquals",
            Self::NumericDateGreaterThan => "NumericDateGreaterThan",
            Self::NumericDateLessThan => "NumericDateLessThan",
            Self::ArnLike => "ArnLike",
            Self::ArnNotLike => "ArnNotLike",
            Self::Bool => "Bool",
        }
    }

    /// Resolve an IAM operator name exactly as spelled (`StringEquals`, not `stringequals`)
    pub fn from_iam_name(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|op| op.as_str() == name).copied()
    }

    /// Resolve an operator name leniently (case-insensitive), for policy compilation
    ///
    /// Accepts the short `NumericGreater` / `NumericLess` spellings and the
    /// IAM `DateGreaterThan` / `DateLessThan` names as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(op) = Self::ALL
            .iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
        {
            return Some(*op);
        }

        match name.to_ascii_lowercase().as_str() {
            "numericgreater" => Some(Self::NumericGreaterThan),
            "numericless" => Some(Self::NumericLessThan),
            "dategreaterthan" => Some(Self::NumericDateGreaterThan),
            "datelessthan" => Some(Self::NumericDateLessThan),
            _ => None,
        }
    }

    pub fn family(&self) -> OperatorFamily {
        match self {
            Self::StringEquals
            | Self::StringNotEquals
            | Self::StringEqualsIgnoreCase
            | Self::StringLike
            | Self::StringNotLike => OperatorFamily::String,
            Self::IpAddress | Self::NotIpAddress => OperatorFamily::Ip,
            Self::NumericEquals
            | Self::NumericNotEquals
            | Self::NumericGreaterThan
            | Self::NumericGreaterThanEquals
            | Self::NumericLessThan
            | Self::NumericLessThanEquals => OperatorFamily::Numeric,
            Self::NumericDateGreaterThan | Self::NumericDateLessThan => OperatorFamily::Date,
            Self::ArnLike | Self::ArnNotLike => OperatorFamily::Arn,
            Self::Bool => OperatorFamily::Bool,
        }
    }

    /// Negated operators report the complement of their positive form
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Self::StringNotEquals
                | Self::StringNotLike
                | Self::NotIpAddress
                | Self::NumericNotEquals
                | Self::ArnNotLike
        )
    }
}

impl std::fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed condition key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionKey {
    pub operator: ConditionOperator,
    pub field: String,
}

impl ConditionKey {
    /// Parse `Operator:field` or bare `field`
    ///
    /// More than one colon is ambiguous and rejected.
    pub fn parse(key: &str) -> Result<Self, ConditionError> {
        let mut parts = key.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(field), None, None) => Ok(Self {
                operator: ConditionOperator::StringEquals,
                field: field.to_string(),
            }),
            (Some(op_name), Some(field), None) => {
                let operator = ConditionOperator::from_iam_name(op_name)
                    .ok_or_else(|| ConditionError::UnsupportedOperator(op_name.to_string()))?;
                Ok(Self {
                    operator,
                    field: field.to_string(),
                })
            }
            _ => Err(ConditionError::InvalidCondition(format!(
                "ambiguous condition key '{}'",
                key
            ))),
        }
    }
}
