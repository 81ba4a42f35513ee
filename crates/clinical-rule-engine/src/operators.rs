//! 操作符定义
//!
//! - `LogicalOperator`: 条件模板中的逻辑连接符（`&` / `|`），即运算符表
//! - `ComparisonOperator`: 测量规则使用的比较操作符

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 逻辑操作符
///
/// 优先级数值越小结合越紧（与常见约定相反），比较规则见
/// [`crate::expression::should_pop_before_push`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// 运算符表
    pub const ALL: [LogicalOperator; 2] = [LogicalOperator::And, LogicalOperator::Or];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Self::And => 11,
            Self::Or => 12,
        }
    }

    pub fn is_right_associative(self) -> bool {
        false
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// 字符是否属于运算符表
    pub fn is_operator_char(ch: char) -> bool {
        Self::ALL.iter().any(|op| op.symbol().starts_with(ch))
    }

    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            Self::And => lhs && rhs,
            Self::Or => lhs || rhs,
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ComparisonOperator {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
}

impl ComparisonOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Eq => "=",
        }
    }

    /// 是否为大小比较（文本目标值只支持相等比较）
    pub fn is_ordering(self) -> bool {
        !matches!(self, Self::Eq)
    }

    pub fn compare_f64(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Lte => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Gte => lhs >= rhs,
            // 相对误差，容忍 0.1 + 0.2 与 0.3 之类的舍入差异
            Self::Eq => (lhs - rhs).abs() <= f64::EPSILON * lhs.abs().max(rhs.abs()).max(1.0),
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim() {
            "<" | "LessThan" => Self::Lt,
            "<=" | "LessThanOrEqual" => Self::Lte,
            ">" | "GreaterThan" => Self::Gt,
            ">=" | "GreaterThanOrEqual" => Self::Gte,
            "=" | "==" | "Equal" => Self::Eq,
            other => {
                return Err(RuleError::InvalidOperator {
                    operator: other.to_string(),
                    value_type: "comparison".to_string(),
                });
            }
        };
        Ok(op)
    }
}

impl TryFrom<String> for ComparisonOperator {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComparisonOperator> for String {
    fn from(op: ComparisonOperator) -> Self {
        op.symbol().to_string()
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
