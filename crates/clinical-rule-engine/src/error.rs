//! 规则引擎错误类型

use thiserror::Error;

/// 条件表达式解析/求值错误
///
/// 任一错误都会终止当前表达式的处理，但不影响同一周期内其他事件。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("无法识别的字符 '{ch}' (位置 {position})")]
    InvalidCharacter { ch: char, position: usize },

    #[error("无效的标记: {0}")]
    InvalidToken(String),

    #[error("括号不匹配")]
    MismatchedParentheses,

    #[error("表达式格式错误: {0}")]
    MalformedExpression(String),
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error("类型转换失败: 无法将 '{value}' 转换为 {expected}")]
    ConversionFailure { value: String, expected: String },

    #[error("无效的操作符: {operator} 不支持类型 {value_type}")]
    InvalidOperator {
        operator: String,
        value_type: String,
    },

    #[error("规则 ID 重复: {0}")]
    DuplicateRule(u32),

    #[error("事件 {event_id} 引用了不存在的规则: {rule_id}")]
    UnknownRuleReference { event_id: u32, rule_id: u32 },

    #[error("无效的目录配置: {0}")]
    InvalidCatalog(String),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;
