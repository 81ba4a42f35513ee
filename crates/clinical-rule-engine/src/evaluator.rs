//! 测量值比较评估器
//!
//! 将消息中的测量值转换为目标值的类型后，按比较操作符进行静态分派比较。

use crate::error::{Result, RuleError};
use crate::models::TargetValue;
use crate::operators::ComparisonOperator;

/// 比较评估器
pub struct ComparisonEvaluator;

impl ComparisonEvaluator {
    /// 评估 `stored <operator> target`
    ///
    /// # Arguments
    /// * `stored` - 消息中的测量值原文
    /// * `operator` - 比较操作符
    /// * `target` - 规则配置的目标值
    pub fn evaluate(stored: &str, operator: ComparisonOperator, target: &TargetValue) -> Result<bool> {
        match target {
            TargetValue::Number(expected) => {
                let actual = Self::as_f64(stored)?;
                Ok(operator.compare_f64(actual, *expected))
            }
            TargetValue::Text(expected) => {
                if operator.is_ordering() {
                    return Err(RuleError::InvalidOperator {
                        operator: operator.to_string(),
                        value_type: target.type_name().to_string(),
                    });
                }
                Ok(stored == expected)
            }
        }
    }

    fn as_f64(stored: &str) -> Result<f64> {
        stored
            .trim()
            .parse::<f64>()
            .map_err(|_| RuleError::ConversionFailure {
                value: stored.to_string(),
                expected: "number".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparisons() {
        let target = TargetValue::Number(153.0);
        assert!(ComparisonEvaluator::evaluate("150", ComparisonOperator::Lt, &target).unwrap());
        assert!(!ComparisonEvaluator::evaluate("160", ComparisonOperator::Lt, &target).unwrap());
        assert!(ComparisonEvaluator::evaluate("153", ComparisonOperator::Lte, &target).unwrap());
        assert!(ComparisonEvaluator::evaluate("160", ComparisonOperator::Gt, &target).unwrap());
        assert!(ComparisonEvaluator::evaluate("153.0", ComparisonOperator::Gte, &target).unwrap());
        assert!(ComparisonEvaluator::evaluate(" 153 ", ComparisonOperator::Eq, &target).unwrap());
    }

    #[test]
    fn test_conversion_failure() {
        let target = TargetValue::Number(85.0);
        let err = ComparisonEvaluator::evaluate("n/a", ComparisonOperator::Lt, &target).unwrap_err();
        assert!(matches!(err, RuleError::ConversionFailure { .. }));
        assert!(err.to_string().contains("n/a"));
    }

    #[test]
    fn test_text_equality() {
        let target = TargetValue::Text("PAUSED".to_string());
        assert!(ComparisonEvaluator::evaluate("PAUSED", ComparisonOperator::Eq, &target).unwrap());
        assert!(!ComparisonEvaluator::evaluate("RUNNING", ComparisonOperator::Eq, &target).unwrap());
    }

    #[test]
    fn test_text_ordering_rejected() {
        let target = TargetValue::Text("PAUSED".to_string());
        let result = ComparisonEvaluator::evaluate("RUNNING", ComparisonOperator::Gt, &target);
        assert!(matches!(result, Err(RuleError::InvalidOperator { .. })));
    }
}
