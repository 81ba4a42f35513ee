//! 规则定义与评估
//!
//! 规则种类是封闭集合，通过模式匹配分派评估逻辑。
//! 规则的相等性和哈希只取决于 `id`。

use crate::error::{Result, RuleError};
use crate::evaluator::ComparisonEvaluator;
use crate::models::{Message, RuleId, TargetValue};
use crate::operators::ComparisonOperator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tracing::{debug, warn};

/// 规则
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    #[serde(flatten)]
    pub kind: RuleKind,
}

/// 规则种类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleKind {
    /// 消息中存在指定报警
    Alarm { alarm_id: String },
    /// 指定测量值满足比较条件
    Measurement {
        measure_id: String,
        operator: ComparisonOperator,
        target: TargetValue,
    },
    /// 报警持续存在至少 `duration_seconds`
    AlarmDuration {
        alarm_id: String,
        duration_seconds: u64,
    },
    /// 测量条件持续满足至少 `duration_seconds`
    MeasurementDuration {
        measure_id: String,
        operator: ComparisonOperator,
        target: TargetValue,
        duration_seconds: u64,
    },
}

impl Rule {
    pub fn new(id: RuleId, kind: RuleKind) -> Self {
        let rule = Self { id, kind };
        debug!(rule_id = id, rule = %rule.describe(), "Creating rule");
        rule
    }

    pub fn alarm(id: RuleId, alarm_id: impl Into<String>) -> Self {
        Self::new(
            id,
            RuleKind::Alarm {
                alarm_id: alarm_id.into(),
            },
        )
    }

    pub fn measurement(
        id: RuleId,
        measure_id: impl Into<String>,
        operator: ComparisonOperator,
        target: impl Into<TargetValue>,
    ) -> Self {
        Self::new(
            id,
            RuleKind::Measurement {
                measure_id: measure_id.into(),
                operator,
                target: target.into(),
            },
        )
    }

    pub fn alarm_duration(id: RuleId, alarm_id: impl Into<String>, duration: Duration) -> Self {
        Self::new(
            id,
            RuleKind::AlarmDuration {
                alarm_id: alarm_id.into(),
                duration_seconds: duration.as_secs(),
            },
        )
    }

    pub fn measurement_duration(
        id: RuleId,
        measure_id: impl Into<String>,
        operator: ComparisonOperator,
        target: impl Into<TargetValue>,
        duration: Duration,
    ) -> Self {
        Self::new(
            id,
            RuleKind::MeasurementDuration {
                measure_id: measure_id.into(),
                operator,
                target: target.into(),
                duration_seconds: duration.as_secs(),
            },
        )
    }

    /// 持续时间要求（仅持续类规则有）
    pub fn duration(&self) -> Option<Duration> {
        match &self.kind {
            RuleKind::AlarmDuration {
                duration_seconds, ..
            }
            | RuleKind::MeasurementDuration {
                duration_seconds, ..
            } => Some(Duration::from_secs(*duration_seconds)),
            _ => None,
        }
    }

    /// 评估规则，错误向上返回
    ///
    /// 持续类规则目前只检查瞬时条件，满足即视为持续时间也已满足。
    pub fn try_evaluate(&self, message: &Message) -> Result<bool> {
        match &self.kind {
            RuleKind::Alarm { alarm_id } | RuleKind::AlarmDuration { alarm_id, .. } => {
                Ok(message.has_alarm(alarm_id))
            }
            RuleKind::Measurement {
                measure_id,
                operator,
                target,
            }
            | RuleKind::MeasurementDuration {
                measure_id,
                operator,
                target,
                ..
            } => match message.measurement(measure_id) {
                // TODO: 持续类规则需要按规则保存历史评估窗口后才能校验 duration_seconds
                Some(measurement) => ComparisonEvaluator::evaluate(&measurement.value, *operator, target),
                None => Ok(false),
            },
        }
    }

    /// 评估规则，任何错误都记录日志并视为不满足
    pub fn evaluate(&self, message: &Message) -> bool {
        match self.try_evaluate(message) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(rule_id = self.id, error = %e, "Rule evaluation failed, treating as not matched");
                if is_conversion_failure(&e) {
                    metrics::counter!("rule_conversion_failures_total").increment(1);
                }
                false
            }
        }
    }

    /// 人类可读的规则描述
    pub fn describe(&self) -> String {
        match &self.kind {
            RuleKind::Alarm { alarm_id } => format!("when message contains alarm [{}]", alarm_id),
            RuleKind::Measurement {
                measure_id,
                operator,
                target,
            } => format!(
                "when message contains measurement [{}] [{}] [{}]",
                measure_id, operator, target
            ),
            RuleKind::AlarmDuration {
                alarm_id,
                duration_seconds,
            } => format!(
                "when message contains alarm [{}] for {}s",
                alarm_id, duration_seconds
            ),
            RuleKind::MeasurementDuration {
                measure_id,
                operator,
                target,
                duration_seconds,
            } => format!(
                "when message contains measurement [{}] [{}] [{}] for {}s",
                measure_id, operator, target, duration_seconds
            ),
        }
    }
}

/// 只有测量值无法转换时计入 `rule_conversion_failures_total`
fn is_conversion_failure(error: &RuleError) -> bool {
    matches!(error, RuleError::ConversionFailure { .. })
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Rule {}

impl Hash for Rule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_message() -> Message {
        Message::new()
            .with_alarm("HRhi", "1")
            .with_measurement("SFRatio", "150")
            .with_measurement("HR", "not-a-number")
    }

    #[test]
    fn test_alarm_rule() {
        let message = sample_message();
        assert!(Rule::alarm(2, "HRhi").evaluate(&message));
        assert!(!Rule::alarm(3, "HRlo").evaluate(&message));
    }

    #[test]
    fn test_measurement_rule() {
        let rule = Rule::measurement(4, "SFRatio", ComparisonOperator::Lt, "153");

        assert!(rule.evaluate(&Message::new().with_measurement("SFRatio", "150")));
        assert!(!rule.evaluate(&Message::new().with_measurement("SFRatio", "160")));
    }

    #[test]
    fn test_measurement_rule_missing_key() {
        let rule = Rule::measurement(4, "SFRatio", ComparisonOperator::Lt, "153");
        assert!(!rule.evaluate(&Message::new()));
        assert!(!rule.try_evaluate(&Message::new()).unwrap());
    }

    #[test]
    fn test_measurement_conversion_failure_is_false() {
        let rule = Rule::measurement(22, "HR", ComparisonOperator::Lt, "80");
        let message = sample_message();

        assert!(rule.try_evaluate(&message).is_err());
        assert!(!rule.evaluate(&message));
    }

    #[test]
    fn test_only_conversion_errors_are_counted() {
        let conversion = Rule::measurement(22, "HR", ComparisonOperator::Lt, "80")
            .try_evaluate(&sample_message())
            .unwrap_err();
        assert!(is_conversion_failure(&conversion));

        let text_ordering = Rule::measurement(30, "SFRatio", ComparisonOperator::Gt, "high")
            .try_evaluate(&sample_message())
            .unwrap_err();
        assert!(matches!(text_ordering, RuleError::InvalidOperator { .. }));
        assert!(!is_conversion_failure(&text_ordering));
    }

    #[test]
    fn test_duration_rules_pass_through() {
        let message = sample_message();

        let alarm = Rule::alarm_duration(10, "HRhi", Duration::from_secs(600));
        assert!(alarm.evaluate(&message));
        assert_eq!(alarm.duration(), Some(Duration::from_secs(600)));

        let measurement = Rule::measurement_duration(
            5,
            "SFRatio",
            ComparisonOperator::Gt,
            "7.8",
            Duration::from_secs(3600),
        );
        assert!(measurement.evaluate(&message));
        assert!(!measurement.evaluate(&Message::new().with_measurement("SFRatio", "7")));
    }

    #[test]
    fn test_equality_by_id_only() {
        let a = Rule::alarm(1, "CO2lo");
        let b = Rule::measurement(1, "HR", ComparisonOperator::Gt, 100.0);
        let c = Rule::alarm(2, "CO2lo");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Rule> = vec![a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display_is_id() {
        assert_eq!(Rule::alarm(42, "CO2lo").to_string(), "42");
    }

    #[test]
    fn test_rule_deserialization() {
        let json = r#"
        [
            {"id": 1, "type": "alarm", "alarm_id": "CO2lo"},
            {"id": 4, "type": "measurement", "measure_id": "SFRatio", "operator": "<", "target": "153"},
            {"id": 5, "type": "measurement_duration", "measure_id": "OSI", "operator": "GreaterThan", "target": 7.8, "duration_seconds": 3600},
            {"id": 6, "type": "alarm_duration", "alarm_id": "CO2hi", "duration_seconds": 60}
        ]
        "#;

        let rules: Vec<Rule> = serde_json::from_str(json).unwrap();
        assert_eq!(rules.len(), 4);
        assert_eq!(
            rules[1].kind,
            RuleKind::Measurement {
                measure_id: "SFRatio".to_string(),
                operator: ComparisonOperator::Lt,
                target: TargetValue::Number(153.0),
            }
        );
        assert_eq!(rules[2].duration(), Some(Duration::from_secs(3600)));
        assert_eq!(rules[3].duration(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_rule_deserialization_invalid_operator() {
        let json = r#"{"id": 4, "type": "measurement", "measure_id": "HR", "operator": "!=", "target": "80"}"#;
        assert!(serde_json::from_str::<Rule>(json).is_err());
    }
}
