//! 规则引擎领域模型

use crate::error::ExpressionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// 规则 ID，同时也是条件模板中引用规则的数字
pub type RuleId = u32;

/// 没有任何事件激活时的默认状态
pub const ACCEPTABLE_STATUS: &str = "Acceptable";

/// 监护消息快照 - 每个评估周期提供一次，引擎不会修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub measurements: HashMap<String, Measurement>,
    #[serde(default)]
    pub alarms: HashMap<String, Alarm>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_measurement(mut self, measure_id: impl Into<String>, value: impl Into<String>) -> Self {
        let measure_id = measure_id.into();
        self.measurements.insert(
            measure_id.clone(),
            Measurement {
                measure_id,
                value: value.into(),
            },
        );
        self
    }

    pub fn with_alarm(mut self, alarm_id: impl Into<String>, value: impl Into<String>) -> Self {
        let alarm_id = alarm_id.into();
        self.alarms.insert(
            alarm_id.clone(),
            Alarm {
                alarm_id,
                value: value.into(),
            },
        );
        self
    }

    pub fn measurement(&self, measure_id: &str) -> Option<&Measurement> {
        self.measurements.get(measure_id)
    }

    pub fn has_alarm(&self, alarm_id: &str) -> bool {
        self.alarms.contains_key(alarm_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(default)]
    pub measure_id: String,
    /// 缺失时为空串，评估时按转换失败处理，只影响引用它的规则
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    #[serde(default)]
    pub alarm_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,
}

/// 采集端有时直接发送数字，统一按文本保存
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// 比较目标值
///
/// 配置值能解析为数字时按数值比较，否则按文本比较。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum TargetValue {
    Number(f64),
    Text(String),
}

impl TargetValue {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "text",
        }
    }
}

impl From<&str> for TargetValue {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<f64> for TargetValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<Value> for TargetValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or_else(|| Self::Text(n.to_string())),
            Value::String(s) => Self::parse(&s),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<TargetValue> for Value {
    fn from(target: TargetValue) -> Self {
        match target {
            TargetValue::Number(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            TargetValue::Text(s) => Value::String(s),
        }
    }
}

impl fmt::Display for TargetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// 复合事件定义
///
/// `condition` 是以规则 ID 为操作数的模板，如 `"1 & (2 | 3)"`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub name: String,
    pub condition: String,
}

impl Event {
    pub fn new(id: u32, name: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            condition: condition.into(),
        }
    }
}

/// 单周期的规则结果，按规则 ID 降序排列
///
/// 降序保证文本替换时长 ID 先于其前缀（如 `22` 先于 `2`）被替换。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleResults {
    entries: Vec<(RuleId, bool)>,
}

impl RuleResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入结果，同 ID 覆盖
    pub fn insert(&mut self, rule_id: RuleId, matched: bool) {
        match self.entries.binary_search_by(|(id, _)| rule_id.cmp(id)) {
            Ok(pos) => self.entries[pos].1 = matched,
            Err(pos) => self.entries.insert(pos, (rule_id, matched)),
        }
    }

    pub fn get(&self, rule_id: RuleId) -> Option<bool> {
        self.entries
            .binary_search_by(|(id, _)| rule_id.cmp(id))
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleId, bool)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 将模板中出现的规则 ID 依次替换为 `true` / `false`
    pub fn substitute(&self, template: &str) -> String {
        let mut infix = template.to_string();
        for (rule_id, matched) in &self.entries {
            infix = infix.replace(&rule_id.to_string(), if *matched { "true" } else { "false" });
        }
        infix
    }
}

impl FromIterator<(RuleId, bool)> for RuleResults {
    fn from_iter<T: IntoIterator<Item = (RuleId, bool)>>(iter: T) -> Self {
        let mut results = Self::new();
        for (rule_id, matched) in iter {
            results.insert(rule_id, matched);
        }
        results
    }
}

/// 单个事件条件解析失败的记录
#[derive(Debug, Clone, PartialEq)]
pub struct EventFailure {
    pub event_id: u32,
    pub event_name: String,
    pub infix: String,
    pub error: ExpressionError,
}

/// 一个评估周期的结果
#[derive(Debug, Clone)]
pub struct Resolution {
    /// 激活事件的状态名；没有激活事件时为 `["Acceptable"]`
    pub statuses: Vec<String>,
    pub active_events: Vec<u32>,
    pub rule_results: RuleResults,
    pub failures: Vec<EventFailure>,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_us: i64,
    pub evaluated_at: DateTime<Utc>,
}

impl Resolution {
    pub fn is_acceptable(&self) -> bool {
        self.active_events.is_empty()
    }
}
