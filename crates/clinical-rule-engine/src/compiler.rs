//! 目录编译器
//!
//! 将 JSON 形式的规则/事件目录解析并校验为只读的 `Catalog`。
//! 严格模式下遇到第一个问题即失败；宽松模式下记录日志并丢弃有问题的条目。

use crate::error::{ExpressionError, Result, RuleError};
use crate::expression::{TokenKind, to_postfix, tokenize};
use crate::models::{Event, RuleId};
use crate::rules::{Rule, RuleKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, instrument, warn};

/// 目录定义（配置面）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDefinition {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// 编译后的事件
#[derive(Debug, Clone)]
pub struct CompiledEvent {
    pub event: Event,
    /// 条件中引用的规则 ID
    pub required_rules: BTreeSet<RuleId>,
}

impl CompiledEvent {
    pub fn id(&self) -> u32 {
        self.event.id
    }

    pub fn name(&self) -> &str {
        &self.event.name
    }

    pub fn condition(&self) -> &str {
        &self.event.condition
    }
}

/// 只读的规则/事件目录，启动时构建一次后可在多线程间共享
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rules: Vec<Rule>,
    events: Vec<CompiledEvent>,
}

impl Catalog {
    /// 不做校验直接构建目录
    ///
    /// 无法解析的条件会在评估周期中被记录并跳过。
    pub fn new(rules: Vec<Rule>, events: Vec<Event>) -> Self {
        let events = events
            .into_iter()
            .map(|event| CompiledEvent {
                required_rules: referenced_rules(&event.condition).unwrap_or_default(),
                event,
            })
            .collect();

        Self { rules, events }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn events(&self) -> &[CompiledEvent] {
        &self.events
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.events.is_empty()
    }
}

/// 提取条件模板中引用的规则 ID
///
/// 同时校验模板能够完成分词和后缀转换。
pub fn referenced_rules(condition: &str) -> std::result::Result<BTreeSet<RuleId>, ExpressionError> {
    let mut ids = BTreeSet::new();

    for token in to_postfix(tokenize(condition)) {
        let token = token?;
        if matches!(token.kind(), TokenKind::Number | TokenKind::Function) {
            let id = token
                .symbol()
                .parse::<RuleId>()
                .map_err(|_| ExpressionError::InvalidToken(token.symbol().to_string()))?;
            ids.insert(id);
        }
    }

    Ok(ids)
}

/// 目录编译器
pub struct CatalogCompiler {
    strict: bool,
}

impl CatalogCompiler {
    pub fn new() -> Self {
        Self { strict: true }
    }

    /// 设置是否严格校验
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 从 JSON 字符串编译目录
    pub fn compile_from_json(&self, json: &str) -> Result<Catalog> {
        let definition: CatalogDefinition = serde_json::from_str(json)?;
        self.compile(definition)
    }

    /// 编译目录
    #[instrument(skip(self, definition), fields(strict = self.strict, rules = definition.rules.len(), events = definition.events.len()))]
    pub fn compile(&self, definition: CatalogDefinition) -> Result<Catalog> {
        let mut rules = Vec::with_capacity(definition.rules.len());
        let mut rule_ids = HashSet::new();

        for rule in definition.rules {
            let checked = if rule_ids.contains(&rule.id) {
                Err(RuleError::DuplicateRule(rule.id))
            } else {
                self.validate_rule(&rule)
            };

            match checked {
                Ok(()) => {
                    debug!(rule_id = rule.id, rule = %rule.describe(), "Rule compiled");
                    rule_ids.insert(rule.id);
                    rules.push(rule);
                }
                Err(e) => self.reject(e, "rule", rule.id)?,
            }
        }

        let mut events = Vec::with_capacity(definition.events.len());
        for event in definition.events {
            match self.validate_event(&event, &rule_ids) {
                Ok(required_rules) => events.push(CompiledEvent {
                    event,
                    required_rules,
                }),
                Err(e) => self.reject(e, "event", event.id)?,
            }
        }

        info!(
            "目录编译完成: {} 条规则, {} 个事件",
            rules.len(),
            events.len()
        );

        Ok(Catalog { rules, events })
    }

    fn reject(&self, error: RuleError, entry: &str, id: u32) -> Result<()> {
        if self.strict {
            return Err(error);
        }

        warn!(entry, id, error = %error, "Dropping invalid catalog entry");
        Ok(())
    }

    /// 验证规则配置
    fn validate_rule(&self, rule: &Rule) -> Result<()> {
        match &rule.kind {
            RuleKind::Alarm { alarm_id } | RuleKind::AlarmDuration { alarm_id, .. } => {
                if alarm_id.trim().is_empty() {
                    return Err(RuleError::InvalidCatalog(format!(
                        "规则 {} 的报警 ID 不能为空",
                        rule.id
                    )));
                }
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
            } => {
                if measure_id.trim().is_empty() {
                    return Err(RuleError::InvalidCatalog(format!(
                        "规则 {} 的测量 ID 不能为空",
                        rule.id
                    )));
                }

                // 文本目标值只支持相等比较
                if operator.is_ordering() && target.type_name() == "text" {
                    return Err(RuleError::InvalidOperator {
                        operator: operator.to_string(),
                        value_type: target.type_name().to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// 验证事件配置，返回条件引用的规则 ID
    fn validate_event(&self, event: &Event, rule_ids: &HashSet<RuleId>) -> Result<BTreeSet<RuleId>> {
        if event.name.trim().is_empty() {
            return Err(RuleError::InvalidCatalog(format!(
                "事件 {} 的名称不能为空",
                event.id
            )));
        }

        if event.condition.trim().is_empty() {
            return Err(RuleError::InvalidCatalog(format!(
                "事件 {} 的条件不能为空",
                event.id
            )));
        }

        let required_rules = referenced_rules(&event.condition)?;

        if let Some(missing) = required_rules.iter().find(|id| !rule_ids.contains(id)) {
            return Err(RuleError::UnknownRuleReference {
                event_id: event.id,
                rule_id: *missing,
            });
        }

        Ok(required_rules)
    }
}

impl Default for CatalogCompiler {
    fn default() -> Self {
        Self::new()
    }
}
