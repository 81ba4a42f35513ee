//! 事件解析执行器
//!
//! 一个评估周期：评估全部规则 → 按规则 ID 降序生成结果 → 替换每个事件的条件模板
//! → 分词/转后缀/求值 → 收集激活事件的状态名。周期之间不保留任何状态。

use crate::compiler::{Catalog, CompiledEvent};
use crate::error::ExpressionError;
use crate::expression::convert_and_evaluate;
use crate::models::{ACCEPTABLE_STATUS, EventFailure, Message, Resolution, RuleResults};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// 事件解析器
///
/// 目录只读共享，每次 `resolve` 都使用全新的周期状态，可在多线程中并发调用。
#[derive(Clone)]
pub struct EventResolver {
    catalog: Arc<Catalog>,
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl EventResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// 评估全部规则
    pub fn evaluate_rules(&self, message: &Message) -> RuleResults {
        let results: RuleResults = self
            .catalog
            .rules()
            .iter()
            .map(|rule| (rule.id, rule.evaluate(message)))
            .collect();

        metrics::counter!("rule_evaluations_total").increment(results.len() as u64);
        results
    }

    /// 替换并求值单个事件的条件
    pub fn resolve_event(
        &self,
        event: &CompiledEvent,
        results: &RuleResults,
    ) -> Result<bool, (String, ExpressionError)> {
        let infix = results.substitute(event.condition());
        match convert_and_evaluate(&infix) {
            Ok(active) => Ok(active),
            Err(e) => Err((infix, e)),
        }
    }

    /// 执行一个评估周期
    pub fn resolve(&self, message: &Message) -> Resolution {
        let start = Instant::now();
        let mut trace = Vec::new();

        let rule_results = self.evaluate_rules(message);

        if self.trace_enabled {
            for (rule_id, matched) in rule_results.iter() {
                trace.push(format!(
                    "rule {} => {}",
                    rule_id,
                    if matched { "MATCHED" } else { "NOT_MATCHED" }
                ));
            }
        }

        let mut statuses = Vec::new();
        let mut active_events = Vec::new();
        let mut failures = Vec::new();

        for event in self.catalog.events() {
            match self.resolve_event(event, &rule_results) {
                Ok(active) => {
                    if self.trace_enabled {
                        trace.push(format!(
                            "event {} [{}]: {} => {}",
                            event.id(),
                            event.name(),
                            event.condition(),
                            if active { "ACTIVE" } else { "INACTIVE" }
                        ));
                    }

                    if active {
                        statuses.push(event.name().to_string());
                        active_events.push(event.id());
                    }
                }
                Err((infix, error)) => {
                    // 单个事件条件错误不影响同周期的其他事件
                    warn!(
                        event_id = event.id(),
                        condition = %event.condition(),
                        infix = %infix,
                        error = %error,
                        "Invalid event condition, skipping event"
                    );
                    metrics::counter!("event_condition_failures_total").increment(1);

                    if self.trace_enabled {
                        trace.push(format!("event {} [{}]: 错误 {}", event.id(), event.name(), error));
                    }

                    failures.push(EventFailure {
                        event_id: event.id(),
                        event_name: event.name().to_string(),
                        infix,
                        error,
                    });
                }
            }
        }

        if statuses.is_empty() {
            statuses.push(ACCEPTABLE_STATUS.to_string());
        }

        let elapsed = start.elapsed();
        metrics::counter!("event_resolutions_total").increment(1);
        metrics::histogram!("event_resolution_duration_seconds").record(elapsed.as_secs_f64());

        debug!(
            statuses = ?statuses,
            failures = failures.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "Evaluation cycle completed"
        );

        Resolution {
            statuses,
            active_events,
            rule_results,
            failures,
            evaluation_trace: trace,
            evaluation_time_us: elapsed.as_micros() as i64,
            evaluated_at: Utc::now(),
        }
    }
}
