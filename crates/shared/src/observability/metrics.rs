//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 收集指标。
//! 规则引擎是批处理进程，不暴露 HTTP 端点，通过句柄渲染快照。

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Metrics 资源句柄
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 安装 Prometheus recorder 并注册指标描述
pub fn init(service_name: &str) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(service_name);

    Ok(MetricsHandle { handle })
}

/// 注册规则引擎指标
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("rule_evaluations_total", "Total number of rule evaluations");
    metrics::describe_counter!(
        "rule_conversion_failures_total",
        "Rule evaluations that failed and were treated as not matched"
    );
    metrics::describe_counter!("event_resolutions_total", "Total number of evaluation cycles");
    metrics::describe_counter!(
        "event_condition_failures_total",
        "Event conditions that could not be parsed or evaluated"
    );
    metrics::describe_histogram!(
        "event_resolution_duration_seconds",
        "Evaluation cycle duration in seconds"
    );
    metrics::describe_counter!("messages_processed_total", "Total number of input messages");

    // 记录服务启动
    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 记录输入消息处理结果
#[inline]
pub fn record_message(status: &str) {
    metrics::counter!(
        "messages_processed_total",
        "status" => status.to_string()
    )
    .increment(1);
}
