//! 统一可观测性模块
//!
//! 提供 logging 与 metrics 的统一初始化。
//! 所有二进制通过单一入口点配置可观测性，确保一致的日志格式和指标命名。

pub mod metrics;
pub mod tracing;

use crate::config::ObservabilityConfig;
use ::tracing::{debug, info};
use anyhow::Result;

/// 可观测性资源守卫
///
/// 持有指标 recorder 的句柄；Drop 时输出一次指标快照。
pub struct ObservabilityGuard {
    metrics_handle: Option<metrics::MetricsHandle>,
}

impl ObservabilityGuard {
    /// 创建一个空的 Guard（用于测试或禁用可观测性时）
    pub fn empty() -> Self {
        Self {
            metrics_handle: None,
        }
    }

    /// 当前指标快照（Prometheus 文本格式）
    pub fn metrics_snapshot(&self) -> Option<String> {
        self.metrics_handle.as_ref().map(|h| h.render())
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if let Some(snapshot) = self.metrics_snapshot() {
            debug!(metrics = %snapshot, "Final metrics snapshot");
        }
        info!("Shutting down observability...");
    }
}

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. Tracing（日志）
/// 2. Metrics（仅在 `metrics_enabled` 时安装 Prometheus recorder）
///
/// # Example
///
/// ```ignore
/// use monitor_shared::config::AppConfig;
/// use monitor_shared::observability;
///
/// fn main() -> anyhow::Result<()> {
///     let config = AppConfig::load("clinical-rule-engine")?;
///     let _guard = observability::init(&config.service_name, &config.observability)?;
///
///     // 应用逻辑...
///
///     Ok(())
/// }
/// ```
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    let metrics_handle = if config.metrics_enabled {
        Some(metrics::init(service_name)?)
    } else {
        None
    };

    info!(
        service = %service_name,
        log_level = %config.log_level,
        metrics_enabled = config.metrics_enabled,
        "Observability initialized"
    );

    Ok(ObservabilityGuard { metrics_handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_guard_has_no_snapshot() {
        let guard = ObservabilityGuard::empty();
        assert!(guard.metrics_snapshot().is_none());
    }
}
