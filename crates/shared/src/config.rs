//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 规则引擎配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 规则/事件目录 JSON 文件；未配置时使用内置目录
    pub catalog_path: Option<String>,
    /// 严格模式下目录中任一条目无效即启动失败
    pub strict_catalog: bool,
    /// 状态输出端：console 或 log
    pub sink: String,
    /// 是否记录每个周期的评估追踪
    pub trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            strict_catalog: true,
            sink: "console".to_string(),
            trace: false,
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
        }
    }
}

impl ObservabilityConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub engine: EngineConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（MONITOR_ 前缀，层级用双下划线，如 MONITOR_ENGINE__CATALOG_PATH -> engine.catalog_path）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("MONITOR_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    fn load_from(service_name: &str, env: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("MONITOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.engine.strict_catalog);
        assert_eq!(config.engine.sink, "console");
        assert!(config.engine.catalog_path.is_none());
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs());
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = std::env::temp_dir().join("monitor-config-test-missing");
        let config = AppConfig::load_from("clinical-rule-engine", "test", &dir).unwrap();

        assert_eq!(config.service_name, "clinical-rule-engine");
        assert_eq!(config.environment, "test");
        assert!(config.engine.strict_catalog);
    }

    #[test]
    fn test_layered_files() {
        let dir = std::env::temp_dir().join(format!("monitor-config-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("default.toml"),
            "[engine]\nsink = \"log\"\ntrace = true\n\n[observability]\nlog_format = \"json\"\n",
        )
        .unwrap();
        fs::write(
            dir.join("clinical-rule-engine.toml"),
            "[engine]\ncatalog_path = \"catalog.json\"\nstrict_catalog = false\n",
        )
        .unwrap();

        let config = AppConfig::load_from("clinical-rule-engine", "staging", &dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.engine.sink, "log");
        assert!(config.engine.trace);
        assert_eq!(config.engine.catalog_path.as_deref(), Some("catalog.json"));
        assert!(!config.engine.strict_catalog);
        assert!(config.observability.json_logs());
        assert!(!config.is_production());
    }
}
