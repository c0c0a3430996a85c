//! 配置管理
//!
//! 支持多格式配置文件加载和环境变量覆盖。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    pub service_name: String,
    pub environment: String,
    /// 启动时加载的规则文件（JSON 数组）；None 表示空引擎启动
    #[serde(default)]
    pub rules_file: Option<String>,
    #[serde(default)]
    pub log: LogConfig,
}

impl EngineConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的覆盖先加载的同名配置项）：
    /// 1. config/default.toml
    /// 2. config/{environment}.toml
    /// 3. 环境变量（LOGIC_ 前缀，如 LOGIC_RULES_FILE -> rules_file）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("LOGIC_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(Environment::with_prefix("LOGIC").separator("__"))
            .build()?
            .try_deserialize()
    }
}
