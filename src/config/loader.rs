use crate::config::config::AppConfig;
use crate::services::extractor::MAX_BACKOFF_FACTOR;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 合并顺序（后者覆盖前者）：
    /// 1. 开发环境默认值
    /// 2. ./config.toml
    /// 3. `KGCHAT_` 前缀环境变量（嵌套字段用 `__` 分隔，如 `KGCHAT_MEMORY__HISTORY_LIMIT`）
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        Self::extract(Self::figment(path))
    }

    /// 构建配置源
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::development()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("KGCHAT_").split("__"))
    }

    /// 从配置源提取配置，未配置密钥时回退到 `OPENAI_API_KEY`
    pub fn extract(figment: Figment) -> Result<AppConfig, figment::Error> {
        let mut config: AppConfig = figment.extract()?;
        if config.llm.api_key.is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                config.llm.api_key = key;
            }
        }
        Ok(config)
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.llm.model.is_empty() {
            return Err(ConfigValidationError::MissingModel);
        }

        if config.memory.default_window_size == 0 {
            return Err(ConfigValidationError::InvalidBound("memory.default_window_size"));
        }

        if config.memory.buffer_max_turns == 0 {
            return Err(ConfigValidationError::InvalidBound("memory.buffer_max_turns"));
        }

        if config.memory.history_limit == 0 {
            return Err(ConfigValidationError::InvalidBound("memory.history_limit"));
        }

        if config.extractor.max_attempts == 0 {
            return Err(ConfigValidationError::InvalidBound("extractor.max_attempts"));
        }

        let factor = config.extractor.backoff_factor;
        if !factor.is_finite() || !(1.0..=MAX_BACKOFF_FACTOR).contains(&factor) {
            return Err(ConfigValidationError::InvalidBackoff(factor));
        }

        match config.database.backend.as_str() {
            "surrealdb" | "memory" => Ok(()),
            other => Err(ConfigValidationError::UnknownBackend(other.to_string())),
        }
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("LLM 模型名称未配置")]
    MissingModel,

    #[error("{0} 必须大于 0")]
    InvalidBound(&'static str),

    #[error("extractor.backoff_factor 必须在 1 到 10 之间，当前为 {0}")]
    InvalidBackoff(f64),

    #[error("未知的存储后端: {0}")]
    UnknownBackend(String),
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

/// 检查配置文件是否存在
pub fn config_exists() -> bool {
    default_config_path().exists()
}
