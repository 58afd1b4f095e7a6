use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 知识图谱存储配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 存储后端: "surrealdb" 或 "memory"
    pub backend: String,
    /// SurrealDB 连接地址（ws://host:port 或 mem://）
    pub url: String,
    /// 命名空间
    pub namespace: String,
    /// 数据库名称
    pub database: String,
    /// 用户名（为空时跳过登录）
    pub username: String,
    /// 密码
    pub password: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 请求超时（秒）
    pub request_timeout: u64,
    /// 允许跨域访问的前端地址
    pub cors_origins: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化（JSON）日志格式
    pub structured: bool,
    /// 日志文件目录，按天滚动
    pub log_dir: Option<PathBuf>,
}

/// LLM 网关配置（OpenAI 兼容接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// 接口基础地址
    pub base_url: String,
    /// API 密钥
    pub api_key: String,
    /// 模型名称
    pub model: String,
    /// 对话生成温度
    pub temperature: f32,
    /// 元数据抽取温度
    pub extraction_temperature: f32,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            extraction_temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

/// 元数据抽取器重试配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 首次重试前的等待（毫秒）
    pub retry_delay_ms: u64,
    /// 退避倍数，1.0 表示固定间隔
    pub backoff_factor: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 2000,
            backoff_factor: 1.0,
        }
    }
}

/// 会话记忆配置
///
/// `buffer_max_turns`、`default_window_size` 与 `history_limit` 三个上限相互独立。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Window / Summary 策略未指定窗口时的默认窗口大小
    pub default_window_size: usize,
    /// Buffer 策略保留的最大轮次数
    pub buffer_max_turns: usize,
    /// 组装提示词时最多带入的历史轮次数
    pub history_limit: usize,
    /// 最多保留的会话数，超出时淘汰最久未写入的会话
    pub max_keys: Option<usize>,
    /// 会话空闲过期时间（秒）
    pub idle_ttl_secs: Option<u64>,
    /// 过期清理间隔（秒）
    pub sweep_interval_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            default_window_size: 5,
            buffer_max_turns: 12,
            history_limit: 10,
            max_keys: None,
            idle_ttl_secs: None,
            sweep_interval_secs: 60,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 知识图谱存储配置
    pub database: DatabaseConfig,
    /// 服务器配置
    pub server: ServerConfig,
    /// LLM 配置
    pub llm: LlmConfig,
    /// 抽取器配置
    pub extractor: ExtractorConfig,
    /// 会话记忆配置
    pub memory: MemoryConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            database: DatabaseConfig {
                backend: "surrealdb".into(),
                url: "ws://localhost:8000".into(),
                namespace: "kgchat".into(),
                database: "knowledge".into(),
                username: "root".into(),
                password: "root".into(),
            },
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8080,
                request_timeout: 120,
                cors_origins: vec!["http://localhost:3000".into()],
            },
            llm: LlmConfig::default(),
            extractor: ExtractorConfig::default(),
            memory: MemoryConfig::default(),
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
                log_dir: None,
            },
            app_name: "kgchat".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config.logging.log_dir = Some(PathBuf::from("./logs"));
        config
    }
}
