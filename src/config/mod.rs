use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

/// Default upstream endpoint (OpenAI-compatible chat completions).
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
/// Default upstream model identifier.
pub const DEFAULT_MODEL: &str = "deepseek-chat";
/// Upstream request ceiling in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
    pub canvas: CanvasConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
}

/// Completion API configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// API key; `None` keeps the process up but every send fails with a configuration error.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

/// Graph canvas size used by the terminal client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let upstream = UpstreamConfig {
            api_key: env::var("SOCRATIC_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: env::var("SOCRATIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: env::var("SOCRATIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let server = ServerConfig {
            bind_addr: bind_addr.parse().map_err(|_| AppError::Config {
                message: format!("BIND_ADDR is not a socket address: {}", bind_addr),
            })?,
        };

        let canvas = CanvasConfig {
            width: env::var("CANVAS_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|w| *w > 0)
                .unwrap_or(480),
            height: env::var("CANVAS_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|h| *h > 0)
                .unwrap_or(720),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        };

        Ok(Config {
            upstream,
            server,
            canvas,
            logging,
            request,
        })
    }
}

impl UpstreamConfig {
    /// Return the API key or the configuration error every send must surface.
    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.api_key.as_deref().ok_or_else(|| AppError::Config {
            message: "SOCRATIC_API_KEY is required".to_string(),
        })
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 720,
        }
    }
}
