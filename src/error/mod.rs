use thiserror::Error;

/// Hint appended to connectivity failures.
pub const PROXY_HINT: &str =
    "Check network connectivity; if the upstream API is only reachable through a proxy, set HTTPS_PROXY";

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Completion gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Upstream error: {status} - {details}")]
    Upstream { status: u16, details: String },

    #[error("Network error: {message}. {}", PROXY_HINT)]
    Network { message: String },

    #[error("Request timeout after {timeout_ms}ms. {}", PROXY_HINT)]
    Timeout { timeout_ms: u64 },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GatewayError {
    /// Whether this error means the upstream could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, GatewayError::Network { .. } | GatewayError::Timeout { .. })
    }
}

/// Session state errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("A turn is already in flight")]
    TurnInFlight,

    #[error("No turn is awaiting a reply")]
    NoTurnPending,

    #[error("Message content cannot be empty")]
    EmptyMessage,

    #[error("Selection is empty")]
    EmptySelection,

    #[error("Message not found: {id}")]
    MessageNotFound { id: u64 },

    #[error("Note not found: {id}")]
    NoteNotFound { id: u64 },
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Graph snapshot is not ready yet; complete an exchange before exporting")]
    GraphNotReady,

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Graph rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    #[error("Graph is empty; complete an exchange first")]
    EmptyGraph,

    #[error("PNG encoding failed: {message}")]
    PngEncode { message: String },
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type alias for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
