//! 服务器统一错误类型

use super::code::ErrorCode;
use crate::server::ServerState;
use std::net::SocketAddr;
use thiserror::Error;

/// 声明的外部类型必须与服务协议契约一同生成
pub(crate) const OUTER_TYPE_HINT: &str =
    "the declared outer type must be the one generated alongside the service's protocol contract";

/// gRPC 服务器运行器错误类型
#[derive(Error, Debug)]
pub enum ServerError {
    /// 候选服务无法解析出绑定函数（启动期致命错误）
    #[error(
        "no binder found for '{candidate_type}'{searched_note}: {reason}",
        searched_note = .searched.as_deref().map(|s| format!(" (searched: {s})")).unwrap_or_default()
    )]
    Resolution {
        candidate_type: String,
        searched: Option<String>,
        reason: String,
    },

    /// 服务名称重复（配置期致命错误）
    #[error("duplicate gRPC service '{name}': binding names must be unique per server")]
    DuplicateBinding { name: String },

    /// 监听端口绑定失败，保留底层传输错误
    #[error("failed to bind gRPC listener on {addr}: {source}")]
    ListenerBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// 关闭等待被中断（非致命）
    #[error("gRPC server shutdown interrupted: {0}")]
    ShutdownInterrupted(String),

    /// 当前状态不允许该操作
    #[error("cannot {operation} gRPC server in state {state}")]
    InvalidState {
        operation: &'static str,
        state: ServerState,
    },

    /// 配置错误
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ServerError {
    /// 创建解析错误，附带外部类型提示
    pub fn resolution(
        candidate_type: impl Into<String>,
        searched: Option<String>,
        reason: impl AsRef<str>,
    ) -> Self {
        ServerError::Resolution {
            candidate_type: candidate_type.into(),
            searched,
            reason: format!("{}; {}", reason.as_ref(), OUTER_TYPE_HINT),
        }
    }

    pub fn duplicate_binding(name: impl Into<String>) -> Self {
        ServerError::DuplicateBinding { name: name.into() }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        ServerError::Configuration(msg.into())
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::Resolution { .. } => ErrorCode::BinderNotFound,
            ServerError::DuplicateBinding { .. } => ErrorCode::DuplicateBinding,
            ServerError::ListenerBind { .. } => ErrorCode::ListenerBindFailed,
            ServerError::ShutdownInterrupted(_) => ErrorCode::ShutdownInterrupted,
            ServerError::InvalidState { .. } => ErrorCode::InvalidServerState,
            ServerError::Configuration(_) => ErrorCode::ConfigurationError,
        }
    }

    /// 是否为致命错误
    pub fn is_fatal(&self) -> bool {
        self.code().is_fatal()
    }

    /// 监听失败时的底层 IO 错误
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            ServerError::ListenerBind { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
