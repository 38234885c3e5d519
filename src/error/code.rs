//! 错误代码和错误类别定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误代码枚举
///
/// 错误代码按类别分组，每个类别占用1000个代码范围：
/// - 1000-1999: 服务绑定相关错误（发现、解析、重复注册）
/// - 2000-2999: 服务器生命周期相关错误（监听、关闭、状态）
/// - 3000-3999: 配置相关错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 服务绑定相关错误 (1000-1999)
    // ============================================================
    BinderNotFound = 1000,
    DuplicateBinding = 1001,

    // ============================================================
    // 服务器生命周期相关错误 (2000-2999)
    // ============================================================
    ListenerBindFailed = 2000,
    ShutdownInterrupted = 2001,
    InvalidServerState = 2002,

    // ============================================================
    // 配置相关错误 (3000-3999)
    // ============================================================
    ConfigurationError = 3000,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 从数字值创建错误代码
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            1000 => Some(ErrorCode::BinderNotFound),
            1001 => Some(ErrorCode::DuplicateBinding),
            2000 => Some(ErrorCode::ListenerBindFailed),
            2001 => Some(ErrorCode::ShutdownInterrupted),
            2002 => Some(ErrorCode::InvalidServerState),
            3000 => Some(ErrorCode::ConfigurationError),
            _ => None,
        }
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BinderNotFound => "BINDER_NOT_FOUND",
            ErrorCode::DuplicateBinding => "DUPLICATE_BINDING",
            ErrorCode::ListenerBindFailed => "LISTENER_BIND_FAILED",
            ErrorCode::ShutdownInterrupted => "SHUTDOWN_INTERRUPTED",
            ErrorCode::InvalidServerState => "INVALID_SERVER_STATE",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Binding,
            2000..=2999 => ErrorCategory::Lifecycle,
            _ => ErrorCategory::Configuration,
        }
    }

    /// 是否为致命错误
    ///
    /// 致命错误会中断整个启动流程；非致命错误只记录日志。
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ErrorCode::ShutdownInterrupted)
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Binding,
    Lifecycle,
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Binding => write!(f, "BINDING"),
            ErrorCategory::Lifecycle => write!(f, "LIFECYCLE"),
            ErrorCategory::Configuration => write!(f, "CONFIGURATION"),
        }
    }
}
