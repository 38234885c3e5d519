//! 错误处理模块
//!
//! 启动期错误（解析失败、服务重复、端口占用）一律致命，中断整个启动流程；
//! 关闭期错误只记录日志。

pub mod code;
pub mod server_error;

pub use code::{ErrorCategory, ErrorCode};
pub use server_error::{Result, ServerError};
