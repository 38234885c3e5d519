//! gRPC 服务器运行器
//!
//! 暴露给宿主的生命周期钩子：
//! - `run()`：进程启动时调用一次，执行发现、解析、配置、启动
//! - `destroy()`：进程退出时调用一次，请求优雅关闭
//!
//! # 使用示例
//! ```rust,ignore
//! use grpc_server_runner::{Config, GrpcServerRunner, StaticCandidates, ServiceCandidate};
//!
//! let config = Config::load_from_file("config.toml")?.apply_env_overrides()?;
//! let candidates = StaticCandidates::default()
//!     .with(ServiceCandidate::bindable(Arc::new(GreeterService::default())));
//!
//! GrpcServerRunner::new(config.grpc, candidates)?
//!     .run_until_signal(config.runner.shutdown_timeout())
//!     .await?;
//! ```

pub mod runner;

pub use runner::GrpcServerRunner;
