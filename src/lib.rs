//! gRPC Server Runner
//!
//! 为嵌入在应用进程中的 tonic gRPC 服务器提供服务发现、绑定解析与生命周期管理：
//!
//! 发现（`discovery`） → 解析（`resolver`） → 配置/启动/关闭（`server`）
//!
//! 宿主只需提供候选服务集合和端口，并在启动时调用 `run`、退出时调用 `destroy`。

pub mod binding;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod runner;
pub mod server;
pub mod types;
pub mod utils;

// Re-exports
pub use binding::{
    BIND_SERVICE_FN, BindableService, BinderCatalog, BinderFn, OUTER_TYPE_SUFFIX, OuterType,
    ServiceBinding, ServiceDefinition,
};
pub use config::{Config, DEFAULT_GRPC_PORT, GrpcServerConfig, LoggingConfig, RunnerConfig};
pub use discovery::{
    ApplicationRegistry, GrpcServiceMarker, RegisteredObject, ServiceCandidate, ServiceDiscovery,
    StaticCandidates,
};
pub use error::{ErrorCategory, ErrorCode, Result, ServerError};
pub use logging::init_tracing_from_config;
pub use resolver::{
    BindingResolver, BindingStrategy, NotFound, Resolution, ResolutionStrategy,
};
pub use runner::GrpcServerRunner;
pub use server::{ListenerOptions, ServerHandle, ServerState, ShutdownTrigger};
pub use types::TypeRef;
pub use utils::wait_for_server_ready;
