//! 运行器实现

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};

use crate::binding::BinderCatalog;
use crate::config::GrpcServerConfig;
use crate::discovery::ServiceDiscovery;
use crate::error::{Result, ServerError};
use crate::resolver::BindingResolver;
use crate::server::{ServerHandle, ServerState, ShutdownTrigger};

/// gRPC 服务器运行器
///
/// 串联 发现 → 解析 → 配置 → 启动，并持有唯一的 `ServerHandle`。
/// 任何启动期错误都会同步返回，不会留下部分启动的服务器。
pub struct GrpcServerRunner {
    config: GrpcServerConfig,
    discovery: Box<dyn ServiceDiscovery>,
    resolver: BindingResolver,
    handle: ServerHandle,
}

impl GrpcServerRunner {
    /// 创建运行器
    ///
    /// 监听地址无效时返回配置错误。
    pub fn new(config: GrpcServerConfig, discovery: impl ServiceDiscovery + 'static) -> Result<Self> {
        let handle = ServerHandle::new(config.listener_options()?);
        let resolver = Self::default_resolver(&config, Arc::new(BinderCatalog::new()));
        Ok(Self {
            config,
            discovery: Box::new(discovery),
            resolver,
            handle,
        })
    }

    fn default_resolver(config: &GrpcServerConfig, catalog: Arc<BinderCatalog>) -> BindingResolver {
        if config.convention_fallback {
            BindingResolver::new().with_convention(catalog)
        } else {
            BindingResolver::new()
        }
    }

    /// 设置约定查找使用的外部类型目录
    pub fn with_catalog(mut self, catalog: BinderCatalog) -> Self {
        if !self.config.convention_fallback && !catalog.is_empty() {
            warn!(
                outer_types = catalog.len(),
                "Convention fallback is disabled, binder catalog will not be consulted"
            );
        }
        self.resolver = Self::default_resolver(&self.config, Arc::new(catalog));
        self
    }

    /// 使用自定义解析器
    pub fn with_resolver(mut self, resolver: BindingResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// 启动钩子：发现、解析、配置、启动
    ///
    /// 返回实际监听地址。只能调用一次，再次调用在发现之前即返回 `InvalidState`。
    pub async fn run(&mut self) -> Result<SocketAddr> {
        let state = self.handle.state();
        if state != ServerState::Created {
            warn!(state = %state, "gRPC server runner already started, ignoring run");
            return Err(ServerError::InvalidState {
                operation: "run",
                state,
            });
        }

        info!(port = self.config.port, "🚀 Starting gRPC Server ...");

        let candidates = self.discovery.discover();
        if candidates.is_empty() {
            warn!("⚠️ No gRPC service candidates discovered, starting with zero services");
        } else {
            info!(candidates = candidates.len(), "gRPC service candidates discovered");
        }

        let bindings = self
            .resolver
            .resolve_all(&candidates)
            .inspect_err(|e| error!(error = %e, "❌ gRPC service resolution failed"))?;

        self.handle.configure(bindings, self.config.port)?;
        let address = self
            .handle
            .start()
            .await
            .inspect_err(|e| error!(error = %e, "❌ gRPC server failed to start"))?;

        info!(
            address = %address,
            services = ?self.handle.service_names(),
            "gRPC Server started, listening on port {}",
            address.port()
        );
        Ok(address)
    }

    /// 销毁钩子：请求优雅关闭，立即返回
    ///
    /// 在启动成功前调用或重复调用均为空操作。
    pub fn destroy(&self) {
        info!(state = %self.handle.state(), "Shutting down gRPC server ...");
        if self.handle.shutdown() {
            info!("gRPC server stop requested");
        }
    }

    /// 等待服务器终止
    pub async fn await_termination(&self) -> Result<()> {
        self.handle.await_termination().await
    }

    /// 等待监督任务结束
    pub async fn join(&mut self) -> Result<()> {
        self.handle.join_supervisor().await
    }

    /// 运行直到收到 Ctrl+C
    ///
    /// 1. 执行 `run()`
    /// 2. 等待 Ctrl+C 或服务器自行终止
    /// 3. 执行 `destroy()`
    /// 4. 在 `shutdown_timeout` 内等待排空，超时只记录警告
    pub async fn run_until_signal(mut self, shutdown_timeout: Duration) -> anyhow::Result<()> {
        self.run().await.context("failed to start gRPC server")?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received (Ctrl+C)");
            }
            result = self.handle.await_termination() => {
                if let Err(e) = result {
                    warn!(error = %e, "⚠️ gRPC server await interrupted");
                }
                info!(state = %self.handle.state(), "gRPC server terminated");
            }
        }

        self.destroy();

        match tokio::time::timeout(shutdown_timeout, self.handle.join_supervisor()).await {
            Ok(Ok(())) => {
                info!("gRPC server stopped.");
            }
            Ok(Err(e)) => {
                warn!(error = %e, "⚠️ gRPC server shutdown interrupted");
            }
            Err(_) => {
                warn!(timeout = ?shutdown_timeout, "gRPC server shutdown timeout, forcing exit");
            }
        }

        Ok(())
    }

    pub fn state(&self) -> ServerState {
        self.handle.state()
    }

    pub fn handle(&self) -> &ServerHandle {
        &self.handle
    }

    /// 供其他线程的销毁钩子使用
    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        self.handle.shutdown_trigger()
    }

    pub fn config(&self) -> &GrpcServerConfig {
        &self.config
    }
}
