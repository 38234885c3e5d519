//! 服务器生命周期管理
//!
//! `ServerHandle` 包装 tonic 监听器并驱动状态机：
//! - `configure`：注册全部绑定，拒绝重复的服务名
//! - `start`：绑定端口，启动传输任务和唯一的监督任务
//! - `shutdown`：请求优雅关闭，立即返回
//!
//! 启动流程在调用方任务上同步完成；失败时不会产生任何监督任务。

use std::collections::HashSet;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::service::{Routes, RoutesBuilder};
use tracing::{debug, error, info, warn};

use super::ListenerOptions;
use super::state::{ServerState, ShutdownTrigger, StateCell};
use crate::binding::ServiceBinding;
use crate::error::{Result, ServerError};

/// gRPC 服务器句柄
pub struct ServerHandle {
    state: StateCell,
    options: ListenerOptions,
    port: Option<u16>,
    routes: Option<Routes>,
    services: Vec<String>,
    local_addr: Option<SocketAddr>,
    supervisor: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn new(options: ListenerOptions) -> Self {
        Self {
            state: StateCell::new(),
            options,
            port: None,
            routes: None,
            services: Vec::new(),
            local_addr: None,
            supervisor: None,
        }
    }

    /// 注册全部绑定，`Created → Configured`
    ///
    /// 重复的服务名在构建任何路由之前就会被拒绝。
    pub fn configure(&mut self, bindings: Vec<ServiceBinding>, port: u16) -> Result<()> {
        self.expect_state("configure", ServerState::Created)?;

        let mut seen = HashSet::with_capacity(bindings.len());
        for binding in &bindings {
            if !seen.insert(binding.name()) {
                error!(service = %binding.name(), "Duplicate gRPC service binding");
                return Err(ServerError::duplicate_binding(binding.name()));
            }
        }

        let mut routes = RoutesBuilder::default();
        let mut services = Vec::with_capacity(bindings.len());
        for binding in bindings {
            info!(
                service = %binding.name(),
                candidate = %binding.candidate_type(),
                strategy = %binding.strategy(),
                "gRPC service has been registered"
            );
            services.push(binding.name().to_string());
            binding.into_definition().install(&mut routes);
        }

        self.routes = Some(routes.routes());
        self.services = services;
        self.port = Some(port);
        self.state
            .transition(ServerState::Created, ServerState::Configured);
        Ok(())
    }

    /// 绑定端口并开始服务，`Configured → Running`
    ///
    /// 返回实际监听地址（端口为 0 时由系统分配）。
    /// 端口不可用时返回 `ListenerBind`，保留底层 IO 错误，状态不变。
    pub async fn start(&mut self) -> Result<SocketAddr> {
        self.expect_state("start", ServerState::Configured)?;
        let addr = SocketAddr::new(self.options.address, self.port.unwrap_or_default());

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::ListenerBind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::ListenerBind { addr, source })?;

        let Some(routes) = self.routes.take() else {
            return Err(ServerError::InvalidState {
                operation: "start",
                state: self.state.current(),
            });
        };
        let router = self.options.builder().add_routes(routes);

        let nodelay = self.options.tcp_nodelay;
        let incoming = TcpListenerStream::new(listener).map(move |conn| {
            conn.inspect(|stream| {
                if let Err(e) = stream.set_nodelay(nodelay) {
                    debug!(error = %e, "Failed to set TCP_NODELAY");
                }
            })
        });

        let mut stop_rx = self.state.subscribe();
        let signal = async move {
            let _ = stop_rx
                .wait_for(|state| *state >= ServerState::Stopping)
                .await;
        };

        self.state
            .transition(ServerState::Configured, ServerState::Running);
        self.local_addr = Some(local_addr);

        let transport = tokio::spawn(router.serve_with_incoming_shutdown(incoming, signal));
        self.supervisor = Some(Self::spawn_supervisor(
            self.state.clone(),
            transport,
            local_addr,
        ));

        info!(
            address = %local_addr,
            port = local_addr.port(),
            services = self.services.len(),
            "✅ gRPC server started"
        );
        Ok(local_addr)
    }

    /// 监督任务：等待传输层排空后将状态推进到 `Terminated`
    fn spawn_supervisor(
        state: StateCell,
        transport: JoinHandle<std::result::Result<(), tonic::transport::Error>>,
        address: SocketAddr,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            match transport.await {
                Ok(Ok(())) => {
                    info!(address = %address, "gRPC server drained");
                }
                Ok(Err(e)) => {
                    error!(address = %address, error = %e, "❌ gRPC transport stopped with error");
                }
                Err(e) => {
                    let err = ServerError::ShutdownInterrupted(e.to_string());
                    warn!(address = %address, error = %err, "⚠️ gRPC server await interrupted");
                }
            }

            state.advance(ServerState::Stopping);
            state.advance(ServerState::Terminated);
            info!(address = %address, "gRPC server terminated");
        })
    }

    /// 请求优雅关闭，立即返回
    ///
    /// 非 `Running` 状态下为空操作，可重复调用。
    pub fn shutdown(&self) -> bool {
        self.shutdown_trigger().shutdown()
    }

    /// 获取可跨线程使用的关闭触发器
    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        ShutdownTrigger::new(self.state.clone())
    }

    /// 等待服务器到达 `Terminated`
    ///
    /// 服务器从未启动时立即返回。
    pub async fn await_termination(&self) -> Result<()> {
        if self.state.current() < ServerState::Running {
            return Ok(());
        }
        self.state
            .wait_until(ServerState::Terminated)
            .await
            .map_err(|e| ServerError::ShutdownInterrupted(e.to_string()))
    }

    /// 等待监督任务结束
    pub async fn join_supervisor(&mut self) -> Result<()> {
        match self.supervisor.take() {
            Some(supervisor) => supervisor
                .await
                .map_err(|e| ServerError::ShutdownInterrupted(e.to_string())),
            None => Ok(()),
        }
    }

    pub fn state(&self) -> ServerState {
        self.state.current()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// 已注册的服务名，按注册顺序
    pub fn service_names(&self) -> &[String] {
        &self.services
    }

    /// 是否已生成监督任务
    pub fn has_supervisor(&self) -> bool {
        self.supervisor.is_some()
    }

    fn expect_state(&self, operation: &'static str, expected: ServerState) -> Result<()> {
        let state = self.state.current();
        if state == expected {
            Ok(())
        } else {
            Err(ServerError::InvalidState { operation, state })
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if self.state.current() == ServerState::Running {
            self.shutdown();
        }
    }
}
