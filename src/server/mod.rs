//! gRPC 服务端模块
//!
//! 提供监听器选项和服务器生命周期管理

pub mod handle;
pub mod state;

use std::net::{IpAddr, Ipv4Addr};

use tonic::transport::Server;

pub use handle::ServerHandle;
pub use state::{ServerState, ShutdownTrigger};

/// 监听器选项
#[derive(Debug, Clone)]
pub struct ListenerOptions {
    pub address: IpAddr,
    pub tcp_nodelay: bool,
    pub concurrency_limit_per_connection: Option<usize>,
}

impl ListenerOptions {
    pub fn new() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            tcp_nodelay: true,
            concurrency_limit_per_connection: None,
        }
    }

    pub fn address(mut self, address: IpAddr) -> Self {
        self.address = address;
        self
    }

    pub fn tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.tcp_nodelay = nodelay;
        self
    }

    pub fn concurrency_limit_per_connection(mut self, limit: usize) -> Self {
        self.concurrency_limit_per_connection = Some(limit);
        self
    }

    /// 构建 tonic 服务器
    pub fn builder(&self) -> Server {
        let mut server = Server::builder();

        if let Some(limit) = self.concurrency_limit_per_connection {
            server = server.concurrency_limit_per_connection(limit);
        }

        server
    }
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self::new()
    }
}
