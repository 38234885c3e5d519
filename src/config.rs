use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};
use crate::server::ListenerOptions;

/// 默认 gRPC 端口
pub const DEFAULT_GRPC_PORT: u16 = 6565;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub grpc: GrpcServerConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GrpcServerConfig {
    pub port: u16,
    pub address: String,
    pub tcp_nodelay: bool,
    pub concurrency_limit_per_connection: Option<usize>,
    /// 未声明外部类型时是否按约定（契约名 + `Server`）查找绑定函数
    pub convention_fallback: bool,
}

impl Default for GrpcServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_GRPC_PORT,
            address: "0.0.0.0".to_string(),
            tcp_nodelay: true,
            concurrency_limit_per_connection: None,
            convention_fallback: true,
        }
    }
}

impl GrpcServerConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_convention_fallback(mut self, enabled: bool) -> Self {
        self.convention_fallback = enabled;
        self
    }

    pub fn ip_addr(&self) -> Result<IpAddr> {
        self.address.parse().map_err(|e| {
            ServerError::configuration(format!("invalid grpc.address '{}': {e}", self.address))
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(SocketAddr::new(self.ip_addr()?, self.port))
    }

    pub fn listener_options(&self) -> Result<ListenerOptions> {
        let mut options = ListenerOptions::new()
            .address(self.ip_addr()?)
            .tcp_nodelay(self.tcp_nodelay);
        if let Some(limit) = self.concurrency_limit_per_connection {
            options = options.concurrency_limit_per_connection(limit);
        }
        Ok(options)
    }
}

/// 运行器配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// 收到关闭信号后等待排空的时间（默认 5 秒）
    pub shutdown_timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 5,
        }
    }
}

impl RunnerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_file: bool,
    pub with_line_number: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: true,
            with_thread_ids: false,
            with_file: false,
            with_line_number: false,
        }
    }
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::configuration(format!("unable to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ServerError::configuration(format!("invalid config format: {e}")))
    }

    /// 应用环境变量覆盖：`GRPC_PORT`、`GRPC_ADDRESS`
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("GRPC_PORT") {
            self.grpc.port = port
                .trim()
                .parse()
                .map_err(|e| ServerError::configuration(format!("invalid GRPC_PORT '{port}': {e}")))?;
        }
        if let Some(address) = lookup("GRPC_ADDRESS") {
            self.grpc.address = address.trim().to_string();
            self.grpc.ip_addr()?;
        }
        Ok(())
    }

    /// 使用自定义查找函数应用覆盖（不读取进程环境）
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        self.apply_overrides(lookup)?;
        Ok(self)
    }
}
