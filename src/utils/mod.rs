//! 工具函数模块

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::debug;

/// 等待地址可以接受 TCP 连接
///
/// 使用指数退避重试连接，`deadline` 内成功返回 `true`。
/// 适用于探测已启动的 gRPC 监听器，例如宿主的就绪检查。
pub async fn wait_for_server_ready(address: SocketAddr, deadline: Duration) -> bool {
    const INITIAL_DELAY_MS: u64 = 20;
    const MAX_DELAY_MS: u64 = 500;

    let start = Instant::now();
    let mut delay_ms = INITIAL_DELAY_MS;
    let mut attempt = 0u32;

    while start.elapsed() < deadline {
        attempt += 1;
        match timeout(Duration::from_millis(100), TcpStream::connect(address)).await {
            Ok(Ok(_)) => {
                debug!(
                    address = %address,
                    attempts = attempt,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Server is ready"
                );
                return true;
            }
            Ok(Err(e)) => {
                debug!(address = %address, attempt, error = %e, "Connection attempt failed, retrying...");
            }
            Err(_) => {
                debug!(address = %address, attempt, "Connection attempt timed out, retrying...");
            }
        }

        sleep(Duration::from_millis(delay_ms)).await;
        delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
    }

    false
}
