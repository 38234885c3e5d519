//! 服务器生命周期状态

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

/// 服务器状态
///
/// `Created → Configured → Running → Stopping → Terminated`，只能向前推进。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServerState {
    Created,
    Configured,
    Running,
    Stopping,
    Terminated,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerState::Created => write!(f, "Created"),
            ServerState::Configured => write!(f, "Configured"),
            ServerState::Running => write!(f, "Running"),
            ServerState::Stopping => write!(f, "Stopping"),
            ServerState::Terminated => write!(f, "Terminated"),
        }
    }
}

/// 共享状态单元
///
/// 唯一的共享可变状态；监听器的关闭信号和监督任务都通过订阅它来观察状态变化。
#[derive(Debug, Clone)]
pub(crate) struct StateCell(Arc<watch::Sender<ServerState>>);

impl StateCell {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(ServerState::Created);
        Self(Arc::new(tx))
    }

    pub(crate) fn current(&self) -> ServerState {
        *self.0.borrow()
    }

    /// 仅当当前状态为 `from` 时切换到 `to`
    pub(crate) fn transition(&self, from: ServerState, to: ServerState) -> bool {
        debug_assert!(to > from);
        self.0.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    /// 向前推进到 `to`，已经越过则不变
    pub(crate) fn advance(&self, to: ServerState) -> bool {
        self.0.send_if_modified(|state| {
            if to > *state {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.0.subscribe()
    }

    /// 等待状态到达或越过 `target`
    pub(crate) async fn wait_until(
        &self,
        target: ServerState,
    ) -> Result<(), watch::error::RecvError> {
        let mut rx = self.subscribe();
        rx.wait_for(|state| *state >= target).await.map(|_| ())
    }
}

/// 关闭触发器
///
/// 可跨线程克隆，供宿主的销毁钩子在监督任务阻塞时并发调用。
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    state: StateCell,
}

impl ShutdownTrigger {
    pub(crate) fn new(state: StateCell) -> Self {
        Self { state }
    }

    /// 请求优雅关闭，立即返回
    ///
    /// 只有 `Running` 状态会切换到 `Stopping`；其他状态下为空操作。
    /// 返回本次调用是否发起了关闭。
    pub fn shutdown(&self) -> bool {
        if self
            .state
            .transition(ServerState::Running, ServerState::Stopping)
        {
            info!("gRPC server stopping, draining in-flight calls");
            true
        } else {
            debug!(state = %self.state.current(), "Shutdown ignored, server is not running");
            false
        }
    }

    pub fn state(&self) -> ServerState {
        self.state.current()
    }
}
