//! 候选服务发现模块
//!
//! 两种来源：
//! - [`ApplicationRegistry`]：扫描宿主对象容器中带 [`GrpcServiceMarker`] 的对象
//! - [`StaticCandidates`]：由各模块显式构造候选并直接传入
//!
//! 发现过程没有副作用，也不会失败；结果为空时服务器以零个服务启动。

pub mod candidate;
pub mod registry;

pub use candidate::ServiceCandidate;
pub use registry::{ApplicationRegistry, GrpcServiceMarker, RegisteredObject};

/// 候选服务来源
pub trait ServiceDiscovery: Send + Sync {
    /// 返回所有被标记为 RPC 服务的候选
    fn discover(&self) -> Vec<ServiceCandidate>;
}

/// 显式注册的候选集合
#[derive(Debug, Clone, Default)]
pub struct StaticCandidates(Vec<ServiceCandidate>);

impl StaticCandidates {
    pub fn new(candidates: Vec<ServiceCandidate>) -> Self {
        Self(candidates)
    }

    pub fn push(&mut self, candidate: ServiceCandidate) -> &mut Self {
        self.0.push(candidate);
        self
    }

    pub fn with(mut self, candidate: ServiceCandidate) -> Self {
        self.0.push(candidate);
        self
    }
}

impl From<Vec<ServiceCandidate>> for StaticCandidates {
    fn from(candidates: Vec<ServiceCandidate>) -> Self {
        Self(candidates)
    }
}

impl ServiceDiscovery for StaticCandidates {
    fn discover(&self) -> Vec<ServiceCandidate> {
        self.0.clone()
    }
}
