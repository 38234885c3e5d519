//! 绑定解析模块
//!
//! 按固定优先级依次尝试各策略，第一个命中者胜出：
//! 1. 直接绑定（`BindableService`）
//! 2. 显式外部类型
//! 3. 约定查找（可选的次级回退，仅在未声明外部类型时生效）

pub mod strategy;

use std::sync::Arc;

use tracing::{debug, info};

use crate::binding::{BinderCatalog, ServiceBinding};
use crate::discovery::ServiceCandidate;
use crate::error::{Result, ServerError};

pub use strategy::{
    BindingStrategy, ConventionStrategy, DirectStrategy, ExplicitOuterTypeStrategy, NotFound,
    Resolution, ResolutionStrategy,
};

/// 绑定解析器
pub struct BindingResolver {
    strategies: Vec<Box<dyn BindingStrategy>>,
}

impl BindingResolver {
    /// 仅使用直接绑定和显式外部类型
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(DirectStrategy),
                Box::new(ExplicitOuterTypeStrategy),
            ],
        }
    }

    /// 追加约定查找作为最后的回退
    pub fn with_convention(mut self, catalog: impl Into<Arc<BinderCatalog>>) -> Self {
        self.strategies
            .push(Box::new(ConventionStrategy::new(catalog.into())));
        self
    }

    pub fn strategies(&self) -> Vec<ResolutionStrategy> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// 解析单个候选
    pub fn resolve(&self, candidate: &ServiceCandidate) -> Result<ServiceBinding> {
        let mut misses = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            match strategy.try_bind(candidate) {
                Resolution::Found(definition) => {
                    let binding =
                        ServiceBinding::new(definition, strategy.kind(), candidate.type_name());
                    info!(
                        service = %binding.name(),
                        candidate = %candidate.name(),
                        strategy = %strategy.kind(),
                        "gRPC service binding resolved"
                    );
                    return Ok(binding);
                }
                Resolution::NotFound(miss) => {
                    debug!(
                        candidate = %candidate.name(),
                        strategy = %miss.strategy,
                        reason = %miss.reason,
                        "Binding strategy did not match"
                    );
                    misses.push(miss);
                }
            }
        }

        Err(Self::resolution_error(candidate, &misses))
    }

    /// 解析全部候选，任一失败即整体失败
    pub fn resolve_all(&self, candidates: &[ServiceCandidate]) -> Result<Vec<ServiceBinding>> {
        candidates.iter().map(|c| self.resolve(c)).collect()
    }

    fn resolution_error(candidate: &ServiceCandidate, misses: &[NotFound]) -> ServerError {
        let searched: Vec<&str> = misses
            .iter()
            .flat_map(|m| m.searched.iter().map(String::as_str))
            .collect();
        let reason = misses
            .iter()
            .map(|m| format!("{}: {}", m.strategy, m.reason))
            .collect::<Vec<_>>()
            .join("; ");

        ServerError::resolution(
            candidate.type_name(),
            (!searched.is_empty()).then(|| searched.join(", ")),
            reason,
        )
    }
}

impl Default for BindingResolver {
    fn default() -> Self {
        Self::new()
    }
}
