//! 绑定解析策略
//!
//! 每个策略对候选返回带标签的 [`Resolution`]，不依赖错误展开控制流程。

use std::fmt;
use std::sync::Arc;

use crate::binding::{BIND_SERVICE_FN, BinderCatalog, OuterType, ServiceDefinition};
use crate::discovery::ServiceCandidate;

/// 解析策略种类（按优先级排列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResolutionStrategy {
    /// 候选自身实现 `BindableService`
    Direct,
    /// 候选标记中显式声明了外部类型
    ExplicitOuterType,
    /// 按契约名 + 后缀在目录中查找外部类型
    Convention,
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStrategy::Direct => write!(f, "direct"),
            ResolutionStrategy::ExplicitOuterType => write!(f, "explicit-outer-type"),
            ResolutionStrategy::Convention => write!(f, "convention"),
        }
    }
}

/// 单个策略未命中的原因
#[derive(Debug, Clone)]
pub struct NotFound {
    pub strategy: ResolutionStrategy,
    /// 实际搜索过的外部类型名
    pub searched: Vec<String>,
    pub reason: String,
}

impl NotFound {
    fn new(strategy: ResolutionStrategy, reason: impl Into<String>) -> Self {
        Self {
            strategy,
            searched: Vec::new(),
            reason: reason.into(),
        }
    }

    fn searched(mut self, searched: Vec<String>) -> Self {
        self.searched = searched;
        self
    }
}

/// 策略解析结果
#[derive(Debug)]
pub enum Resolution {
    Found(ServiceDefinition),
    NotFound(NotFound),
}

/// 绑定解析策略
pub trait BindingStrategy: Send + Sync {
    fn kind(&self) -> ResolutionStrategy;

    fn try_bind(&self, candidate: &ServiceCandidate) -> Resolution;
}

/// 直接绑定：候选实现了 `BindableService`
#[derive(Debug, Default)]
pub struct DirectStrategy;

impl BindingStrategy for DirectStrategy {
    fn kind(&self) -> ResolutionStrategy {
        ResolutionStrategy::Direct
    }

    fn try_bind(&self, candidate: &ServiceCandidate) -> Resolution {
        match candidate.bindable_service() {
            Some(service) => Resolution::Found(Arc::clone(service).bind_service()),
            None => Resolution::NotFound(NotFound::new(
                self.kind(),
                "does not implement BindableService",
            )),
        }
    }
}

/// 在外部类型上查找并调用匹配的绑定函数
fn bind_with(
    strategy: ResolutionStrategy,
    outer_type: &OuterType,
    candidate: &ServiceCandidate,
) -> Result<ServiceDefinition, String> {
    let binder = outer_type.find_binder(candidate).ok_or_else(|| {
        format!(
            "'{}' has no one-parameter '{}' function accepting '{}'",
            outer_type.name(),
            BIND_SERVICE_FN,
            candidate.type_name()
        )
    })?;

    binder.invoke(candidate).ok_or_else(|| {
        format!(
            "'{}::{}' rejected instance of '{}' ({})",
            outer_type.name(),
            binder.name(),
            candidate.type_name(),
            strategy
        )
    })
}

/// 显式外部类型：直接在声明的外部类型上查找绑定函数
#[derive(Debug, Default)]
pub struct ExplicitOuterTypeStrategy;

impl BindingStrategy for ExplicitOuterTypeStrategy {
    fn kind(&self) -> ResolutionStrategy {
        ResolutionStrategy::ExplicitOuterType
    }

    fn try_bind(&self, candidate: &ServiceCandidate) -> Resolution {
        let Some(outer_type) = candidate.outer_type() else {
            return Resolution::NotFound(NotFound::new(self.kind(), "no outer type declared"));
        };

        match bind_with(self.kind(), outer_type, candidate) {
            Ok(definition) => Resolution::Found(definition),
            Err(reason) => Resolution::NotFound(
                NotFound::new(self.kind(), reason).searched(vec![outer_type.name().to_string()]),
            ),
        }
    }
}

/// 约定查找：契约名 + `Server` 后缀
///
/// 仅在候选未声明外部类型时生效。
#[derive(Debug, Default)]
pub struct ConventionStrategy {
    catalog: Arc<BinderCatalog>,
}

impl ConventionStrategy {
    pub fn new(catalog: Arc<BinderCatalog>) -> Self {
        Self { catalog }
    }
}

impl BindingStrategy for ConventionStrategy {
    fn kind(&self) -> ResolutionStrategy {
        ResolutionStrategy::Convention
    }

    fn try_bind(&self, candidate: &ServiceCandidate) -> Resolution {
        if candidate.outer_type().is_some() {
            return Resolution::NotFound(NotFound::new(
                self.kind(),
                "explicit outer type declared, convention lookup skipped",
            ));
        }
        if candidate.contracts().is_empty() {
            return Resolution::NotFound(NotFound::new(self.kind(), "no contracts declared"));
        }

        let mut searched = Vec::new();
        let mut reasons = Vec::new();
        for contract in candidate.contracts() {
            let outer_name = BinderCatalog::conventional_name(contract);
            let Some(outer_type) = self.catalog.get(&outer_name) else {
                reasons.push(format!("no outer type '{outer_name}' for contract '{contract}'"));
                continue;
            };
            searched.push(outer_name);

            match bind_with(self.kind(), outer_type, candidate) {
                Ok(definition) => return Resolution::Found(definition),
                Err(reason) => reasons.push(reason),
            }
        }

        Resolution::NotFound(NotFound::new(self.kind(), reasons.join("; ")).searched(searched))
    }
}
