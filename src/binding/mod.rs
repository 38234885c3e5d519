//! 服务绑定模块
//!
//! 将类型化的服务实现转换为监听器可直接注册的协议定义：
//! - [`ServiceDefinition`]：擦除类型后的 tonic 服务
//! - [`BindableService`]：服务自身即可产出协议定义（直接绑定能力）
//! - [`BinderFn`] / [`OuterType`] / [`BinderCatalog`]：生成代码提供的绑定函数映射

pub mod binder;

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use tonic::body::Body;
use tonic::server::NamedService;
use tonic::service::RoutesBuilder;
use tower::Service;

use crate::resolver::ResolutionStrategy;

pub use binder::{BIND_SERVICE_FN, BinderCatalog, BinderFn, OUTER_TYPE_SUFFIX, OuterType};

type Install = Box<dyn FnOnce(&mut RoutesBuilder) + Send>;

/// 协议层服务定义
///
/// 包装任意 tonic 生成的 `XxxServer<T>`（或手写的 tower 服务），
/// 在配置阶段安装到路由表中。
pub struct ServiceDefinition {
    name: String,
    install: Install,
}

impl ServiceDefinition {
    /// 从 tonic 服务创建定义，名称取自 `NamedService::NAME`
    pub fn new<S>(service: S) -> Self
    where
        S: Service<http::Request<Body>, Response = http::Response<Body>, Error = Infallible>
            + NamedService
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        Self {
            name: S::NAME.to_string(),
            install: Box::new(move |routes: &mut RoutesBuilder| {
                routes.add_service(service);
            }),
        }
    }

    /// 服务全名，例如 `helloworld.Greeter`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn install(self, routes: &mut RoutesBuilder) {
        (self.install)(routes)
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// 直接绑定能力
///
/// 实现此 trait 的服务无需外部绑定函数，解析时优先使用。
/// 接收宿主持有的同一个实例，产出的协议定义应直接包装它。
pub trait BindableService: Send + Sync {
    fn bind_service(self: Arc<Self>) -> ServiceDefinition;
}

/// 已解析的服务绑定
///
/// 每个候选服务恰好产出一个，配置后由 `ServerHandle` 持有直到关闭。
#[derive(Debug)]
pub struct ServiceBinding {
    name: String,
    definition: ServiceDefinition,
    strategy: ResolutionStrategy,
    candidate_type: &'static str,
}

impl ServiceBinding {
    pub fn new(
        definition: ServiceDefinition,
        strategy: ResolutionStrategy,
        candidate_type: &'static str,
    ) -> Self {
        Self {
            name: definition.name().to_string(),
            definition,
            strategy,
            candidate_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 产出此绑定的解析策略
    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    pub fn candidate_type(&self) -> &'static str {
        self.candidate_type
    }

    pub fn definition(&self) -> &ServiceDefinition {
        &self.definition
    }

    pub(crate) fn into_definition(self) -> ServiceDefinition {
        self.definition
    }
}
