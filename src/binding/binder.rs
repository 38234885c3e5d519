//! 绑定函数与外部类型
//!
//! 生成代码为每个服务契约提供一个"外部类型"（tonic 中即 `XxxServer`），
//! 其上挂载若干静态绑定函数。这里以显式注册的函数表代替运行时反射。

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::ServiceDefinition;
use crate::discovery::ServiceCandidate;
use crate::types::TypeRef;

/// 约定的绑定函数名
pub const BIND_SERVICE_FN: &str = "bind_service";

/// 约定的外部类型名后缀（tonic 生成 `GreeterServer` 持有 `Greeter` 契约）
pub const OUTER_TYPE_SUFFIX: &str = "Server";

type BindCall = dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<ServiceDefinition> + Send + Sync;

/// 外部类型上的静态绑定函数
#[derive(Clone)]
pub struct BinderFn {
    name: &'static str,
    params: Vec<TypeRef>,
    call: Arc<BindCall>,
}

impl BinderFn {
    /// 创建单参数绑定函数，参数类型为具体实现类型 `T`
    pub fn new<T, F>(name: &'static str, bind: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arc<T>) -> ServiceDefinition + Send + Sync + 'static,
    {
        Self {
            name,
            params: vec![TypeRef::of::<T>()],
            call: Arc::new(move |instance: Arc<dyn Any + Send + Sync>| {
                instance.downcast::<T>().ok().map(&bind)
            }),
        }
    }

    /// 创建约定名称（`bind_service`）的单参数绑定函数
    pub fn bind_service<T, F>(bind: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arc<T>) -> ServiceDefinition + Send + Sync + 'static,
    {
        Self::new(BIND_SERVICE_FN, bind)
    }

    /// 使用任意参数列表创建绑定函数
    ///
    /// `call` 返回 `None` 表示实例不能被此函数接受。
    pub fn with_params<F>(name: &'static str, params: Vec<TypeRef>, call: F) -> Self
    where
        F: Fn(Arc<dyn Any + Send + Sync>) -> Option<ServiceDefinition> + Send + Sync + 'static,
    {
        Self {
            name,
            params,
            call: Arc::new(call),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// 名称为 `bind_service`、恰好一个参数且候选可赋值给该参数
    pub fn accepts(&self, candidate: &ServiceCandidate) -> bool {
        self.name == BIND_SERVICE_FN
            && self.params.len() == 1
            && candidate.is_assignable_to(&self.params[0])
    }

    pub fn invoke(&self, candidate: &ServiceCandidate) -> Option<ServiceDefinition> {
        (self.call)(candidate.instance())
    }
}

impl fmt::Debug for BinderFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinderFn")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// 生成的外部类型（绑定函数持有者）
#[derive(Debug, Clone)]
pub struct OuterType {
    name: String,
    functions: Vec<BinderFn>,
}

impl OuterType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn with_function(mut self, function: BinderFn) -> Self {
        self.functions.push(function);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn functions(&self) -> &[BinderFn] {
        &self.functions
    }

    /// 按声明顺序查找第一个接受该候选的绑定函数
    pub fn find_binder(&self, candidate: &ServiceCandidate) -> Option<&BinderFn> {
        self.functions.iter().find(|f| f.accepts(candidate))
    }
}

/// 外部类型目录
///
/// 约定查找（契约名 + `Server` 后缀）使用的构建期映射。
#[derive(Debug, Clone, Default)]
pub struct BinderCatalog {
    outer_types: HashMap<String, Arc<OuterType>>,
}

impl BinderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册外部类型，同名覆盖
    pub fn register(&mut self, outer_type: impl Into<Arc<OuterType>>) -> &mut Self {
        let outer_type = outer_type.into();
        if let Some(previous) = self
            .outer_types
            .insert(outer_type.name().to_string(), outer_type)
        {
            warn!(outer_type = %previous.name(), "Outer type replaced in binder catalog");
        }
        self
    }

    pub fn with(mut self, outer_type: impl Into<Arc<OuterType>>) -> Self {
        self.register(outer_type);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<OuterType>> {
        self.outer_types.get(name)
    }

    /// 按约定查找契约对应的外部类型名
    pub fn conventional_name(contract: &TypeRef) -> String {
        format!("{}{}", contract.simple_name(), OUTER_TYPE_SUFFIX)
    }

    pub fn len(&self) -> usize {
        self.outer_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outer_types.is_empty()
    }
}
