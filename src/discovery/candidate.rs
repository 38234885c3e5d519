//! 候选服务定义

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::binding::{BindableService, OuterType};
use crate::types::TypeRef;

/// 候选服务
///
/// 宿主在启动时创建；克隆只共享底层实例，宿主仍然持有对象本身。
#[derive(Clone)]
pub struct ServiceCandidate {
    name: String,
    type_ref: TypeRef,
    instance: Arc<dyn Any + Send + Sync>,
    contracts: Vec<TypeRef>,
    bindable: Option<Arc<dyn BindableService>>,
    outer_type: Option<Arc<OuterType>>,
}

impl ServiceCandidate {
    /// 从服务实例创建候选，名称默认取类型简单名
    pub fn new<T: Any + Send + Sync>(instance: Arc<T>) -> Self {
        let type_ref = TypeRef::of::<T>();
        Self {
            name: type_ref.simple_name().to_string(),
            type_ref,
            instance,
            contracts: Vec::new(),
            bindable: None,
            outer_type: None,
        }
    }

    /// 从具备直接绑定能力的实例创建候选
    pub fn bindable<T: BindableService + Any>(instance: Arc<T>) -> Self {
        let bindable: Arc<dyn BindableService> = instance.clone();
        Self {
            bindable: Some(bindable),
            ..Self::new(instance)
        }
    }

    pub(crate) fn from_parts(
        name: String,
        type_ref: TypeRef,
        instance: Arc<dyn Any + Send + Sync>,
        bindable: Option<Arc<dyn BindableService>>,
    ) -> Self {
        Self {
            name,
            type_ref,
            instance,
            contracts: Vec::new(),
            bindable,
            outer_type: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 声明实现的服务契约（通常为 `dyn Trait`）
    pub fn with_contract<C: ?Sized + 'static>(mut self) -> Self {
        self.contracts.push(TypeRef::of::<C>());
        self
    }

    pub(crate) fn with_contracts(mut self, contracts: &[TypeRef]) -> Self {
        self.contracts.extend_from_slice(contracts);
        self
    }

    /// 显式声明生成的外部类型
    pub fn with_outer_type(mut self, outer_type: impl Into<Arc<OuterType>>) -> Self {
        self.outer_type = Some(outer_type.into());
        self
    }

    pub(crate) fn with_outer_type_opt(mut self, outer_type: Option<Arc<OuterType>>) -> Self {
        self.outer_type = outer_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    /// 具体类型全名，用于错误信息
    pub fn type_name(&self) -> &'static str {
        self.type_ref.name()
    }

    pub fn contracts(&self) -> &[TypeRef] {
        &self.contracts
    }

    pub fn bindable_service(&self) -> Option<&Arc<dyn BindableService>> {
        self.bindable.as_ref()
    }

    pub fn outer_type(&self) -> Option<&Arc<OuterType>> {
        self.outer_type.as_ref()
    }

    pub fn instance(&self) -> Arc<dyn Any + Send + Sync> {
        self.instance.clone()
    }

    /// 候选能否作为参数类型 `param` 传入
    pub fn is_assignable_to(&self, param: &TypeRef) -> bool {
        self.type_ref == *param || self.contracts.contains(param)
    }
}

impl fmt::Debug for ServiceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCandidate")
            .field("name", &self.name)
            .field("type", &self.type_ref)
            .field("contracts", &self.contracts)
            .field("bindable", &self.bindable.is_some())
            .field("outer_type", &self.outer_type.as_ref().map(|o| o.name()))
            .finish()
    }
}
