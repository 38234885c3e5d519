//! 应用对象注册表
//!
//! 宿主进程内的对象容器。带有 [`GrpcServiceMarker`] 的对象会被发现为候选服务。

use std::any::Any;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{ServiceCandidate, ServiceDiscovery};
use crate::binding::{BindableService, OuterType};
use crate::types::TypeRef;

/// gRPC 服务标记
///
/// 声明对象是可注册的 RPC 服务，可选携带生成的外部类型引用。
#[derive(Debug, Clone, Default)]
pub struct GrpcServiceMarker {
    outer_type: Option<Arc<OuterType>>,
    contracts: Vec<TypeRef>,
}

impl GrpcServiceMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outer_type(mut self, outer_type: impl Into<Arc<OuterType>>) -> Self {
        self.outer_type = Some(outer_type.into());
        self
    }

    pub fn contract<C: ?Sized + 'static>(mut self) -> Self {
        self.contracts.push(TypeRef::of::<C>());
        self
    }
}

/// 注册表中的应用对象
pub struct RegisteredObject {
    name: String,
    type_ref: TypeRef,
    instance: Arc<dyn Any + Send + Sync>,
    bindable: Option<Arc<dyn BindableService>>,
    marker: Option<GrpcServiceMarker>,
}

impl RegisteredObject {
    pub fn new<T: Any + Send + Sync>(name: impl Into<String>, instance: Arc<T>) -> Self {
        Self {
            name: name.into(),
            type_ref: TypeRef::of::<T>(),
            instance,
            bindable: None,
            marker: None,
        }
    }

    /// 具备直接绑定能力的对象
    pub fn bindable<T: BindableService + Any>(name: impl Into<String>, instance: Arc<T>) -> Self {
        let bindable: Arc<dyn BindableService> = instance.clone();
        Self {
            bindable: Some(bindable),
            ..Self::new(name, instance)
        }
    }

    pub fn with_marker(mut self, marker: GrpcServiceMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }

    fn to_candidate(&self) -> Option<ServiceCandidate> {
        let marker = self.marker.as_ref()?;
        let candidate = ServiceCandidate::from_parts(
            self.name.clone(),
            self.type_ref,
            self.instance.clone(),
            self.bindable.clone(),
        )
        .with_contracts(&marker.contracts)
        .with_outer_type_opt(marker.outer_type.clone());
        Some(candidate)
    }
}

/// 应用对象注册表
#[derive(Default)]
pub struct ApplicationRegistry {
    objects: Vec<RegisteredObject>,
}

impl ApplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册对象，同名对象会被替换
    pub fn register(&mut self, object: RegisteredObject) -> &mut Self {
        if let Some(pos) = self.objects.iter().position(|o| o.name == object.name) {
            warn!(object = %object.name, "Application object replaced in registry");
            self.objects[pos] = object;
        } else {
            debug!(object = %object.name, marked = object.is_marked(), "Application object registered");
            self.objects.push(object);
        }
        self
    }

    pub fn with(mut self, object: RegisteredObject) -> Self {
        self.register(object);
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ServiceDiscovery for ApplicationRegistry {
    fn discover(&self) -> Vec<ServiceCandidate> {
        self.objects
            .iter()
            .filter_map(RegisteredObject::to_candidate)
            .collect()
    }
}
