use std::any::{TypeId, type_name};
use std::fmt;

/// 运行时类型引用
///
/// 记录具体类型或契约（trait object）类型的 `TypeId` 与完整名称，
/// 用于候选服务与绑定函数参数之间的匹配。
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    /// 获取类型 `T` 的引用（支持 `dyn Trait`）
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名称，例如 `app::service::GreeterService`
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 简单名称：去掉 `dyn ` 前缀、泛型参数和模块路径
    ///
    /// `dyn app::greeter_server::Greeter` -> `Greeter`
    pub fn simple_name(&self) -> &'static str {
        let name = self.name.strip_prefix("dyn ").unwrap_or(self.name);
        let name = name.split('<').next().unwrap_or(name);
        let name = name.split(" + ").next().unwrap_or(name);
        name.rsplit("::").next().unwrap_or(name)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
