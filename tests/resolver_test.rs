//! 绑定解析测试
//!
//! 覆盖策略优先级、显式外部类型与约定查找的取舍、以及解析失败信息。

mod common;

use std::sync::Arc;

use common::{
    EchoService, Greeter, GreeterServer, GreeterService, echo_outer_type, greeter_outer_type,
};
use grpc_server_runner::{
    BinderCatalog, BinderFn, BindingResolver, ErrorCode, OuterType, ResolutionStrategy,
    ServerError, ServiceCandidate, ServiceDefinition, TypeRef,
};
use tokio_test::{assert_err, assert_ok};

fn catalog() -> BinderCatalog {
    BinderCatalog::new()
        .with(greeter_outer_type())
        .with(echo_outer_type())
}

fn resolver() -> BindingResolver {
    BindingResolver::new().with_convention(catalog())
}

#[test]
fn strategies_follow_fixed_priority() {
    assert_eq!(
        resolver().strategies(),
        vec![
            ResolutionStrategy::Direct,
            ResolutionStrategy::ExplicitOuterType,
            ResolutionStrategy::Convention,
        ]
    );
    assert_eq!(
        BindingResolver::new().strategies(),
        vec![ResolutionStrategy::Direct, ResolutionStrategy::ExplicitOuterType]
    );
}

#[test]
fn direct_capability_wins_over_convention() {
    let candidate =
        ServiceCandidate::bindable(Arc::new(GreeterService)).with_contract::<dyn Greeter>();

    let binding = assert_ok!(resolver().resolve(&candidate));
    assert_eq!(binding.name(), "Greeter");
    assert_eq!(binding.strategy(), ResolutionStrategy::Direct);
}

#[test]
fn direct_binding_wraps_host_instance() {
    let host = Arc::new(GreeterService);
    let candidate = ServiceCandidate::bindable(host.clone());
    // 宿主、候选实例、直接绑定能力各持有一份
    assert_eq!(Arc::strong_count(&host), 3);

    let binding = assert_ok!(BindingResolver::new().resolve(&candidate));
    assert_eq!(binding.strategy(), ResolutionStrategy::Direct);
    assert_eq!(Arc::strong_count(&host), 4);

    drop(binding);
    assert_eq!(Arc::strong_count(&host), 3);
    assert!(Arc::ptr_eq(
        &candidate.instance(),
        &(host.clone() as Arc<dyn std::any::Any + Send + Sync>)
    ));
}

#[test]
fn direct_capability_wins_over_explicit_outer_type() {
    let candidate = ServiceCandidate::bindable(Arc::new(GreeterService))
        .with_outer_type(greeter_outer_type());

    let binding = assert_ok!(resolver().resolve(&candidate));
    assert_eq!(binding.strategy(), ResolutionStrategy::Direct);
}

#[test]
fn explicit_outer_type_resolves_without_catalog() {
    let candidate = ServiceCandidate::new(Arc::new(GreeterService))
        .with_contract::<dyn Greeter>()
        .with_outer_type(greeter_outer_type());

    let binding = assert_ok!(BindingResolver::new().resolve(&candidate));
    assert_eq!(binding.name(), "Greeter");
    assert_eq!(binding.strategy(), ResolutionStrategy::ExplicitOuterType);
    assert!(binding.candidate_type().ends_with("GreeterService"));
}

#[test]
fn convention_lookup_uses_contract_name_and_suffix() {
    let candidate = ServiceCandidate::new(Arc::new(GreeterService)).with_contract::<dyn Greeter>();

    let binding = assert_ok!(resolver().resolve(&candidate));
    assert_eq!(binding.name(), "Greeter");
    assert_eq!(binding.strategy(), ResolutionStrategy::Convention);
    assert_eq!(
        BinderCatalog::conventional_name(&TypeRef::of::<dyn Greeter>()),
        "GreeterServer"
    );
}

#[test]
fn convention_requires_enabled_fallback() {
    let candidate = ServiceCandidate::new(Arc::new(GreeterService)).with_contract::<dyn Greeter>();

    let err = assert_err!(BindingResolver::new().resolve(&candidate));
    assert_eq!(err.code(), ErrorCode::BinderNotFound);
}

#[test]
fn explicit_reference_disables_convention_lookup() {
    // 声明的外部类型没有匹配函数，即便目录中存在可用的 GreeterServer 也不回退
    let candidate = ServiceCandidate::new(Arc::new(GreeterService))
        .with_contract::<dyn Greeter>()
        .with_outer_type(echo_outer_type());

    let err = assert_err!(resolver().resolve(&candidate));
    match err {
        ServerError::Resolution {
            candidate_type,
            searched,
            reason,
        } => {
            assert!(candidate_type.ends_with("GreeterService"));
            assert_eq!(searched.as_deref(), Some("EchoServer"));
            assert!(reason.contains("convention lookup skipped"));
            assert!(reason.contains("generated alongside"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn binder_must_be_conventional_one_parameter_function() {
    let greeter = TypeRef::of::<GreeterService>();
    let outer = OuterType::new("GreeterServer")
        .with_function(BinderFn::new("new", |service: Arc<GreeterService>| {
            ServiceDefinition::new(GreeterServer::from_arc(service))
        }))
        .with_function(BinderFn::with_params(
            "bind_service",
            vec![greeter, greeter],
            |_| None,
        ))
        .with_function(BinderFn::with_params("bind_service", vec![], |_| None));
    let candidate = ServiceCandidate::new(Arc::new(GreeterService)).with_outer_type(outer);

    let err = assert_err!(BindingResolver::new().resolve(&candidate));
    let message = err.to_string();
    assert!(message.contains("GreeterService"), "{message}");
    assert!(message.contains("searched: GreeterServer"), "{message}");
}

#[test]
fn binder_accepts_declared_contract_parameter() {
    let outer = OuterType::new("GreeterServer").with_function(BinderFn::with_params(
        "bind_service",
        vec![TypeRef::of::<dyn Greeter>()],
        |instance| {
            instance
                .downcast::<GreeterService>()
                .ok()
                .map(|service| ServiceDefinition::new(GreeterServer::from_arc(service)))
        },
    ));
    let candidate = ServiceCandidate::new(Arc::new(GreeterService))
        .with_contract::<dyn Greeter>()
        .with_outer_type(outer);

    let binding = assert_ok!(BindingResolver::new().resolve(&candidate));
    assert_eq!(binding.name(), "Greeter");
}

#[test]
fn binder_rejecting_instance_counts_as_no_match() {
    // 参数类型声明为 Greeter 契约，但调用时只接受 EchoService
    let outer = OuterType::new("GreeterServer").with_function(BinderFn::with_params(
        "bind_service",
        vec![TypeRef::of::<dyn Greeter>()],
        |instance| {
            instance
                .downcast::<EchoService>()
                .ok()
                .and_then(|_| None)
        },
    ));
    let candidate = ServiceCandidate::new(Arc::new(GreeterService))
        .with_contract::<dyn Greeter>()
        .with_outer_type(outer);

    let err = assert_err!(BindingResolver::new().resolve(&candidate));
    assert!(err.to_string().contains("rejected instance"));
}

#[test]
fn unmatched_candidate_without_metadata_reports_type_only() {
    let candidate = ServiceCandidate::new(Arc::new(GreeterService));

    let err = assert_err!(resolver().resolve(&candidate));
    match &err {
        ServerError::Resolution {
            candidate_type,
            searched,
            ..
        } => {
            assert!(candidate_type.ends_with("GreeterService"));
            assert!(searched.is_none());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_fatal());
}

#[test]
fn resolve_all_yields_one_binding_per_candidate() {
    let candidates = vec![
        ServiceCandidate::new(Arc::new(GreeterService)).with_outer_type(greeter_outer_type()),
        ServiceCandidate::new(Arc::new(EchoService)).with_outer_type(echo_outer_type()),
    ];

    let bindings = assert_ok!(resolver().resolve_all(&candidates));
    let names: Vec<&str> = bindings.iter().map(|b| b.name()).collect();
    assert_eq!(names, vec!["Greeter", "Echo"]);
}

#[test]
fn resolve_all_is_all_or_nothing() {
    let candidates = vec![
        ServiceCandidate::new(Arc::new(GreeterService)).with_outer_type(greeter_outer_type()),
        ServiceCandidate::new(Arc::new(EchoService)),
    ];

    let err = assert_err!(resolver().resolve_all(&candidates));
    assert!(err.to_string().contains("EchoService"));
}
