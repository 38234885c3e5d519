//! 解析失败时启动中止，不占用端口

mod common;

use std::sync::Arc;

use common::{Greeter, GreeterService};
use grpc_server_runner::{
    ApplicationRegistry, ErrorCode, GrpcServerConfig, GrpcServerRunner, GrpcServiceMarker,
    RegisteredObject, ServerError, ServerState,
};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn unresolvable_candidate_aborts_startup() {
    // 仅声明契约，没有外部类型，约定查找也关闭
    let registry = ApplicationRegistry::new().with(
        RegisteredObject::new("greeterService", Arc::new(GreeterService))
            .with_marker(GrpcServiceMarker::new().contract::<dyn Greeter>()),
    );
    let config = GrpcServerConfig::default()
        .with_address("127.0.0.1")
        .with_convention_fallback(false);

    let mut runner = assert_ok!(GrpcServerRunner::new(config, registry));
    let err = assert_err!(runner.run().await);

    assert_eq!(err.code(), ErrorCode::BinderNotFound);
    match &err {
        ServerError::Resolution { candidate_type, .. } => {
            assert!(candidate_type.ends_with("GreeterService"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(runner.state(), ServerState::Created);
    assert!(!runner.handle().has_supervisor());
    assert!(runner.handle().local_addr().is_none());

    // 端口从未被占用
    let probe = std::net::TcpListener::bind(("127.0.0.1", 6565));
    assert!(probe.is_ok(), "port 6565 should be free: {probe:?}");

    // 失败后销毁为空操作
    runner.destroy();
    assert_eq!(runner.state(), ServerState::Created);
}
