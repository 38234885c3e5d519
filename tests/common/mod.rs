//! 测试公共工具
//!
//! 手写的 tower 服务模拟 tonic 生成的 `XxxServer<T>`，避免依赖 proto 代码生成。

#![allow(dead_code)]

use std::convert::Infallible;
use std::future::{Ready, ready};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::task::{Context, Poll};

use grpc_server_runner::{
    BindableService, BinderFn, ListenerOptions, OuterType, ServiceDefinition,
};
use http::HeaderValue;
use tonic::body::Body;
use tonic::server::NamedService;
use tower::Service;

/// 所有测试服务对任何调用返回 UNIMPLEMENTED
fn unimplemented_response() -> http::Response<Body> {
    let mut response = http::Response::new(Body::empty());
    let headers = response.headers_mut();
    headers.insert("content-type", HeaderValue::from_static("application/grpc"));
    headers.insert("grpc-status", HeaderValue::from_static("12"));
    response
}

macro_rules! stub_server {
    ($server:ident, $contract:ident, $name:literal) => {
        pub struct $server<T> {
            inner: Arc<T>,
        }

        impl<T: $contract> $server<T> {
            pub fn from_arc(inner: Arc<T>) -> Self {
                Self { inner }
            }
        }

        impl<T> Clone for $server<T> {
            fn clone(&self) -> Self {
                Self {
                    inner: self.inner.clone(),
                }
            }
        }

        impl<T> NamedService for $server<T> {
            const NAME: &'static str = $name;
        }

        impl<T: $contract> Service<http::Request<Body>> for $server<T> {
            type Response = http::Response<Body>;
            type Error = Infallible;
            type Future = Ready<Result<Self::Response, Self::Error>>;

            fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
                Poll::Ready(Ok(()))
            }

            fn call(&mut self, _req: http::Request<Body>) -> Self::Future {
                ready(Ok(unimplemented_response()))
            }
        }
    };
}

/// Greeter 服务契约
pub trait Greeter: Send + Sync + 'static {
    fn say_hello(&self, name: &str) -> String;
}

/// Echo 服务契约
pub trait Echo: Send + Sync + 'static {
    fn echo(&self, message: &str) -> String;
}

stub_server!(GreeterServer, Greeter, "Greeter");
stub_server!(EchoServer, Echo, "Echo");

#[derive(Debug, Default)]
pub struct GreeterService;

impl Greeter for GreeterService {
    fn say_hello(&self, name: &str) -> String {
        format!("Hello {name}")
    }
}

impl BindableService for GreeterService {
    fn bind_service(self: Arc<Self>) -> ServiceDefinition {
        ServiceDefinition::new(GreeterServer::from_arc(self))
    }
}

#[derive(Debug, Default)]
pub struct EchoService;

impl Echo for EchoService {
    fn echo(&self, message: &str) -> String {
        message.to_string()
    }
}

/// 第二个 Greeter 实现，用于制造重复服务名
#[derive(Debug, Default)]
pub struct LoudGreeterService;

impl Greeter for LoudGreeterService {
    fn say_hello(&self, name: &str) -> String {
        format!("HELLO {}", name.to_uppercase())
    }
}

/// 模拟生成的 `GreeterServer` 外部类型
pub fn greeter_outer_type() -> OuterType {
    OuterType::new("GreeterServer").with_function(BinderFn::bind_service(
        |service: Arc<GreeterService>| ServiceDefinition::new(GreeterServer::from_arc(service)),
    ))
}

pub fn loud_greeter_outer_type() -> OuterType {
    OuterType::new("LoudGreeterServer").with_function(BinderFn::bind_service(
        |service: Arc<LoudGreeterService>| {
            ServiceDefinition::new(GreeterServer::from_arc(service))
        },
    ))
}

pub fn echo_outer_type() -> OuterType {
    OuterType::new("EchoServer").with_function(BinderFn::bind_service(
        |service: Arc<EchoService>| ServiceDefinition::new(EchoServer::from_arc(service)),
    ))
}

/// 仅监听本地回环地址
pub fn loopback_options() -> ListenerOptions {
    ListenerOptions::new().address(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
