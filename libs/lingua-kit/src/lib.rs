#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Host glue shared by the Lingua server and its modules.
//!
//! - [`config`]: layered `AppConfig` (defaults, YAML, `APP__*` env, CLI)
//! - [`logging`]: `tracing-subscriber` setup
//! - [`api`]: operation builder, `OpenAPI` registry, error mapping
//! - [`auth`]: bearer-token middleware
//! - [`server`]: router assembly, middleware stack, graceful serve

pub mod api;
pub mod auth;
pub mod config;
pub mod docs;
pub mod health;
pub mod logging;
pub mod server;
pub mod signals;

pub use api::{OpenApiRegistry, OperationBuilder};
pub use auth::AuthContext;
pub use config::{AppConfig, CliOverrides, ConfigError};
pub use server::{RestHost, RestModule, serve};
pub use signals::wait_for_shutdown;
