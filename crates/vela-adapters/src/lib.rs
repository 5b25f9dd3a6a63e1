//! vela-adapters: colaboradores concretos del harness.
//!
//! - `rest`: cliente REST genérico por recurso (una sola implementación para
//!   networks, subnets, ...).
//! - `auth`: adquisición del token de autenticación.
//! - `config`: carga y validación de configuración (TOML o entorno).
//! - `generators`: payloads por defecto para tasks de creación.
//! - `tasks`: tasks concretos de networking sobre el core.
pub mod auth;
pub mod config;
pub mod errors;
pub mod generators;
pub mod rest;
pub mod tasks;

pub use auth::{authenticate, ApiKeyCredentials, AuthMethod};
pub use config::{AuthConfig, HarnessConfig, ServiceEndpoint};
pub use errors::AdapterError;
pub use generators::{NetworkGenerator, SubnetGenerator};
pub use rest::RestService;
