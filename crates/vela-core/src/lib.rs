//! vela-core: núcleo de orquestación con compensación (undo) LIFO.
//!
//! El core sólo conoce tres cosas de sus colaboradores:
//! - un `Service` que devuelve `ServiceResponse` normalizadas,
//! - un `PayloadGenerator` para payloads por defecto,
//! - un `LogSink` donde delegar la emisión de logs.
//!
//! Todo lo demás (transporte HTTP, auth, parsing de config) vive en
//! `vela-adapters`.
pub mod context;
pub mod errors;
pub mod generator;
pub mod logging;
pub mod model;
pub mod service;
pub mod session;
pub mod task;

pub use context::{ExecutionContext, Phase, ScopeKind};
pub use errors::CoreError;
pub use generator::{GeneratorRegistry, PayloadGenerator};
pub use logging::{BufferSink, LogSink, StdLogSink};
pub use model::{AuthInfo, ServiceResponse};
pub use service::Service;
pub use session::Session;
pub use task::{Task, TaskOutcome, TaskRef, TaskState, MSG_UNDONE, UNNAMED_ARTIFACT};
