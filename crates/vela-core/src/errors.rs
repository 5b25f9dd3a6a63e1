//! Errores del núcleo (simples por ahora).
//!
//! Los fallos "esperables" de un task (status distinto al esperado) NO pasan
//! por aquí: se registran en su `TaskOutcome` y en el log. `CoreError` queda
//! reservado para fallos de programación/colaboradores (servicio desconocido,
//! transporte caído, artifact ausente o ambiguo).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("no artifact stored under ['{0}']")] MissingArtifact(String),
    #[error("ambiguous retrieve for artifact ['{0}']: {1} stored")] AmbiguousArtifact(String, usize),
    #[error("unknown service '{0}'")] UnknownService(String),
    #[error("no payload generator registered for '{0}'")] MissingGenerator(String),
    #[error("transport: {0}")] Transport(String),
    #[error("internal: {0}")] Internal(String),
}
