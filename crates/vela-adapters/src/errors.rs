//! Errores de los colaboradores.
//!
//! Fatales por diseño: una configuración incompleta o una respuesta de auth
//! malformada se levantan en construcción y se propagan fuera del workflow;
//! el core nunca los captura.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("missing required information: {0}")] MissingRequiredInformation(String),
    #[error("parsing error: {0}")] Parsing(String),
    #[error("transport error: {0}")] Transport(#[from] reqwest::Error),
    #[error("io error: {0}")] Io(#[from] std::io::Error),
}
