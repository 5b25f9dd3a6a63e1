//! Respuesta normalizada de un servicio.
//!
//! Producida por los clientes de servicio, consumida por los tasks para
//! decidir éxito/fallo. Nunca se muta tras su construcción.
//!
//! Regla de evaluación (una sola, estricta):
//! - `succeeded` ⇔ el status efectivo coincide con el esperado para el verbo.
//! - un body que no parsea como JSON deja `body = None` sin afectar a
//!   `succeeded`: un 200 sin JSON frente a un 200 esperado sigue siendo
//!   éxito, y un 204 sin cuerpo también.
//! - un body que sí parsea no rescata un status equivocado: 404 parseado
//!   frente a un 201 esperado es fallo.

use std::fmt;

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub succeeded: bool,
    pub status: u16,
    pub body: Option<Value>,
    pub raw: String,
}

impl ServiceResponse {
    /// Construye la respuesta aplicando la regla de evaluación estricta.
    pub fn evaluate(expected: u16, status: u16, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let body = serde_json::from_str::<Value>(&raw).ok();
        Self { succeeded: status == expected,
               status,
               body,
               raw }
    }
}

impl fmt::Display for ServiceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.status, self.raw)
    }
}
