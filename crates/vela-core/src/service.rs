//! Contrato mínimo que el core exige a un servicio.
//!
//! Un handle de servicio se localiza por nombre lógico (p. ej. `"network"`)
//! en el registro inmutable del contexto. Cómo realice la llamada (HTTP,
//! mock, ...) no es asunto del core; sólo importa que devuelva una
//! `ServiceResponse` normalizada. Las operaciones son genéricas por familia
//! de recurso (`"networks"`, `"subnets"`, ...), así una única implementación
//! REST cubre todos los recursos.

use serde_json::Value;

use crate::errors::CoreError;
use crate::model::{AuthInfo, ServiceResponse};

pub trait Service {
    /// Nombre lógico bajo el que se registra en el contexto.
    fn name(&self) -> &str;

    /// GET de la colección del recurso. Código esperado del verbo: 200.
    fn list(&self, auth: &AuthInfo, resource: &str) -> Result<ServiceResponse, CoreError>;

    /// POST de creación. Código esperado del verbo: 201.
    fn create(&self, auth: &AuthInfo, resource: &str, payload: &Value) -> Result<ServiceResponse, CoreError>;

    /// DELETE por id. Código esperado del verbo: 204.
    fn delete(&self, auth: &AuthInfo, resource: &str, id: &str) -> Result<ServiceResponse, CoreError>;
}
