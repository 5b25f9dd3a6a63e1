//! Tipos de frontera entre el core y sus colaboradores.
mod auth;
mod response;

pub use auth::AuthInfo;
pub use response::ServiceResponse;
