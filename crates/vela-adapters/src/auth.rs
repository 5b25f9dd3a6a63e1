//! Adquisición del token de autenticación.
//!
//! Una vez por workflow: se construye el payload de credenciales, se hace el
//! POST al endpoint de identidad y se extrae el bearer token (y el tenant si
//! viene). Las respuestas malformadas son `Parsing` y se propagan: no hay
//! reintentos ni captura en el core.

use serde_json::{json, Value};
use vela_core::AuthInfo;

use crate::config::AuthConfig;
use crate::errors::AdapterError;

/// Método de autenticación enchufable: sólo produce el payload JSON de
/// credenciales que el endpoint de identidad espera.
pub trait AuthMethod {
    fn payload(&self) -> Value;
}

/// Credenciales por api key (username + clave).
#[derive(Debug, Clone)]
pub struct ApiKeyCredentials {
    pub username: String,
    pub api_key: String,
}

impl ApiKeyCredentials {
    pub fn from_config(conf: &AuthConfig) -> Self {
        Self { username: conf.username.clone(),
               api_key: conf.api_key.clone() }
    }
}

impl AuthMethod for ApiKeyCredentials {
    fn payload(&self) -> Value {
        json!({
            "auth": {
                "apiKeyCredentials": {
                    "username": self.username,
                    "apiKey": self.api_key,
                }
            }
        })
    }
}

fn parse_auth_response(body: &Value) -> Result<AuthInfo, AdapterError> {
    let token = body.pointer("/access/token/id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AdapterError::Parsing("missing access.token.id in auth response".into()))?;
    let mut info = AuthInfo::new(token);
    if let Some(tenant) = body.pointer("/access/token/tenant/id").and_then(Value::as_str) {
        info = info.with_tenant(tenant);
    }
    Ok(info)
}

/// Hace el POST de autenticación y devuelve la credencial opaca del core.
pub fn authenticate(conf: &AuthConfig) -> Result<AuthInfo, AdapterError> {
    let method = ApiKeyCredentials::from_config(conf);
    authenticate_with(conf, &method)
}

pub fn authenticate_with(conf: &AuthConfig, method: &dyn AuthMethod) -> Result<AuthInfo, AdapterError> {
    let client = reqwest::blocking::Client::new();
    let response = client.post(&conf.endpoint)
                         .header(reqwest::header::CONTENT_TYPE, conf.content_type.clone())
                         .body(method.payload().to_string())
                         .send()?;
    let text = response.text()?;
    let body: Value = serde_json::from_str(&text).map_err(|e| AdapterError::Parsing(e.to_string()))?;
    parse_auth_response(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_credentials_shape() {
        let method = ApiKeyCredentials { username: "demo".into(),
                                         api_key: "k3y".into() };
        let payload = method.payload();
        assert_eq!(payload["auth"]["apiKeyCredentials"]["username"], "demo");
        assert_eq!(payload["auth"]["apiKeyCredentials"]["apiKey"], "k3y");
    }

    #[test]
    fn auth_response_with_tenant_parses() {
        let body = json!({
            "access": {
                "token": { "id": "tok-123", "tenant": { "id": "t-9" } },
                "serviceCatalog": []
            }
        });
        let info = parse_auth_response(&body).unwrap();
        assert_eq!(info.token(), "tok-123");
        assert_eq!(info.tenant_id(), Some("t-9"));
    }

    #[test]
    fn auth_response_without_token_is_a_parsing_error() {
        let body = json!({"access": {}});
        let err = parse_auth_response(&body).unwrap_err();
        assert!(matches!(err, AdapterError::Parsing(_)));
    }
}
