//! Configuración del harness.
//!
//! Dos fuentes: un fichero TOML (`[auth]` + `[network]`) o variables de
//! entorno `VELA_*` (el binario carga `.env` vía dotenvy antes de llamar
//! aquí). Los structs crudos llevan `Option` y un paso `validate()` que
//! levanta `MissingRequiredInformation` nombrando el campo ausente.

use std::env;
use std::path::Path;

use serde::Deserialize;

use crate::errors::AdapterError;

/// Sección `[auth]` ya validada.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub endpoint: String,
    pub username: String,
    pub api_key: String,
    pub content_type: String,
}

/// Endpoint de un servicio ya validado (sección `[network]`).
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    pub endpoint: String,
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub auth: AuthConfig,
    pub network: ServiceEndpoint,
}

#[derive(Debug, Default, Deserialize)]
struct RawAuth {
    endpoint: Option<String>,
    username: Option<String>,
    api_key: Option<String>,
    content_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawService {
    endpoint: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    auth: Option<RawAuth>,
    network: Option<RawService>,
}

fn required(field: Option<String>, name: &str) -> Result<String, AdapterError> {
    field.ok_or_else(|| AdapterError::MissingRequiredInformation(name.to_string()))
}

impl RawConfig {
    fn validate(self) -> Result<HarnessConfig, AdapterError> {
        let auth = self.auth
                       .ok_or_else(|| AdapterError::MissingRequiredInformation("[auth] section".into()))?;
        let network = self.network
                          .ok_or_else(|| AdapterError::MissingRequiredInformation("[network] section".into()))?;
        Ok(HarnessConfig { auth: AuthConfig { endpoint: required(auth.endpoint, "auth.endpoint")?,
                                              username: required(auth.username, "auth.username")?,
                                              api_key: required(auth.api_key, "auth.api_key")?,
                                              content_type: auth.content_type
                                                                .unwrap_or_else(|| "application/json".to_string()) },
                           network: ServiceEndpoint { endpoint: required(network.endpoint, "network.endpoint")?,
                                                      version: required(network.version, "network.version")? } })
    }
}

impl HarnessConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, AdapterError> {
        let parsed: RawConfig = toml::from_str(raw).map_err(|e| AdapterError::Parsing(e.to_string()))?;
        parsed.validate()
    }

    pub fn from_file(path: &Path) -> Result<Self, AdapterError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Fallback por entorno: `VELA_AUTH_ENDPOINT`, `VELA_USERNAME`,
    /// `VELA_API_KEY`, `VELA_NET_ENDPOINT`, `VELA_NET_VERSION`.
    pub fn from_env() -> Result<Self, AdapterError> {
        let var = |k: &str| env::var(k).ok();
        RawConfig { auth: Some(RawAuth { endpoint: var("VELA_AUTH_ENDPOINT"),
                                         username: var("VELA_USERNAME"),
                                         api_key: var("VELA_API_KEY"),
                                         content_type: var("VELA_CONTENT_TYPE") }),
                    network: Some(RawService { endpoint: var("VELA_NET_ENDPOINT"),
                                               version: var("VELA_NET_VERSION") }) }.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[auth]
endpoint = "https://identity.example/v2.0/tokens"
username = "demo"
api_key = "k3y"

[network]
endpoint = "https://network.example"
version = "v2.0"
"#;

    #[test]
    fn a_complete_file_validates() {
        let conf = HarnessConfig::from_toml_str(FULL).unwrap();
        assert_eq!(conf.auth.username, "demo");
        assert_eq!(conf.auth.content_type, "application/json"); // default
        assert_eq!(conf.network.version, "v2.0");
    }

    #[test]
    fn missing_fields_are_named_in_the_error() {
        let raw = "[auth]\nendpoint = \"https://identity.example\"\n[network]\nendpoint = \"e\"\nversion = \"v\"\n";
        let err = HarnessConfig::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, AdapterError::MissingRequiredInformation(ref f) if f == "auth.username"));
    }

    #[test]
    fn missing_sections_are_fatal() {
        let err = HarnessConfig::from_toml_str("[auth]\nendpoint = \"e\"\nusername = \"u\"\napi_key = \"k\"\n").unwrap_err();
        assert!(matches!(err, AdapterError::MissingRequiredInformation(ref f) if f.contains("[network]")));
    }

    #[test]
    fn malformed_toml_is_a_parsing_error() {
        let err = HarnessConfig::from_toml_str("not toml at all [[[").unwrap_err();
        assert!(matches!(err, AdapterError::Parsing(_)));
    }
}
