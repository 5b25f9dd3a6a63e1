//! Cliente REST genérico por recurso.
//!
//! Una única implementación de `Service` cubre todas las familias de recurso
//! (`networks`, `subnets`, ...): URLs `{endpoint}/{version}/{resource}[/{id}]`
//! con `Content-Type: application/json` y el bearer en `X-Auth-Token`.
//! Códigos esperados por verbo: GET 200, POST 201, DELETE 204; la evaluación
//! de éxito vive en `ServiceResponse::evaluate`.

use serde_json::Value;
use vela_core::{AuthInfo, CoreError, Service, ServiceResponse};

use crate::config::ServiceEndpoint;

const LIST_OK: u16 = 200;
const CREATE_OK: u16 = 201;
const DELETE_OK: u16 = 204;

pub struct RestService {
    name: String,
    endpoint: String,
    version: String,
    client: reqwest::blocking::Client,
}

impl RestService {
    pub fn new(name: impl Into<String>, conf: &ServiceEndpoint) -> Self {
        Self { name: name.into(),
               endpoint: conf.endpoint.clone(),
               version: conf.version.clone(),
               client: reqwest::blocking::Client::new() }
    }

    /// Handle con el nombre lógico que los tasks de networking buscan.
    pub fn network(conf: &ServiceEndpoint) -> Self {
        Self::new("network", conf)
    }

    fn collection_url(&self, resource: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.version, resource)
    }

    fn member_url(&self, resource: &str, id: &str) -> String {
        format!("{}/{}/{}/{}", self.endpoint, self.version, resource, id)
    }

    fn finish(expected: u16, response: reqwest::blocking::Response) -> Result<ServiceResponse, CoreError> {
        let status = response.status().as_u16();
        let raw = response.text().map_err(|e| CoreError::Transport(e.to_string()))?;
        Ok(ServiceResponse::evaluate(expected, status, raw))
    }
}

impl Service for RestService {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, auth: &AuthInfo, resource: &str) -> Result<ServiceResponse, CoreError> {
        let url = self.collection_url(resource);
        log::debug!("GET {url}");
        let response = self.client
                           .get(url)
                           .header(reqwest::header::CONTENT_TYPE, "application/json")
                           .header("X-Auth-Token", auth.token())
                           .send()
                           .map_err(|e| CoreError::Transport(e.to_string()))?;
        Self::finish(LIST_OK, response)
    }

    fn create(&self, auth: &AuthInfo, resource: &str, payload: &Value) -> Result<ServiceResponse, CoreError> {
        let url = self.collection_url(resource);
        log::debug!("POST {url}");
        let response = self.client
                           .post(url)
                           .header(reqwest::header::CONTENT_TYPE, "application/json")
                           .header("X-Auth-Token", auth.token())
                           .body(payload.to_string())
                           .send()
                           .map_err(|e| CoreError::Transport(e.to_string()))?;
        Self::finish(CREATE_OK, response)
    }

    fn delete(&self, auth: &AuthInfo, resource: &str, id: &str) -> Result<ServiceResponse, CoreError> {
        let url = self.member_url(resource, id);
        log::debug!("DELETE {url}");
        let response = self.client
                           .delete(url)
                           .header(reqwest::header::CONTENT_TYPE, "application/json")
                           .header("X-Auth-Token", auth.token())
                           .send()
                           .map_err(|e| CoreError::Transport(e.to_string()))?;
        Self::finish(DELETE_OK, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> RestService {
        RestService::network(&ServiceEndpoint { endpoint: "https://network.example".into(),
                                                version: "v2.0".into() })
    }

    #[test]
    fn urls_follow_the_endpoint_version_resource_shape() {
        let s = service();
        assert_eq!(s.collection_url("networks"), "https://network.example/v2.0/networks");
        assert_eq!(s.member_url("subnets", "s-1"), "https://network.example/v2.0/subnets/s-1");
    }

    #[test]
    fn the_logical_name_is_what_contexts_index_by() {
        assert_eq!(service().name(), "network");
    }
}
