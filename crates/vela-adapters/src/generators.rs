//! Generadores de payloads por defecto.
//!
//! Contador de vida-de-proceso por tipo de recurso (`AtomicU64` compartido
//! entre instancias): el sufijo nunca se reutiliza aunque se construyan
//! varios generadores.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};
use vela_core::PayloadGenerator;

const DEFAULT_PREFIX: &str = "vela";

static NETWORK_SEQ: AtomicU64 = AtomicU64::new(0);
static SUBNET_SEQ: AtomicU64 = AtomicU64::new(0);

fn next(seq: &AtomicU64) -> u64 {
    seq.fetch_add(1, Ordering::Relaxed) + 1
}

fn name_for(prefix: &str, resource: &str, n: u64) -> String {
    format!("{prefix}_{resource}_{n}")
}

#[derive(Debug)]
pub struct NetworkGenerator {
    prefix: String,
}

impl NetworkGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for NetworkGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl PayloadGenerator for NetworkGenerator {
    fn resource(&self) -> &str {
        "network"
    }

    fn generate(&self) -> Value {
        let n = next(&NETWORK_SEQ);
        json!({"network": {"name": name_for(&self.prefix, "network", n)}})
    }
}

/// Payload de subnet sin `network_id`: lo inyecta el task de creación a
/// partir del artifact `"network"`.
#[derive(Debug)]
pub struct SubnetGenerator {
    prefix: String,
}

impl SubnetGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for SubnetGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl PayloadGenerator for SubnetGenerator {
    fn resource(&self) -> &str {
        "subnet"
    }

    fn generate(&self) -> Value {
        let n = next(&SUBNET_SEQ);
        json!({
            "subnet": {
                "name": name_for(&self.prefix, "subnet", n),
                "cidr": format!("192.168.{}.0/24", n % 255),
                "ip_version": 4,
            }
        })
    }
}
