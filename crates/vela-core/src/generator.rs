//! Generadores de payloads por defecto.
//!
//! Los tasks de creación piden un payload generado cuando el caller no
//! suministra uno explícito. Contrato: sufijo numérico estrictamente
//! creciente por tipo de recurso, con contador de vida-de-proceso (sin
//! reutilización entre instancias del mismo generador).

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

pub trait PayloadGenerator {
    /// Tipo de recurso que cubre (p. ej. `"network"`).
    fn resource(&self) -> &str;

    /// Payload por defecto para una creación de este recurso.
    fn generate(&self) -> Value;
}

/// Registro de generadores por recurso. La primera inscripción gana.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Rc<dyn PayloadGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devuelve `false` si ya había un generador para ese recurso.
    pub fn register(&mut self, generator: Rc<dyn PayloadGenerator>) -> bool {
        let key = generator.resource().to_string();
        if self.generators.contains_key(&key) {
            return false;
        }
        self.generators.insert(key, generator);
        true
    }

    pub fn generate(&self, resource: &str) -> Option<Value> {
        self.generators.get(resource).map(|g| g.generate())
    }
}
