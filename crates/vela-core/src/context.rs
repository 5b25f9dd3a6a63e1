//! Contexto de ejecución: el contenedor de un scope de workflow.
//!
//! Posee el registro de servicios y el store de artifacts, anota los tasks
//! según se ejecutan (orden de registro) y al salir del scope corre las
//! compensaciones en orden inverso (LIFO). El orden inverso es la propiedad
//! de corrección central: los recursos posteriores pueden referenciar a los
//! anteriores, así que se desmontan primero.
//!
//! No hay jerarquía de contextos: un único tipo parametrizado por
//! `ScopeKind`, que sólo decide el default de `ignore_errors` y la etiqueta
//! de los logs.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::errors::CoreError;
use crate::generator::GeneratorRegistry;
use crate::logging::LogSink;
use crate::model::AuthInfo;
use crate::service::Service;
use crate::task::TaskRef;

/// Fase del scope. Los tasks sólo crecen en `Do` y sólo se drenan en `Undo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Do,
    Undo,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Do => write!(f, "Do"),
            Phase::Undo => write!(f, "Undo"),
        }
    }
}

/// Clase de scope: configura el contexto, no lo subclasea.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Setup,
    Teardown,
}

impl ScopeKind {
    pub fn label(self) -> &'static str {
        match self {
            ScopeKind::Setup => "Setup",
            ScopeKind::Teardown => "Teardown",
        }
    }

    /// Política advisoria: en teardown los fallos de task no son fatales.
    pub fn ignore_errors_default(self) -> bool {
        matches!(self, ScopeKind::Teardown)
    }
}

pub struct ExecutionContext {
    services: HashMap<String, Rc<dyn Service>>,
    auth: AuthInfo,
    generators: Rc<GeneratorRegistry>,
    sink: Rc<dyn LogSink>,
    kind: ScopeKind,
    ignore_errors: bool,
    phase: Cell<Phase>,
    tasks: RefCell<Vec<TaskRef>>,
    artifacts: RefCell<IndexMap<String, Vec<Value>>>,
}

impl ExecutionContext {
    pub fn new(kind: ScopeKind,
               auth: AuthInfo,
               services: Vec<Rc<dyn Service>>,
               generators: Rc<GeneratorRegistry>,
               sink: Rc<dyn LogSink>)
               -> Self {
        let mut by_name = HashMap::new();
        for service in services {
            by_name.insert(service.name().to_string(), service);
        }
        Self { services: by_name,
               auth,
               generators,
               sink,
               kind,
               ignore_errors: kind.ignore_errors_default(),
               phase: Cell::new(Phase::Do),
               tasks: RefCell::new(Vec::new()),
               artifacts: RefCell::new(IndexMap::new()) }
    }

    /// Override puntual de la política advisoria.
    pub fn with_ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Estado advisorio leído por el caller; el contexto no lo aplica.
    pub fn ignore_errors(&self) -> bool {
        self.ignore_errors
    }

    pub fn auth(&self) -> &AuthInfo {
        &self.auth
    }

    /// Anota el task. Sólo efecto lateral, sin validación. El préstamo es
    /// acotado, así que es seguro re-entrar si un task construye sub-tasks.
    pub fn register(&self, task: TaskRef) {
        self.tasks.borrow_mut().push(task);
    }

    pub fn task_count(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Añade un valor a la secuencia de la clave, creándola si no existía.
    /// Única vía de alta: no puede observarse una entrada presente y vacía.
    pub fn add_artifact(&self, key: &str, value: Value) {
        self.artifacts
            .borrow_mut()
            .entry(key.to_string())
            .or_default()
            .push(value);
    }

    /// `None` si la clave nunca se vio ("sin artifacts" ≠ "lista vacía").
    pub fn get_artifacts(&self, key: &str) -> Option<Vec<Value>> {
        self.artifacts.borrow().get(key).cloned()
    }

    /// Lookup en el registro inmutable de servicios.
    pub fn request_service(&self, name: &str) -> Option<Rc<dyn Service>> {
        self.services.get(name).cloned()
    }

    /// Variante con error tipado, para constructores de tasks.
    pub fn service(&self, name: &str) -> Result<Rc<dyn Service>, CoreError> {
        self.request_service(name)
            .ok_or_else(|| CoreError::UnknownService(name.to_string()))
    }

    /// Payload por defecto del recurso, vía el registro del Session.
    pub fn generate_payload(&self, resource: &str) -> Option<Value> {
        self.generators.generate(resource)
    }

    pub fn log(&self, msg: &str) {
        self.sink.emit(&format!("[{}]{}", self.phase.get(), msg));
    }

    /// Entrada del scope: fija la fase `Do`. Sin otros efectos.
    pub fn enter(&self) {
        self.phase.set(Phase::Do);
        self.log(&format!("[{}] scope enter", self.kind.label()));
    }

    /// Salida del scope: fija `Undo` y drena los tasks en LIFO, ofreciendo a
    /// cada uno exactamente una compensación. Un task con `perform_undo`
    /// suprimido se salta entera su compensación (queda sólo la nota de
    /// no-op). Un `Err` de una compensación se loguea como ignorado y el
    /// desmontaje continúa: de aquí nunca se propaga un error.
    pub fn unwind(&self) {
        self.phase.set(Phase::Undo);
        self.log(&format!("[{}] scope exit", self.kind.label()));
        loop {
            let task = self.tasks.borrow_mut().pop();
            let Some(task) = task else { break };
            let mut task = task.borrow_mut();
            let label = task.state().label().to_string();
            if !task.state().perform_undo() {
                self.log(&format!("[{label}] undo suppressed (already undone)"));
                continue;
            }
            if let Err(e) = task.undo(self) {
                self.log(&format!("[{label}] EXCEPT(ignored): {e}"));
            }
        }
    }

    /// Scope con cierre: `enter`, el closure, y `unwind` pase lo que pase.
    /// El error que surge es el del closure (fase Do); los fallos de
    /// compensación jamás lo reemplazan.
    pub fn scope<T, F>(&self, f: F) -> Result<T, CoreError>
        where F: FnOnce(&Self) -> Result<T, CoreError>
    {
        self.enter();
        let result = f(self);
        self.unwind();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::BufferSink;
    use serde_json::json;

    fn bare(kind: ScopeKind) -> ExecutionContext {
        ExecutionContext::new(kind,
                              AuthInfo::new("tok"),
                              Vec::new(),
                              Rc::new(GeneratorRegistry::new()),
                              Rc::new(BufferSink::new()))
    }

    #[test]
    fn artifact_entries_only_exist_after_an_add() {
        let ctx = bare(ScopeKind::Setup);
        assert!(ctx.get_artifacts("network").is_none());
        ctx.add_artifact("network", json!({"id": "a"}));
        ctx.add_artifact("network", json!({"id": "b"}));
        let items = ctx.get_artifacts("network").unwrap();
        assert_eq!(items.len(), 2);
        // orden de inserción = orden de creación
        assert_eq!(items[0]["id"], "a");
        assert_eq!(items[1]["id"], "b");
    }

    #[test]
    fn scope_kinds_set_the_ignore_errors_default() {
        assert!(!bare(ScopeKind::Setup).ignore_errors());
        assert!(bare(ScopeKind::Teardown).ignore_errors());
        assert!(bare(ScopeKind::Setup).with_ignore_errors(true).ignore_errors());
    }

    #[test]
    fn unknown_service_is_a_typed_error() {
        let ctx = bare(ScopeKind::Setup);
        assert!(ctx.request_service("network").is_none());
        let err = ctx.service("network").err().unwrap();
        assert_eq!(err, CoreError::UnknownService("network".to_string()));
    }

    #[test]
    fn enter_and_unwind_toggle_the_phase() {
        let ctx = bare(ScopeKind::Setup);
        ctx.enter();
        assert_eq!(ctx.phase(), Phase::Do);
        ctx.unwind();
        assert_eq!(ctx.phase(), Phase::Undo);
    }
}
