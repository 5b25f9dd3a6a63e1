//! Session: coordinación a nivel de proceso.
//!
//! Glue trivial: crea contextos de ejecución y les instala el sink de logs y
//! el registro de generadores. No mantiene un "contexto actual" global; cada
//! scope creado es independiente y se pasa explícito a los tasks.

use std::rc::Rc;

use crate::context::{ExecutionContext, ScopeKind};
use crate::generator::{GeneratorRegistry, PayloadGenerator};
use crate::logging::{LogSink, StdLogSink};
use crate::model::AuthInfo;
use crate::service::Service;

pub struct Session {
    sink: Rc<dyn LogSink>,
    generators: GeneratorRegistry,
}

impl Session {
    pub fn new() -> Self {
        Self::with_sink(Rc::new(StdLogSink))
    }

    pub fn with_sink(sink: Rc<dyn LogSink>) -> Self {
        Self { sink,
               generators: GeneratorRegistry::new() }
    }

    /// Devuelve `false` si el recurso ya tenía generador (la primera gana).
    pub fn register_generator(&mut self, generator: Rc<dyn PayloadGenerator>) -> bool {
        self.generators.register(generator)
    }

    /// Scope de setup: los fallos de task son fatales para el caller.
    pub fn setup(&self, auth: AuthInfo, services: Vec<Rc<dyn Service>>) -> ExecutionContext {
        self.scope(ScopeKind::Setup, auth, services)
    }

    /// Scope de teardown: fallos advisoriamente ignorables.
    pub fn teardown(&self, auth: AuthInfo, services: Vec<Rc<dyn Service>>) -> ExecutionContext {
        self.scope(ScopeKind::Teardown, auth, services)
    }

    pub fn scope(&self, kind: ScopeKind, auth: AuthInfo, services: Vec<Rc<dyn Service>>) -> ExecutionContext {
        ExecutionContext::new(kind,
                              auth,
                              services,
                              Rc::new(self.generators.clone()),
                              Rc::clone(&self.sink))
    }

    pub fn log(&self, msg: &str) {
        self.sink.emit(msg);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
