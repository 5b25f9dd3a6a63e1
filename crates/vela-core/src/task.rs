//! Task: la unidad de trabajo invocable y compensable.
//!
//! Protocolo:
//! - un task se registra en el contexto al construirse (el contexto se pasa
//!   explícito; no hay slot global de "contexto actual"),
//! - su invocación fija el `TaskOutcome` comparando el status esperado con el
//!   efectivo, y opcionalmente almacena un artifact,
//! - en el desmontaje del scope recibe exactamente una oportunidad de
//!   compensación (`undo`), que puede no-op,
//! - `notify("undone")` es el único mensaje que el core reconoce: baja el
//!   latch `perform_undo` para suprimir una compensación ya realizada por
//!   otro task (evita el doble-delete).

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use uuid::Uuid;

use crate::context::ExecutionContext;
use crate::errors::CoreError;
use crate::model::ServiceResponse;

/// Handle compartido a un task ya registrado. Modelo mono-hilo: `Rc/RefCell`.
pub type TaskRef = Rc<RefCell<dyn Task>>;

/// Clave centinela para tasks que no nombran su artifact.
pub const UNNAMED_ARTIFACT: &str = "unnamed";

/// Único mensaje de notificación con semántica en el core.
pub const MSG_UNDONE: &str = "undone";

/// Resultado tri-estado de la última invocación. `NotRun` distingue "nadie
/// lo comprobó" de "pasó"; no hay default a éxito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    NotRun,
    Succeeded,
    Failed,
}

impl TaskOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, TaskOutcome::Succeeded)
    }
}

/// Estado común a todo task; los tipos concretos lo componen.
pub struct TaskState {
    id: Uuid,
    label: String,
    outcome: TaskOutcome,
    perform_undo: bool,
    artifact_key: String,
    expected_status: u16,
    notify_targets: Vec<TaskRef>,
}

impl TaskState {
    pub fn new(label: impl Into<String>, expected_status: u16) -> Self {
        Self { id: Uuid::new_v4(),
               label: label.into(),
               outcome: TaskOutcome::NotRun,
               perform_undo: true,
               artifact_key: UNNAMED_ARTIFACT.to_string(),
               expected_status,
               notify_targets: Vec::new() }
    }

    pub fn with_artifact_key(mut self, key: impl Into<String>) -> Self {
        self.artifact_key = key.into();
        self
    }

    pub fn with_notify_targets(mut self, targets: Vec<TaskRef>) -> Self {
        self.notify_targets = targets;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn outcome(&self) -> TaskOutcome {
        self.outcome
    }

    pub fn set_outcome(&mut self, outcome: TaskOutcome) {
        self.outcome = outcome;
    }

    pub fn was_successful(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn perform_undo(&self) -> bool {
        self.perform_undo
    }

    /// Latch de una sola dirección: una vez suprimido no se revierte.
    pub fn suppress_undo(&mut self) {
        self.perform_undo = false;
    }

    pub fn artifact_key(&self) -> &str {
        &self.artifact_key
    }

    pub fn expected_status(&self) -> u16 {
        self.expected_status
    }

    /// Compara el status esperado del task con el efectivo y fija el outcome.
    pub fn check_response(&mut self, ctx: &ExecutionContext, resp: &ServiceResponse) {
        self.check_response_expecting(ctx, resp, self.expected_status);
    }

    /// Variante con override del esperado (p. ej. el undo de un create
    /// espera 204 aunque el task esperase 201).
    pub fn check_response_expecting(&mut self, ctx: &ExecutionContext, resp: &ServiceResponse, expected: u16) {
        if resp.status == expected {
            self.outcome = TaskOutcome::Succeeded;
        } else {
            self.outcome = TaskOutcome::Failed;
            self.log_fail(ctx, &format!("status mismatch. {} != {}", expected, resp.status));
        }
    }

    /// Guarda un artifact bajo la clave del task, en el store del contexto.
    pub fn store_artifact(&self, ctx: &ExecutionContext, value: Value) {
        self.log_store(ctx, &format!("['{}'] <- {}", self.artifact_key, value));
        ctx.add_artifact(&self.artifact_key, value);
    }

    /// Lectura con política de unicidad: cero almacenados es ausencia, más de
    /// uno es una recuperación ambigua; nunca se elige uno en silencio.
    pub fn retrieve_artifact(&self, ctx: &ExecutionContext, key: &str) -> Result<Value, CoreError> {
        match ctx.get_artifacts(key) {
            None => {
                self.log_fail(ctx, &format!("no artifact named ['{key}']"));
                Err(CoreError::MissingArtifact(key.to_string()))
            }
            Some(items) if items.len() > 1 => {
                self.log_fail(ctx, &format!("ambiguous retrieve for artifact ['{key}']"));
                Err(CoreError::AmbiguousArtifact(key.to_string(), items.len()))
            }
            Some(items) => {
                let value = items[0].clone();
                self.log_retrieve(ctx, &format!("['{key}'] -> {value}"));
                Ok(value)
            }
        }
    }

    /// Difunde `message` a cada task de la lista de notificación.
    pub fn notify_success(&self, message: &str) {
        for target in &self.notify_targets {
            target.borrow_mut().notify(message);
        }
    }

    pub fn log(&self, ctx: &ExecutionContext, msg: &str) {
        ctx.log(&format!("[{}] {}", self.label, msg));
    }

    pub fn log_debug(&self, ctx: &ExecutionContext, msg: &str) {
        self.log(ctx, &format!("DEBUG: {msg}"));
    }

    pub fn log_ignored(&self, ctx: &ExecutionContext, msg: &str) {
        self.log(ctx, &format!("EXCEPT(ignored): {msg}"));
    }

    pub fn log_fail(&self, ctx: &ExecutionContext, msg: &str) {
        self.log(ctx, &format!("FAIL: {msg}"));
    }

    pub fn log_store(&self, ctx: &ExecutionContext, msg: &str) {
        self.log(ctx, &format!("STORE: {msg}"));
    }

    pub fn log_retrieve(&self, ctx: &ExecutionContext, msg: &str) {
        self.log(ctx, &format!("RETRIEVE: {msg}"));
    }
}

pub trait Task {
    fn state(&self) -> &TaskState;

    fn state_mut(&mut self) -> &mut TaskState;

    /// Oportunidad de compensación. No-op por defecto; los tasks mutadores
    /// la sobreescriben. Debe ser seguro llamarla aunque no haya nada que
    /// deshacer, y nunca debe dejar escapar un fallo de servicio (se loguea
    /// como ignorado dentro de la implementación o en `unwind`).
    fn undo(&mut self, _ctx: &ExecutionContext) -> Result<(), CoreError> {
        Ok(())
    }

    /// Hook receptor. El core reconoce exactamente `"undone"`: mi efecto ya
    /// fue revertido por otro, no intentes tu propia compensación.
    fn notify(&mut self, message: &str) {
        if message == MSG_UNDONE {
            self.state_mut().suppress_undo();
        }
    }

    fn was_successful(&self) -> bool {
        self.state().was_successful()
    }
}
