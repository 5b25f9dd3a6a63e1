//! Tasks genéricos por familia de recurso.
//!
//! Cada task se registra en el contexto al construirse (`register`), fija su
//! outcome comparando el status esperado con el efectivo, y sigue el
//! protocolo de compensación del core:
//! - `CreateResource` guarda el body como artifact y recuerda el id creado;
//!   su `undo` borra ese id (esperando 204) salvo que esté suprimido o no
//!   haya id.
//! - `DeleteResource` resuelve el id por argumento o por artifact (fallo
//!   degradado sin llamada si falta o es ambiguo) y, si borra con éxito,
//!   difunde `"undone"` a sus targets para suprimir compensaciones ajenas.
//! - `GetResources` sólo lista y chequea.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use vela_core::{CoreError, ExecutionContext, Service, Task, TaskOutcome, TaskRef, TaskState,
                MSG_UNDONE};

const CREATE_OK: u16 = 201;
const LIST_OK: u16 = 200;
const DELETE_OK: u16 = 204;

/// Vínculo con un recurso padre: de qué artifact sacar el id y en qué campo
/// del payload inyectarlo (p. ej. subnet ← network.id en `network_id`).
#[derive(Debug, Clone)]
pub struct ParentLink {
    pub artifact_key: &'static str,
    pub id_pointer: &'static str,
    pub field: &'static str,
}

/// Descriptor de una familia de recurso REST.
#[derive(Debug, Clone)]
pub struct ResourceFamily {
    /// Nombre lógico del servicio en el registro del contexto.
    pub service: &'static str,
    /// Segmento de colección en la URL (`networks`).
    pub collection: &'static str,
    /// Singular: clave de artifact, raíz del body y recurso del generador.
    pub singular: &'static str,
    pub parent: Option<ParentLink>,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl ResourceFamily {
    pub fn networks() -> Self {
        Self { service: "network",
               collection: "networks",
               singular: "network",
               parent: None }
    }

    pub fn subnets() -> Self {
        Self { service: "network",
               collection: "subnets",
               singular: "subnet",
               parent: Some(ParentLink { artifact_key: "network",
                                         id_pointer: "/network/id",
                                         field: "network_id" }) }
    }

    fn id_pointer(&self) -> String {
        format!("/{}/id", self.singular)
    }

    fn label(&self, verb: &str, plural: bool) -> String {
        if plural {
            format!("{verb}{}", capitalize(self.collection))
        } else {
            format!("{verb}{}", capitalize(self.singular))
        }
    }
}

/// Task de creación. Artifact key = singular de la familia.
pub struct CreateResource {
    state: TaskState,
    family: ResourceFamily,
    service: Rc<dyn Service>,
    created_id: Option<String>,
}

impl CreateResource {
    pub fn register(ctx: &ExecutionContext, family: ResourceFamily) -> Result<Rc<RefCell<Self>>, CoreError> {
        Self::register_expecting(ctx, family, CREATE_OK)
    }

    pub fn register_expecting(ctx: &ExecutionContext,
                              family: ResourceFamily,
                              expected: u16)
                              -> Result<Rc<RefCell<Self>>, CoreError> {
        let service = ctx.service(family.service)?;
        let state = TaskState::new(family.label("Create", false), expected).with_artifact_key(family.singular);
        let task = Rc::new(RefCell::new(Self { state,
                                               family,
                                               service,
                                               created_id: None }));
        ctx.register(task.clone() as TaskRef);
        Ok(task)
    }

    /// Id creado en la última invocación con éxito de extracción.
    pub fn created_id(&self) -> Option<&str> {
        self.created_id.as_deref()
    }

    /// Inyecta el id del padre si el payload no lo trae. Fallo degradado si
    /// el artifact padre falta o es ambiguo: se anota y no se llama a nada.
    fn link_parent(&mut self, ctx: &ExecutionContext, payload: &mut Value) -> bool {
        let Some(link) = self.family.parent.clone() else { return true };
        let root = payload.get(self.family.singular);
        if root.and_then(|r| r.get(link.field)).is_some() {
            return true;
        }
        let parent = match self.state.retrieve_artifact(ctx, link.artifact_key) {
            Ok(parent) => parent,
            Err(_) => {
                self.state.set_outcome(TaskOutcome::Failed);
                return false;
            }
        };
        let Some(id) = parent.pointer(link.id_pointer).and_then(Value::as_str) else {
            self.state.log_fail(ctx, &format!("no parent id under ['{}']", link.artifact_key));
            self.state.set_outcome(TaskOutcome::Failed);
            return false;
        };
        match payload.get_mut(self.family.singular).and_then(Value::as_object_mut) {
            Some(obj) => {
                obj.insert(link.field.to_string(), json!(id));
                true
            }
            None => {
                self.state.log_fail(ctx, "payload without resource root");
                self.state.set_outcome(TaskOutcome::Failed);
                false
            }
        }
    }

    pub fn invoke(&mut self, ctx: &ExecutionContext, payload: Option<Value>) -> Result<(), CoreError> {
        let mut payload = match payload {
            Some(p) => p,
            None => ctx.generate_payload(self.family.singular)
                       .ok_or_else(|| CoreError::MissingGenerator(self.family.singular.to_string()))?,
        };
        if !self.link_parent(ctx, &mut payload) {
            return Ok(());
        }
        let resp = self.service.create(ctx.auth(), self.family.collection, &payload)?;
        self.state.log_debug(ctx, &resp.to_string());
        self.state.check_response(ctx, &resp);
        match resp.body {
            Some(body) => match body.pointer(&self.family.id_pointer()).and_then(Value::as_str) {
                Some(id) => {
                    self.created_id = Some(id.to_string());
                    self.state.store_artifact(ctx, body);
                }
                None => self.state.log_ignored(ctx, "response body without resource id"),
            },
            None => self.state.log_ignored(ctx, "no parsable response body"),
        }
        Ok(())
    }
}

impl Task for CreateResource {
    fn state(&self) -> &TaskState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TaskState {
        &mut self.state
    }

    fn undo(&mut self, ctx: &ExecutionContext) -> Result<(), CoreError> {
        if !self.state.perform_undo() {
            return Ok(());
        }
        // sin id registrado no hay nada que revertir: no-op sin llamada
        let Some(id) = self.created_id.clone() else { return Ok(()) };
        match self.service.delete(ctx.auth(), self.family.collection, &id) {
            Ok(resp) => {
                self.state.check_response_expecting(ctx, &resp, DELETE_OK);
                self.state.log_debug(ctx, &resp.to_string());
            }
            Err(e) => self.state.log_ignored(ctx, &e.to_string()),
        }
        Ok(())
    }
}

/// Task de listado: GET de la colección y chequeo del status.
pub struct GetResources {
    state: TaskState,
    family: ResourceFamily,
    service: Rc<dyn Service>,
}

impl GetResources {
    pub fn register(ctx: &ExecutionContext, family: ResourceFamily) -> Result<Rc<RefCell<Self>>, CoreError> {
        Self::register_expecting(ctx, family, LIST_OK)
    }

    pub fn register_expecting(ctx: &ExecutionContext,
                              family: ResourceFamily,
                              expected: u16)
                              -> Result<Rc<RefCell<Self>>, CoreError> {
        let service = ctx.service(family.service)?;
        let state = TaskState::new(family.label("Get", true), expected);
        let task = Rc::new(RefCell::new(Self { state, family, service }));
        ctx.register(task.clone() as TaskRef);
        Ok(task)
    }

    pub fn invoke(&mut self, ctx: &ExecutionContext) -> Result<(), CoreError> {
        let resp = self.service.list(ctx.auth(), self.family.collection)?;
        self.state.log_debug(ctx, &resp.to_string());
        self.state.check_response(ctx, &resp);
        Ok(())
    }
}

impl Task for GetResources {
    fn state(&self) -> &TaskState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TaskState {
        &mut self.state
    }
}

/// Task de borrado. Si borra con éxito difunde `"undone"` a sus targets.
pub struct DeleteResource {
    state: TaskState,
    family: ResourceFamily,
    service: Rc<dyn Service>,
}

impl DeleteResource {
    pub fn register(ctx: &ExecutionContext,
                    family: ResourceFamily,
                    notify: Vec<TaskRef>)
                    -> Result<Rc<RefCell<Self>>, CoreError> {
        Self::register_expecting(ctx, family, DELETE_OK, notify)
    }

    pub fn register_expecting(ctx: &ExecutionContext,
                              family: ResourceFamily,
                              expected: u16,
                              notify: Vec<TaskRef>)
                              -> Result<Rc<RefCell<Self>>, CoreError> {
        let service = ctx.service(family.service)?;
        let state = TaskState::new(family.label("Delete", false), expected).with_artifact_key(family.singular)
                                                                           .with_notify_targets(notify);
        let task = Rc::new(RefCell::new(Self { state, family, service }));
        ctx.register(task.clone() as TaskRef);
        Ok(task)
    }

    pub fn invoke(&mut self, ctx: &ExecutionContext, id: Option<String>) -> Result<(), CoreError> {
        let id = match id {
            Some(id) => id,
            None => {
                let stored = match self.state.retrieve_artifact(ctx, self.family.singular) {
                    Ok(v) => v,
                    Err(_) => {
                        // degradado: se anota el fallo y no se llama al servicio
                        self.state.log_fail(ctx, "no id found for delete");
                        self.state.set_outcome(TaskOutcome::Failed);
                        return Ok(());
                    }
                };
                match stored.pointer(&self.family.id_pointer()).and_then(Value::as_str) {
                    Some(id) => id.to_string(),
                    None => {
                        self.state.log_fail(ctx, "no id found for delete");
                        self.state.set_outcome(TaskOutcome::Failed);
                        return Ok(());
                    }
                }
            }
        };
        let resp = self.service.delete(ctx.auth(), self.family.collection, &id)?;
        self.state.log_debug(ctx, &resp.to_string());
        self.state.check_response(ctx, &resp);
        if self.state.was_successful() {
            self.state.notify_success(MSG_UNDONE);
        }
        Ok(())
    }
}

impl Task for DeleteResource {
    fn state(&self) -> &TaskState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TaskState {
        &mut self.state
    }
}
