//! Escenarios extremo-a-extremo sobre un `Service` de prueba con guion.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::Value;
use vela_adapters::tasks::{CreateResource, DeleteResource, GetResources, ResourceFamily};
use vela_adapters::{NetworkGenerator, SubnetGenerator};
use vela_core::{AuthInfo, BufferSink, CoreError, Service, ServiceResponse, Session, Task, TaskRef};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    List(String),
    Create(String, String),
    Delete(String, String),
}

/// Servicio de red simulado: registra cada llamada y responde según un
/// guion por verbo (status + body crudo). Sin guion responde con defaults
/// que hacen visible la llamada inesperada (500 en create).
struct MockService {
    calls: RefCell<Vec<Call>>,
    list_script: RefCell<VecDeque<(u16, String)>>,
    create_script: RefCell<VecDeque<(u16, String)>>,
    delete_script: RefCell<VecDeque<(u16, String)>>,
    fail_next_create: Cell<bool>,
}

impl MockService {
    fn new() -> Rc<Self> {
        Rc::new(Self { calls: RefCell::new(Vec::new()),
                       list_script: RefCell::new(VecDeque::new()),
                       create_script: RefCell::new(VecDeque::new()),
                       delete_script: RefCell::new(VecDeque::new()),
                       fail_next_create: Cell::new(false) })
    }

    fn script_list(&self, status: u16, raw: &str) {
        self.list_script.borrow_mut().push_back((status, raw.to_string()));
    }

    fn script_create(&self, status: u16, raw: &str) {
        self.create_script.borrow_mut().push_back((status, raw.to_string()));
    }

    fn script_delete(&self, status: u16, raw: &str) {
        self.delete_script.borrow_mut().push_back((status, raw.to_string()));
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn deletes_issued(&self) -> usize {
        self.calls.borrow().iter().filter(|c| matches!(c, Call::Delete(..))).count()
    }
}

impl Service for MockService {
    fn name(&self) -> &str {
        "network"
    }

    fn list(&self, _auth: &AuthInfo, resource: &str) -> Result<ServiceResponse, CoreError> {
        self.calls.borrow_mut().push(Call::List(resource.to_string()));
        let (status, raw) = self.list_script
                                .borrow_mut()
                                .pop_front()
                                .unwrap_or((200, "{}".to_string()));
        Ok(ServiceResponse::evaluate(200, status, raw))
    }

    fn create(&self, _auth: &AuthInfo, resource: &str, payload: &Value) -> Result<ServiceResponse, CoreError> {
        self.calls
            .borrow_mut()
            .push(Call::Create(resource.to_string(), payload.to_string()));
        if self.fail_next_create.replace(false) {
            return Err(CoreError::Transport("connection refused".into()));
        }
        let (status, raw) = self.create_script
                                .borrow_mut()
                                .pop_front()
                                .unwrap_or((500, String::new()));
        Ok(ServiceResponse::evaluate(201, status, raw))
    }

    fn delete(&self, _auth: &AuthInfo, resource: &str, id: &str) -> Result<ServiceResponse, CoreError> {
        self.calls
            .borrow_mut()
            .push(Call::Delete(resource.to_string(), id.to_string()));
        let (status, raw) = self.delete_script
                                .borrow_mut()
                                .pop_front()
                                .unwrap_or((204, String::new()));
        Ok(ServiceResponse::evaluate(204, status, raw))
    }
}

fn session_with(sink: Rc<BufferSink>) -> Session {
    let mut session = Session::with_sink(sink);
    session.register_generator(Rc::new(NetworkGenerator::default()));
    session.register_generator(Rc::new(SubnetGenerator::default()));
    session
}

#[test]
fn create_then_delete_with_notification_suppresses_the_compensation() {
    let sink = Rc::new(BufferSink::new());
    let session = session_with(sink.clone());
    let mock = MockService::new();
    mock.script_create(201, r#"{"network": {"id": "abc"}}"#);
    mock.script_delete(204, "");

    let ctx = session.setup(AuthInfo::new("tok"), vec![mock.clone() as Rc<dyn Service>]);
    let result = ctx.scope(|ctx| {
                        let get = GetResources::register(ctx, ResourceFamily::networks())?;
                        get.borrow_mut().invoke(ctx)?;

                        let create = CreateResource::register(ctx, ResourceFamily::networks())?;
                        create.borrow_mut().invoke(ctx, None)?;
                        assert!(create.borrow().was_successful());
                        assert_eq!(create.borrow().created_id(), Some("abc"));

                        let delete = DeleteResource::register(ctx,
                                                              ResourceFamily::networks(),
                                                              vec![create.clone() as TaskRef])?;
                        delete.borrow_mut().invoke(ctx, None)?;
                        assert!(delete.borrow().was_successful());
                        Ok(())
                    });
    assert!(result.is_ok());

    // una creación y un único borrado: la compensación del create quedó
    // suprimida por la notificación "undone"
    let calls = mock.calls();
    assert_eq!(calls.len(), 3, "unexpected calls: {calls:?}");
    assert!(matches!(calls[0], Call::List(ref r) if r == "networks"));
    assert!(matches!(calls[1], Call::Create(ref r, _) if r == "networks"));
    assert_eq!(calls[2], Call::Delete("networks".into(), "abc".into()));
    assert_eq!(mock.deletes_issued(), 1);
    assert!(sink.contains("undo suppressed"));
}

#[test]
fn scope_exit_rolls_back_an_unreversed_create() {
    let session = session_with(Rc::new(BufferSink::new()));
    let mock = MockService::new();
    mock.script_create(201, r#"{"network": {"id": "n-77"}}"#);
    mock.script_delete(204, "");

    let ctx = session.setup(AuthInfo::new("tok"), vec![mock.clone() as Rc<dyn Service>]);
    let result = ctx.scope(|ctx| {
                        let create = CreateResource::register(ctx, ResourceFamily::networks())?;
                        create.borrow_mut().invoke(ctx, None)?;
                        Ok(())
                    });
    assert!(result.is_ok());

    let calls = mock.calls();
    assert_eq!(calls.len(), 2, "unexpected calls: {calls:?}");
    assert!(matches!(calls[0], Call::Create(ref r, _) if r == "networks"));
    assert_eq!(calls[1], Call::Delete("networks".into(), "n-77".into()));
}

#[test]
fn undo_without_a_recorded_id_issues_no_service_call() {
    let sink = Rc::new(BufferSink::new());
    let session = session_with(sink);
    let mock = MockService::new();
    // create responde 500 sin body: no hay id que recordar
    mock.script_create(500, "");

    let ctx = session.setup(AuthInfo::new("tok"), vec![mock.clone() as Rc<dyn Service>]);
    let result = ctx.scope(|ctx| {
                        let create = CreateResource::register(ctx, ResourceFamily::networks())?;
                        create.borrow_mut().invoke(ctx, None)?;
                        assert!(!create.borrow().was_successful());
                        Ok(())
                    });
    assert!(result.is_ok());

    // sólo la creación fallida; el undo fue un no-op sin llamada
    assert_eq!(mock.deletes_issued(), 0);
    assert_eq!(mock.calls().len(), 1);
}

#[test]
fn delete_without_artifact_degrades_without_calling_the_service() {
    let sink = Rc::new(BufferSink::new());
    let session = session_with(sink.clone());
    let mock = MockService::new();

    let ctx = session.setup(AuthInfo::new("tok"), vec![mock.clone() as Rc<dyn Service>]);
    let result = ctx.scope(|ctx| {
                        let delete = DeleteResource::register(ctx, ResourceFamily::networks(), Vec::new())?;
                        delete.borrow_mut().invoke(ctx, None)?;
                        assert!(!delete.borrow().was_successful());
                        Ok(())
                    });
    assert!(result.is_ok());

    assert!(mock.calls().is_empty());
    assert!(sink.contains("no id found for delete"));
}

#[test]
fn ambiguous_artifacts_also_degrade_the_delete() {
    let sink = Rc::new(BufferSink::new());
    let session = session_with(sink.clone());
    let mock = MockService::new();
    mock.script_create(201, r#"{"network": {"id": "a"}}"#);
    mock.script_create(201, r#"{"network": {"id": "b"}}"#);

    let ctx = session.setup(AuthInfo::new("tok"), vec![mock.clone() as Rc<dyn Service>]);
    let _ = ctx.scope(|ctx| {
                   let c1 = CreateResource::register(ctx, ResourceFamily::networks())?;
                   c1.borrow_mut().invoke(ctx, None)?;
                   let c2 = CreateResource::register(ctx, ResourceFamily::networks())?;
                   c2.borrow_mut().invoke(ctx, None)?;

                   let delete = DeleteResource::register(ctx, ResourceFamily::networks(), Vec::new())?;
                   delete.borrow_mut().invoke(ctx, None)?;
                   assert!(!delete.borrow().was_successful());
                   // dos creates, cero deletes hasta aquí
                   assert_eq!(mock.deletes_issued(), 0);
                   Ok(())
               });

    assert!(sink.contains("ambiguous retrieve for artifact ['network']"));
    // el unwind sí borra ambas redes, en orden inverso de creación
    assert_eq!(mock.deletes_issued(), 2);
    let calls = mock.calls();
    assert_eq!(calls[calls.len() - 2], Call::Delete("networks".into(), "b".into()));
    assert_eq!(calls[calls.len() - 1], Call::Delete("networks".into(), "a".into()));
}

#[test]
fn subnets_inherit_the_parent_network_id_and_unwind_first() {
    let session = session_with(Rc::new(BufferSink::new()));
    let mock = MockService::new();
    mock.script_create(201, r#"{"network": {"id": "net-1"}}"#);
    mock.script_create(201, r#"{"subnet": {"id": "sub-1"}}"#);

    let ctx = session.setup(AuthInfo::new("tok"), vec![mock.clone() as Rc<dyn Service>]);
    let result = ctx.scope(|ctx| {
                        let net = CreateResource::register(ctx, ResourceFamily::networks())?;
                        net.borrow_mut().invoke(ctx, None)?;

                        let sub = CreateResource::register(ctx, ResourceFamily::subnets())?;
                        sub.borrow_mut().invoke(ctx, None)?;
                        assert!(sub.borrow().was_successful());
                        Ok(())
                    });
    assert!(result.is_ok());

    let calls = mock.calls();
    // el payload de la subnet lleva el id del padre inyectado
    assert!(matches!(calls[1], Call::Create(ref r, ref payload)
                     if r == "subnets" && payload.contains("\"network_id\":\"net-1\"")));
    // desmontaje LIFO: la subnet cae antes que la red
    assert_eq!(calls[2], Call::Delete("subnets".into(), "sub-1".into()));
    assert_eq!(calls[3], Call::Delete("networks".into(), "net-1".into()));
}

#[test]
fn a_transport_error_in_the_do_phase_surfaces_but_still_unwinds() {
    let session = session_with(Rc::new(BufferSink::new()));
    let mock = MockService::new();
    mock.script_create(201, r#"{"network": {"id": "n-1"}}"#);

    let ctx = session.setup(AuthInfo::new("tok"), vec![mock.clone() as Rc<dyn Service>]);
    let result: Result<(), CoreError> = ctx.scope(|ctx| {
                                               let first = CreateResource::register(ctx, ResourceFamily::networks())?;
                                               first.borrow_mut().invoke(ctx, None)?;

                                               mock.fail_next_create.set(true);
                                               let second = CreateResource::register(ctx, ResourceFamily::networks())?;
                                               second.borrow_mut().invoke(ctx, None)?;
                                               Ok(())
                                           });

    assert!(matches!(result, Err(CoreError::Transport(_))));
    // la primera red se compensó a pesar del error de transporte
    assert_eq!(mock.deletes_issued(), 1);
    assert!(mock.calls().contains(&Call::Delete("networks".into(), "n-1".into())));
}
