//! Binario de demostración: autentica, monta un scope de setup y ejercita
//! el ciclo create/delete de red y subnet con rollback automático.

use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::Parser;
use vela_adapters::tasks::{CreateResource, DeleteResource, GetResources, ResourceFamily};
use vela_adapters::{authenticate, AdapterError, HarnessConfig, NetworkGenerator, RestService,
                    SubnetGenerator};
use vela_core::{CoreError, ExecutionContext, LogSink, Service, Session, Task, TaskRef};

#[derive(Parser)]
#[command(name = "vela", about = "Harness de APIs de networking con rollback compensado")]
struct Cli {
    /// Fichero TOML con las secciones [auth] y [network]. Sin él se leen
    /// las variables VELA_* del entorno (se carga .env si existe).
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    verbose: bool,
}

/// Sink del binario: imprime cada línea según llega.
struct StdoutSink;

impl LogSink for StdoutSink {
    fn emit(&self, line: &str) {
        println!("{line}");
    }
}

#[derive(Debug)]
enum CliError {
    Adapter(AdapterError),
    Core(CoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Adapter(e) => write!(f, "{e}"),
            CliError::Core(e) => write!(f, "{e}"),
        }
    }
}

impl From<AdapterError> for CliError {
    fn from(e: AdapterError) -> Self {
        CliError::Adapter(e)
    }
}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Core(e)
    }
}

/// Aplica la política advisoria del contexto: en un scope que no ignora
/// errores, un task fallido corta el workflow (y dispara el rollback).
fn ensure_ok(ctx: &ExecutionContext, task: &dyn Task, label: &'static str) -> Result<(), CoreError> {
    if !ctx.ignore_errors() && !task.was_successful() {
        return Err(CoreError::Internal(format!("task {label} failed")));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    let conf = match &cli.config {
        Some(path) => HarnessConfig::from_file(path)?,
        None => HarnessConfig::from_env()?,
    };

    let auth = authenticate(&conf.auth)?;
    if cli.verbose {
        println!("auth token: {}", auth.token());
    }

    let network: Rc<dyn Service> = Rc::new(RestService::network(&conf.network));

    let mut session = Session::with_sink(Rc::new(StdoutSink));
    session.register_generator(Rc::new(NetworkGenerator::default()));
    session.register_generator(Rc::new(SubnetGenerator::default()));

    let ctx = session.setup(auth, vec![network]);
    let result = ctx.scope(|ctx| {
                        let get = GetResources::register(ctx, ResourceFamily::networks())?;
                        get.borrow_mut().invoke(ctx)?;
                        ensure_ok(ctx, &*get.borrow(), "GetNetworks")?;

                        let create_net = CreateResource::register(ctx, ResourceFamily::networks())?;
                        create_net.borrow_mut().invoke(ctx, None)?;
                        ensure_ok(ctx, &*create_net.borrow(), "CreateNetwork")?;

                        let create_sub = CreateResource::register(ctx, ResourceFamily::subnets())?;
                        create_sub.borrow_mut().invoke(ctx, None)?;
                        ensure_ok(ctx, &*create_sub.borrow(), "CreateSubnet")?;

                        let delete_sub = DeleteResource::register(ctx,
                                                                  ResourceFamily::subnets(),
                                                                  vec![create_sub.clone() as TaskRef])?;
                        delete_sub.borrow_mut().invoke(ctx, None)?;
                        ensure_ok(ctx, &*delete_sub.borrow(), "DeleteSubnet")?;

                        let delete_net = DeleteResource::register(ctx,
                                                                  ResourceFamily::networks(),
                                                                  vec![create_net.clone() as TaskRef])?;
                        delete_net.borrow_mut().invoke(ctx, None)?;
                        ensure_ok(ctx, &*delete_net.borrow(), "DeleteNetwork")?;
                        Ok(())
                    });

    // un Err aquí ya pasó por el rollback del scope
    result.map_err(CliError::from)
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("vela: {e}");
        process::exit(1);
    }
}
