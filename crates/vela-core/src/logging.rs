//! Sink de logging del harness.
//!
//! El contexto formatea cada línea con su fase (`Do`/`Undo`) y la identidad
//! del task; la emisión/persistencia real se delega en el colaborador que
//! implemente `LogSink`.

use std::cell::RefCell;

pub trait LogSink {
    fn emit(&self, line: &str);
}

/// Sink por defecto: emite a través de la fachada `log`.
#[derive(Debug, Default)]
pub struct StdLogSink;

impl LogSink for StdLogSink {
    fn emit(&self, line: &str) {
        log::info!("{line}");
    }
}

/// Buffer en memoria. Útil en tests y para volcar un resumen al final de un
/// workflow (el modelo es mono-hilo, ver `RefCell`).
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: RefCell<Vec<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// ¿Alguna línea contiene el fragmento dado?
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

impl LogSink for BufferSink {
    fn emit(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}
