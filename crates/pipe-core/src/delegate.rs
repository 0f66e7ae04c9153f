//! Sumidero de ciclo de vida y salida de un step.
//!
//! El delegate recibe las fases (`initializing`, `starting`, `finished`) y
//! expone los streams stdout/stderr que el usuario final lee como log del
//! step.
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::logging::Session;

pub trait BuildStepDelegate: Send + Sync {
    fn initializing(&self, logger: &Session);
    fn starting(&self, logger: &Session);
    fn finished(&self, logger: &Session, succeeded: bool);
    fn stdout(&self) -> Box<dyn Write + Send>;
    fn stderr(&self) -> Box<dyn Write + Send>;
}

/// Fase registrada por `BufferedDelegate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegatePhase {
    Initializing,
    Starting,
    Finished { succeeded: bool },
}

/// Writer sobre un buffer compartido.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let guard = self.0.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&guard).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.0.lock().unwrap_or_else(|p| p.into_inner());
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Delegate en memoria: acumula fases y salida. Lo usan los tests y los
/// callers que quieren inspeccionar la salida al terminar.
#[derive(Debug, Clone, Default)]
pub struct BufferedDelegate {
    phases: Arc<Mutex<Vec<(DelegatePhase, DateTime<Utc>)>>>,
    stdout: SharedBuffer,
    stderr: SharedBuffer,
}

impl BufferedDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phases(&self) -> Vec<DelegatePhase> {
        let guard = self.phases.lock().unwrap_or_else(|p| p.into_inner());
        guard.iter().map(|(p, _)| *p).collect()
    }

    /// Resultado de la última llamada a `finished`, si la hubo.
    pub fn finished_with(&self) -> Option<bool> {
        self.phases().into_iter().rev().find_map(|p| match p {
                                          DelegatePhase::Finished { succeeded } => Some(succeeded),
                                          _ => None,
                                      })
    }

    pub fn stdout_contents(&self) -> String {
        self.stdout.contents()
    }

    pub fn stderr_contents(&self) -> String {
        self.stderr.contents()
    }

    fn record(&self, phase: DelegatePhase) {
        let mut guard = self.phases.lock().unwrap_or_else(|p| p.into_inner());
        guard.push((phase, Utc::now()));
    }
}

impl BuildStepDelegate for BufferedDelegate {
    fn initializing(&self, logger: &Session) {
        logger.debug("initializing");
        self.record(DelegatePhase::Initializing);
    }

    fn starting(&self, logger: &Session) {
        logger.debug("starting");
        self.record(DelegatePhase::Starting);
    }

    fn finished(&self, logger: &Session, succeeded: bool) {
        logger.info("finished", &[("succeeded", &succeeded)]);
        self.record(DelegatePhase::Finished { succeeded });
    }

    fn stdout(&self) -> Box<dyn Write + Send> {
        Box::new(self.stdout.clone())
    }

    fn stderr(&self) -> Box<dyn Write + Send> {
        Box::new(self.stderr.clone())
    }
}

/// Delegate que escribe directo a la salida estándar del proceso.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioDelegate;

impl BuildStepDelegate for StdioDelegate {
    fn initializing(&self, logger: &Session) {
        logger.info("initializing", &[]);
    }

    fn starting(&self, logger: &Session) {
        logger.info("starting", &[]);
    }

    fn finished(&self, logger: &Session, succeeded: bool) {
        logger.info("finished", &[("succeeded", &succeeded)]);
    }

    fn stdout(&self) -> Box<dyn Write + Send> {
        Box::new(io::stdout())
    }

    fn stderr(&self) -> Box<dyn Write + Send> {
        Box::new(io::stderr())
    }
}
