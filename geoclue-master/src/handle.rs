//! Sync facade over a MasterService running on its own thread
//!
//! Every method blocks until the worker has processed the request. Do not
//! call them from inside an async runtime.

use std::collections::BTreeMap;
use std::thread::JoinHandle;

use geoclue_bus::{BusConnection, BusMessage, MethodCall, MethodReply};
use geoclue_providers::{Constraints, ProviderRecord};
use tokio::sync::{mpsc, oneshot};

use crate::error::{MasterError, Result};
use crate::service::{MasterService, MasterStats};
use crate::worker::{spawn_master_worker, Command};

/// Thread-safe handle to a running broker
///
/// Dropping the handle shuts the worker down and waits for it.
pub struct MasterHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl MasterHandle {
    /// Move `service` onto a background worker thread
    pub fn spawn<C>(service: MasterService<C>) -> Result<Self>
    where
        C: BusConnection + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let worker = spawn_master_worker(service, command_rx).map_err(|e| {
            tracing::error!("Failed to spawn master worker: {}", e);
            MasterError::WorkerDisconnected
        })?;

        Ok(Self {
            command_tx,
            worker: Some(worker),
        })
    }

    fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| MasterError::WorkerDisconnected)
    }

    fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx))?;
        reply_rx
            .blocking_recv()
            .map_err(|_| MasterError::WorkerDisconnected)
    }

    /// Queue an incoming message for the service's filter
    pub fn deliver(&self, message: impl Into<BusMessage>) -> Result<()> {
        self.send(Command::Deliver(message.into()))
    }

    pub fn call(&self, call: MethodCall) -> Result<Option<MethodReply>> {
        self.request(|reply| Command::Call { call, reply })
    }

    pub fn create_session(&self, call: MethodCall) -> Result<String> {
        self.request(|reply| Command::Create { call, reply })?
    }

    pub fn release_session(&self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        self.request(|reply| Command::Release { path, reply })?
    }

    pub fn set_requirements(&self, path: impl Into<String>, requirements: Constraints) -> Result<()> {
        let path = path.into();
        self.request(|reply| Command::SetRequirements {
            path,
            requirements,
            reply,
        })?
    }

    /// Snapshot of the providers matching a session's requirements
    pub fn providers_for(&self, path: impl Into<String>) -> Result<Vec<ProviderRecord>> {
        let path = path.into();
        self.request(|reply| Command::Providers { path, reply })?
    }

    pub fn emit_options_changed(&self, options: BTreeMap<String, String>) -> Result<()> {
        self.request(|reply| Command::EmitOptionsChanged { options, reply })?
    }

    pub fn stats(&self) -> Result<MasterStats> {
        self.request(|reply| Command::Stats { reply })
    }

    /// Stop the worker and wait for it to exit
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Master worker panicked");
            }
        }
    }
}

impl Drop for MasterHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
