//! Background worker thread owning a MasterService
//!
//! Spawns a thread with its own tokio runtime. Commands from the sync
//! [`MasterHandle`](crate::MasterHandle) are processed one at a time, in the
//! order they were sent.

use std::collections::BTreeMap;
use std::thread::{self, JoinHandle};

use geoclue_bus::{BusConnection, BusMessage, MessageFilter, MethodCall, MethodReply};
use geoclue_providers::{Constraints, ProviderRecord};
use tokio::sync::{mpsc, oneshot};

use crate::error::Result;
use crate::service::{MasterService, MasterStats};

/// Commands sent from the handle to the background worker
#[derive(Debug)]
pub enum Command {
    /// Show an incoming message to the service's filter
    Deliver(BusMessage),
    /// Route a method call to the master object
    Call {
        call: MethodCall,
        reply: oneshot::Sender<Option<MethodReply>>,
    },
    Create {
        call: MethodCall,
        reply: oneshot::Sender<Result<String>>,
    },
    Release {
        path: String,
        reply: oneshot::Sender<Result<()>>,
    },
    SetRequirements {
        path: String,
        requirements: Constraints,
        reply: oneshot::Sender<Result<()>>,
    },
    Providers {
        path: String,
        reply: oneshot::Sender<Result<Vec<ProviderRecord>>>,
    },
    EmitOptionsChanged {
        options: BTreeMap<String, String>,
        reply: oneshot::Sender<Result<()>>,
    },
    Stats {
        reply: oneshot::Sender<MasterStats>,
    },
    /// Stop the worker
    Shutdown,
}

/// Spawns the background worker thread
pub fn spawn_master_worker<C>(
    service: MasterService<C>,
    command_rx: mpsc::UnboundedReceiver<Command>,
) -> std::io::Result<JoinHandle<()>>
where
    C: BusConnection + 'static,
{
    thread::Builder::new()
        .name("geoclue-master".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread().build() {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to create tokio runtime for master worker: {}", e);
                    return;
                }
            };

            rt.block_on(run_command_loop(service, command_rx));
        })
}

async fn run_command_loop<C: BusConnection>(
    mut service: MasterService<C>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
) {
    tracing::info!("Master worker started ({})", service.stats());

    while let Some(command) = command_rx.recv().await {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::Deliver(message) => {
                service.filter(&message);
            }
            Command::Call { call, reply } => {
                let _ = reply.send(service.handle_method_call(&call));
            }
            Command::Create { call, reply } => {
                let _ = reply.send(service.create_session(&call));
            }
            Command::Release { path, reply } => {
                let _ = reply.send(service.release_session(&path));
            }
            Command::SetRequirements {
                path,
                requirements,
                reply,
            } => {
                let _ = reply.send(service.set_requirements(&path, requirements));
            }
            Command::Providers { path, reply } => {
                let providers = service
                    .providers_for(&path)
                    .map(|records| records.into_iter().cloned().collect());
                let _ = reply.send(providers);
            }
            Command::EmitOptionsChanged { options, reply } => {
                let _ = reply.send(service.emit_options_changed(options));
            }
            Command::Stats { reply } => {
                let _ = reply.send(service.stats());
            }
            Command::Shutdown => {
                tracing::info!("Master worker received shutdown command");
                break;
            }
        }
    }

    tracing::info!("Master worker shut down ({})", service.stats());
}
