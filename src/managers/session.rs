//! Session Manager
//!
//! Runs any number of independent recognition sessions. Each session is owned
//! by its own task and fed through a command queue, so frames of one session
//! are processed strictly in order while different sessions run in parallel.
//! Resets travel through the same queue and therefore always land between two
//! frames.

use crate::config::EngineConfig;
use crate::engine::{
    BatchReport, FrameInput, ResultSnapshot, SessionStats, SignSession, ThresholdController,
};
use crate::error::{ConfigError, SessionError};
use crate::export::SessionExport;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub type SessionId = u64;

/// Frames that may wait in a session's queue before senders are backpressured.
const SESSION_QUEUE_DEPTH: usize = 64;

enum SessionCommand {
    Process {
        frame: Option<FrameInput>,
        reply: oneshot::Sender<ResultSnapshot>,
    },
    Batch {
        frames: Vec<Option<FrameInput>>,
        reply: oneshot::Sender<Result<BatchReport, SessionError>>,
    },
    Reset {
        reply: oneshot::Sender<SessionStats>,
    },
    Stats {
        reply: oneshot::Sender<SessionStats>,
    },
    Export {
        reply: oneshot::Sender<SessionExport>,
    },
}

struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    /// Written by the control plane directly; the session reads it per frame.
    threshold: Arc<ThresholdController>,
    task: JoinHandle<()>,
}

/// Owns the decision loops of all open sessions.
pub struct SessionManager {
    config: EngineConfig,
    next_session_id: AtomicU64,
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl SessionManager {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            next_session_id: AtomicU64::new(1),
            sessions: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a new session with fresh state. Must be called from within a
    /// Tokio runtime.
    pub fn open_session(&self) -> Result<SessionId, ConfigError> {
        let id = self.next_session_id.fetch_add(1, Ordering::SeqCst);
        let threshold = Arc::new(ThresholdController::new(self.config.confidence_threshold)?);
        let session = SignSession::with_threshold(self.config.clone(), threshold.clone())?;

        let (commands, receiver) = mpsc::channel(SESSION_QUEUE_DEPTH);
        let task = tokio::spawn(run_session(id, session, receiver));

        self.sessions.lock().unwrap().insert(
            id,
            SessionHandle {
                commands,
                threshold,
                task,
            },
        );

        info!("Opened session {}", id);
        Ok(id)
    }

    /// Stop accepting commands for `id`. Frames already queued are still
    /// processed before the loop exits.
    pub fn close_session(&self, id: SessionId) -> bool {
        let removed = self.sessions.lock().unwrap().remove(&id);
        match removed {
            Some(_) => {
                info!("Closed session {}", id);
                true
            }
            None => false,
        }
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.lock().unwrap().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub async fn process(
        &self,
        id: SessionId,
        frame: Option<FrameInput>,
    ) -> Result<ResultSnapshot, SessionError> {
        self.request(id, |reply| SessionCommand::Process { frame, reply })
            .await
    }

    pub async fn process_batch(
        &self,
        id: SessionId,
        frames: Vec<Option<FrameInput>>,
    ) -> Result<BatchReport, SessionError> {
        self.request(id, |reply| SessionCommand::Batch { frames, reply })
            .await?
    }

    /// Clear the session's state. Returns the statistics it had before.
    pub async fn reset_session(&self, id: SessionId) -> Result<SessionStats, SessionError> {
        self.request(id, |reply| SessionCommand::Reset { reply }).await
    }

    pub async fn stats(&self, id: SessionId) -> Result<SessionStats, SessionError> {
        self.request(id, |reply| SessionCommand::Stats { reply }).await
    }

    pub async fn export(&self, id: SessionId) -> Result<SessionExport, SessionError> {
        self.request(id, |reply| SessionCommand::Export { reply }).await
    }

    /// Takes effect on the next frame the session processes.
    pub fn set_threshold(&self, id: SessionId, value: f32) -> Result<(), SessionError> {
        self.threshold_controller(id)?.set(value)?;
        Ok(())
    }

    pub fn cycle_threshold(&self, id: SessionId) -> Result<f32, SessionError> {
        Ok(self.threshold_controller(id)?.cycle_preset())
    }

    pub fn threshold(&self, id: SessionId) -> Result<f32, SessionError> {
        Ok(self.threshold_controller(id)?.get())
    }

    /// Close every session and wait for their loops to drain.
    pub async fn shutdown(&self) {
        let handles: Vec<(SessionId, SessionHandle)> =
            self.sessions.lock().unwrap().drain().collect();

        for (id, handle) in handles {
            drop(handle.commands);
            if let Err(e) = handle.task.await {
                warn!("Session {} loop ended abnormally: {}", id, e);
            }
        }
        info!("All sessions shut down");
    }

    fn threshold_controller(&self, id: SessionId) -> Result<Arc<ThresholdController>, SessionError> {
        self.sessions
            .lock()
            .unwrap()
            .get(&id)
            .map(|h| h.threshold.clone())
            .ok_or(SessionError::UnknownSession(id))
    }

    async fn request<T>(
        &self,
        id: SessionId,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        // clone the sender so the map lock is not held across an await
        let commands = self
            .sessions
            .lock()
            .unwrap()
            .get(&id)
            .map(|h| h.commands.clone())
            .ok_or(SessionError::UnknownSession(id))?;

        let (reply, response) = oneshot::channel();
        commands
            .send(command(reply))
            .await
            .map_err(|_| SessionError::Closed(id))?;
        response.await.map_err(|_| SessionError::Closed(id))
    }
}

async fn run_session(
    id: SessionId,
    mut session: SignSession,
    mut commands: mpsc::Receiver<SessionCommand>,
) {
    debug!("Session {} loop started", id);

    while let Some(command) = commands.recv().await {
        match command {
            SessionCommand::Process { frame, reply } => {
                let _ = reply.send(session.process(frame));
            }
            SessionCommand::Batch { frames, reply } => {
                let _ = reply.send(session.process_batch(frames));
            }
            SessionCommand::Reset { reply } => {
                let _ = reply.send(session.reset());
            }
            SessionCommand::Stats { reply } => {
                let _ = reply.send(session.stats());
            }
            SessionCommand::Export { reply } => {
                let _ = reply.send(session.export());
            }
        }
    }

    debug!("Session {} loop finished", id);
}
