use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::capture::{filter, PacketSource, PcapSource};
use crate::config::CaptureConfig;
use crate::core::queue::{CaptureEvent, DeliveryQueue, PacketSender};
use crate::core::session::CaptureSession;
use crate::error::{CaptureTerminated, StartError};
use crate::packet::CapturedPacket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Stopping,
}

/// Result of `CaptureEngine::stop`. Stopping never fails; a thread that
/// outlives the timeout is reported, not raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing was running.
    AlreadyIdle,
    Stopped,
    /// The capture thread did not exit within the stop timeout and was
    /// detached along with its handle.
    Leaked,
}

struct Worker {
    handle: JoinHandle<()>,
    exited: Receiver<()>,
}

pub struct CaptureEngine {
    config: CaptureConfig,
    state: EngineState,
    queue: DeliveryQueue,
    session: Option<Arc<CaptureSession>>,
    worker: Option<Worker>,
}

impl CaptureEngine {
    /// Creates an idle engine and the receiver for its notifications.
    pub fn new(config: CaptureConfig) -> (Self, Receiver<CaptureEvent>) {
        let (queue, events) = DeliveryQueue::new();
        let engine = Self {
            config,
            state: EngineState::Idle,
            queue,
            session: None,
            worker: None,
        };
        (engine, events)
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// A session whose capture primitive died on its own reports `Idle`
    /// even before `stop` reaps its thread.
    pub fn state(&self) -> EngineState {
        match self.state {
            EngineState::Running if !self.session.as_ref().is_some_and(|s| s.is_running()) => {
                EngineState::Idle
            }
            state => state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    /// Current session, or the last one once stopped.
    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_deref()
    }

    /// Opens `interface` with libpcap and starts capturing through `filter`.
    pub fn start(&mut self, interface: &str, filter_expr: &str) -> Result<(), StartError> {
        if let Err(e) = filter::validate(filter_expr) {
            tracing::warn!(interface, error = %e, "refusing to start with invalid filter");
            return Err(e.into());
        }
        self.ensure_idle()?;

        let source = PcapSource::open(interface, filter_expr, &self.config)?;
        self.launch(interface, filter_expr, Box::new(source))
    }

    /// Starts a session over an already-open source. The source is expected
    /// to apply `filter_expr` itself; it is only validated here.
    pub fn start_with_source(
        &mut self,
        label: &str,
        filter_expr: &str,
        source: Box<dyn PacketSource>,
    ) -> Result<(), StartError> {
        filter::validate_for(filter_expr, source.link_type())?;
        self.ensure_idle()?;
        self.launch(label, filter_expr, source)
    }

    /// Stops the running session, waiting at most `stop_timeout` for the
    /// capture thread. No packet is pushed after this returns.
    pub fn stop(&mut self) -> StopOutcome {
        let Some(worker) = self.worker.take() else {
            return StopOutcome::AlreadyIdle;
        };

        self.state = EngineState::Stopping;
        let was_running = self.session.as_ref().is_some_and(|s| s.halt());
        self.queue.seal();

        let outcome = match worker.exited.recv_timeout(self.config.stop_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    tracing::error!("capture thread panicked");
                }
                if was_running {
                    StopOutcome::Stopped
                } else {
                    StopOutcome::AlreadyIdle
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout = ?self.config.stop_timeout,
                    "capture thread did not exit in time; leaking it and its interface handle"
                );
                StopOutcome::Leaked
            }
        };

        self.state = EngineState::Idle;
        if let Some(session) = &self.session {
            tracing::info!(
                interface = session.interface(),
                packets = session.packets(),
                ?outcome,
                "capture stopped"
            );
        }
        outcome
    }

    pub fn try_pop(&self) -> Option<CapturedPacket> {
        self.queue.try_pop()
    }

    /// Packets captured but not yet popped.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    fn ensure_idle(&mut self) -> Result<(), StartError> {
        if self.is_running() {
            let interface = self
                .session
                .as_ref()
                .map(|s| s.interface().to_string())
                .unwrap_or_default();
            return Err(StartError::AlreadyRunning(interface));
        }
        // the previous capture ended on its own; reap its thread first
        if self.worker.is_some() {
            self.stop();
        }
        Ok(())
    }

    fn launch(
        &mut self,
        interface: &str,
        filter_expr: &str,
        source: Box<dyn PacketSource>,
    ) -> Result<(), StartError> {
        let session = Arc::new(CaptureSession::new(interface, filter_expr));
        let sender = self.queue.sender();
        let (exit_tx, exit_rx) = mpsc::channel();

        let thread_session = Arc::clone(&session);
        let handle = thread::Builder::new()
            .name(format!("capture-{}", interface))
            .spawn(move || {
                run_capture(source, &thread_session, &sender);
                let _ = exit_tx.send(());
            })
            .inspect_err(|_| self.queue.seal())?;

        tracing::info!(interface, filter = filter_expr, "capture started");

        self.session = Some(session);
        self.worker = Some(Worker {
            handle,
            exited: exit_rx,
        });
        self.state = EngineState::Running;
        Ok(())
    }
}

impl Drop for CaptureEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of the capture thread.
fn run_capture(mut source: Box<dyn PacketSource>, session: &CaptureSession, sender: &PacketSender) {
    let link_type = source.link_type();

    while session.is_running() {
        match source.next_frame() {
            Ok(Some(frame)) => {
                let packet = CapturedPacket::from_raw(frame.data, frame.timestamp, session.next_sequence())
                    .with_link_type(link_type)
                    .with_elapsed(session.elapsed_at(frame.timestamp))
                    .with_wire_len(frame.wire_len);

                if !sender.push(packet) {
                    break;
                }
            }
            Ok(None) => continue,
            Err(e) => {
                // a requested stop may surface as a read error; only report
                // failures nobody asked for
                if session.halt() {
                    tracing::error!(interface = session.interface(), error = %e, "capture terminated");
                    sender.terminate(CaptureTerminated {
                        interface: session.interface().to_string(),
                        reason: e.to_string(),
                    });
                }
                break;
            }
        }
    }

    tracing::debug!(
        interface = session.interface(),
        packets = session.packets(),
        "capture thread exiting"
    );
}
