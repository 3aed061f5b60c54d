//! A single charge point's connection lifecycle: the inbound read pump,
//! outbound call/response correlation, and the state machine tying them
//! together.

pub mod registry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{oneshot, Mutex, Notify, RwLock};
use tokio::time::{timeout, Duration};

use crate::bus::SharedEventBus;
use crate::codec::OcppFrame;
use crate::domain::{
    ChargePointSettings, Event, NotifyReportBuffer, OcppVersion, ReportItem,
    TOPIC_CHARGE_POINT_DISCONNECTED,
};
use crate::handlers::{HandlerError, HandlerSet};
use crate::transport::{ChannelAdapter, IncomingMessage};

pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Running,
    Closing,
    Closed,
}

#[derive(Debug, thiserror::Error, Clone)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,
    #[error("station disconnected mid-call")]
    Disconnected,
    #[error("call timed out")]
    Timeout,
    #[error("charge point returned an error: {code}: {description}")]
    CallError {
        code: String,
        description: String,
        details: Value,
    },
    #[error("transport error: {0}")]
    Transport(String),
}

type PendingOutcome = Result<Value, SessionError>;

/// One charge point's live session.
pub struct Session {
    pub charge_point_id: String,
    pub ocpp_version: OcppVersion,
    channel: Arc<dyn ChannelAdapter>,
    pending: DashMap<String, oneshot::Sender<PendingOutcome>>,
    next_id: AtomicU64,
    state: RwLock<SessionState>,
    pub settings: RwLock<ChargePointSettings>,
    bus: SharedEventBus,
    report_buffer: Mutex<NotifyReportBuffer>,
    report_notify: Notify,
}

impl Session {
    pub fn new(
        charge_point_id: impl Into<String>,
        ocpp_version: OcppVersion,
        channel: Arc<dyn ChannelAdapter>,
        settings: ChargePointSettings,
        bus: SharedEventBus,
    ) -> Arc<Self> {
        Arc::new(Self {
            charge_point_id: charge_point_id.into(),
            ocpp_version,
            channel,
            pending: DashMap::new(),
            next_id: AtomicU64::new(1),
            state: RwLock::new(SessionState::Starting),
            settings: RwLock::new(settings),
            bus,
            report_buffer: Mutex::new(NotifyReportBuffer::new()),
            report_notify: Notify::new(),
        })
    }

    /// Begin a new `GetBaseReport` cycle, discarding any prior buffer state.
    pub async fn reset_report_buffer(&self) {
        self.report_buffer.lock().await.reset();
    }

    /// Ingest one `NotifyReport` frame. Returns this frame's rows and wakes
    /// any waiter if the report is now complete (`tbc == false`).
    pub async fn ingest_notify_report(&self, seq_no: i64, tbc: bool, report_data: &[Value]) -> Vec<ReportItem> {
        let mut buf = self.report_buffer.lock().await;
        let rows = buf.ingest_frame(seq_no, tbc, report_data);
        if buf.done() {
            self.report_notify.notify_waiters();
        }
        rows
    }

    /// Wait up to `deadline` for the current report cycle to complete, then
    /// return the deduplicated rows regardless of whether it did.
    pub async fn wait_for_report(&self, deadline: Duration) -> Vec<ReportItem> {
        if !self.report_buffer.lock().await.done() {
            let _ = timeout(deadline, self.report_notify.notified()).await;
        }
        self.report_buffer.lock().await.dedup()
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    fn next_call_id(&self) -> String {
        format!("CS-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Send a CALL and await its CALLRESULT/CALLERROR, or time out.
    ///
    /// Defaults to `DEFAULT_CALL_TIMEOUT_SECS`; callers needing a different
    /// budget (e.g. the configuration aggregator) pass one explicitly.
    pub async fn send_call(
        &self,
        action: &str,
        payload: Value,
        call_timeout: Option<Duration>,
    ) -> Result<Value, SessionError> {
        if *self.state.read().await == SessionState::Closed {
            return Err(SessionError::Closed);
        }

        let unique_id = self.next_call_id();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(unique_id.clone(), tx);

        let frame = OcppFrame::Call {
            unique_id: unique_id.clone(),
            action: action.to_string(),
            payload,
        };

        tracing::debug!(charge_point_id = %self.charge_point_id, %action, %unique_id, "sending call");

        if let Err(e) = self.channel.send(frame.serialize()).await {
            self.pending.remove(&unique_id);
            return Err(SessionError::Transport(e.to_string()));
        }

        let wait = call_timeout.unwrap_or_else(|| Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS));
        match timeout(wait, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(SessionError::Closed),
            Err(_) => {
                self.pending.remove(&unique_id);
                Err(SessionError::Timeout)
            }
        }
    }

    /// Resolve a pending call from an inbound CALLRESULT/CALLERROR frame.
    fn resolve_pending(&self, unique_id: &str, outcome: PendingOutcome) {
        if let Some((_, tx)) = self.pending.remove(unique_id) {
            let _ = tx.send(outcome);
        } else {
            tracing::warn!(
                charge_point_id = %self.charge_point_id,
                %unique_id,
                "received response for unknown or already-resolved call"
            );
        }
    }

    /// Fail every outstanding call, e.g. on disconnect.
    fn drain_pending(&self, err: SessionError) {
        let ids: Vec<String> = self.pending.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if let Some((_, tx)) = self.pending.remove(&id) {
                let _ = tx.send(Err(err.clone()));
            }
        }
    }

    /// Drive the inbound read loop until the remote disconnects or the
    /// session is asked to close. Runs to completion; callers spawn it.
    pub async fn run(self: Arc<Self>, handlers: Arc<dyn HandlerSet>) {
        *self.state.write().await = SessionState::Running;

        loop {
            match self.channel.recv().await {
                Some(IncomingMessage::Text(text)) => {
                    self.handle_inbound(&text, &handlers).await;
                }
                Some(IncomingMessage::Closed) | None => break,
            }

            if *self.state.read().await == SessionState::Closing {
                break;
            }
        }

        self.finish_disconnect().await;
    }

    async fn handle_inbound(&self, text: &str, handlers: &Arc<dyn HandlerSet>) {
        let frame = match OcppFrame::parse(text) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(charge_point_id = %self.charge_point_id, error = %e, "dropping unparseable frame");
                return;
            }
        };

        match frame {
            OcppFrame::Call { unique_id, action, payload } => {
                tracing::debug!(charge_point_id = %self.charge_point_id, %action, %unique_id, "received call");
                let response = match handlers.handle_call(self, &action, payload).await {
                    Ok(result_payload) => OcppFrame::CallResult { unique_id, payload: result_payload },
                    Err(HandlerError::NotImplemented) => OcppFrame::CallError {
                        unique_id,
                        error_code: "NotImplemented".into(),
                        error_description: format!("no handler for action {action}"),
                        error_details: Value::Object(Default::default()),
                    },
                    Err(HandlerError::FormationViolation(msg)) => OcppFrame::CallError {
                        unique_id,
                        error_code: "FormationViolation".into(),
                        error_description: msg,
                        error_details: Value::Object(Default::default()),
                    },
                };
                if let Err(e) = self.channel.send(response.serialize()).await {
                    tracing::warn!(charge_point_id = %self.charge_point_id, error = %e, "failed to send response");
                }
            }
            OcppFrame::CallResult { unique_id, payload } => {
                self.resolve_pending(&unique_id, Ok(payload));
            }
            OcppFrame::CallError { unique_id, error_code, error_description, error_details } => {
                self.resolve_pending(
                    &unique_id,
                    Err(SessionError::CallError {
                        code: error_code,
                        description: error_description,
                        details: error_details,
                    }),
                );
            }
        }
    }

    async fn finish_disconnect(&self) {
        *self.state.write().await = SessionState::Closed;
        self.drain_pending(SessionError::Disconnected);
        self.channel.close().await;

        self.bus
            .publish(Event::new(
                TOPIC_CHARGE_POINT_DISCONNECTED,
                self.charge_point_id.clone(),
                Some(self.ocpp_version),
                serde_json::json!({}),
                chrono::Utc::now(),
            ))
            .await;
    }

    /// Request a graceful shutdown of the read loop from outside (e.g. an
    /// operator-initiated disconnect). The loop observes this on its next
    /// iteration boundary.
    pub async fn request_close(&self) {
        *self.state.write().await = SessionState::Closing;
        self.channel.close().await;
    }
}
