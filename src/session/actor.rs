//! Session actor.
//!
//! Owns the [`Session`] and processes transport events sequentially.
//! Executor calls run on their own tasks; their replies come back through a
//! completion channel into the same loop, so the session is never touched
//! from two places at once.

use super::{Dispatch, Session, SessionAction};
use crate::error::SessionResult;
use crate::executor::CommandExecutor;
use crate::metrics;
use crate::telemetry::{CommandTimer, spans};
use crate::transport::TransportEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};
use xmpp_stanza::Element;

/// Capacity of the event channel returned by [`SessionActor::spawn`].
const EVENT_CAPACITY: usize = 64;

/// The Session Actor.
pub struct SessionActor {
    session: Session,
    executor: Arc<dyn CommandExecutor>,
    command_timeout: Option<Duration>,
}

impl SessionActor {
    pub fn new(session: Session, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            session,
            executor,
            command_timeout: None,
        }
    }

    /// Drop a command's reply if the executor takes longer than `timeout`.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Spawn the actor on its own task.
    ///
    /// Returns the sender for transport events and the task handle, which
    /// resolves to the fatal error that ended the session, if any.
    pub fn spawn(
        self,
        outbound: mpsc::Sender<Element>,
    ) -> (mpsc::Sender<TransportEvent>, JoinHandle<SessionResult<()>>) {
        let (tx, rx) = mpsc::channel(EVENT_CAPACITY);
        let handle = tokio::spawn(self.run(rx, outbound));
        (tx, handle)
    }

    /// The main actor loop.
    ///
    /// Returns `Ok(())` when the event channel closes and `Err` on the first
    /// fatal session error.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<TransportEvent>,
        outbound: mpsc::Sender<Element>,
    ) -> SessionResult<()> {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Element>();
        self.session.start();

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        info!("transport closed, session ending");
                        return Ok(());
                    };
                    let actions = self.session.handle(event)?;
                    for action in actions {
                        self.perform(action, &outbound, &done_tx).await;
                    }
                }
                Some(reply) = done_rx.recv() => {
                    send(&outbound, reply).await;
                }
            }
        }
    }

    async fn perform(
        &self,
        action: SessionAction,
        outbound: &mpsc::Sender<Element>,
        done: &mpsc::UnboundedSender<Element>,
    ) {
        match action {
            SessionAction::Send(element) => send(outbound, element).await,
            SessionAction::Dispatch(dispatch) => self.dispatch(dispatch, done.clone()),
        }
    }

    /// Run one command on its own task. The reply, if any, is fed back
    /// through `done`.
    fn dispatch(&self, dispatch: Dispatch, done: mpsc::UnboundedSender<Element>) {
        let executor = Arc::clone(&self.executor);
        let timeout = self.command_timeout;
        let span = spans::command(&dispatch.command, &dispatch.context.sender);

        tokio::spawn(
            async move {
                let result = {
                    let _timer = CommandTimer::new();
                    let call = executor.handle(&dispatch.command, dispatch.context.clone());
                    match timeout {
                        Some(limit) => tokio::time::timeout(limit, call).await.ok(),
                        None => Some(call.await),
                    }
                };
                let Some(body) = result else {
                    warn!(timeout = ?timeout, "command timed out, reply dropped");
                    metrics::record_command_timeout();
                    return;
                };
                debug!(reply_to = %dispatch.reply_to, "command finished");
                let _ = done.send(dispatch.reply(&body));
            }
            .instrument(span),
        );
    }
}

async fn send(outbound: &mpsc::Sender<Element>, element: Element) {
    if outbound.send(element).await.is_err() {
        warn!("transport gone, stanza dropped");
        return;
    }
    metrics::record_stanza_sent();
}
