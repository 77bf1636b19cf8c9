//! Session harness.
//!
//! Runs a [`SessionActor`] against in-memory channels: the test plays the
//! transport, feeding events and reading what the session sends.

use super::executor::RecordingExecutor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use xmpp_commander::muc::MucConfig;
use xmpp_commander::permission::AdminRule;
use xmpp_commander::{Session, SessionActor, SessionResult, TransportEvent};
use xmpp_stanza::Element;

/// Reply body used by the default executor.
pub const UPTIME_REPLY: &str = "Server has been up a long time";

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Bare JID used for [`TestBot::sync`] barriers.
const SYNC_JID: &str = "sync@localhost";

/// A running session with the test acting as transport.
pub struct TestBot {
    events: mpsc::Sender<TransportEvent>,
    outbound: mpsc::Receiver<Element>,
    handle: JoinHandle<SessionResult<()>>,
    pub executor: Arc<RecordingExecutor>,
}

#[allow(dead_code)]
impl TestBot {
    /// Spawn with the default executor and no timeout.
    pub fn spawn(admins: Vec<AdminRule>, muc: Option<MucConfig>) -> Self {
        Self::spawn_with(
            admins,
            muc,
            RecordingExecutor::new(UPTIME_REPLY),
            None,
        )
    }

    pub fn spawn_with(
        admins: Vec<AdminRule>,
        muc: Option<MucConfig>,
        executor: RecordingExecutor,
        command_timeout: Option<Duration>,
    ) -> Self {
        let executor = Arc::new(executor);
        let actor = SessionActor::new(Session::new(admins, muc), executor.clone())
            .with_command_timeout(command_timeout);
        let (out_tx, outbound) = mpsc::channel(64);
        let (events, handle) = actor.spawn(out_tx);
        Self {
            events,
            outbound,
            handle,
            executor,
        }
    }

    pub async fn send_event(&self, event: TransportEvent) {
        self.events
            .send(event)
            .await
            .expect("session task ended early");
    }

    pub async fn online(&self) {
        self.send_event(TransportEvent::Online).await;
    }

    /// Deliver one inbound stanza.
    pub async fn stanza(&self, raw: &str) {
        self.send_event(TransportEvent::Stanza(super::stanza(raw)))
            .await;
    }

    /// Next stanza the session sent.
    pub async fn recv(&mut self) -> anyhow::Result<Element> {
        match timeout(RECV_TIMEOUT, self.outbound.recv()).await? {
            Some(el) => Ok(el),
            None => Err(anyhow::anyhow!("session closed its outbound channel")),
        }
    }

    /// Receive until `predicate` matches; returns the matching stanza.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Element>
    where
        F: FnMut(&Element) -> bool,
    {
        loop {
            let el = self.recv().await?;
            if predicate(&el) {
                return Ok(el);
            }
        }
    }

    /// Wait until every event sent so far has been processed.
    ///
    /// Sends a subscription request and collects everything the session
    /// sent before answering it. Only valid once online.
    pub async fn sync(&mut self) -> anyhow::Result<Vec<Element>> {
        self.stanza(&format!(
            r#"<presence from="{SYNC_JID}/probe" type="subscribe"/>"#
        ))
        .await;
        let mut before = Vec::new();
        loop {
            let el = self.recv().await?;
            if el.is("presence") && el.attr("to") == Some(SYNC_JID) {
                return Ok(before);
            }
            before.push(el);
        }
    }

    /// Sync, then give spawned executor tasks a moment to run.
    pub async fn settle(&mut self) -> anyhow::Result<Vec<Element>> {
        let mut seen = self.sync().await?;
        tokio::time::sleep(Duration::from_millis(50)).await;
        while let Ok(Some(el)) = timeout(Duration::from_millis(10), self.outbound.recv()).await {
            seen.push(el);
        }
        Ok(seen)
    }

    /// Close the transport side and return how the session ended.
    pub async fn finish(self) -> SessionResult<()> {
        drop(self.events);
        timeout(RECV_TIMEOUT, self.handle)
            .await
            .expect("session did not stop")
            .expect("session task panicked")
    }

    /// Wait for the session to end on its own (after a fatal event).
    pub async fn ended(self) -> SessionResult<()> {
        timeout(RECV_TIMEOUT, self.handle)
            .await
            .expect("session did not stop")
            .expect("session task panicked")
    }
}
