//! Stanza transport.
//!
//! The session consumes a stream of [`TransportEvent`]s and produces
//! [`Element`]s to send. [`LineTransport`] is the concrete transport: one
//! stanza per line over TCP, framed with [`StanzaCodec`]. Stream negotiation
//! (TLS, SASL, binding) is left to the gateway at the other end.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};
use xmpp_stanza::{Element, StanzaCodec, StanzaError};

/// Capacity of the event and outbound channels.
const CHANNEL_CAPACITY: usize = 64;

/// What the transport reports to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The stream is ready for stanzas.
    Online,
    /// The transport failed; no further events follow.
    Error(String),
    /// One inbound stanza.
    Stanza(Element),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection closed by peer")]
    Closed,
    #[error(transparent)]
    Stanza(#[from] StanzaError),
}

impl TransportError {
    /// Whether the stream can keep going after this error.
    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Stanza(
                StanzaError::Malformed { .. }
                    | StanzaError::MismatchedTag { .. }
                    | StanzaError::TrailingData(_)
                    | StanzaError::Empty
                    | StanzaError::LineTooLong { .. }
            )
        )
    }
}

/// Newline-delimited stanzas over TCP.
#[derive(Debug, Clone)]
pub struct LineTransport {
    address: String,
    max_line_bytes: usize,
}

impl LineTransport {
    pub fn new(address: impl Into<String>, max_line_bytes: usize) -> Self {
        Self {
            address: address.into(),
            max_line_bytes,
        }
    }

    /// Connect in the background.
    ///
    /// Returns the sender for outbound stanzas and the receiver for
    /// transport events. Dropping the sender closes the connection.
    pub fn spawn(self) -> (mpsc::Sender<Element>, mpsc::Receiver<TransportEvent>) {
        let (out_tx, out_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            if let Err(e) = self.run(out_rx, &event_tx).await {
                let _ = event_tx.send(TransportEvent::Error(e.to_string())).await;
            }
        });

        (out_tx, event_rx)
    }

    async fn run(
        self,
        mut outbound: mpsc::Receiver<Element>,
        events: &mpsc::Sender<TransportEvent>,
    ) -> Result<(), TransportError> {
        info!(address = %self.address, "connecting");
        let stream = TcpStream::connect(&self.address)
            .await
            .map_err(|source| TransportError::Connect {
                address: self.address.clone(),
                source,
            })?;

        let mut framed = Framed::new(stream, StanzaCodec::with_max_len(self.max_line_bytes));
        if events.send(TransportEvent::Online).await.is_err() {
            return Ok(());
        }
        info!(address = %self.address, "online");

        // A decoded stanza waits here until the session has room for it, so
        // outbound stanzas keep draining while the event channel is full.
        let mut pending: Option<Element> = None;

        loop {
            tokio::select! {
                inbound = framed.next(), if pending.is_none() => {
                    match inbound {
                        Some(Ok(element)) => pending = Some(element),
                        Some(Err(e)) => {
                            let e = TransportError::from(e);
                            if !e.is_recoverable() {
                                return Err(e);
                            }
                            warn!(error = %e, "dropping unreadable stanza");
                        }
                        None => return Err(TransportError::Closed),
                    }
                }
                permit = events.reserve(), if pending.is_some() => {
                    let Ok(permit) = permit else {
                        return Ok(());
                    };
                    if let Some(element) = pending.take() {
                        permit.send(TransportEvent::Stanza(element));
                    }
                }
                out = outbound.recv() => {
                    match out {
                        Some(element) => {
                            debug!(stanza = %element, "send");
                            framed.send(element).await?;
                        }
                        None => {
                            debug!("session closed the transport");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
