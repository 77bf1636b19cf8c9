//! Fake line gateway.
//!
//! Accepts the bot's TCP connection and exchanges one stanza per line.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use xmpp_stanza::Element;

/// A listening gateway.
pub struct TestGateway {
    listener: TcpListener,
}

/// The gateway end of one accepted connection.
pub struct GatewayConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

#[allow(dead_code)]
impl TestGateway {
    pub async fn bind() -> anyhow::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind("127.0.0.1:0").await?,
        })
    }

    pub fn address(&self) -> String {
        self.listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_default()
    }

    pub async fn accept(&self) -> anyhow::Result<GatewayConnection> {
        let (stream, _) = timeout(Duration::from_secs(5), self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(GatewayConnection {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }
}

#[allow(dead_code)]
impl GatewayConnection {
    /// Send one stanza line.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one stanza.
    pub async fn recv(&mut self) -> anyhow::Result<Element> {
        let mut line = String::new();
        let read = timeout(Duration::from_secs(5), self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("bot closed the connection");
        }
        line.trim_end()
            .parse::<Element>()
            .map_err(|e| anyhow::anyhow!("Parse error: {}", e))
    }

    /// Separate the read and write sides so a test can do both at once.
    pub fn into_parts(self) -> (BufReader<OwnedReadHalf>, BufWriter<OwnedWriteHalf>) {
        (self.reader, self.writer)
    }

    /// Hang up.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
