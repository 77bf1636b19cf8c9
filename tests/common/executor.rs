//! Command executor that records what it was asked to run.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use xmpp_commander::executor::{CommandContext, CommandExecutor};

/// Reply every recorded command with a fixed body.
pub struct RecordingExecutor {
    reply: String,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, CommandContext)>>,
}

#[allow(dead_code)]
impl RecordingExecutor {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep this long before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn last_command(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(c, _)| c.clone())
    }

    pub fn last_context(&self) -> Option<CommandContext> {
        self.calls.lock().unwrap().last().map(|(_, ctx)| ctx.clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn handle(&self, command: &str, context: CommandContext) -> String {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), context));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}
