//! Commands that ship with the binary.

use super::{CommandContext, CommandExecutor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

const HELP: &str = "Commands: ping, uptime, echo <text>, whoami, help";

/// `ping`, `uptime`, `echo`, `whoami` and `help`.
#[derive(Debug, Clone)]
pub struct BuiltinCommands {
    started: DateTime<Utc>,
}

impl BuiltinCommands {
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    /// Report uptime relative to `started`.
    pub fn started_at(started: DateTime<Utc>) -> Self {
        Self { started }
    }

    fn uptime(&self, now: DateTime<Utc>) -> String {
        let secs = (now - self.started).num_seconds().max(0);
        let (days, rem) = (secs / 86_400, secs % 86_400);
        let (hours, rem) = (rem / 3_600, rem % 3_600);
        let (minutes, seconds) = (rem / 60, rem % 60);
        format!(
            "Up {days}d {hours}h {minutes}m {seconds}s (since {})",
            self.started.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

impl Default for BuiltinCommands {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for BuiltinCommands {
    async fn handle(&self, command: &str, context: CommandContext) -> String {
        let (name, args) = match command.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (command, ""),
        };

        match name.to_ascii_lowercase().as_str() {
            "ping" => "pong".to_string(),
            "uptime" => self.uptime(Utc::now()),
            "echo" => args.to_string(),
            "whoami" => context.sender.to_string(),
            "help" => HELP.to_string(),
            _ => format!("Unknown command: {name}. {HELP}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use xmpp_stanza::{Element, Jid};

    fn context() -> CommandContext {
        CommandContext {
            sender: Jid::parse("lloyd@localhost/laptop").unwrap(),
            stanza: Element::new("message"),
        }
    }

    #[tokio::test]
    async fn test_simple_commands() {
        let cmds = BuiltinCommands::new();
        assert_eq!(cmds.handle("ping", context()).await, "pong");
        assert_eq!(cmds.handle("PING", context()).await, "pong");
        assert_eq!(cmds.handle("echo  hello there ", context()).await, "hello there");
        assert_eq!(cmds.handle("whoami", context()).await, "lloyd@localhost/laptop");
        assert_eq!(cmds.handle("help", context()).await, HELP);
    }

    #[tokio::test]
    async fn test_unknown_command_lists_help() {
        let reply = BuiltinCommands::new().handle("reboot now", context()).await;
        assert!(reply.starts_with("Unknown command: reboot."));
        assert!(reply.contains("uptime"));
    }

    #[test]
    fn test_uptime_format() {
        let started = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let cmds = BuiltinCommands::started_at(started);
        let now = started + Duration::seconds(90_061);
        assert_eq!(
            cmds.uptime(now),
            "Up 1d 1h 1m 1s (since 2024-01-01 00:00:00 UTC)"
        );
    }
}
