//! Integration tests for executor scheduling: slow commands do not stall
//! the session, and the optional timeout drops late replies.

mod common;

use common::{RecordingExecutor, TestBot};
use std::time::Duration;
use xmpp_commander::executor::BuiltinCommands;
use xmpp_commander::permission::AdminRule;

const CHAT_MESSAGE: &str =
    r#"<message from="lloyd@localhost/laptop" type="chat"><body>uptime</body></message>"#;

fn admins() -> Vec<AdminRule> {
    vec![AdminRule::exact("lloyd@localhost")]
}

#[tokio::test]
async fn test_slow_command_does_not_block_events() {
    let executor = RecordingExecutor::new("done").with_delay(Duration::from_millis(300));
    let mut bot = TestBot::spawn_with(admins(), None, executor, None);
    bot.online().await;
    bot.recv().await.expect("availability");

    bot.stanza(CHAT_MESSAGE).await;
    // The subscription answer arrives while the command is still running.
    let before = bot.sync().await.expect("session alive");
    assert!(before.is_empty());

    let reply = bot.recv_until(|el| el.is("message")).await.expect("reply");
    assert_eq!(reply.get_child_text("body").as_deref(), Some("done"));
}

#[tokio::test]
async fn test_timed_out_command_reply_is_dropped() {
    let executor = RecordingExecutor::new("too late").with_delay(Duration::from_millis(500));
    let mut bot = TestBot::spawn_with(admins(), None, executor, Some(Duration::from_millis(50)));
    bot.online().await;
    bot.recv().await.expect("availability");

    bot.stanza(CHAT_MESSAGE).await;
    bot.sync().await.expect("session alive");
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert!(bot.settle().await.expect("session alive").is_empty());
    assert_eq!(bot.executor.call_count(), 1);
    assert!(bot.finish().await.is_ok());
}

#[tokio::test]
async fn test_each_command_gets_one_reply() {
    let mut bot = TestBot::spawn(admins(), None);
    bot.online().await;
    bot.recv().await.expect("availability");

    for _ in 0..3 {
        bot.stanza(CHAT_MESSAGE).await;
    }
    let mut replies = Vec::new();
    while replies.len() < 3 {
        replies.push(bot.recv_until(|el| el.is("message")).await.expect("reply"));
    }
    assert!(bot.settle().await.expect("session alive").is_empty());
    assert_eq!(bot.executor.call_count(), 3);
}

#[tokio::test]
async fn test_builtin_commands_answer_through_session() {
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use xmpp_commander::{Session, SessionActor, TransportEvent};

    let actor = SessionActor::new(Session::new(admins(), None), Arc::new(BuiltinCommands::new()));
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let (events, handle) = actor.spawn(out_tx);

    events.send(TransportEvent::Online).await.unwrap();
    assert!(out_rx.recv().await.unwrap().is("presence"));

    events
        .send(TransportEvent::Stanza(common::stanza(
            r#"<message from="lloyd@localhost/laptop" type="chat"><body>whoami</body></message>"#,
        )))
        .await
        .unwrap();
    let reply = out_rx.recv().await.unwrap();
    assert_eq!(
        reply.get_child_text("body").as_deref(),
        Some("lloyd@localhost/laptop")
    );

    drop(events);
    assert!(handle.await.unwrap().is_ok());
}
