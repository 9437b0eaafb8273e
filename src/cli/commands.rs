//! Feed and chat commands.
//!
//! Each command drives the [`Engine`] the way an interactive front end
//! would: issue the action, wait until the spawned requests settle, then
//! print the resulting state.

use std::io::Write;

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::app::Engine;
use crate::chat::UnsendOutcome;
use crate::models::{Message, MessageId, Sender};

/// Refresh and print the feed.
pub async fn run_feed<W: Write>(engine: &mut Engine, out: &mut W) -> Result<()> {
    engine.refresh_notifications();
    engine.run_until_idle().await;
    report_error(engine);

    for item in engine.notifications.items() {
        let n = item.notification;
        let marker = if item.unread { "*" } else { " " };
        let when = n
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "{} [{}] {} {}: {}  {}",
            marker,
            n.actor_initial,
            n.kind.as_str(),
            n.actor_name,
            n.message,
            when
        )?;
        for image in n.resolved_media(engine.resolver()) {
            writeln!(out, "      {}", image)?;
        }
    }
    writeln!(
        out,
        "{} notification(s), {} unread",
        engine.notifications.len(),
        engine.notifications.unread_count()
    )?;
    Ok(())
}

/// Refresh the feed and acknowledge everything in it.
pub async fn run_ack<W: Write>(engine: &mut Engine, out: &mut W) -> Result<()> {
    engine.refresh_notifications();
    engine.run_until_idle().await;
    report_error(engine);

    let count = engine.acknowledge()?;
    writeln!(out, "Marked {} notification(s) as read", count)?;
    Ok(())
}

/// Print the conversation with `peer_id`.
pub async fn run_chat<W: Write>(engine: &mut Engine, peer_id: &str, out: &mut W) -> Result<()> {
    open_conversation(engine, peer_id).await?;
    for message in engine.chat.messages() {
        write_message(out, message)?;
    }
    Ok(())
}

/// Send `text` to `peer_id` and wait for the acknowledgement.
pub async fn run_send<W: Write>(
    engine: &mut Engine,
    peer_id: &str,
    text: &str,
    out: &mut W,
) -> Result<()> {
    open_conversation(engine, peer_id).await?;

    let id = engine
        .send_message(text)
        .ok_or_else(|| eyre!("nothing to send"))?;
    engine.run_until_idle().await;
    report_error(engine);

    // Reconciliation may have replaced the pending id with the server one.
    let sent = engine
        .chat
        .messages()
        .iter()
        .rev()
        .find(|m| m.sender == Sender::Me && (m.id == id || m.text == text));
    match sent {
        Some(message) => write_message(out, message)?,
        None => writeln!(out, "message {} no longer in conversation", id)?,
    }
    Ok(())
}

/// Unsend one of the user's messages.
pub async fn run_unsend<W: Write>(
    engine: &mut Engine,
    peer_id: &str,
    message_id: &str,
    out: &mut W,
) -> Result<()> {
    open_conversation(engine, peer_id).await?;

    let id = MessageId::Server(message_id.to_string());
    match engine.chat.find(&id) {
        Some(message) if message.sender == Sender::Me => {}
        Some(_) => return Err(eyre!("message {} was not sent by you", message_id)),
        None => return Err(eyre!("no message {} with {}", message_id, peer_id)),
    }

    engine.request_unsend(id);
    let outcome = engine.confirm_unsend();
    engine.run_until_idle().await;

    match outcome {
        UnsendOutcome::Deleted(_) | UnsendOutcome::RemovedPending => {
            writeln!(out, "Unsent message {}", message_id)?;
        }
        UnsendOutcome::RemovedLocalOnly => {
            writeln!(out, "Removed message {} locally; the server kept its copy", message_id)?;
        }
        UnsendOutcome::NotFound => writeln!(out, "Message {} already gone", message_id)?,
    }
    if let Some(error) = engine.take_error() {
        writeln!(out, "warning: {}", error)?;
    }
    Ok(())
}

async fn open_conversation(engine: &mut Engine, peer_id: &str) -> Result<()> {
    engine.open_chat(peer_id)?;
    engine.run_until_idle().await;
    report_error(engine);
    Ok(())
}

fn write_message<W: Write>(out: &mut W, message: &Message) -> std::io::Result<()> {
    let who = match message.sender {
        Sender::Me => "me",
        Sender::Them => "them",
    };
    let status = if message.pending { " (sending)" } else { "" };
    writeln!(out, "[{}] {}: {}{}", message.id, who, message.text, status)
}

fn report_error(engine: &mut Engine) {
    if let Some(error) = engine.take_error() {
        eprintln!("warning: {}", error);
    }
}
