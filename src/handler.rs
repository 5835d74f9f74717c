//! Connection handler
//!
//! Drives one accepted TCP connection through its lifecycle: greeting and
//! nickname negotiation, then the active read loop, then cleanup. The
//! handler owns its socket exclusively; other handlers reach this connection
//! only through the reply channel registered with the server actor.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::command::Command;
use crate::error::AppError;
use crate::message::ServerReply;
use crate::registry::RegisterError;
use crate::server::ServerCommand;
use crate::types::{ConnId, Nickname};

/// Per-connection reply queue depth. A reader stalled past this many pending
/// replies starts losing them (no backpressure onto senders).
const MESSAGE_BUFFER_SIZE: usize = 32;

type LineReader = Lines<BufReader<OwnedReadHalf>>;

/// Handle a new TCP connection
///
/// Splits the stream, spawns the writer task, negotiates a nickname, then
/// relays parsed commands to the server actor until the peer quits or the
/// stream ends. An error return terminates only this connection.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let conn_id = ConnId::new();
    info!("Connection {} opened from {}", conn_id, peer_addr);

    let (read_half, write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    // Server → client replies flow through this channel into the writer
    // task; the handler itself queues prompts the same way the actor does.
    let (msg_tx, msg_rx) = mpsc::channel::<ServerReply>(MESSAGE_BUFFER_SIZE);
    let writer = tokio::spawn(write_loop(write_half, msg_rx));

    let result = run_lifecycle(&mut lines, &msg_tx, &cmd_tx, conn_id).await;

    // Dropping our sender lets the writer drain whatever is queued (the
    // farewell included) once the actor's clone is gone too, then exit.
    drop(msg_tx);
    let _ = writer.await;

    info!("Connection {} closed", conn_id);
    result
}

/// Connecting → Active → Closing, with the disconnect command guaranteed
/// whenever a session was created.
async fn run_lifecycle(
    lines: &mut LineReader,
    msg_tx: &mpsc::Sender<ServerReply>,
    cmd_tx: &mpsc::Sender<ServerCommand>,
    conn_id: ConnId,
) -> Result<(), AppError> {
    queue(msg_tx, ServerReply::Welcome).await?;
    queue(msg_tx, ServerReply::NickPrompt).await?;

    let Some(nickname) = negotiate_nickname(lines, msg_tx, cmd_tx, conn_id).await? else {
        // Aborted or stream ended before a session existed.
        return Ok(());
    };

    let result = active_loop(lines, msg_tx, cmd_tx, &nickname).await;

    // Closing: remove the session even when the read loop failed.
    let _ = cmd_tx.send(ServerCommand::Disconnect { nickname }).await;
    result
}

/// Connecting state: read candidates until one registers, the client aborts
/// with /quit, or the stream ends.
async fn negotiate_nickname(
    lines: &mut LineReader,
    msg_tx: &mpsc::Sender<ServerReply>,
    cmd_tx: &mpsc::Sender<ServerCommand>,
    conn_id: ConnId,
) -> Result<Option<Nickname>, AppError> {
    loop {
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let candidate = line.trim();

        if candidate.eq_ignore_ascii_case("/quit") {
            queue(msg_tx, ServerReply::Goodbye).await?;
            return Ok(None);
        }

        let Some(nickname) = Nickname::parse(candidate) else {
            queue(msg_tx, ServerReply::NickInvalid).await?;
            continue;
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx
            .send(ServerCommand::Register {
                conn_id,
                nickname: nickname.clone(),
                sender: msg_tx.clone(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| AppError::ChannelSend)?;

        match reply_rx.await.map_err(|_| AppError::ChannelSend)? {
            Ok(()) => return Ok(Some(nickname)),
            Err(RegisterError::NameTaken) => {
                debug!("Connection {} lost nickname race for '{}'", conn_id, nickname);
                queue(msg_tx, ServerReply::NickTaken).await?;
            }
        }
    }
}

/// Active state: one parsed command per non-empty line.
async fn active_loop(
    lines: &mut LineReader,
    msg_tx: &mpsc::Sender<ServerReply>,
    cmd_tx: &mpsc::Sender<ServerCommand>,
    nickname: &Nickname,
) -> Result<(), AppError> {
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !line.starts_with('/') {
            queue(msg_tx, ServerReply::UnknownInput).await?;
            continue;
        }

        let command = Command::parse(line);
        let quitting = matches!(command, Command::Quit);
        cmd_tx
            .send(ServerCommand::Apply {
                nickname: nickname.clone(),
                command,
            })
            .await
            .map_err(|_| AppError::ChannelSend)?;

        if quitting {
            break;
        }
    }
    Ok(())
}

/// Queue a reply on this connection's own channel.
///
/// Unlike relay deliveries this may wait for queue space: the handler only
/// ever blocks on its own connection.
async fn queue(msg_tx: &mpsc::Sender<ServerReply>, reply: ServerReply) -> Result<(), AppError> {
    msg_tx.send(reply).await.map_err(|_| AppError::ChannelSend)
}

/// Writer task: one line plus newline per queued reply.
///
/// A failed write means this peer is gone; the writer stops and the next
/// handler-side queue attempt surfaces the closure.
async fn write_loop(mut write_half: OwnedWriteHalf, mut msg_rx: mpsc::Receiver<ServerReply>) {
    while let Some(reply) = msg_rx.recv().await {
        let line = format!("{}\n", reply);
        if write_half.write_all(line.as_bytes()).await.is_err() {
            debug!("Socket write failed, ending writer task");
            break;
        }
    }
    let _ = write_half.shutdown().await;
}
