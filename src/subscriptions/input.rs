use crate::handlers::{Command, Message};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Forward stdin lines as commands until end of file.
pub fn spawn_stdin(tx: mpsc::Sender<Message>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match Command::parse(&line) {
                    Some(command) => {
                        if tx.send(Message::Command(command)).await.is_err() {
                            return;
                        }
                    }
                    None => tracing::warn!("Unknown command {:?}, expected n, p, o or q", line.trim()),
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
        let _ = tx.send(Message::InputClosed).await;
    });
}
