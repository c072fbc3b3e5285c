//! Feeds host messages from a line-oriented reader into the session store.

use session_core::host::HostMessage;

use log::{debug, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Forward every JSON line from `reader` to `sender` until EOF or until the
/// receiving side is gone. Returns how many messages were forwarded.
///
/// Blank lines are skipped; lines that are not a `HostMessage` are logged
/// and skipped.
pub async fn pump_host_messages<R>(reader: R, sender: mpsc::Sender<HostMessage>) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Host message input closed after {forwarded} messages");
                break;
            }
            Err(e) => {
                warn!("Failed to read host message input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message: HostMessage = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping malformed host message: {e}");
                continue;
            }
        };

        debug!("Forwarding host message from {}", message.origin);
        if sender.send(message).await.is_err() {
            info!("Session store stopped listening; closing host message input");
            break;
        }
        forwarded += 1;
    }

    forwarded
}
