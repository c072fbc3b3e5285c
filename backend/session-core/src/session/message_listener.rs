//! Task that applies tokens pushed by the host window.

use super::{SessionInner, SessionStore};

use crate::host::HostMessage;

use std::sync::Weak;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Spawn the listener. It holds only a weak reference, so it ends on its own
/// once the store is gone or the sending side closes.
pub(super) fn spawn(
    store: Weak<SessionInner>,
    mut receiver: mpsc::Receiver<HostMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            let Some(inner) = store.upgrade() else {
                debug!("Session store dropped; stopping host message listener");
                return;
            };

            handle(&SessionStore::from_inner(inner), message).await;
        }

        debug!("Host message channel closed");
    })
}

async fn handle(store: &SessionStore, message: HostMessage) {
    let Some(token) = message.auth_token() else {
        debug!("Ignoring host message from {}", message.origin);
        return;
    };

    if !store.origin_policy().permits(&message.origin) {
        warn!(
            "Rejected auth token message from disallowed origin {}",
            message.origin
        );
        return;
    }

    info!("Received auth token from {}", message.origin);
    store.set_token(token, Some(message.origin)).await;
}
