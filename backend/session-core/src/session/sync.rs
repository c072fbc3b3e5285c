//! One-shot synchronization run by `SessionStore::initialize`.
//!
//! Storage first, then the URL, then the message listener. Each step that
//! finds a token funnels into the same validate-and-commit path, so the URL
//! token wins over the stored one and later host messages win over both.

use super::SessionStore;

use crate::AUTH_TOKEN_QUERY_PARAM;
use crate::error::StorageError;
use crate::host::address_bar::{query_param, without_query_param};

use common::BearerToken;
use models::{SessionSnapshot, SessionStatus};

use log::{debug, error, info, warn};

pub(super) async fn run(store: &SessionStore) -> SessionStatus {
    info!("Initializing session");

    if let Err(e) = recover_from_storage(store).await {
        error!("Session initialization failed: {e}");
        store.commit(SessionSnapshot::unauthenticated());
    }

    recover_from_url(store).await;
    store.register_message_listener();

    if store.status() == SessionStatus::Loading {
        store.commit(SessionSnapshot::unauthenticated());
    }

    let status = store.status();
    info!("Session initialized: {status}");
    status
}

async fn recover_from_storage(store: &SessionStore) -> Result<(), StorageError> {
    let Some(token) = store.storage().load()? else {
        debug!("No persisted token");
        store.commit(SessionSnapshot::unauthenticated());
        return Ok(());
    };

    if store.validate_token(&token).await {
        info!("Persisted token is valid");
        store.commit(SessionSnapshot::authenticated(token, store.parent_origin()));
    } else {
        warn!("Persisted token failed validation; removing it");
        store.forget_persisted();
        store.commit(SessionSnapshot::invalid_token(store.parent_origin()));
    }

    Ok(())
}

async fn recover_from_url(store: &SessionStore) {
    let current = store.address_bar().current_url();
    let Some(token) = query_param(&current, AUTH_TOKEN_QUERY_PARAM) else {
        return;
    };

    info!("Found bootstrap token in the page URL");
    store.set_token(BearerToken::new(token), None).await;

    store
        .address_bar()
        .replace_url(without_query_param(&current, AUTH_TOKEN_QUERY_PARAM));
    debug!("Removed {AUTH_TOKEN_QUERY_PARAM} from the page URL");
}
