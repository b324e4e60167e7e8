//! Per-session notification queue.
//!
//! Every failure a visitor should know about goes through here, whether or
//! not the page that caused it shows an inline error. Pages drain the queue
//! when they render.

use tower_sessions::Session;

use crate::models::{Notice, session_keys};

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push_notice(
    session: &Session,
    notice: Notice,
) -> Result<(), tower_sessions::session::Error> {
    let mut notices: Vec<Notice> = session
        .get(session_keys::NOTICES)
        .await?
        .unwrap_or_default();

    if notice.is_error() {
        tracing::debug!(message = %notice.message, "Queued error notice");
    }

    notices.push(notice);
    session.insert(session_keys::NOTICES, notices).await
}

/// Remove and return all queued notices.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_notices(session: &Session) -> Result<Vec<Notice>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<Notice>>(session_keys::NOTICES)
        .await?
        .unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_notices_are_drained_in_order() {
        let session = session();
        push_notice(&session, Notice::success("Item added to cart!"))
            .await
            .unwrap();
        push_notice(&session, Notice::error("Could not load addresses."))
            .await
            .unwrap();

        let notices = take_notices(&session).await.unwrap();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "Item added to cart!");
        assert!(notices[1].is_error());

        assert!(take_notices(&session).await.unwrap().is_empty());
    }
}
