//! Loading and storing per-view state in the session.

use serde::{Serialize, de::DeserializeOwned};
use tower_sessions::Session;

/// Read the state stored under `key`, or its default if none is stored.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn load_view<T>(session: &Session, key: &str) -> Result<T, tower_sessions::session::Error>
where
    T: DeserializeOwned + Default,
{
    Ok(session.get::<T>(key).await?.unwrap_or_default())
}

/// Store `state` under `key`.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn save_view<T>(
    session: &Session,
    key: &str,
    state: &T,
) -> Result<(), tower_sessions::session::Error>
where
    T: Serialize + Sync,
{
    session.insert(key, state).await
}
