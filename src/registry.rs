//! Process-wide slot holding the archive blob that [`AssetFs::new`] decodes.
//!
//! Generated asset modules call [`register`] once at start-up, before any
//! file system is built. Registering again replaces the blob for future
//! constructions only; file systems that already exist keep their index.
//! Concurrent registration while another thread constructs is not a
//! supported pattern.
//!
//! [`AssetFs::new`]: crate::AssetFs::new

use parking_lot::RwLock;
use std::sync::Arc;

static REGISTERED: RwLock<Option<Arc<[u8]>>> = RwLock::new(None);

/// Register archive data; the last registration wins
pub fn register(data: impl Into<Arc<[u8]>>) {
    let data = data.into();
    tracing::debug!(bytes = data.len(), "archive data registered");
    *REGISTERED.write() = Some(data);
}

/// The currently registered archive data, if any
pub fn registered() -> Option<Arc<[u8]>> {
    REGISTERED.read().clone()
}

#[cfg(test)]
pub(crate) fn clear() {
    *REGISTERED.write() = None;
}

/// Serializes unit tests that touch the global slot
#[cfg(test)]
pub(crate) static TEST_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
