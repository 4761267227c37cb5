//! Immutable views of the notification log.

use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::core::model::{Notification, NotificationId};

/// The full ordered log at one point in time. Clones share the same buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    entries: Arc<[Notification]>,
    /// Store mutation counter at the time this was taken
    version: u64,
}

impl Snapshot {
    pub(crate) fn new(entries: &[Notification], version: u64) -> Self {
        Self {
            entries: Arc::from(entries),
            version,
        }
    }

    /// Increases with every mutation of the owning store; a higher version is
    /// always the more recent state.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn by_id(&self, id: NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    /// Entries the user has not acknowledged yet, oldest first.
    pub fn unseen(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().filter(|n| !n.seen)
    }

    pub fn seen(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().filter(|n| n.seen)
    }

    pub fn unseen_count(&self) -> usize {
        self.unseen().count()
    }

    /// Most recently appended entry.
    pub fn latest(&self) -> Option<&Notification> {
        self.entries.last()
    }

    pub fn to_vec(&self) -> Vec<Notification> {
        self.entries.to_vec()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(&[], 0)
    }
}

impl Deref for Snapshot {
    type Target = [Notification];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
