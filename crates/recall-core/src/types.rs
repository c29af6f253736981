use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of the user a reminder belongs to (a chat/user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub i64);

impl OwnerId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OwnerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Composite identity of a reminder chain: `(owner, subject)`.
///
/// Two owners registering the same subject text get two independent keys,
/// so their timers never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderKey {
    pub owner: OwnerId,
    pub subject: String,
}

impl ReminderKey {
    pub fn new(owner: OwnerId, subject: impl Into<String>) -> Self {
        Self {
            owner,
            subject: subject.into(),
        }
    }
}

impl fmt::Display for ReminderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn same_subject_different_owner_are_distinct_keys() {
        let a = ReminderKey::new(OwnerId(1), "Piano");
        let b = ReminderKey::new(OwnerId(2), "Piano");
        assert_ne!(a, b);

        let set: HashSet<_> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn key_display_includes_owner_and_subject() {
        let key = ReminderKey::new(OwnerId(42), "Exam");
        assert_eq!(key.to_string(), "42/Exam");
    }
}
