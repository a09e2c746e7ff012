//! Registration outcome variants.

/// The result of one registration attempt.
///
/// These variants are the whole vocabulary between the registration engine
/// and the HTTP layer; only the HTTP layer turns them into status codes and
/// JSON. `AlreadyRegistered` is a normal outcome (a double tap on a phone),
/// not an error, and carries the unchanged count so the caller can still
/// render the tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The attendance row was inserted; carries the post-commit count.
    Registered(i64),
    /// This runner already checked in for this run; carries the current count.
    AlreadyRegistered(i64),
    /// The code or token resolves to no run (unknown, tampered, or expired).
    BadSession,
    /// The run exists but admits no registrations (deactivated or not today).
    SessionClosed,
    /// The runner id failed validation; nothing touched the store.
    Invalid(String),
    /// A transient store failure; safe to retry thanks to the uniqueness
    /// constraint.
    Retryable,
}

impl RegisterOutcome {
    /// The tally carried by this outcome, when it has one.
    pub fn count(&self) -> Option<i64> {
        match self {
            RegisterOutcome::Registered(n) | RegisterOutcome::AlreadyRegistered(n) => Some(*n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_present_only_on_tallied_outcomes() {
        assert_eq!(RegisterOutcome::Registered(3).count(), Some(3));
        assert_eq!(RegisterOutcome::AlreadyRegistered(3).count(), Some(3));
        assert_eq!(RegisterOutcome::BadSession.count(), None);
        assert_eq!(RegisterOutcome::SessionClosed.count(), None);
        assert_eq!(RegisterOutcome::Invalid("empty".into()).count(), None);
        assert_eq!(RegisterOutcome::Retryable.count(), None);
    }
}
