//! Three-way result of a mutating cache operation.

use crate::{StashError, StashResult};

/// Outcome of a mutating cache operation.
///
/// Distinguishes a completed call from one whose target was absent and from
/// one the store failed, instead of folding all three into a boolean.
#[derive(Debug)]
#[must_use]
pub enum CacheOutcome<T = ()> {
    /// The store accepted the call.
    Done(T),
    /// The call reached the store but the key, field or element was absent.
    NotFound,
    /// The store raised an error.
    Failed(StashError),
}

impl<T> CacheOutcome<T> {
    /// Legacy success flag: `false` only when the store failed.
    ///
    /// A `NotFound` outcome still counts as success because the store
    /// handled the call; only the boolean is lost.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Returns true for `Done`.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Returns true for `NotFound`.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Returns true for `Failed`.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the store error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&StashError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the carried value for `Done`.
    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            _ => None,
        }
    }

    /// Converts into a `Result`, mapping `NotFound` to `Ok(None)`.
    pub fn into_result(self) -> StashResult<Option<T>> {
        match self {
            Self::Done(value) => Ok(Some(value)),
            Self::NotFound => Ok(None),
            Self::Failed(e) => Err(e),
        }
    }

    /// Maps the carried value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CacheOutcome<U> {
        match self {
            Self::Done(value) => CacheOutcome::Done(f(value)),
            Self::NotFound => CacheOutcome::NotFound,
            Self::Failed(e) => CacheOutcome::Failed(e),
        }
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Done(_) => "done",
            Self::NotFound => "not_found",
            Self::Failed(_) => "failed",
        }
    }
}

impl CacheOutcome<()> {
    /// Existence flag for presence checks: `true` only for `Done`.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.is_done()
    }

    /// Builds `Done(())` when `hit` is true, `NotFound` otherwise.
    pub const fn from_hit(hit: bool) -> Self {
        if hit {
            Self::Done(())
        } else {
            Self::NotFound
        }
    }
}

impl<T> From<StashResult<T>> for CacheOutcome<T> {
    fn from(result: StashResult<T>) -> Self {
        match result {
            Ok(value) => Self::Done(value),
            Err(e) => Self::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_success_flag() {
        assert!(CacheOutcome::Done(()).is_success());
        assert!(CacheOutcome::<()>::NotFound.is_success());
        assert!(!CacheOutcome::<()>::Failed(StashError::Disabled).is_success());
    }

    #[test]
    fn test_presence() {
        assert!(CacheOutcome::from_hit(true).is_present());
        assert!(!CacheOutcome::from_hit(false).is_present());
        assert!(!CacheOutcome::Failed(StashError::Disabled).is_present());
    }

    #[test]
    fn test_into_result() {
        assert_eq!(CacheOutcome::Done(3).into_result().unwrap(), Some(3));
        assert_eq!(CacheOutcome::<i32>::NotFound.into_result().unwrap(), None);

        let err = CacheOutcome::<i32>::Failed(StashError::store("ERR")).into_result();
        assert!(matches!(err, Err(StashError::Store(_))));
    }

    #[test]
    fn test_from_result() {
        let ok: CacheOutcome<u64> = Ok(2).into();
        assert_eq!(ok.done(), Some(2));

        let failed: CacheOutcome<u64> = StashResult::Err(StashError::connection("reset")).into();
        assert!(failed.is_failed());
        assert!(failed.error().is_some_and(StashError::is_transient));
    }

    #[test]
    fn test_map_and_label() {
        let outcome = CacheOutcome::Done(5).map(|n| n * 2);
        assert_eq!(outcome.label(), "done");
        assert_eq!(outcome.done(), Some(10));
        assert_eq!(CacheOutcome::<u8>::NotFound.map(|n| n + 1).label(), "not_found");
    }
}
