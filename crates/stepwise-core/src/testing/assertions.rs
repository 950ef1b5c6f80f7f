//! Test assertion macros and helpers.

use std::collections::HashSet;

use crate::error::StepwiseError;

/// Assert that a result is Ok.
///
/// # Example
///
/// ```ignore
/// let result = migrator.migrate().await;
/// assert_ok!(result);
/// assert_ok!(result, "first run should apply everything");
/// ```
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match &$expr {
            Ok(_) => (),
            Err(e) => panic!("assertion failed: expected Ok, got Err({:?})", e),
        }
    };
    ($expr:expr, $($arg:tt)+) => {
        match &$expr {
            Ok(_) => (),
            Err(e) => panic!("assertion failed: {}: expected Ok, got Err({:?})", format_args!($($arg)+), e),
        }
    };
}

/// Assert that a result is Err.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match &$expr {
            Err(_) => (),
            Ok(v) => panic!("assertion failed: expected Err, got Ok({:?})", v),
        }
    };
    ($expr:expr, $($arg:tt)+) => {
        match &$expr {
            Err(_) => (),
            Ok(v) => panic!("assertion failed: {}: expected Err, got Ok({:?})", format_args!($($arg)+), v),
        }
    };
}

/// Assert that an error matches a specific variant.
///
/// # Example
///
/// ```ignore
/// let result = migrator.rollback_last().await;
/// assert_err_variant!(result, StepwiseError::NoAppliedMigration);
/// ```
#[macro_export]
macro_rules! assert_err_variant {
    ($expr:expr, $variant:pat) => {
        match &$expr {
            Err($variant) => (),
            Err(e) => panic!(
                "assertion failed: expected {}, got {:?}",
                stringify!($variant),
                e
            ),
            Ok(v) => panic!(
                "assertion failed: expected Err({}), got Ok({:?})",
                stringify!($variant),
                v
            ),
        }
    };
}

/// Check if an error message contains a substring.
pub fn error_contains(error: &StepwiseError, substring: &str) -> bool {
    error.to_string().contains(substring)
}

/// Build an id set from string literals, for comparing against applied sets.
pub fn id_set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_ok_macro() {
        let result: Result<i32, String> = Ok(42);
        assert_ok!(result);
    }

    #[test]
    #[should_panic(expected = "expected Ok")]
    fn test_assert_ok_macro_fails() {
        let result: Result<i32, String> = Err("error".to_string());
        assert_ok!(result);
    }

    #[test]
    fn test_assert_err_macro() {
        let result: Result<i32, String> = Err("error".to_string());
        assert_err!(result);
    }

    #[test]
    #[should_panic(expected = "expected Err")]
    fn test_assert_err_macro_fails() {
        let result: Result<i32, String> = Ok(42);
        assert_err!(result);
    }

    #[test]
    fn test_assert_err_variant_macro() {
        let result: Result<(), StepwiseError> = Err(StepwiseError::NoAppliedMigration);
        assert_err_variant!(result, StepwiseError::NoAppliedMigration);
    }

    #[test]
    #[should_panic(expected = "expected StepwiseError::NotApplied")]
    fn test_assert_err_variant_macro_fails() {
        let result: Result<(), StepwiseError> = Err(StepwiseError::NoAppliedMigration);
        assert_err_variant!(result, StepwiseError::NotApplied(_));
    }

    #[test]
    fn test_error_contains() {
        let error = StepwiseError::UnknownMigration("0004_missing".to_string());
        assert!(error_contains(&error, "0004_missing"));
        assert!(!error_contains(&error, "0005"));
    }

    #[test]
    fn test_id_set() {
        let set = id_set(&["a", "b", "a"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("b"));
    }
}
