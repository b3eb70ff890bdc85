//! Keyed callback pairs

use std::fmt;

use super::Keyed;
use crate::errors::{CliError, CliResult};

/// An immutable (key, function) pair
///
/// The key identifies the callback inside a [`KeyedList`](super::KeyedList);
/// two callbacks with the same key conflict. The function's signature varies
/// by usage (middleware stage or permission-group predicate), so the
/// function type is a parameter.
pub struct Callback<F> {
    key: String,
    func: F,
}

impl<F> Callback<F> {
    /// Pair `func` with an identifying key
    ///
    /// The key must be non-empty and free of single- and double-quote
    /// characters.
    pub fn new(key: impl Into<String>, func: F) -> CliResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(CliError::Argument(
                "key must be a non-empty string".to_string(),
            ));
        }
        if key.contains(['\'', '"']) {
            return Err(CliError::Argument(
                "key must not contain any single-quotes or double-quotes".to_string(),
            ));
        }
        Ok(Self { key, func })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn func(&self) -> &F {
        &self.func
    }
}

impl<F> Keyed for Callback<F> {
    fn key(&self) -> &str {
        &self.key
    }
}

impl<F> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("key", &self.key)
            .field("func", &format_args!("<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_and_func_preserved() {
        let cb = Callback::new("greet", |x: i32| x + 1).unwrap();
        assert_eq!(cb.key(), "greet");
        assert_eq!((cb.func())(1), 2);
    }

    #[test]
    fn test_quoted_key_rejected() {
        assert!(matches!(
            Callback::new("bad'key", || ()),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            Callback::new("bad\"key", || ()),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(Callback::new("", || ()), Err(CliError::Argument(_))));
    }
}
