//! Global String Interner
//!
//! Provides a process-wide string interning service that converts strings to
//! compact integer symbols for comparison and hashing. The render graph's
//! string-keyed resource registry is built on top of it: render-target names
//! stay strings at the public API boundary, but every lookup happens on an
//! interned [`Symbol`].

use lasso::{Spur, ThreadedRodeo};
use std::sync::LazyLock;

/// Global interner instance.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Symbol type alias.
///
/// A symbol is a compact integer identifier that can be compared and hashed
/// efficiently.
pub type Symbol = Spur;

/// Interns a string and returns its symbol.
///
/// If the string is already in the pool, the existing symbol is returned.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up the symbol of an already-interned string.
///
/// Returns `None` if the string has never been interned. Does not allocate.
#[inline]
#[must_use]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a symbol back to its string.
///
/// # Panics
/// Panics if the symbol is invalid (should not happen for symbols produced
/// by [`intern`]).
#[inline]
#[must_use]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let s1 = intern("hello");
        let s2 = intern("hello");
        let s3 = intern("world");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);

        assert_eq!(resolve(s1), "hello");
        assert_eq!(resolve(s3), "world");
    }

    #[test]
    fn test_get() {
        let _ = intern("existing");

        assert!(get("existing").is_some());
        assert!(get("never_interned_anywhere").is_none());
    }
}
