//! Uniqueness tracking for names declared within one lexical scope.

use crate::source::Span;
use std::collections::HashMap;
use std::hash::Hash;

/// A transient set of keys seen in one declaration.
///
/// The resolver creates one per struct, union, enum, interface and
/// parameter list, and drops it once that declaration is checked.
#[derive(Debug, Clone)]
pub struct Scope<K> {
    /// Key → span of its first declaration.
    seen: HashMap<K, Span>,
}

impl<K: Eq + Hash> Default for Scope<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> Scope<K> {
    pub fn new() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }

    /// Record `key` declared at `span`.
    ///
    /// On a collision the scope is left unchanged and the span of the
    /// earlier declaration is returned.
    pub fn declare(&mut self, key: K, span: Span) -> Result<(), Span> {
        match self.seen.get(&key) {
            Some(previous) => Err(*previous),
            None => {
                self.seen.insert(key, span);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceId;

    fn at(start: usize) -> Span {
        Span::new(SourceId(0), start, start + 1)
    }

    #[test]
    fn test_distinct_keys_are_accepted() {
        let mut scope: Scope<&str> = Scope::new();

        assert_eq!(scope.declare("a", at(0)), Ok(()));
        assert_eq!(scope.declare("b", at(4)), Ok(()));
        assert_eq!(scope.declare("a", at(8)), Err(at(0)));
    }

    #[test]
    fn test_ordinal_scope() {
        let mut scope: Scope<u32> = Scope::default();

        assert_eq!(scope.declare(1, at(0)), Ok(()));
        assert_eq!(scope.declare(2, at(10)), Ok(()));
        assert_eq!(scope.declare(2, at(20)), Err(at(10)));
        assert_eq!(scope.declare(3, at(30)), Ok(()));
    }

    #[test]
    fn test_declare_returns_previous_span() {
        let mut scope: Scope<String> = Scope::new();
        let first = Span::new(SourceId(0), 4, 5);
        let second = Span::new(SourceId(0), 20, 21);

        assert_eq!(scope.declare("x".to_string(), first), Ok(()));
        assert_eq!(scope.declare("x".to_string(), second), Err(first));
    }
}
