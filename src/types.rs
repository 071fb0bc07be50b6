//! Alphabet symbols.
//!
//! A [`Symbol`] is an index into the sorted [`Alphabet`] of one automaton.
//! Symbols of two different automata are only comparable through their names,
//! so every operation combining automata translates symbols via
//! [`Alphabet::index_of`].
use std::fmt;

use crate::error::{Error, Result};

/// An alphabet symbol (0-indexed position in the sorted alphabet).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Symbol(u32);

impl Symbol {
    pub const fn new(index: u32) -> Self {
        Symbol(index)
    }

    /// Returns the position of the symbol in its alphabet.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

impl From<usize> for Symbol {
    fn from(index: usize) -> Self {
        Symbol(index as u32)
    }
}

/// A finite alphabet.
///
/// # Invariants
///
/// - Names are sorted lexicographically and unique.
/// - The order is significant: it fixes the exploration order of every
///   worklist algorithm and therefore the naming of the states they create.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Alphabet {
    names: Vec<String>,
}

impl Alphabet {
    /// Creates an alphabet from arbitrary names, sorting and deduplicating them.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Alphabet { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over all symbols in alphabet order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.names.len()).map(Symbol::from)
    }

    /// Returns the name of the symbol.
    pub fn name(&self, symbol: Symbol) -> &str {
        &self.names[symbol.index()]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Looks up a symbol by name.
    pub fn index_of(&self, name: &str) -> Option<Symbol> {
        self.names
            .binary_search_by(|n| n.as_str().cmp(name))
            .ok()
            .map(Symbol::from)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Checks whether every symbol of `self` is also in `other`.
    pub fn is_subset(&self, other: &Alphabet) -> bool {
        self.names.iter().all(|name| other.contains(name))
    }

    /// Symbols present in both alphabets.
    pub fn intersection(&self, other: &Alphabet) -> Alphabet {
        Alphabet {
            names: self.names.iter().filter(|name| other.contains(name)).cloned().collect(),
        }
    }

    /// Symbols present in either alphabet.
    pub fn union(&self, other: &Alphabet) -> Alphabet {
        Alphabet::new(self.names.iter().chain(other.names.iter()).cloned())
    }

    /// Two alphabets are compatible when one of them contains the other.
    ///
    /// Operations combining automata pick the smaller or the larger alphabet,
    /// which only has a well-defined meaning for nested alphabets.
    pub fn check_compatible(&self, other: &Alphabet) -> Result<()> {
        if self.is_subset(other) || other.is_subset(self) {
            Ok(())
        } else {
            Err(Error::IncompatibleAlphabets {
                left: self.names.clone(),
                right: other.names.clone(),
            })
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.names.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for Alphabet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Alphabet::new(iter)
    }
}
