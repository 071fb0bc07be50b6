use crate::reference::StateId;
use crate::types::Symbol;

/// A state of an automaton.
///
/// `out[a]` lists the `a`-successors and `inc[a]` the `a`-predecessors; both
/// lists have set semantics and are kept exact inverses of each other by the
/// owning [`Automaton`][crate::automaton::Automaton].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct State {
    pub(crate) name: String,
    pub(crate) out: Vec<Vec<StateId>>,
    pub(crate) inc: Vec<Vec<StateId>>,
    pub(crate) is_start: bool,
    pub(crate) is_final: bool,
    pub(crate) removed: bool,
}

impl State {
    pub(crate) fn new(name: String, num_symbols: usize) -> Self {
        Self {
            name,
            out: vec![Vec::new(); num_symbols],
            inc: vec![Vec::new(); num_symbols],
            is_start: false,
            is_final: false,
            removed: false,
        }
    }

    pub(crate) fn tombstone(num_symbols: usize) -> Self {
        let mut state = Self::new(String::new(), num_symbols);
        state.removed = true;
        state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_start(&self) -> bool {
        self.is_start
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Tombstoned states keep their slot but take part in no relation.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Targets of the transitions labelled `symbol`.
    pub fn successors(&self, symbol: Symbol) -> &[StateId] {
        &self.out[symbol.index()]
    }

    /// Sources of the transitions labelled `symbol` ending here.
    pub fn predecessors(&self, symbol: Symbol) -> &[StateId] {
        &self.inc[symbol.index()]
    }

    /// Number of outgoing transitions labelled `symbol`.
    pub fn out_degree(&self, symbol: Symbol) -> usize {
        self.out[symbol.index()].len()
    }

    /// All outgoing transitions as `(symbol, target)` pairs.
    pub fn transitions(&self) -> impl Iterator<Item = (Symbol, StateId)> + '_ {
        self.out
            .iter()
            .enumerate()
            .flat_map(|(a, targets)| targets.iter().map(move |&t| (Symbol::from(a), t)))
    }

    pub(crate) fn has_transitions(&self) -> bool {
        self.out.iter().any(|t| !t.is_empty()) || self.inc.iter().any(|t| !t.is_empty())
    }
}
