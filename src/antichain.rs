//! Antichain-based universality and language inclusion.
//!
//! Both checks explore the subset construction on the fly, but keep only the
//! macro-states that are minimal with respect to a simulation preorder: a
//! macro-state covered by a smaller one cannot reveal a counterexample the
//! smaller one would not reveal first. With [`Preorder::identity`] the
//! pruning degenerates to plain set inclusion.
//!
//! ```
//! use nfa_rs::automaton::Automaton;
//! use nfa_rs::preorder::Preorder;
//!
//! let all = Automaton::from_parts("All", ["a"], ["p"], ["p"], ["p"], [("p", "a", "p")]).unwrap();
//! assert!(all.is_universal(&all.preorder()).unwrap());
//! assert!(all.is_universal(&Preorder::identity_for(&all)).unwrap());
//! ```

use std::fmt;

use log::debug;

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::preorder::Preorder;
use crate::reference::StateId;
use crate::trace::{trace_event, NoTrace, Phase, Tracer};
use crate::types::Symbol;

/// A set of states, tagged as rejecting when none of them is final.
///
/// Members are handles in the index space of the preorder that built the
/// macro-state.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MacroState {
    states: Vec<StateId>,
    rejecting: bool,
}

impl MacroState {
    pub fn new(states: Vec<StateId>, is_final: impl Fn(StateId) -> bool) -> Self {
        let rejecting = !states.iter().any(|&s| is_final(s));
        MacroState { states, rejecting }
    }

    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn is_rejecting(&self) -> bool {
        self.rejecting
    }

    /// Drops the members simulated by another remaining member.
    pub fn minimize(&mut self, preorder: &Preorder) {
        self.states = minimize_macro_state(&self.states, preorder);
    }

    /// Every member is simulated by some member of `other`.
    pub fn is_covered_by(&self, other: &MacroState, preorder: &Preorder) -> bool {
        is_subset(&self.states, &other.states, preorder)
    }
}

/// A state of the left automaton paired with a macro-state of the right one.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProductState {
    pub state: StateId,
    pub macro_state: MacroState,
}

/// Removes every member `p` for which another remaining member `q` has `(p, q)` in the preorder.
///
/// Members are scanned in order; of two mutually similar members the later one survives.
pub fn minimize_macro_state(states: &[StateId], preorder: &Preorder) -> Vec<StateId> {
    let mut deleted = vec![false; states.len()];
    for i in 0..states.len() {
        let covered = (0..states.len()).any(|j| j != i && !deleted[j] && preorder.contains(states[i], states[j]));
        if covered {
            deleted[i] = true;
        }
    }
    states
        .iter()
        .zip(deleted)
        .filter(|(_, d)| !d)
        .map(|(&s, _)| s)
        .collect()
}

/// Checks whether every member of `x` is simulated by some member of `y`.
pub fn is_subset(x: &[StateId], y: &[StateId], preorder: &Preorder) -> bool {
    x.iter().all(|&p| y.iter().any(|&q| preorder.contains(p, q)))
}

fn names<'a>(automaton: &'a Automaton, states: &'a [StateId], offset: usize) -> Names<'a> {
    Names {
        automaton,
        states,
        offset,
    }
}

struct Names<'a> {
    automaton: &'a Automaton,
    states: &'a [StateId],
    offset: usize,
}

impl fmt::Display for Names<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, s) in self.states.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.automaton.state_name(StateId::from(s.index() - self.offset)))?;
        }
        write!(f, "}}")
    }
}

/// Successors of a macro-state whose members live at `offset` in the preorder's index space.
fn post(automaton: &Automaton, states: &[StateId], symbol: Option<Symbol>, offset: usize) -> Vec<StateId> {
    let Some(symbol) = symbol else {
        return Vec::new();
    };
    let mut next: Vec<StateId> = states
        .iter()
        .flat_map(|&s| automaton.successors(StateId::from(s.index() - offset), symbol).iter())
        .map(|&t| t.offset(offset))
        .collect();
    next.sort_unstable();
    next.dedup();
    next
}

impl Automaton {
    /// Checks whether the automaton accepts every word over its alphabet.
    ///
    /// `preorder` must be a simulation preorder over this automaton's arena
    /// (for example [`preorder`](Automaton::preorder) or
    /// [`Preorder::identity_for`]); otherwise
    /// [`Error::PreorderMismatch`] is returned.
    pub fn is_universal(&self, preorder: &Preorder) -> Result<bool> {
        self.is_universal_traced(preorder, &mut NoTrace)
    }

    pub fn is_universal_traced(&self, preorder: &Preorder, tracer: &mut dyn Tracer) -> Result<bool> {
        if preorder.size() != self.capacity() {
            return Err(Error::PreorderMismatch {
                expected: self.capacity(),
                found: preorder.size(),
            });
        }
        let is_final = |s: StateId| self.is_final(s);

        let mut initial = MacroState::new(self.starts().iter().copied().collect(), is_final);
        initial.minimize(preorder);
        trace_event!(tracer, Phase::Universality, "initial {}", names(self, initial.states(), 0));
        if initial.is_rejecting() {
            return Ok(false);
        }

        let mut processed: Vec<MacroState> = Vec::new();
        let mut next: Vec<MacroState> = vec![initial];

        while let Some(current) = next.pop() {
            processed.push(current.clone());
            for symbol in self.alphabet().symbols() {
                let mut successor = MacroState::new(post(self, current.states(), Some(symbol), 0), is_final);
                successor.minimize(preorder);
                trace_event!(
                    tracer,
                    Phase::Universality,
                    "post_{}({}) = {}",
                    self.alphabet().name(symbol),
                    names(self, current.states(), 0),
                    names(self, successor.states(), 0)
                );
                if successor.is_rejecting() {
                    trace_event!(tracer, Phase::Universality, "rejecting {}", names(self, successor.states(), 0));
                    debug!("is_universal({}): false after {} macro-states", self.name(), processed.len());
                    return Ok(false);
                }

                let subsumed = processed
                    .iter()
                    .chain(next.iter())
                    .any(|s| s.is_covered_by(&successor, preorder));
                if subsumed {
                    continue;
                }
                processed.retain(|s| !successor.is_covered_by(s, preorder));
                next.retain(|s| !successor.is_covered_by(s, preorder));
                trace_event!(tracer, Phase::Universality, "admit {}", names(self, successor.states(), 0));
                next.push(successor);
            }
        }

        debug!("is_universal({}): true after {} macro-states", self.name(), processed.len());
        Ok(true)
    }

    /// Checks `L(self) ⊆ L(other)`.
    ///
    /// `preorder` ranges over the arena of `self.union(other)`: states of
    /// `self` keep their indices and states of `other` are shifted by
    /// `self.capacity()` (see [`inclusion_preorder`](Automaton::inclusion_preorder)).
    pub fn includes(&self, other: &Automaton, preorder: &Preorder) -> Result<bool> {
        self.includes_traced(other, preorder, &mut NoTrace)
    }

    pub fn includes_traced(&self, other: &Automaton, preorder: &Preorder, tracer: &mut dyn Tracer) -> Result<bool> {
        self.alphabet().check_compatible(other.alphabet())?;
        let offset = self.capacity();
        let expected = offset + other.capacity();
        if preorder.size() != expected {
            return Err(Error::PreorderMismatch {
                expected,
                found: preorder.size(),
            });
        }

        let is_final = |s: StateId| other.is_final(StateId::from(s.index() - offset));
        let symbols: Vec<(Symbol, Option<Symbol>)> = self
            .alphabet()
            .symbols()
            .map(|a| (a, other.alphabet().index_of(self.alphabet().name(a))))
            .collect();

        let mut processed: Vec<ProductState> = Vec::new();
        let mut next: Vec<ProductState> = Vec::new();

        // Returns false when `candidate` is a counterexample.
        let admit = |candidate: ProductState,
                         processed: &mut Vec<ProductState>,
                         next: &mut Vec<ProductState>,
                         tracer: &mut dyn Tracer|
         -> bool {
            let p = candidate.state;
            let macro_state = &candidate.macro_state;
            if self.is_final(p) && macro_state.is_rejecting() {
                trace_event!(
                    tracer,
                    Phase::Inclusion,
                    "counterexample ({}, {})",
                    self.state_name(p),
                    names(other, macro_state.states(), offset)
                );
                return false;
            }
            if macro_state.states().iter().any(|&q| preorder.contains(p, q)) {
                trace_event!(
                    tracer,
                    Phase::Inclusion,
                    "skip ({}, {}): left state simulated",
                    self.state_name(p),
                    names(other, macro_state.states(), offset)
                );
                return true;
            }
            let subsumed = processed.iter().chain(next.iter()).any(|s| {
                preorder.contains(p, s.state) && s.macro_state.is_covered_by(macro_state, preorder)
            });
            if subsumed {
                return true;
            }
            let covers = |s: &ProductState| {
                preorder.contains(s.state, p) && macro_state.is_covered_by(&s.macro_state, preorder)
            };
            processed.retain(|s| !covers(s));
            next.retain(|s| !covers(s));
            trace_event!(
                tracer,
                Phase::Inclusion,
                "admit ({}, {})",
                self.state_name(p),
                names(other, macro_state.states(), offset)
            );
            next.push(candidate);
            true
        };

        let initial_states: Vec<StateId> = other.starts().iter().map(|s| s.offset(offset)).collect();
        let mut initial = MacroState::new(initial_states, is_final);
        initial.minimize(preorder);
        for &p in self.starts() {
            let candidate = ProductState {
                state: p,
                macro_state: initial.clone(),
            };
            if !admit(candidate, &mut processed, &mut next, &mut *tracer) {
                return Ok(false);
            }
        }

        while let Some(current) = next.pop() {
            processed.push(current.clone());
            for &(a, b) in &symbols {
                let targets = self.successors(current.state, a);
                if targets.is_empty() {
                    continue;
                }
                let mut successor = MacroState::new(post(other, current.macro_state.states(), b, offset), is_final);
                successor.minimize(preorder);
                for &p in targets {
                    let candidate = ProductState {
                        state: p,
                        macro_state: successor.clone(),
                    };
                    if !admit(candidate, &mut processed, &mut next, &mut *tracer) {
                        debug!("includes({}, {}): false", self.name(), other.name());
                        return Ok(false);
                    }
                }
            }
        }

        debug!(
            "includes({}, {}): true after {} product states",
            self.name(),
            other.name(),
            processed.len()
        );
        Ok(true)
    }

    /// Simulation preorder over the arena of `self.union(other)`, suitable for
    /// [`includes`](Automaton::includes).
    pub fn inclusion_preorder(&self, other: &Automaton) -> Result<Preorder> {
        Ok(self.union(other)?.preorder())
    }
}
