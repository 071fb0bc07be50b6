//! The automaton arena.
//!
//! An [`Automaton`] owns its states in a growable arena indexed by
//! [`StateId`]. Transitions are stored twice, forward in `out` and backward in
//! `inc`, and every mutator in this module keeps the two exact inverses of
//! each other. Algorithms never touch the relations directly; they go through
//! [`add_transition`](Automaton::add_transition),
//! [`remove_transition`](Automaton::remove_transition),
//! [`remove_state`](Automaton::remove_state) and
//! [`merge_into`](Automaton::merge_into), so a deleted state can never be left
//! referenced from a partner's relation.
//!
//! Deleting a state tombstones its slot instead of shifting the arena, which
//! keeps every other handle valid. [`compact`](Automaton::compact) physically
//! drops the tombstones afterwards.
//!
//! # Examples
//!
//! ```
//! use nfa_rs::automaton::Automaton;
//!
//! let a = Automaton::from_parts("A", ["a"], ["p", "q"], ["p"], ["q"], [("p", "a", "q")]).unwrap();
//! assert_eq!(a.num_states(), 2);
//! assert!(a.accepts(&["a"]));
//! assert!(!a.accepts::<&str>(&[]));
//! ```

use std::collections::BTreeSet;

use log::debug;

use crate::error::{Error, Result};
use crate::reference::StateId;
use crate::state::State;
use crate::types::{Alphabet, Symbol};

#[derive(Debug, Clone)]
pub struct Automaton {
    name: String,
    alphabet: Alphabet,
    states: Vec<State>,
    starts: BTreeSet<StateId>,
    finals: BTreeSet<StateId>,
}

impl Automaton {
    /// Creates an automaton with no states.
    pub fn new(name: impl Into<String>, alphabet: Alphabet) -> Self {
        Self {
            name: name.into(),
            alphabet,
            states: Vec::new(),
            starts: BTreeSet::new(),
            finals: BTreeSet::new(),
        }
    }

    /// Builds an automaton from state and symbol names.
    ///
    /// Fails with [`Error::UnknownState`] or [`Error::UnknownSymbol`] when a
    /// start, final or transition entry mentions an undeclared name.
    pub fn from_parts<'a>(
        name: &str,
        alphabet: impl IntoIterator<Item = &'a str>,
        states: impl IntoIterator<Item = &'a str>,
        starts: impl IntoIterator<Item = &'a str>,
        finals: impl IntoIterator<Item = &'a str>,
        transitions: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    ) -> Result<Self> {
        let mut automaton = Automaton::new(name, Alphabet::new(alphabet));
        for state in states {
            automaton.add_state(state);
        }
        for state in starts {
            let id = automaton.lookup(state)?;
            automaton.set_start(id, true);
        }
        for state in finals {
            let id = automaton.lookup(state)?;
            automaton.set_final(id, true);
        }
        for (from, symbol, to) in transitions {
            automaton.add_transition_by_name(from, symbol, to)?;
        }
        Ok(automaton)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Number of arena slots, tombstones included.
    pub fn capacity(&self) -> usize {
        self.states.len()
    }

    /// Number of live states.
    pub fn num_states(&self) -> usize {
        self.states.iter().filter(|s| !s.removed).count()
    }

    /// Number of transitions `(p, a, q)`.
    pub fn num_transitions(&self) -> usize {
        self.states
            .iter()
            .filter(|s| !s.removed)
            .map(|s| s.out.iter().map(Vec::len).sum::<usize>())
            .sum()
    }

    /// Iterates over the handles of all live states in arena order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.removed)
            .map(|(i, _)| StateId::from(i))
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn state_name(&self, id: StateId) -> &str {
        &self.states[id.index()].name
    }

    pub fn starts(&self) -> &BTreeSet<StateId> {
        &self.starts
    }

    pub fn finals(&self) -> &BTreeSet<StateId> {
        &self.finals
    }

    pub fn is_start(&self, id: StateId) -> bool {
        self.states[id.index()].is_start
    }

    pub fn is_final(&self, id: StateId) -> bool {
        self.states[id.index()].is_final
    }

    pub fn is_removed(&self, id: StateId) -> bool {
        self.states[id.index()].removed
    }

    pub fn successors(&self, id: StateId, symbol: Symbol) -> &[StateId] {
        self.states[id.index()].successors(symbol)
    }

    pub fn predecessors(&self, id: StateId, symbol: Symbol) -> &[StateId] {
        self.states[id.index()].predecessors(symbol)
    }

    /// Finds a live state by name (the first one, should names collide).
    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.states().find(|&id| self.state_name(id) == name)
    }

    fn lookup(&self, name: &str) -> Result<StateId> {
        self.find_state(name).ok_or_else(|| Error::UnknownState(name.to_string()))
    }

    /// Looks up a symbol of this automaton's alphabet by name.
    pub fn symbol(&self, name: &str) -> Result<Symbol> {
        self.alphabet
            .index_of(name)
            .ok_or_else(|| Error::UnknownSymbol(name.to_string()))
    }

    /// Appends a fresh state with no transitions.
    pub fn add_state(&mut self, name: impl Into<String>) -> StateId {
        let id = StateId::from(self.states.len());
        self.states.push(State::new(name.into(), self.alphabet.len()));
        id
    }

    /// Appends a tombstoned slot, keeping arena positions aligned with another automaton.
    pub(crate) fn add_tombstone(&mut self) -> StateId {
        let id = StateId::from(self.states.len());
        self.states.push(State::tombstone(self.alphabet.len()));
        id
    }

    /// Marks or unmarks a start state, keeping the flag and the start set in sync.
    pub fn set_start(&mut self, id: StateId, value: bool) {
        self.states[id.index()].is_start = value;
        if value {
            self.starts.insert(id);
        } else {
            self.starts.remove(&id);
        }
    }

    /// Marks or unmarks a final state, keeping the flag and the final set in sync.
    pub fn set_final(&mut self, id: StateId, value: bool) {
        self.states[id.index()].is_final = value;
        if value {
            self.finals.insert(id);
        } else {
            self.finals.remove(&id);
        }
    }

    /// Adds the transition `from --symbol--> to`.
    ///
    /// Returns `false` if the transition was already present.
    pub fn add_transition(&mut self, from: StateId, symbol: Symbol, to: StateId) -> bool {
        let a = symbol.index();
        if self.states[from.index()].out[a].contains(&to) {
            return false;
        }
        self.states[from.index()].out[a].push(to);
        self.states[to.index()].inc[a].push(from);
        true
    }

    /// Adds a transition given by names.
    pub fn add_transition_by_name(&mut self, from: &str, symbol: &str, to: &str) -> Result<bool> {
        let from = self.lookup(from)?;
        let to = self.lookup(to)?;
        let symbol = self.symbol(symbol)?;
        Ok(self.add_transition(from, symbol, to))
    }

    /// Removes the transition `from --symbol--> to` from both relations.
    ///
    /// Returns `false` if there was no such transition.
    pub fn remove_transition(&mut self, from: StateId, symbol: Symbol, to: StateId) -> bool {
        let a = symbol.index();
        let out = &mut self.states[from.index()].out[a];
        let Some(pos) = out.iter().position(|&t| t == to) else {
            return false;
        };
        out.swap_remove(pos);
        let inc = &mut self.states[to.index()].inc[a];
        if let Some(pos) = inc.iter().position(|&s| s == from) {
            inc.swap_remove(pos);
        }
        true
    }

    /// Removes every transition entering or leaving `id`, in both directions.
    pub fn unlink_state(&mut self, id: StateId) {
        for symbol in self.alphabet.symbols() {
            let a = symbol.index();
            for target in std::mem::take(&mut self.states[id.index()].out[a]) {
                let inc = &mut self.states[target.index()].inc[a];
                inc.retain(|&s| s != id);
            }
            for source in std::mem::take(&mut self.states[id.index()].inc[a]) {
                let out = &mut self.states[source.index()].out[a];
                out.retain(|&t| t != id);
            }
        }
    }

    /// Deletes a state: unlinks it, drops it from the start/final sets and tombstones its slot.
    pub fn remove_state(&mut self, id: StateId) {
        self.unlink_state(id);
        self.set_start(id, false);
        self.set_final(id, false);
        self.states[id.index()].removed = true;
    }

    /// Collapses `p` into `q`.
    ///
    /// Every transition entering `p` is redirected to `q`, every transition
    /// leaving `p` is copied to `q` (self-loops on `p` become self-loops on
    /// `q`), `q` inherits the start/final status of `p`, and `p` is
    /// tombstoned. The arena is not compacted.
    pub fn merge_into(&mut self, p: StateId, q: StateId) {
        assert_ne!(p, q, "Cannot merge a state into itself");
        debug!("merge_into(p = {}, q = {})", self.state_name(p), self.state_name(q));

        let redirect = |s: StateId| if s == p { q } else { s };
        let symbols: Vec<Symbol> = self.alphabet.symbols().collect();
        for symbol in symbols {
            let a = symbol.index();
            for source in self.states[p.index()].inc[a].clone() {
                self.remove_transition(source, symbol, p);
                self.add_transition(redirect(source), symbol, q);
            }
            for target in self.states[p.index()].out[a].clone() {
                self.remove_transition(p, symbol, target);
                self.add_transition(q, symbol, redirect(target));
            }
        }
        if self.is_start(p) {
            self.set_start(q, true);
        }
        if self.is_final(p) {
            self.set_final(q, true);
        }
        self.remove_state(p);
    }

    /// Reverses the automaton in place: every transition flips direction and
    /// start and final states swap roles.
    pub fn reverse(&mut self) {
        for state in self.states.iter_mut() {
            std::mem::swap(&mut state.out, &mut state.inc);
            std::mem::swap(&mut state.is_start, &mut state.is_final);
        }
        std::mem::swap(&mut self.starts, &mut self.finals);
    }

    /// Drops tombstoned slots and renumbers the remaining states in arena order.
    ///
    /// Returns the old-to-new handle mapping (`None` for dropped slots).
    pub fn compact(&mut self) -> Vec<Option<StateId>> {
        let mut mapping = vec![None; self.states.len()];
        let mut next = 0usize;
        for (i, state) in self.states.iter().enumerate() {
            if !state.removed {
                mapping[i] = Some(StateId::from(next));
                next += 1;
            }
        }
        if next == self.states.len() {
            return mapping;
        }
        debug!("compact: {} -> {} slots", self.states.len(), next);

        // Live states never reference tombstones, so nothing is dropped here.
        let remap = |ids: &mut Vec<StateId>| {
            *ids = ids.iter().filter_map(|id| mapping[id.index()]).collect();
        };
        let states = std::mem::take(&mut self.states);
        self.states = states
            .into_iter()
            .filter(|s| !s.removed)
            .map(|mut s| {
                s.out.iter_mut().for_each(&remap);
                s.inc.iter_mut().for_each(&remap);
                s
            })
            .collect();
        self.starts = self.starts.iter().filter_map(|id| mapping[id.index()]).collect();
        self.finals = self.finals.iter().filter_map(|id| mapping[id.index()]).collect();
        mapping
    }

    /// Checks whether the automaton accepts the given word.
    ///
    /// Symbols outside the alphabet are rejected.
    pub fn accepts<S: AsRef<str>>(&self, word: &[S]) -> bool {
        let mut current: BTreeSet<StateId> = self.starts.clone();
        for letter in word {
            let Some(symbol) = self.alphabet.index_of(letter.as_ref()) else {
                return false;
            };
            current = current
                .iter()
                .flat_map(|&s| self.successors(s, symbol).iter().copied())
                .collect();
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|&s| self.is_final(s))
    }

    /// At most one start state and at most one target per state and symbol.
    pub fn is_deterministic(&self) -> bool {
        self.check_deterministic().is_ok()
    }

    pub fn check_deterministic(&self) -> Result<()> {
        if self.starts.len() > 1 {
            let names: Vec<&str> = self.starts.iter().map(|&s| self.state_name(s)).collect();
            return Err(Error::NotDeterministic {
                state: names.join(","),
                symbol: "<initial>".to_string(),
            });
        }
        for id in self.states() {
            for symbol in self.alphabet.symbols() {
                if self.successors(id, symbol).len() > 1 {
                    return Err(Error::NotDeterministic {
                        state: self.state_name(id).to_string(),
                        symbol: self.alphabet.name(symbol).to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// At least one start state and at least one target per state and symbol.
    pub fn is_complete(&self) -> bool {
        self.check_complete().is_ok()
    }

    pub fn check_complete(&self) -> Result<()> {
        if self.starts.is_empty() {
            return Err(Error::NotComplete {
                state: "<none>".to_string(),
                symbol: "<initial>".to_string(),
            });
        }
        for id in self.states() {
            for symbol in self.alphabet.symbols() {
                if self.successors(id, symbol).is_empty() {
                    return Err(Error::NotComplete {
                        state: self.state_name(id).to_string(),
                        symbol: self.alphabet.name(symbol).to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks the `out`/`inc` inverse invariant and the start/final denormalization.
    pub fn check_consistency(&self) -> bool {
        for (i, state) in self.states.iter().enumerate() {
            let id = StateId::from(i);
            if state.removed {
                if state.has_transitions() || self.starts.contains(&id) || self.finals.contains(&id) {
                    return false;
                }
                continue;
            }
            if state.is_start != self.starts.contains(&id) || state.is_final != self.finals.contains(&id) {
                return false;
            }
            for symbol in self.alphabet.symbols() {
                for &t in state.successors(symbol) {
                    if self.is_removed(t) || !self.predecessors(t, symbol).contains(&id) {
                        return false;
                    }
                }
                for &s in state.predecessors(symbol) {
                    if self.is_removed(s) || !self.successors(s, symbol).contains(&id) {
                        return false;
                    }
                }
            }
        }
        true
    }
}
