//! Union, copy, completion and complement.

use std::collections::HashSet;

use log::debug;

use crate::automaton::Automaton;
use crate::determinize::SINK_NAME;
use crate::error::Result;
use crate::reference::StateId;
use crate::types::Symbol;

/// Suffix appended to a state name that is already taken in the automaton being built.
pub const COPY_SUFFIX: &str = "_copy";

/// Extends `name` with [`COPY_SUFFIX`] until it is not in `taken`, then records it.
pub(crate) fn claim_name(taken: &mut HashSet<String>, mut name: String) -> String {
    while taken.contains(&name) {
        name.push_str(COPY_SUFFIX);
    }
    taken.insert(name.clone());
    name
}

impl Automaton {
    /// Builds an automaton accepting `L(self) ∪ L(other)` by disjoint copy.
    ///
    /// Arena slots of `self` keep their indices (tombstones included) and
    /// slot `j` of `other` lands at `self.capacity() + j`, so a preorder
    /// computed on the union can address both operands. States of `self` keep
    /// their names; a name of `other` that is already taken gets `_copy`
    /// appended until it is free. The result runs over the union of both
    /// alphabets.
    pub fn union(&self, other: &Automaton) -> Result<Automaton> {
        self.alphabet().check_compatible(other.alphabet())?;
        let alphabet = self.alphabet().union(other.alphabet());
        let mut result = Automaton::new(format!("{}+{}", self.name(), other.name()), alphabet);
        let mut taken: HashSet<String> = HashSet::new();

        for (source, rename) in [(self, false), (other, true)] {
            let offset = result.capacity();
            for i in 0..source.capacity() {
                let s = StateId::from(i);
                if source.is_removed(s) {
                    result.add_tombstone();
                    continue;
                }
                let mut name = source.state_name(s).to_string();
                if rename {
                    name = claim_name(&mut taken, name);
                } else {
                    taken.insert(name.clone());
                }
                let id = result.add_state(name);
                result.set_start(id, source.is_start(s));
                result.set_final(id, source.is_final(s));
            }

            let symbols: Vec<(Symbol, Symbol)> = source
                .alphabet()
                .symbols()
                .filter_map(|a| Some((a, result.alphabet().index_of(source.alphabet().name(a))?)))
                .collect();
            for s in source.states() {
                for &(a, b) in &symbols {
                    for &t in source.successors(s, a) {
                        result.add_transition(s.offset(offset), b, t.offset(offset));
                    }
                }
            }
        }

        debug!(
            "union({}, {}): {} states",
            self.name(),
            other.name(),
            result.num_states()
        );
        Ok(result)
    }

    /// Deep copy without tombstones: live states are renumbered in arena order.
    pub fn copy(&self) -> Automaton {
        let mut result = self.clone();
        result.compact();
        result
    }

    /// Makes the transition function total by routing every missing
    /// transition to a fresh non-final `fail` state with self-loops
    /// (`fail_copy` if `fail` is taken).
    ///
    /// An automaton without start states gets the sink as its start state.
    /// Returns `false` (and changes nothing) if the automaton is already complete.
    pub fn complete(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        let ids: Vec<StateId> = self.states().collect();
        let mut taken: HashSet<String> = ids.iter().map(|&s| self.state_name(s).to_string()).collect();
        let sink = self.add_state(claim_name(&mut taken, SINK_NAME.to_string()));
        let symbols: Vec<Symbol> = self.alphabet().symbols().collect();
        for &a in &symbols {
            self.add_transition(sink, a, sink);
        }
        for s in ids {
            for &a in &symbols {
                if self.successors(s, a).is_empty() {
                    self.add_transition(s, a, sink);
                }
            }
        }
        if self.starts().is_empty() {
            self.set_start(sink, true);
        }
        debug!("complete({}): added sink", self.name());
        true
    }

    /// Complements the language in place by flipping every final flag.
    ///
    /// Requires a complete DFA: fails with
    /// [`Error::NotDeterministic`](crate::error::Error::NotDeterministic) or
    /// [`Error::NotComplete`](crate::error::Error::NotComplete) before touching
    /// the automaton otherwise.
    pub fn complement(&mut self) -> Result<()> {
        self.check_deterministic()?;
        self.check_complete()?;
        let ids: Vec<StateId> = self.states().collect();
        for s in ids {
            let is_final = self.is_final(s);
            self.set_final(s, !is_final);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::determinize::DeterminizeConfig;
    use crate::error::Error;
    use test_log::test;

    fn universal(name: &str, state: &'static str) -> Automaton {
        Automaton::from_parts(name, ["a"], [state], [state], [state], [(state, "a", state)]).unwrap()
    }

    #[test]
    fn test_union_of_universal() {
        let a = universal("A", "p");
        let b = universal("B", "p");
        let c = a.union(&b).unwrap();
        assert_eq!(c.name(), "A+B");
        assert_eq!(c.num_states(), 2);
        assert!(c.find_state("p_copy").is_some());
        assert_eq!(c.starts().len(), 2);
        assert!(c.accepts(&["a", "a"]));
        assert!(c.check_consistency());
    }

    #[test]
    fn test_union_layout() {
        let mut a = Automaton::from_parts("A", ["a"], ["x", "dead", "y"], ["x"], ["y"], [("x", "a", "y")]).unwrap();
        let dead = a.find_state("dead").unwrap();
        a.remove_state(dead);
        let b = Automaton::from_parts("B", ["a", "b"], ["u", "v"], ["u"], ["v"], [("u", "b", "v")]).unwrap();
        let c = a.union(&b).unwrap();
        assert_eq!(c.capacity(), a.capacity() + b.capacity());
        assert!(c.is_removed(StateId::new(1)));
        assert_eq!(c.state_name(StateId::new(3)), "u");
        assert_eq!(c.alphabet().names(), &["a", "b"]);
        assert!(c.accepts(&["a"]));
        assert!(c.accepts(&["b"]));
        assert!(!c.accepts(&["a", "b"]));
    }

    #[test]
    fn test_union_names_stay_unique() {
        let a = Automaton::from_parts("A", ["a"], ["p", "p_copy"], ["p"], ["p_copy"], [("p", "a", "p_copy")]).unwrap();
        let b = Automaton::from_parts("B", ["a"], ["p"], ["p"], ["p"], []).unwrap();
        let c = a.union(&b).unwrap();
        let names: Vec<&str> = c.states().map(|s| c.state_name(s)).collect();
        assert_eq!(names, vec!["p", "p_copy", "p_copy_copy"]);
        assert!(c.is_final(c.find_state("p_copy_copy").unwrap()));
        assert!(!c.is_start(c.find_state("p_copy").unwrap()));

        let text = c.to_timbuk_string();
        let parsed = Automaton::from_timbuk_str(&text).unwrap();
        assert_eq!(parsed.num_states(), 3);
        assert!(parsed.accepts::<&str>(&[]));
        assert!(parsed.accepts(&["a"]));
    }

    #[test]
    fn test_copy() {
        let mut a = Automaton::from_parts("A", ["a"], ["p", "q", "r"], ["p"], ["r"], [("p", "a", "r")]).unwrap();
        let q = a.find_state("q").unwrap();
        a.remove_state(q);
        let c = a.copy();
        assert_eq!(c.capacity(), 2);
        assert_eq!(c.name(), "A");
        assert!(c.accepts(&["a"]));
        assert!(c.check_consistency());
        assert_eq!(a.capacity(), 3);
    }

    #[test]
    fn test_complete() {
        let mut a = Automaton::from_parts("A", ["a", "b"], ["p", "q"], ["p"], ["q"], [("p", "a", "q")]).unwrap();
        assert!(a.complete());
        assert!(a.is_complete());
        assert_eq!(a.num_states(), 3);
        assert!(!a.complete());
        assert!(a.accepts(&["a"]));
        assert!(!a.accepts(&["a", "b"]));
    }

    #[test]
    fn test_complete_avoids_taken_sink_name() {
        let mut a = Automaton::from_parts("A", ["a"], ["p", "fail"], ["p"], ["fail"], [("p", "a", "fail")]).unwrap();
        assert!(a.complete());
        let sink = a.find_state("fail_copy").unwrap();
        assert!(!a.is_final(sink));
        assert!(a.is_final(a.find_state("fail").unwrap()));
        assert!(a.accepts(&["a"]));
        assert!(!a.accepts(&["a", "a"]));
    }

    #[test]
    fn test_complement() {
        let mut d = Automaton::from_parts("A", ["a"], ["p", "q"], ["p"], ["q"], [("p", "a", "q")])
            .unwrap()
            .determinize_with(&DeterminizeConfig::default().with_sink_state(true));
        d.complement().unwrap();
        assert!(d.accepts::<&str>(&[]));
        assert!(!d.accepts(&["a"]));
        assert!(d.accepts(&["a", "a"]));
        assert!(d.check_consistency());
    }

    #[test]
    fn test_complement_preconditions() {
        let mut partial = Automaton::from_parts("A", ["a"], ["p", "q"], ["p"], ["q"], [("p", "a", "q")]).unwrap();
        assert!(matches!(partial.complement(), Err(Error::NotComplete { .. })));
        assert!(partial.is_final(partial.find_state("q").unwrap()));

        let mut nfa = Automaton::from_parts("B", ["a"], ["p"], ["p"], [], [("p", "a", "p")]).unwrap();
        let p = nfa.find_state("p").unwrap();
        let sym = nfa.symbol("a").unwrap();
        nfa.add_state("r");
        let r = nfa.find_state("r").unwrap();
        nfa.add_transition(p, sym, r);
        assert!(matches!(nfa.complement(), Err(Error::NotDeterministic { .. })));
    }
}
