//! Emptiness test and useless-state pruning.

use log::debug;

use crate::automaton::Automaton;
use crate::bitset::BitSet;
use crate::reference::StateId;
use crate::trace::{trace_event, NoTrace, Phase, Tracer};
use crate::types::Symbol;

impl Automaton {
    /// Checks whether the automaton accepts no word at all.
    ///
    /// Depth-first search from all start states; stops at the first final
    /// state popped from the stack.
    pub fn is_empty(&self) -> bool {
        self.is_empty_traced(&mut NoTrace)
    }

    pub fn is_empty_traced(&self, tracer: &mut dyn Tracer) -> bool {
        let mut visited = BitSet::new(self.capacity());
        let mut stack: Vec<StateId> = Vec::new();
        for &s in self.starts().iter().rev() {
            if visited.insert(s.index()) {
                stack.push(s);
            }
        }

        while let Some(s) = stack.pop() {
            trace_event!(tracer, Phase::Emptiness, "visit {}", self.state_name(s));
            if self.is_final(s) {
                trace_event!(tracer, Phase::Emptiness, "final state {} reached", self.state_name(s));
                return false;
            }
            for symbol in self.alphabet().symbols().collect::<Vec<_>>().into_iter().rev() {
                for &t in self.successors(s, symbol) {
                    if visited.insert(t.index()) {
                        stack.push(t);
                    }
                }
            }
        }

        debug!("is_empty: {} states visited, language is empty", visited.len());
        true
    }

    /// States reachable from some start state.
    pub fn reachable_states(&self) -> BitSet {
        self.search(self.starts().iter().copied(), |s, symbol| self.successors(s, symbol))
    }

    /// States from which some final state is reachable.
    pub fn coreachable_states(&self) -> BitSet {
        self.search(self.finals().iter().copied(), |s, symbol| self.predecessors(s, symbol))
    }

    fn search<'a>(
        &'a self,
        roots: impl Iterator<Item = StateId>,
        next: impl Fn(StateId, Symbol) -> &'a [StateId],
    ) -> BitSet {
        let mut visited = BitSet::new(self.capacity());
        let mut queue: Vec<StateId> = Vec::new();
        for s in roots {
            if visited.insert(s.index()) {
                queue.push(s);
            }
        }
        while let Some(s) = queue.pop() {
            for symbol in self.alphabet().symbols() {
                for &t in next(s, symbol) {
                    if visited.insert(t.index()) {
                        queue.push(t);
                    }
                }
            }
        }
        visited
    }

    /// Deletes every state that is unreachable from the start states or
    /// cannot reach a final state, then compacts the arena.
    ///
    /// Returns the number of deleted states. All previously obtained
    /// [`StateId`]s are invalidated.
    pub fn remove_useless_states(&mut self) -> usize {
        self.remove_useless_states_traced(&mut NoTrace)
    }

    pub fn remove_useless_states_traced(&mut self, tracer: &mut dyn Tracer) -> usize {
        let mut useful = self.reachable_states();
        useful.intersect_with(&self.coreachable_states());

        let useless: Vec<StateId> = self.states().filter(|s| !useful.contains(s.index())).collect();
        for &s in &useless {
            trace_event!(tracer, Phase::Useless, "remove {}", self.state_name(s));
            self.remove_state(s);
        }
        self.compact();

        debug!(
            "remove_useless_states: removed {}, kept {}",
            useless.len(),
            self.num_states()
        );
        useless.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::trace::Recorder;
    use test_log::test;

    #[test]
    fn test_empty_without_finals() {
        let a = Automaton::from_parts("A", ["a"], ["p"], ["p"], [], []).unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn test_start_final_is_nonempty() {
        let a = Automaton::from_parts("A", ["a"], ["p"], ["p"], ["p"], []).unwrap();
        assert!(!a.is_empty());
    }

    #[test]
    fn test_unreachable_final_is_empty() {
        let a = Automaton::from_parts("A", ["a"], ["p", "q", "r"], ["p"], ["r"], [("p", "a", "q"), ("r", "a", "q")])
            .unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn test_single_transition_nonempty() {
        let a = Automaton::from_parts("A", ["a"], ["p", "q"], ["p"], ["q"], [("p", "a", "q")]).unwrap();
        let mut recorder = Recorder::default();
        assert!(!a.is_empty_traced(&mut recorder));
        assert_eq!(recorder.messages(Phase::Emptiness), vec!["visit p", "visit q", "final state q reached"]);
    }

    #[test]
    fn test_reachable_and_coreachable() {
        let a = Automaton::from_parts(
            "A",
            ["a"],
            ["p", "q", "dead", "island"],
            ["p"],
            ["q"],
            [("p", "a", "q"), ("p", "a", "dead"), ("island", "a", "q")],
        )
        .unwrap();
        assert_eq!(a.reachable_states().iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(a.coreachable_states().iter().collect::<Vec<_>>(), vec![0, 1, 3]);
    }

    #[test]
    fn test_remove_useless_states() {
        let mut a = Automaton::from_parts(
            "A",
            ["a", "b"],
            ["p", "q", "dead", "island"],
            ["p"],
            ["q"],
            [("p", "a", "q"), ("p", "b", "dead"), ("dead", "a", "dead"), ("island", "a", "q")],
        )
        .unwrap();
        assert_eq!(a.remove_useless_states(), 2);
        assert_eq!(a.num_states(), 2);
        assert_eq!(a.capacity(), 2);
        assert_eq!(a.num_transitions(), 1);
        assert!(a.find_state("dead").is_none());
        assert!(a.check_consistency());

        assert_eq!(a.remove_useless_states(), 0);
        assert_eq!(a.num_states(), 2);
    }

    #[test]
    fn test_remove_useless_states_empty_language() {
        let mut a = Automaton::from_parts("A", ["a"], ["p", "q"], ["p"], [], [("p", "a", "q")]).unwrap();
        a.remove_useless_states();
        assert_eq!(a.num_states(), 0);
        assert!(a.starts().is_empty());
    }
}
