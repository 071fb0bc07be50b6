//! NFA reduction by quotienting with simulation preorders.
//!
//! Three passes, each merging a state `p` into a partner `q`:
//!
//! 1. `p` and `q` simulate each other (right preorder);
//! 2. `p` and `q` simulate each other in the reversed automaton (left preorder);
//! 3. `q` simulates `p` in both directions and `p` lies on no cycle.
//!
//! Passes 1 and 2 prune the preorders after every merge instead of
//! recomputing them: `(q, x)` survives only if `(p, x)` held as well, and
//! every pair mentioning `p` is dropped. Both preorders are recomputed at the
//! start of each pass, and after every merge of pass 3.
//!
//! Merged states are tombstoned; call [`compact`](Automaton::compact) to
//! reclaim their slots.

use log::debug;

use crate::automaton::Automaton;
use crate::bitset::BitSet;
use crate::preorder::Preorder;
use crate::reference::StateId;
use crate::trace::{trace_event, NoTrace, Phase, Tracer};

/// Number of merges made by each pass of [`Automaton::reduce`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ReduceStats {
    pub right: usize,
    pub left: usize,
    pub combined: usize,
}

impl ReduceStats {
    pub fn total(&self) -> usize {
        self.right + self.left + self.combined
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Side {
    Right,
    Left,
}

impl Automaton {
    /// Reduces the number of states in place without changing the language.
    pub fn reduce(&mut self) -> ReduceStats {
        self.reduce_traced(&mut NoTrace)
    }

    pub fn reduce_traced(&mut self, tracer: &mut dyn Tracer) -> ReduceStats {
        let before = self.num_states();
        let mut stats = ReduceStats::default();

        stats.right = self.merge_mutual(Side::Right, tracer);
        stats.left = self.merge_mutual(Side::Left, tracer);
        stats.combined = self.merge_combined(tracer);

        debug!(
            "reduce({}): {} -> {} states, {:?}",
            self.name(),
            before,
            self.num_states(),
            stats
        );
        stats
    }

    /// Passes 1 and 2: merge mutually similar states.
    fn merge_mutual(&mut self, side: Side, tracer: &mut dyn Tracer) -> usize {
        let mut right = self.preorder();
        let mut left = self.left_preorder();
        let ids: Vec<StateId> = self.states().collect();
        let mut merges = 0;

        for &p in &ids {
            if self.is_removed(p) {
                continue;
            }
            let relation = match side {
                Side::Right => &right,
                Side::Left => &left,
            };
            let partner = ids
                .iter()
                .copied()
                .find(|&q| q != p && !self.is_removed(q) && relation.contains(p, q) && relation.contains(q, p));
            let Some(q) = partner else {
                continue;
            };

            trace_event!(
                tracer,
                Phase::Reduce,
                "{:?} pass: merge {} into {}",
                side,
                self.state_name(p),
                self.state_name(q)
            );
            self.merge_into(p, q);
            prune(&mut right, p, q);
            prune(&mut left, p, q);
            merges += 1;
        }
        merges
    }

    /// Pass 3: merge `p` into `q` when `q` simulates `p` on both sides and
    /// `p` is on no cycle. Preorders are recomputed after every merge.
    fn merge_combined(&mut self, tracer: &mut dyn Tracer) -> usize {
        let mut merges = 0;
        loop {
            let right = self.preorder();
            let left = self.left_preorder();
            let ids: Vec<StateId> = self.states().collect();

            let candidate = ids.iter().copied().find_map(|p| {
                if self.is_on_cycle(p) {
                    return None;
                }
                ids.iter()
                    .copied()
                    .find(|&q| q != p && right.contains(p, q) && left.contains(p, q))
                    .map(|q| (p, q))
            });
            let Some((p, q)) = candidate else {
                return merges;
            };

            trace_event!(
                tracer,
                Phase::Reduce,
                "combined pass: merge {} into {}",
                self.state_name(p),
                self.state_name(q)
            );
            self.merge_into(p, q);
            merges += 1;
        }
    }

    /// Checks whether `p` can reach itself through at least one transition.
    pub fn is_on_cycle(&self, p: StateId) -> bool {
        let mut visited = BitSet::new(self.capacity());
        let mut stack: Vec<StateId> = Vec::new();
        for a in self.alphabet().symbols() {
            for &t in self.successors(p, a) {
                if visited.insert(t.index()) {
                    stack.push(t);
                }
            }
        }
        while let Some(s) = stack.pop() {
            if s == p {
                return true;
            }
            for a in self.alphabet().symbols() {
                for &t in self.successors(s, a) {
                    if visited.insert(t.index()) {
                        stack.push(t);
                    }
                }
            }
        }
        false
    }
}

/// Updates a preorder after `p` was merged into `q`.
fn prune(relation: &mut Preorder, p: StateId, q: StateId) {
    let keep = relation.row(p).clone();
    relation.retain_row(q, &keep);
    relation.remove_state(p);
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::trace::Recorder;
    use test_log::test;

    fn words(alphabet: &[&'static str], max_len: usize) -> Vec<Vec<&'static str>> {
        let mut all = vec![vec![]];
        let mut layer: Vec<Vec<&str>> = vec![vec![]];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for w in &layer {
                for &a in alphabet {
                    let mut w2 = w.clone();
                    w2.push(a);
                    next.push(w2);
                }
            }
            all.extend(next.iter().cloned());
            layer = next;
        }
        all
    }

    fn assert_same_language(a: &Automaton, b: &Automaton, alphabet: &[&'static str]) {
        for w in words(alphabet, 6) {
            assert_eq!(a.accepts(&w), b.accepts(&w), "word {:?}", w);
        }
    }

    #[test]
    fn test_right_pass_merges_duplicates() {
        let mut a = Automaton::from_parts(
            "A",
            ["a", "b"],
            ["s", "p", "q", "f"],
            ["s"],
            ["f"],
            [("s", "a", "p"), ("s", "b", "q"), ("p", "a", "f"), ("q", "a", "f")],
        )
        .unwrap();
        let original = a.clone();
        let stats = a.reduce();
        assert!(stats.right >= 1);
        assert_eq!(a.num_states(), 3);
        assert!(a.check_consistency());
        assert_same_language(&original, &a, &["a", "b"]);
    }

    #[test]
    fn test_left_pass_merges_duplicates() {
        // p and q are only distinguishable to the right, but have the same left language.
        let mut a = Automaton::from_parts(
            "A",
            ["a", "b"],
            ["s", "p", "q", "f", "g"],
            ["s"],
            ["f", "g"],
            [("s", "a", "p"), ("s", "a", "q"), ("p", "a", "f"), ("q", "b", "g")],
        )
        .unwrap();
        let original = a.clone();
        let stats = a.reduce();
        assert!(stats.left >= 1);
        assert!(a.num_states() < original.num_states());
        assert_same_language(&original, &a, &["a", "b"]);
    }

    #[test]
    fn test_cycle_guard() {
        // q simulates p on both sides, but p is on a cycle: merging p into q
        // would accept "a c d".
        let mut a = Automaton::from_parts(
            "A",
            ["a", "b", "c", "d", "e"],
            ["s", "p", "q", "r", "f"],
            ["s"],
            ["f"],
            [
                ("s", "a", "q"),
                ("s", "b", "p"),
                ("s", "b", "q"),
                ("s", "b", "r"),
                ("p", "c", "p"),
                ("p", "e", "f"),
                ("q", "c", "r"),
                ("r", "c", "q"),
                ("q", "d", "f"),
                ("q", "e", "f"),
                ("r", "e", "f"),
            ],
        )
        .unwrap();
        assert!(!a.accepts(&["a", "c", "d"]));
        let original = a.clone();
        a.reduce();
        assert!(!a.accepts(&["a", "c", "d"]));
        assert_same_language(&original, &a, &["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_merged_states_are_tombstoned() {
        let mut a = Automaton::from_parts(
            "A",
            ["a"],
            ["s", "p", "q"],
            ["s"],
            ["p", "q"],
            [("s", "a", "p"), ("s", "a", "q"), ("p", "a", "p"), ("q", "a", "q")],
        )
        .unwrap();
        let mut recorder = Recorder::default();
        let stats = a.reduce_traced(&mut recorder);
        assert_eq!(stats.total(), a.capacity() - a.num_states());
        assert_eq!(a.capacity(), 3);
        assert!(a.num_states() < 3);
        assert_eq!(recorder.messages(Phase::Reduce).len(), stats.total());
        a.compact();
        assert_eq!(a.capacity(), a.num_states());
        assert!(a.accepts(&["a", "a"]));
        assert!(!a.accepts::<&str>(&[]));
    }

    #[test]
    fn test_is_on_cycle() {
        let a = Automaton::from_parts(
            "A",
            ["a"],
            ["p", "q", "r"],
            ["p"],
            ["r"],
            [("p", "a", "q"), ("q", "a", "p"), ("q", "a", "r"), ("r", "a", "r")],
        )
        .unwrap();
        assert!(a.is_on_cycle(a.find_state("p").unwrap()));
        assert!(a.is_on_cycle(a.find_state("r").unwrap()));
        let b = Automaton::from_parts("B", ["a"], ["p", "q"], ["p"], ["q"], [("p", "a", "q")]).unwrap();
        assert!(!b.is_on_cycle(b.find_state("p").unwrap()));
    }
}
