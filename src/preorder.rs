//! Simulation preorder.
//!
//! `(p, q)` belongs to the preorder when `q` simulates `p`: `q` is final
//! whenever `p` is, and every `a`-move of `p` can be matched by an `a`-move of
//! `q` into a state simulating the target. The preorder is computed through
//! its complement, the set of pairs where simulation fails, by refining
//! per-predecessor counters until a fixpoint is reached.

use std::fmt;

use log::debug;

use crate::automaton::Automaton;
use crate::bitset::BitSet;
use crate::reference::StateId;
use crate::trace::{trace_event, NoTrace, Phase, Tracer};

/// A binary relation over the arena indices `0..size` of an automaton.
///
/// # Invariants
///
/// - `rows.len() == size`; `rows[p]` holds every `q` with `(p, q)` in the relation.
/// - Indices are arena positions, so a relation computed over an automaton
///   stays meaningful across merges (which only tombstone slots) but not
///   across [`compact`](Automaton::compact).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Preorder {
    rows: Vec<BitSet>,
}

impl Preorder {
    /// The empty relation over `size` states.
    pub fn new(size: usize) -> Self {
        Preorder {
            rows: (0..size).map(|_| BitSet::new(size)).collect(),
        }
    }

    /// The identity relation over `size` states.
    pub fn identity(size: usize) -> Self {
        let mut relation = Preorder::new(size);
        for p in 0..size {
            relation.rows[p].insert(p);
        }
        relation
    }

    /// The identity relation over the arena of `automaton` (its capacity).
    pub fn identity_for(automaton: &Automaton) -> Self {
        Preorder::identity(automaton.capacity())
    }

    /// Number of states the relation ranges over.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.rows.iter().map(BitSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(BitSet::is_empty)
    }

    /// Checks whether `q` simulates `p`.
    #[inline]
    pub fn contains(&self, p: StateId, q: StateId) -> bool {
        self.rows.get(p.index()).is_some_and(|row| row.contains(q.index()))
    }

    pub fn insert(&mut self, p: StateId, q: StateId) -> bool {
        self.rows[p.index()].insert(q.index())
    }

    pub fn remove(&mut self, p: StateId, q: StateId) -> bool {
        self.rows[p.index()].remove(q.index())
    }

    /// States simulating `p`.
    pub fn row(&self, p: StateId) -> &BitSet {
        &self.rows[p.index()]
    }

    /// Keeps `(p, x)` only for the `x` in `keep`.
    pub(crate) fn retain_row(&mut self, p: StateId, keep: &BitSet) {
        self.rows[p.index()].intersect_with(keep);
    }

    /// Drops every pair mentioning `p`.
    pub fn remove_state(&mut self, p: StateId) {
        self.rows[p.index()].clear();
        for row in self.rows.iter_mut() {
            row.remove(p.index());
        }
    }

    /// All pairs in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = (StateId, StateId)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(p, row)| row.iter().map(move |q| (StateId::from(p), StateId::from(q))))
    }

    /// Renders the pairs with the state names of `automaton`.
    pub fn display<'a>(&'a self, automaton: &'a Automaton) -> impl fmt::Display + 'a {
        DisplayPreorder {
            relation: self,
            automaton,
        }
    }
}

struct DisplayPreorder<'a> {
    relation: &'a Preorder,
    automaton: &'a Automaton,
}

impl fmt::Display for DisplayPreorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (p, q)) in self.relation.pairs().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let name = |s: StateId| {
                if s.index() < self.automaton.capacity() {
                    self.automaton.state_name(s).to_string()
                } else {
                    s.to_string()
                }
            };
            write!(f, "({}, {})", name(p), name(q))?;
        }
        write!(f, "}}")
    }
}

impl Automaton {
    /// Computes the (right) simulation preorder over the live states.
    pub fn preorder(&self) -> Preorder {
        self.preorder_traced(&mut NoTrace)
    }

    pub fn preorder_traced(&self, tracer: &mut dyn Tracer) -> Preorder {
        let n = self.capacity();
        let live: Vec<StateId> = self.states().collect();
        let num_symbols = self.alphabet().len();

        // card[a][k]: number of a-successors of k.
        let card: Vec<Vec<u32>> = self
            .alphabet()
            .symbols()
            .map(|a| {
                let mut row = vec![0u32; n];
                for &k in &live {
                    row[k.index()] = self.state(k).out_degree(a) as u32;
                }
                row
            })
            .collect();

        let mut complement = Preorder::new(n);
        let mut worklist: Vec<(StateId, StateId)> = Vec::new();

        for &p in &live {
            for &q in &live {
                let fails = (self.is_final(p) && !self.is_final(q))
                    || (0..num_symbols).any(|a| card[a][p.index()] > 0 && card[a][q.index()] == 0);
                if fails && complement.insert(p, q) {
                    worklist.push((p, q));
                }
            }
        }
        trace_event!(tracer, Phase::Preorder, "seeded {} pairs", worklist.len());

        // counters[(a * n + p) * n + k]: a-successors of k not simulating p.
        let mut counters = vec![0u32; num_symbols * n * n];

        while let Some((p, q)) = worklist.pop() {
            trace_event!(
                tracer,
                Phase::Preorder,
                "({}, {}) not simulated",
                self.state_name(p),
                self.state_name(q)
            );
            for a in self.alphabet().symbols() {
                for &k in self.predecessors(q, a) {
                    let counter = &mut counters[(a.index() * n + p.index()) * n + k.index()];
                    *counter += 1;
                    if *counter == card[a.index()][k.index()] {
                        for &l in self.predecessors(p, a) {
                            if complement.insert(l, k) {
                                worklist.push((l, k));
                            }
                        }
                    }
                }
            }
        }

        let mut relation = Preorder::new(n);
        for &p in &live {
            for &q in &live {
                if !complement.contains(p, q) {
                    relation.insert(p, q);
                }
            }
        }

        debug!(
            "preorder({}): {} states, {} pairs",
            self.name(),
            live.len(),
            relation.len()
        );
        relation
    }

    /// Computes the left (backward) simulation preorder: the simulation
    /// preorder of the reversed automaton.
    ///
    /// The automaton is reversed in place and restored before returning.
    pub fn left_preorder(&mut self) -> Preorder {
        self.left_preorder_traced(&mut NoTrace)
    }

    pub fn left_preorder_traced(&mut self, tracer: &mut dyn Tracer) -> Preorder {
        self.reverse();
        let relation = self.preorder_traced(tracer);
        self.reverse();
        relation
    }
}
