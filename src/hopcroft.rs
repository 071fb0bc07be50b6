//! Hopcroft partition refinement and DFA minimization.
//!
//! The refinement runs on a completed copy of the transition function:
//! when some state lacks a transition, an implicit non-final sink with
//! self-loops on every symbol takes its place. The sink never shows up in a
//! reported [`Partition`], but the states equivalent to it (dead states)
//! still end up in a block of their own.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::algebra::claim_name;
use crate::automaton::Automaton;
use crate::error::Result;
use crate::reference::StateId;
use crate::trace::{trace_event, NoTrace, Phase, Tracer};
use crate::types::Symbol;

/// A partition of the live states of an automaton into equivalence classes.
///
/// # Invariants
///
/// - Blocks are non-empty and pairwise disjoint.
/// - Members of a block are sorted; blocks are sorted by their first member.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Partition {
    blocks: Vec<Vec<StateId>>,
}

impl Partition {
    pub fn blocks(&self) -> &[Vec<StateId>] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Index of the block containing `state`.
    pub fn block_of(&self, state: StateId) -> Option<usize> {
        self.blocks.iter().position(|b| b.binary_search(&state).is_ok())
    }

    fn from_blocks(mut blocks: Vec<Vec<StateId>>) -> Self {
        blocks.retain(|b| !b.is_empty());
        for b in blocks.iter_mut() {
            b.sort_unstable();
        }
        blocks.sort_unstable_by_key(|b| b[0]);
        Partition { blocks }
    }
}

/// Completed transition function over local indices `0..n`, with the sink at `n` if present.
struct Dfa {
    ids: Vec<StateId>,
    finals: Vec<bool>,
    /// `inverse[a][j]`: all `i` whose `a`-successor is `j`.
    inverse: Vec<Vec<Vec<usize>>>,
}

impl Dfa {
    fn new(automaton: &Automaton) -> Self {
        let ids: Vec<StateId> = automaton.states().collect();
        let mut local = vec![usize::MAX; automaton.capacity()];
        for (i, id) in ids.iter().enumerate() {
            local[id.index()] = i;
        }
        let n = ids.len();
        let has_sink = ids
            .iter()
            .any(|&s| automaton.alphabet().symbols().any(|a| automaton.successors(s, a).is_empty()));
        let size = if has_sink { n + 1 } else { n };

        let mut finals: Vec<bool> = ids.iter().map(|&s| automaton.is_final(s)).collect();
        if has_sink {
            finals.push(false);
        }

        let mut inverse = Vec::with_capacity(automaton.alphabet().len());
        for a in automaton.alphabet().symbols() {
            let mut row = vec![n; size];
            let mut inv = vec![Vec::new(); size];
            for (i, &s) in ids.iter().enumerate() {
                if let Some(&t) = automaton.successors(s, a).first() {
                    row[i] = local[t.index()];
                }
            }
            for (i, &j) in row.iter().enumerate() {
                inv[j].push(i);
            }
            inverse.push(inv);
        }

        Dfa { ids, finals, inverse }
    }

    fn size(&self) -> usize {
        self.finals.len()
    }
}

impl Automaton {
    /// Computes the coarsest partition of the states into language-equivalent blocks.
    ///
    /// Requires a deterministic automaton (at most one start state, at most
    /// one target per state and symbol); fails with
    /// [`Error::NotDeterministic`](crate::error::Error::NotDeterministic)
    /// otherwise.
    pub fn hopcroft_partition(&self) -> Result<Partition> {
        self.hopcroft_partition_traced(&mut NoTrace)
    }

    pub fn hopcroft_partition_traced(&self, tracer: &mut dyn Tracer) -> Result<Partition> {
        self.check_deterministic()?;
        let dfa = Dfa::new(self);
        let size = dfa.size();
        let num_symbols = self.alphabet().len();

        let finals: Vec<usize> = (0..size).filter(|&i| dfa.finals[i]).collect();
        let others: Vec<usize> = (0..size).filter(|&i| !dfa.finals[i]).collect();
        if finals.is_empty() || others.is_empty() {
            trace_event!(tracer, Phase::Hopcroft, "trivial partition");
            return Ok(Partition::from_blocks(vec![dfa.ids.clone()]));
        }

        let mut block_of = vec![0usize; size];
        for &i in &others {
            block_of[i] = 1;
        }
        let mut blocks: Vec<Vec<usize>> = vec![finals, others];
        let mut pending: Vec<Vec<bool>> = vec![vec![false; num_symbols]; 2];
        let mut worklist: VecDeque<(Symbol, usize)> = VecDeque::new();

        let smaller = if blocks[0].len() <= blocks[1].len() { 0 } else { 1 };
        for a in self.alphabet().symbols() {
            worklist.push_back((a, smaller));
            pending[smaller][a.index()] = true;
        }

        let mut in_preimage = vec![false; size];
        while let Some((a, splitter)) = worklist.pop_front() {
            pending[splitter][a.index()] = false;
            trace_event!(
                tracer,
                Phase::Hopcroft,
                "splitter ({}, {:?})",
                self.alphabet().name(a),
                self.block_names(&dfa, &blocks[splitter])
            );

            // Stage the preimage before touching the partition.
            let mut preimage: Vec<usize> = Vec::new();
            for &j in &blocks[splitter] {
                for &i in &dfa.inverse[a.index()][j] {
                    if !in_preimage[i] {
                        in_preimage[i] = true;
                        preimage.push(i);
                    }
                }
            }

            let mut touched: Vec<usize> = preimage.iter().map(|&i| block_of[i]).collect();
            touched.sort_unstable();
            touched.dedup();

            for c in touched {
                let (inside, outside): (Vec<usize>, Vec<usize>) =
                    blocks[c].iter().partition(|&&i| in_preimage[i]);
                if outside.is_empty() {
                    continue;
                }

                let d = blocks.len();
                for &i in &outside {
                    block_of[i] = d;
                }
                trace_event!(
                    tracer,
                    Phase::Hopcroft,
                    "split {:?} into {:?} and {:?}",
                    self.block_names(&dfa, &blocks[c]),
                    self.block_names(&dfa, &inside),
                    self.block_names(&dfa, &outside)
                );
                let small = if inside.len() <= outside.len() { c } else { d };
                blocks[c] = inside;
                blocks.push(outside);
                pending.push(vec![false; num_symbols]);

                for b in self.alphabet().symbols() {
                    let target = if pending[c][b.index()] { d } else { small };
                    if !pending[target][b.index()] {
                        pending[target][b.index()] = true;
                        worklist.push_back((b, target));
                    }
                }
            }

            for i in preimage {
                in_preimage[i] = false;
            }
        }

        let n = dfa.ids.len();
        let partition = Partition::from_blocks(
            blocks
                .into_iter()
                .map(|b| b.into_iter().filter(|&i| i < n).map(|i| dfa.ids[i]).collect())
                .collect(),
        );
        debug!(
            "hopcroft_partition({}): {} states, {} blocks",
            self.name(),
            n,
            partition.len()
        );
        Ok(partition)
    }

    fn block_names(&self, dfa: &Dfa, block: &[usize]) -> Vec<String> {
        block
            .iter()
            .map(|&i| match dfa.ids.get(i) {
                Some(&id) => self.state_name(id).to_string(),
                None => "<sink>".to_string(),
            })
            .collect()
    }

    /// Builds the minimal DFA: one state per block of [`hopcroft_partition`](Automaton::hopcroft_partition).
    ///
    /// A block's state is named by concatenating its members' names in
    /// handle order (with `_copy` appended while that name is taken), is
    /// start/final if any member is, and takes its transitions from its
    /// first member.
    pub fn minimize(&self) -> Result<Automaton> {
        self.minimize_traced(&mut NoTrace)
    }

    pub fn minimize_traced(&self, tracer: &mut dyn Tracer) -> Result<Automaton> {
        let partition = self.hopcroft_partition_traced(tracer)?;
        let mut result = Automaton::new(format!("min-{}", self.name()), self.alphabet().clone());

        let mut block_of = vec![usize::MAX; self.capacity()];
        let mut taken: HashSet<String> = HashSet::new();
        for (b, block) in partition.blocks().iter().enumerate() {
            let name: String = block.iter().map(|&s| self.state_name(s)).collect();
            let id = result.add_state(claim_name(&mut taken, name));
            for &s in block {
                block_of[s.index()] = b;
                if self.is_start(s) {
                    result.set_start(id, true);
                }
                if self.is_final(s) {
                    result.set_final(id, true);
                }
            }
        }

        for (b, block) in partition.blocks().iter().enumerate() {
            let first = block[0];
            for a in self.alphabet().symbols() {
                for &t in self.successors(first, a) {
                    result.add_transition(StateId::from(b), a, StateId::from(block_of[t.index()]));
                }
            }
        }

        debug!(
            "minimize({}): {} -> {} states",
            self.name(),
            self.num_states(),
            result.num_states()
        );
        Ok(result)
    }
}
