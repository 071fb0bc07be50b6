//! Synchronized product (intersection).

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use crate::algebra::claim_name;
use crate::automaton::Automaton;
use crate::error::Result;
use crate::reference::StateId;
use crate::trace::{trace_event, NoTrace, Phase, Tracer};
use crate::types::Symbol;

impl Automaton {
    /// Builds an automaton accepting `L(self) ∩ L(other)`.
    ///
    /// Product states are created on demand from the start pairs and named
    /// by concatenating the component names; a pair whose concatenation is
    /// already taken gets `_copy` appended until it is free. The result runs
    /// over the symbols common to both inputs; alphabets where neither
    /// contains the other are rejected.
    pub fn intersect(&self, other: &Automaton) -> Result<Automaton> {
        self.intersect_traced(other, &mut NoTrace)
    }

    pub fn intersect_traced(&self, other: &Automaton, tracer: &mut dyn Tracer) -> Result<Automaton> {
        self.alphabet().check_compatible(other.alphabet())?;
        let alphabet = self.alphabet().intersection(other.alphabet());

        // Result symbol -> (symbol in self, symbol in other).
        let mut symbols: Vec<(Symbol, Symbol, Symbol)> = Vec::with_capacity(alphabet.len());
        for symbol in alphabet.symbols() {
            let name = alphabet.name(symbol);
            symbols.push((symbol, self.symbol(name)?, other.symbol(name)?));
        }

        let mut result = Automaton::new(format!("{}&{}", self.name(), other.name()), alphabet);
        let mut pairs: HashMap<(StateId, StateId), StateId> = HashMap::new();
        let mut queue: VecDeque<(StateId, StateId)> = VecDeque::new();
        let mut taken: HashSet<String> = HashSet::new();

        let mut intern = |result: &mut Automaton, queue: &mut VecDeque<(StateId, StateId)>, p: StateId, q: StateId| {
            *pairs.entry((p, q)).or_insert_with(|| {
                let name = claim_name(&mut taken, format!("{}{}", self.state_name(p), other.state_name(q)));
                let id = result.add_state(name);
                if self.is_final(p) && other.is_final(q) {
                    result.set_final(id, true);
                }
                queue.push_back((p, q));
                id
            })
        };

        for &p in self.starts() {
            for &q in other.starts() {
                let id = intern(&mut result, &mut queue, p, q);
                result.set_start(id, true);
            }
        }

        while let Some((p, q)) = queue.pop_front() {
            let source = intern(&mut result, &mut queue, p, q);
            trace_event!(tracer, Phase::Product, "expand {}", result.state_name(source));
            for &(symbol, sp, sq) in &symbols {
                for &p2 in self.successors(p, sp) {
                    for &q2 in other.successors(q, sq) {
                        let target = intern(&mut result, &mut queue, p2, q2);
                        result.add_transition(source, symbol, target);
                    }
                }
            }
        }

        debug!(
            "intersect({}, {}): {} states, {} transitions",
            self.name(),
            other.name(),
            result.num_states(),
            result.num_transitions()
        );
        Ok(result)
    }
}
