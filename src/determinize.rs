//! Subset construction.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use crate::algebra::claim_name;
use crate::automaton::Automaton;
use crate::reference::StateId;
use crate::trace::{trace_event, NoTrace, Phase, Tracer};

/// Configuration for [`Automaton::determinize_with`].
#[derive(Debug, Clone, Default)]
pub struct DeterminizeConfig {
    /// Route empty successor sets to a single non-final `fail` state with a
    /// self-loop on every symbol, producing a complete DFA.
    ///
    /// Default: `false` (partial DFA, no transition on an empty successor set).
    pub sink_state: bool,
}

impl DeterminizeConfig {
    pub fn with_sink_state(mut self, sink_state: bool) -> Self {
        self.sink_state = sink_state;
        self
    }
}

/// Name of the sink state added by the complete policies.
pub const SINK_NAME: &str = "fail";

impl Automaton {
    /// Subset construction with the default (partial) policy.
    pub fn determinize(&self) -> Automaton {
        self.determinize_with(&DeterminizeConfig::default())
    }

    pub fn determinize_with(&self, config: &DeterminizeConfig) -> Automaton {
        self.determinize_traced(config, &mut NoTrace)
    }

    /// Builds a DFA accepting the same language.
    ///
    /// Subset states are keyed by their sorted member handles, so a set
    /// reached along different paths is created once. A subset state is
    /// named `|` followed by its sorted member names, each closed by `|`
    /// (`|p|q|`; the empty set is `|`), with `_copy` appended should two
    /// subsets render the same way. Only subsets reachable from the set
    /// of start states are built.
    pub fn determinize_traced(&self, config: &DeterminizeConfig, tracer: &mut dyn Tracer) -> Automaton {
        let mut result = Automaton::new(format!("det{}", self.name()), self.alphabet().clone());
        let mut subsets: HashMap<Vec<StateId>, StateId> = HashMap::new();
        let mut queue: VecDeque<(Vec<StateId>, StateId)> = VecDeque::new();
        let mut sink: Option<StateId> = None;
        let mut taken: HashSet<String> = HashSet::new();

        let mut intern = |result: &mut Automaton, queue: &mut VecDeque<(Vec<StateId>, StateId)>, members: Vec<StateId>| {
            if let Some(&id) = subsets.get(&members) {
                return id;
            }
            let id = result.add_state(claim_name(&mut taken, self.subset_name(&members)));
            if members.iter().any(|&s| self.is_final(s)) {
                result.set_final(id, true);
            }
            subsets.insert(members.clone(), id);
            queue.push_back((members, id));
            id
        };

        let initial: Vec<StateId> = self.starts().iter().copied().collect();
        let initial = intern(&mut result, &mut queue, initial);
        result.set_start(initial, true);

        while let Some((members, source)) = queue.pop_front() {
            trace_event!(tracer, Phase::Determinize, "expand {}", result.state_name(source));
            for symbol in self.alphabet().symbols() {
                let mut targets: Vec<StateId> = members
                    .iter()
                    .flat_map(|&s| self.successors(s, symbol).iter().copied())
                    .collect();
                targets.sort_unstable();
                targets.dedup();

                if targets.is_empty() {
                    if !config.sink_state {
                        continue;
                    }
                    let fail = *sink.get_or_insert_with(|| {
                        let fail = result.add_state(SINK_NAME);
                        for a in self.alphabet().symbols() {
                            result.add_transition(fail, a, fail);
                        }
                        fail
                    });
                    result.add_transition(source, symbol, fail);
                    continue;
                }

                let target = intern(&mut result, &mut queue, targets);
                trace_event!(
                    tracer,
                    Phase::Determinize,
                    "{} --{}--> {}",
                    result.state_name(source),
                    self.alphabet().name(symbol),
                    result.state_name(target)
                );
                result.add_transition(source, symbol, target);
            }
        }

        debug!(
            "determinize({}): {} -> {} states",
            self.name(),
            self.num_states(),
            result.num_states()
        );
        result
    }

    /// Display name of a subset state.
    pub(crate) fn subset_name(&self, members: &[StateId]) -> String {
        let mut names: Vec<&str> = members.iter().map(|&s| self.state_name(s)).collect();
        names.sort_unstable();
        let mut name = String::from("|");
        for n in names {
            name.push_str(n);
            name.push('|');
        }
        name
    }
}
