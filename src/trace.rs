//! Step-by-step tracing of the worklist algorithms.
//!
//! Every algorithm with a `*_traced` variant reports its intermediate steps
//! (queue contents, visited states, refinement splits, antichain updates) to a
//! [`Tracer`]. The plain variants pass [`NoTrace`], so tracing costs nothing
//! unless a caller asks for it.
//!
//! ```
//! use nfa_rs::automaton::Automaton;
//! use nfa_rs::trace::{Phase, Recorder};
//!
//! let a = Automaton::from_parts("A", ["a"], ["p", "q"], ["p"], ["q"], [("p", "a", "q")]).unwrap();
//! let mut recorder = Recorder::default();
//! assert!(!a.is_empty_traced(&mut recorder));
//! assert!(recorder.events().iter().all(|(phase, _)| *phase == Phase::Emptiness));
//! ```

use std::fmt;

/// The algorithm emitting an event.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    Emptiness,
    Useless,
    Product,
    Determinize,
    Hopcroft,
    Preorder,
    Reduce,
    Universality,
    Inclusion,
}

impl Phase {
    /// Log target used by [`LogTracer`].
    pub const fn target(self) -> &'static str {
        match self {
            Phase::Emptiness => "nfa_rs::emptiness",
            Phase::Useless => "nfa_rs::useless",
            Phase::Product => "nfa_rs::product",
            Phase::Determinize => "nfa_rs::determinize",
            Phase::Hopcroft => "nfa_rs::hopcroft",
            Phase::Preorder => "nfa_rs::preorder",
            Phase::Reduce => "nfa_rs::reduce",
            Phase::Universality => "nfa_rs::universality",
            Phase::Inclusion => "nfa_rs::inclusion",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.target().trim_start_matches("nfa_rs::");
        write!(f, "{}", name)
    }
}

/// Sink for intermediate algorithm steps.
pub trait Tracer {
    /// Whether events are consumed at all. Algorithms skip formatting
    /// expensive event payloads when this is false.
    fn enabled(&self) -> bool {
        true
    }

    fn event(&mut self, phase: Phase, args: fmt::Arguments<'_>);
}

/// Discards every event.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoTrace;

impl Tracer for NoTrace {
    fn enabled(&self) -> bool {
        false
    }

    fn event(&mut self, _phase: Phase, _args: fmt::Arguments<'_>) {}
}

/// Forwards events to the `log` facade at trace level, one target per phase.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn enabled(&self) -> bool {
        log::log_enabled!(log::Level::Trace)
    }

    fn event(&mut self, phase: Phase, args: fmt::Arguments<'_>) {
        log::trace!(target: phase.target(), "{}", args);
    }
}

/// Collects events in memory.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    events: Vec<(Phase, String)>,
}

impl Recorder {
    pub fn events(&self) -> &[(Phase, String)] {
        &self.events
    }

    /// Messages recorded for one phase.
    pub fn messages(&self, phase: Phase) -> Vec<&str> {
        self.events
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, m)| m.as_str())
            .collect()
    }
}

impl Tracer for Recorder {
    fn event(&mut self, phase: Phase, args: fmt::Arguments<'_>) {
        self.events.push((phase, args.to_string()));
    }
}

/// Emits an event to a tracer, skipping formatting when the tracer is disabled.
macro_rules! trace_event {
    ($tracer:expr, $phase:expr, $($arg:tt)+) => {
        if $tracer.enabled() {
            $tracer.event($phase, format_args!($($arg)+));
        }
    };
}

pub(crate) use trace_event;
