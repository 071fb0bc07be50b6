//! # nfa-rs: Finite Automata Algorithms in Rust
//!
//! **`nfa-rs`** is a library of classic and simulation-based algorithms on
//! **nondeterministic and deterministic finite automata (NFA/DFA)** over a
//! finite alphabet: emptiness, pruning, product, subset construction,
//! Hopcroft minimization, simulation preorders, NFA reduction, and
//! antichain-based universality and inclusion checking.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: Every algorithm is a method of the [`Automaton`][crate::automaton::Automaton] arena. States are addressed by lightweight [`StateId`][crate::reference::StateId] handles, and every mutation keeps forward and backward transitions exact inverses of each other.
//! - **Stable Handles**: Deleting or merging a state tombstones its slot, so handles (and relations indexed by them) stay valid until an explicit [`compact`][crate::automaton::Automaton::compact].
//! - **Checked Preconditions**: Minimization and complement refuse nondeterministic or incomplete inputs, and mismatched alphabets or preorders are reported as [`Error`][crate::error::Error]s instead of producing silently wrong results.
//! - **Per-Call Tracing**: Worklist algorithms come in `*_traced` variants that report each step to a [`Tracer`][crate::trace::Tracer].
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! nfa-rs = "0.1"
//! ```
//!
//! ## Basic Usage
//!
//! ```rust
//! use nfa_rs::automaton::Automaton;
//! use nfa_rs::determinize::DeterminizeConfig;
//!
//! // 1. Build an NFA: words over {a, b} whose second-to-last letter is `a`.
//! let nfa = Automaton::from_parts(
//!     "A",
//!     ["a", "b"],
//!     ["s", "t", "u"],
//!     ["s"],
//!     ["u"],
//!     [("s", "a", "s"), ("s", "b", "s"), ("s", "a", "t"), ("t", "a", "u"), ("t", "b", "u")],
//! )
//! .unwrap();
//! assert!(nfa.accepts(&["b", "a", "b"]));
//!
//! // 2. Determinize and minimize.
//! let dfa = nfa.determinize();
//! let min = dfa.minimize().unwrap();
//! assert_eq!(min.num_states(), 4);
//!
//! // 3. Universality with simulation-pruned antichains.
//! assert!(!nfa.is_universal(&nfa.preorder()).unwrap());
//!
//! // 4. Complement a complete DFA and compare.
//! let mut co = nfa.determinize_with(&DeterminizeConfig::default().with_sink_state(true));
//! co.complement().unwrap();
//! assert!(co.accepts(&["a", "a", "a", "b", "b"]));
//! assert!(nfa.intersect(&co).unwrap().is_empty());
//! ```
//!
//! ## Core Components
//!
//! - **[`automaton`]**: The [`Automaton`][crate::automaton::Automaton] arena and its structural mutators.
//! - **[`reachability`]**, **[`product`]**, **[`determinize`]**, **[`hopcroft`]**: classic constructions.
//! - **[`preorder`]**, **[`reduce`]**, **[`antichain`]**: simulation-based reduction and checking.
//! - **[`io`]** and **[`dot`]**: text format and Graphviz export.

pub mod algebra;
pub mod antichain;
pub mod automaton;
pub mod bitset;
pub mod count;
pub mod determinize;
pub mod dot;
pub mod error;
pub mod hopcroft;
pub mod io;
pub mod preorder;
pub mod product;
pub mod reachability;
pub mod reduce;
pub mod reference;
pub mod state;
pub mod trace;
pub mod types;
