//! Cross-checks of the automaton algorithms on random NFAs.
//!
//! Every language-level answer is compared against either brute-force word
//! enumeration or an independent classic construction (subset construction
//! plus complement).

use nfa_rs::automaton::Automaton;
use nfa_rs::determinize::DeterminizeConfig;
use nfa_rs::io::parse_automata;
use nfa_rs::preorder::Preorder;
use nfa_rs::reference::StateId;
use nfa_rs::trace::{LogTracer, Phase, Recorder};
use nfa_rs::types::{Alphabet, Symbol};
use num_bigint::BigUint;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use test_log::test;

const SYMBOLS: [&str; 2] = ["a", "b"];
const MAX_WORD_LEN: usize = 6;
const ROUNDS: u64 = 60;

// ─── Helpers ───────────────────────────────────────────────────────────────────

/// Random NFA over `{a, b}` with up to `max_states` states.
fn random_nfa(rng: &mut ChaCha8Rng, name: &str, max_states: usize) -> Automaton {
    let mut a = Automaton::new(name, Alphabet::new(SYMBOLS));
    let n = rng.random_range(1..=max_states);
    let ids: Vec<StateId> = (0..n).map(|i| a.add_state(format!("q{}", i))).collect();

    a.set_start(ids[0], true);
    for &s in &ids[1..] {
        if rng.random_bool(0.2) {
            a.set_start(s, true);
        }
    }
    for &s in &ids {
        if rng.random_bool(0.35) {
            a.set_final(s, true);
        }
    }
    for &p in &ids {
        for sym in 0..SYMBOLS.len() {
            for &q in &ids {
                if rng.random_bool(0.3) {
                    a.add_transition(p, Symbol::new(sym as u32), q);
                }
            }
        }
    }
    a
}

/// All words over `{a, b}` of length at most `max_len`.
fn words(max_len: usize) -> Vec<Vec<&'static str>> {
    let mut all = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for w in &frontier {
            for s in SYMBOLS {
                let mut v: Vec<&'static str> = w.clone();
                v.push(s);
                next.push(v);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}

fn assert_same_language(expected: &Automaton, actual: &Automaton) {
    for w in words(MAX_WORD_LEN) {
        assert_eq!(
            expected.accepts(&w),
            actual.accepts(&w),
            "{} and {} disagree on {:?}",
            expected.name(),
            actual.name(),
            w
        );
    }
}

/// Complete DFA for the complement language.
fn complement_of(a: &Automaton) -> Automaton {
    let mut d = a.determinize_with(&DeterminizeConfig::default().with_sink_state(true));
    d.complement().unwrap();
    d
}

// ─── Emptiness and Pruning ─────────────────────────────────────────────────────

#[test]
fn random_emptiness_matches_enumeration() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 5);
        // A shortest accepted word is shorter than the number of states.
        let accepts_some = words(5).iter().any(|w| a.accepts(w));
        assert_eq!(a.is_empty(), !accepts_some);
    }
}

#[test]
fn random_remove_useless_states() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    for _ in 0..ROUNDS {
        let original = random_nfa(&mut rng, "A", 6);
        let mut a = original.clone();
        let removed = a.remove_useless_states();
        assert_eq!(a.num_states() + removed, original.num_states());
        assert_eq!(a.capacity(), a.num_states());
        assert!(a.check_consistency());
        assert_same_language(&original, &a);

        let reachable = a.reachable_states();
        let coreachable = a.coreachable_states();
        for s in a.states() {
            assert!(reachable.contains(s.index()));
            assert!(coreachable.contains(s.index()));
        }
        assert_eq!(a.remove_useless_states(), 0);
    }
}

// ─── Product and Union ─────────────────────────────────────────────────────────

#[test]
fn random_intersection_and_union() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 4);
        let b = random_nfa(&mut rng, "B", 4);
        let both = a.intersect(&b).unwrap();
        let either = a.union(&b).unwrap();
        assert_eq!(both.name(), "A&B");
        assert_eq!(either.name(), "A+B");
        assert!(both.check_consistency());
        assert!(either.check_consistency());
        for w in words(MAX_WORD_LEN) {
            assert_eq!(both.accepts(&w), a.accepts(&w) && b.accepts(&w), "{:?}", w);
            assert_eq!(either.accepts(&w), a.accepts(&w) || b.accepts(&w), "{:?}", w);
        }
    }
}

// ─── Determinization and Minimization ──────────────────────────────────────────

#[test]
fn random_determinize() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 5);
        let d = a.determinize();
        assert!(d.is_deterministic());
        assert_eq!(d.name(), "detA");
        assert_same_language(&a, &d);

        let complete = a.determinize_with(&DeterminizeConfig::default().with_sink_state(true));
        assert!(complete.is_deterministic());
        assert!(complete.is_complete());
        assert_same_language(&a, &complete);
    }
}

#[test]
fn random_minimize() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 5);
        let d = a.determinize();
        let m = d.minimize().unwrap();
        assert!(m.is_deterministic());
        assert!(m.num_states() <= d.num_states());
        assert_same_language(&a, &m);

        let again = m.minimize().unwrap();
        assert_eq!(again.num_states(), m.num_states());
    }
}

#[test]
fn random_minimal_states_are_distinguishable() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 3);
        let m = a.determinize().minimize().unwrap();
        let states: Vec<StateId> = m.states().collect();
        // With the implicit sink, any two inequivalent states differ on a word this short.
        let sample = words(states.len());
        let languages: Vec<Vec<bool>> = states
            .iter()
            .map(|&s| {
                let mut from_s = m.clone();
                for t in m.starts().iter().copied() {
                    from_s.set_start(t, false);
                }
                from_s.set_start(s, true);
                sample.iter().map(|w| from_s.accepts(w)).collect()
            })
            .collect();
        for i in 0..states.len() {
            for j in i + 1..states.len() {
                assert_ne!(
                    languages[i],
                    languages[j],
                    "{} and {} are equivalent in {}",
                    m.state_name(states[i]),
                    m.state_name(states[j]),
                    m.name()
                );
            }
        }
    }
}

#[test]
fn minimal_dfa_size_is_canonical() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    for _ in 0..ROUNDS {
        let mut a = random_nfa(&mut rng, "A", 5);
        a.remove_useless_states();
        let mut b = a.clone();
        b.reduce();
        b.remove_useless_states();

        let ma = a.determinize().minimize().unwrap();
        let mb = b.determinize().minimize().unwrap();
        assert_eq!(ma.num_states(), mb.num_states());
    }
}

#[test]
fn random_count_words() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 4);
        let d = a.determinize();
        for len in 0..=4 {
            let expected = words(len).iter().filter(|w| w.len() == len && a.accepts(w)).count();
            assert_eq!(d.count_words(len).unwrap(), BigUint::from(expected));
        }
    }
}

// ─── Simulation and Reduction ──────────────────────────────────────────────────

#[test]
fn random_preorder_implies_language_inclusion() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 5);
        let preorder = a.preorder();
        for (p, q) in preorder.pairs() {
            // Language of a single state: make it the only start state.
            let from = |s: StateId| {
                let mut c = a.clone();
                for t in a.states() {
                    c.set_start(t, t == s);
                }
                c
            };
            let (lp, lq) = (from(p), from(q));
            for w in words(4) {
                assert!(!lp.accepts(&w) || lq.accepts(&w), "{} <= {} but {:?}", p, q, w);
            }
        }
    }
}

#[test]
fn random_reduce_preserves_language() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for _ in 0..ROUNDS {
        let original = random_nfa(&mut rng, "A", 6);
        let mut a = original.clone();
        let stats = a.reduce();
        assert_eq!(a.num_states() + stats.total(), original.num_states());
        assert!(a.check_consistency());
        assert_same_language(&original, &a);
    }
}

// ─── Antichains ────────────────────────────────────────────────────────────────

#[test]
fn random_universality_matches_complement() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 4);
        let expected = complement_of(&a).is_empty();
        assert_eq!(a.is_universal(&a.preorder()).unwrap(), expected);
        assert_eq!(a.is_universal(&Preorder::identity_for(&a)).unwrap(), expected);
    }
}

#[test]
fn random_universality_of_dense_automata() {
    // Complete automata with mostly final states are often universal.
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut universal = 0;
    for _ in 0..ROUNDS {
        let mut a = random_nfa(&mut rng, "A", 3);
        let ids: Vec<StateId> = a.states().collect();
        for &s in &ids {
            a.set_final(s, rng.random_bool(0.7));
            for sym in 0..SYMBOLS.len() {
                let sym = Symbol::new(sym as u32);
                if a.successors(s, sym).is_empty() {
                    let target = ids[rng.random_range(0..ids.len())];
                    a.add_transition(s, sym, target);
                }
            }
        }
        let expected = complement_of(&a).is_empty();
        let actual = a.is_universal(&a.preorder()).unwrap();
        assert_eq!(actual, expected);
        if actual {
            universal += 1;
            assert!(words(4).iter().all(|w| a.accepts(w)));
        }
    }
    assert!(universal > 0);
}

#[test]
fn random_inclusion_matches_complement() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 4);
        let b = random_nfa(&mut rng, "B", 4);
        let expected = a.intersect(&complement_of(&b)).unwrap().is_empty();

        let preorder = a.inclusion_preorder(&b).unwrap();
        assert_eq!(a.includes(&b, &preorder).unwrap(), expected);

        let identity = Preorder::identity(a.capacity() + b.capacity());
        assert_eq!(a.includes(&b, &identity).unwrap(), expected);

        if expected {
            for w in words(4) {
                assert!(!a.accepts(&w) || b.accepts(&w), "{:?}", w);
            }
        }
    }
}

#[test]
fn inclusion_of_reduced_automaton() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    for _ in 0..ROUNDS {
        let a = random_nfa(&mut rng, "A", 5);
        let mut b = a.clone();
        b.set_name("B");
        b.reduce();
        assert!(a.includes(&b, &a.inclusion_preorder(&b).unwrap()).unwrap());
        assert!(b.includes(&a, &b.inclusion_preorder(&a).unwrap()).unwrap());
    }
}

// ─── Text Format ───────────────────────────────────────────────────────────────

#[test]
fn random_text_roundtrip() {
    let mut rng = ChaCha8Rng::seed_from_u64(14);
    let automata: Vec<Automaton> = (0..10).map(|i| random_nfa(&mut rng, &format!("A{}", i), 5)).collect();
    let text: String = automata.iter().map(|a| a.to_timbuk_string()).collect::<Vec<_>>().join("\n");

    let parsed = parse_automata(&text).unwrap();
    assert_eq!(parsed.len(), automata.len());
    for (a, b) in automata.iter().zip(&parsed) {
        assert_eq!(a.name(), b.name());
        assert_eq!(a.num_states(), b.num_states());
        assert_eq!(a.num_transitions(), b.num_transitions());
        assert_eq!(a.starts().len(), b.starts().len());
        assert_same_language(a, b);
    }
}

// ─── Tracing ───────────────────────────────────────────────────────────────────

#[test]
fn tracers_do_not_change_results() {
    let mut rng = ChaCha8Rng::seed_from_u64(15);
    for _ in 0..20 {
        let a = random_nfa(&mut rng, "A", 4);
        let b = random_nfa(&mut rng, "B", 4);
        let preorder = a.inclusion_preorder(&b).unwrap();

        let mut recorder = Recorder::default();
        assert_eq!(a.is_empty_traced(&mut recorder), a.is_empty());
        assert_eq!(
            a.includes_traced(&b, &preorder, &mut recorder).unwrap(),
            a.includes(&b, &preorder).unwrap()
        );
        assert!(!recorder.messages(Phase::Emptiness).is_empty());

        let mut logged = a.clone();
        let mut plain = a.clone();
        assert_eq!(logged.reduce_traced(&mut LogTracer), plain.reduce());
        assert_eq!(logged.num_states(), plain.num_states());
    }
}
