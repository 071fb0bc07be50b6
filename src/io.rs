//! Reading and writing automata in the Timbuk-style text format.
//!
//! # Format
//!
//! ```text
//! Ops a:1 b:1 x:0
//!
//! Automaton A
//! States p q r
//! Final States r
//! Transitions
//! x -> p
//! a(p) -> q
//! b(q) -> r
//! ```
//!
//! - `Ops` declares symbols as `name:arity`; only arity-1 symbols form the
//!   alphabet, the rest are ignored. A new `Ops` section starts a new
//!   alphabet; an `Automaton` directly after a transition section reuses the
//!   previous one.
//! - State names may carry a `:<arity>` suffix, which is stripped.
//! - In the transition section, `a(p) -> q` declares `p --a--> q`, while a
//!   bare token followed by an arrow (`x -> p`) marks `p` as a start state.
//!   The arrow may be attached to its neighbours (`a(p)->q`).
//! - Several automata may follow each other in one stream. The stream must
//!   end inside a transition section.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::types::Alphabet;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Section {
    Start,
    Ops,
    Name,
    States,
    Final,
    FinalStates,
    Transitions,
}

/// Strips a trailing `:<digits>` arity annotation from a state name.
fn strip_arity(token: &str) -> &str {
    match token.rsplit_once(':') {
        Some((name, arity)) if !name.is_empty() && !arity.is_empty() && arity.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => token,
    }
}

fn tokens(input: &str) -> impl Iterator<Item = (usize, String)> + '_ {
    input.lines().enumerate().flat_map(|(i, line)| {
        line.replace("->", " -> ")
            .split_whitespace()
            .map(|t| (i + 1, t.to_string()))
            .collect::<Vec<_>>()
    })
}

/// A transition-section entry being assembled from its three tokens.
#[derive(Debug, Default)]
struct PendingTransition {
    left: Option<String>,
    arrow: bool,
}

/// Parses every automaton in the stream.
pub fn parse_automata(input: &str) -> Result<Vec<Automaton>> {
    let mut automata: Vec<Automaton> = Vec::new();
    let mut section = Section::Start;
    let mut symbols: Vec<String> = Vec::new();
    let mut named = false;
    let mut pending = PendingTransition::default();
    let mut last_line = 0;

    for (line, token) in tokens(input) {
        last_line = line;
        let in_transition = pending.left.is_some();

        match (token.as_str(), section) {
            ("Ops", Section::Start | Section::Transitions) if !in_transition => {
                symbols.clear();
                section = Section::Ops;
                continue;
            }
            ("Automaton", Section::Ops | Section::Transitions) if !in_transition => {
                section = Section::Name;
                named = false;
                continue;
            }
            ("States", Section::Name) if named => {
                section = Section::States;
                continue;
            }
            ("Final", Section::States) => {
                section = Section::Final;
                continue;
            }
            ("States", Section::Final) => {
                section = Section::FinalStates;
                continue;
            }
            ("Transitions", Section::FinalStates) => {
                section = Section::Transitions;
                continue;
            }
            _ => {}
        }

        match section {
            Section::Start => {
                return Err(Error::parse(line, format!("expected `Ops`, found `{}`", token)));
            }
            Section::Ops => {
                let Some((name, arity)) = token.rsplit_once(':') else {
                    return Err(Error::parse(line, format!("expected `symbol:arity`, found `{}`", token)));
                };
                if arity == "1" {
                    symbols.push(name.to_string());
                }
            }
            Section::Name => {
                if named {
                    return Err(Error::parse(line, format!("expected `States`, found `{}`", token)));
                }
                automata.push(Automaton::new(token, Alphabet::new(symbols.iter().cloned())));
                named = true;
            }
            Section::States => {
                let automaton = current(&mut automata, line)?;
                let name = strip_arity(&token);
                if automaton.find_state(name).is_some() {
                    return Err(Error::parse(line, format!("duplicate state `{}`", name)));
                }
                automaton.add_state(name);
            }
            Section::Final => {
                return Err(Error::parse(line, format!("expected `States` after `Final`, found `{}`", token)));
            }
            Section::FinalStates => {
                let automaton = current(&mut automata, line)?;
                let name = strip_arity(&token);
                let id = automaton
                    .find_state(name)
                    .ok_or_else(|| Error::parse(line, format!("unknown final state `{}`", name)))?;
                automaton.set_final(id, true);
            }
            Section::Transitions => {
                let automaton = current(&mut automata, line)?;
                match pending.left.take() {
                    None => {
                        if token == "->" {
                            return Err(Error::parse(line, "unexpected `->`"));
                        }
                        pending.left = Some(token);
                    }
                    Some(left) if !pending.arrow => {
                        if token != "->" {
                            return Err(Error::parse(line, format!("expected `->` after `{}`, found `{}`", left, token)));
                        }
                        pending.left = Some(left);
                        pending.arrow = true;
                    }
                    Some(left) => {
                        pending.arrow = false;
                        add_transition(automaton, line, &left, strip_arity(&token))?;
                    }
                }
            }
        }
    }

    if section != Section::Transitions || pending.left.is_some() {
        return Err(Error::parse(last_line, "unexpected end of input, expected a complete transition section"));
    }
    debug!("parse_automata: {} automata", automata.len());
    Ok(automata)
}

fn current(automata: &mut [Automaton], line: usize) -> Result<&mut Automaton> {
    automata
        .last_mut()
        .ok_or_else(|| Error::parse(line, "no automaton declared"))
}

/// Applies `left -> target` to the automaton: either `a(p) -> q` or a start marker `x -> p`.
fn add_transition(automaton: &mut Automaton, line: usize, left: &str, target: &str) -> Result<()> {
    let target_id = automaton
        .find_state(target)
        .ok_or_else(|| Error::parse(line, format!("unknown state `{}`", target)))?;

    let Some((symbol, rest)) = left.split_once('(') else {
        automaton.set_start(target_id, true);
        return Ok(());
    };
    let source = rest
        .strip_suffix(')')
        .ok_or_else(|| Error::parse(line, format!("unbalanced parenthesis in `{}`", left)))?;
    let source = strip_arity(source);
    let source_id = automaton
        .find_state(source)
        .ok_or_else(|| Error::parse(line, format!("unknown state `{}`", source)))?;
    let symbol = automaton
        .alphabet()
        .index_of(symbol)
        .ok_or_else(|| Error::parse(line, format!("unknown symbol `{}`", symbol)))?;
    automaton.add_transition(source_id, symbol, target_id);
    Ok(())
}

/// Reads every automaton from a reader (for example stdin).
pub fn read_automata<R: Read>(mut reader: R) -> Result<Vec<Automaton>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_automata(&content)
}

/// Reads every automaton from a file.
pub fn load_automata<P: AsRef<Path>>(path: P) -> Result<Vec<Automaton>> {
    let content = fs::read_to_string(path)?;
    parse_automata(&content)
}

impl Automaton {
    /// Parses the first automaton of a stream.
    ///
    /// # Example
    ///
    /// ```
    /// use nfa_rs::automaton::Automaton;
    ///
    /// let a = Automaton::from_timbuk_str("Ops a:1 x:0 Automaton A States p q Final States q Transitions x -> p a(p)->q").unwrap();
    /// assert!(a.accepts(&["a"]));
    /// ```
    pub fn from_timbuk_str(input: &str) -> Result<Self> {
        parse_automata(input)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::parse(0, "no automaton in input"))
    }

    /// Loads the first automaton from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_timbuk_str(&content)
    }

    /// Saves the automaton in the text format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_timbuk_string())?;
        Ok(())
    }

    /// Renders the automaton in the text format read by [`parse_automata`].
    pub fn to_timbuk_string(&self) -> String {
        Timbuk(self).to_string()
    }

    /// Nullary symbol used for start markers, distinct from every alphabet symbol.
    fn start_marker(&self) -> String {
        let mut marker = String::from("x");
        let mut i = 0;
        while self.alphabet().contains(&marker) {
            marker = format!("x{}", i);
            i += 1;
        }
        marker
    }
}

struct Timbuk<'a>(&'a Automaton);

impl fmt::Display for Timbuk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        let marker = a.start_marker();

        write!(f, "Ops")?;
        for name in a.alphabet().names() {
            write!(f, " {}:1", name)?;
        }
        writeln!(f, " {}:0", marker)?;
        writeln!(f)?;
        writeln!(f, "Automaton {}", a.name())?;
        write!(f, "States")?;
        for s in a.states() {
            write!(f, " {}", a.state_name(s))?;
        }
        writeln!(f)?;
        write!(f, "Final States")?;
        for &s in a.finals() {
            write!(f, " {}", a.state_name(s))?;
        }
        writeln!(f)?;
        writeln!(f, "Transitions")?;
        for &s in a.starts() {
            writeln!(f, "{} -> {}", marker, a.state_name(s))?;
        }
        for s in a.states() {
            for (symbol, t) in a.state(s).transitions() {
                writeln!(f, "{}({}) -> {}", a.alphabet().name(symbol), a.state_name(s), a.state_name(t))?;
            }
        }
        Ok(())
    }
}

/// Result dump: state set `Q`, alphabet `A`, transitions `r`, start set `s`, final set `F`.
impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn set<'a>(f: &mut fmt::Formatter<'_>, label: &str, items: impl Iterator<Item = String> + 'a) -> fmt::Result {
            let items: Vec<String> = items.collect();
            writeln!(f, "{} = {{{}}}", label, items.join(", "))
        }

        writeln!(f, "Automaton {}", self.name())?;
        set(f, "Q", self.states().map(|s| self.state_name(s).to_string()))?;
        set(f, "A", self.alphabet().names().iter().cloned())?;
        set(
            f,
            "r",
            self.states().flat_map(|s| {
                self.state(s).transitions().map(move |(a, t)| {
                    format!("{}({})->{}", self.state_name(s), self.alphabet().name(a), self.state_name(t))
                })
            }),
        )?;
        set(f, "s", self.starts().iter().map(|&s| self.state_name(s).to_string()))?;
        set(f, "F", self.finals().iter().map(|&s| self.state_name(s).to_string()))
    }
}
