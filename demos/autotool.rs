//! Command-line driver: reads automata from a file or stdin and runs one algorithm.
//!
//! ```bash
//! cargo run --example autotool -- determinize < data/nfa.txt
//! cargo run --example autotool -- --input pair.txt includes --identity
//! cargo run --example autotool -- universal --complement < data/nfa.txt
//! ```
//!
//! Exit status: 2 when two automata have incompatible alphabets, 3 when the
//! input does not parse, 4 when the input holds too few automata for the
//! command, 1 for any other error.

use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use color_eyre::Result;

use nfa_rs::automaton::Automaton;
use nfa_rs::determinize::DeterminizeConfig;
use nfa_rs::error::Error;
use nfa_rs::io::read_automata;
use nfa_rs::preorder::Preorder;
use nfa_rs::trace::{LogTracer, NoTrace, Tracer};

#[derive(Debug, Parser)]
#[command(author, version, about = "Finite automata toolbox")]
struct Cli {
    /// Input file with one or more automata (defaults to stdin).
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Repeat the algorithm for at least this many milliseconds and report the mean time.
    #[arg(long, value_name = "MS", default_value = "0")]
    repeat_ms: u64,

    /// Log every algorithm step at trace level.
    #[arg(long)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether the language is empty
    #[command(alias = "e")]
    Empty,

    /// Remove unreachable and non-coreachable states
    #[command(alias = "n")]
    Useless,

    /// Intersection of the first two automata
    #[command(alias = "p")]
    Product,

    /// Subset construction
    #[command(alias = "d")]
    Determinize {
        /// Add a `fail` sink state to obtain a complete DFA.
        #[arg(long)]
        sink: bool,
    },

    /// Determinize, then minimize with Hopcroft's algorithm
    #[command(alias = "m")]
    Minimize,

    /// Print the simulation preorder
    #[command(alias = "s")]
    Simulation,

    /// Simulation-based state reduction
    #[command(alias = "r")]
    Reduce,

    /// Antichain universality check
    #[command(alias = "u")]
    Universal {
        /// Use the identity relation instead of the simulation preorder.
        #[arg(long)]
        identity: bool,

        /// Check the complement (determinized with a `fail` sink) instead.
        #[arg(long)]
        complement: bool,
    },

    /// Antichain inclusion check `L(A) ⊆ L(B)` of the first two automata
    #[command(alias = "i")]
    Includes {
        /// Use the identity relation instead of the simulation preorder.
        #[arg(long)]
        identity: bool,
    },

    /// Union of the first two automata
    #[command(alias = "o")]
    Union,

    /// complement(determinize((A ∩ B) ∪ C)) of the first three automata
    #[command(alias = "x")]
    Sequence,

    /// Graphviz rendering of the first automaton
    Dot,
}

impl Command {
    fn arity(&self) -> usize {
        match self {
            Command::Product | Command::Includes { .. } | Command::Union => 2,
            Command::Sequence => 3,
            _ => 1,
        }
    }
}

const EXIT_INCOMPATIBLE_ALPHABETS: i32 = 2;
const EXIT_PARSE_ERROR: i32 = 3;
const EXIT_TOO_FEW_AUTOMATA: i32 = 4;

/// Exit status for errors that have one of their own.
fn exit_code(error: &Error) -> Option<i32> {
    match error {
        Error::IncompatibleAlphabets { .. } => Some(EXIT_INCOMPATIBLE_ALPHABETS),
        Error::Parse { .. } => Some(EXIT_PARSE_ERROR),
        _ => None,
    }
}

/// Prints `error` and exits with its own status, or hands it back.
fn exit_on<T>(result: nfa_rs::error::Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => match exit_code(&e) {
            Some(code) => {
                eprintln!("{}", e);
                std::process::exit(code);
            }
            None => Err(e.into()),
        },
    }
}

/// Runs `f` once, or repeatedly for at least `repeat`, returning the last result and the mean duration.
fn timed<T>(repeat: Duration, mut f: impl FnMut() -> Result<T>) -> Result<(T, Duration)> {
    let start = Instant::now();
    let mut runs: u32 = 1;
    let mut result = f()?;
    while start.elapsed() < repeat {
        result = f()?;
        runs += 1;
    }
    Ok((result, start.elapsed() / runs))
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = if cli.trace {
        simplelog::LevelFilter::Trace
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();

    let automata = match &cli.input {
        Some(path) => exit_on(read_automata(File::open(path)?))?,
        None => exit_on(read_automata(std::io::stdin().lock()))?,
    };
    if automata.len() < cli.command.arity() {
        eprintln!(
            "{:?} requires {} automata, got {}",
            cli.command,
            cli.command.arity(),
            automata.len()
        );
        std::process::exit(EXIT_TOO_FEW_AUTOMATA);
    }
    for a in &automata {
        log::info!(
            "Loaded {}: {} states, {} transitions",
            a.name(),
            a.num_states(),
            a.num_transitions()
        );
    }

    let mut tracer: Box<dyn Tracer> = if cli.trace { Box::new(LogTracer) } else { Box::new(NoTrace) };
    let repeat = Duration::from_millis(cli.repeat_ms);
    let a = &automata[0];

    let elapsed = match &cli.command {
        Command::Empty => {
            let (empty, elapsed) = timed(repeat, || Ok(a.is_empty_traced(tracer.as_mut())))?;
            if empty {
                println!("Automaton is empty");
            } else {
                println!("Automaton is not empty");
            }
            elapsed
        }

        Command::Useless => {
            let (result, elapsed) = timed(repeat, || {
                let mut copy = a.clone();
                copy.remove_useless_states_traced(tracer.as_mut());
                Ok(copy)
            })?;
            println!("{}", result);
            elapsed
        }

        Command::Product => {
            let (result, elapsed) = timed(repeat, || Ok(a.intersect_traced(&automata[1], tracer.as_mut())?))?;
            println!("{}", result);
            elapsed
        }

        Command::Determinize { sink } => {
            let config = DeterminizeConfig::default().with_sink_state(*sink);
            let (result, elapsed) = timed(repeat, || Ok(a.determinize_traced(&config, tracer.as_mut())))?;
            println!("{}", result);
            elapsed
        }

        Command::Minimize => {
            let dfa = a.determinize();
            let (result, elapsed) = timed(repeat, || Ok(dfa.minimize_traced(tracer.as_mut())?))?;
            println!("{}", result);
            elapsed
        }

        Command::Simulation => {
            let (preorder, elapsed) = timed(repeat, || Ok(a.preorder_traced(tracer.as_mut())))?;
            println!("{}", preorder.display(a));
            elapsed
        }

        Command::Reduce => {
            let (result, elapsed) = timed(repeat, || {
                let mut copy = a.clone();
                let stats = copy.reduce_traced(tracer.as_mut());
                Ok((copy, stats))
            })?;
            let (reduced, stats) = result;
            println!("{:?}", stats);
            println!("{}", reduced);
            elapsed
        }

        Command::Universal { identity, complement } => {
            let complemented;
            let a = if *complement {
                complemented = complement_of(a)?;
                &complemented
            } else {
                a
            };
            let preorder = if *identity { Preorder::identity_for(a) } else { a.preorder() };
            let (universal, elapsed) = timed(repeat, || Ok(a.is_universal_traced(&preorder, tracer.as_mut())?))?;
            if universal {
                println!("Automaton is universal");
            } else {
                println!("Automaton is not universal");
            }
            elapsed
        }

        Command::Includes { identity } => {
            let b = &automata[1];
            let preorder = if *identity {
                a.alphabet().check_compatible(b.alphabet()).map(|()| Preorder::identity(a.capacity() + b.capacity()))
            } else {
                a.inclusion_preorder(b)
            };
            let preorder = exit_on(preorder)?;
            let (included, elapsed) = timed(repeat, || Ok(a.includes_traced(b, &preorder, tracer.as_mut())?))?;
            if included {
                println!("Inclusion {} <= {} holds", a.name(), b.name());
            } else {
                println!("Inclusion {} <= {} does not hold", a.name(), b.name());
            }
            elapsed
        }

        Command::Union => {
            let (result, elapsed) = timed(repeat, || Ok(a.union(&automata[1])?))?;
            println!("{}", result);
            elapsed
        }

        Command::Sequence => {
            let (result, elapsed) = timed(repeat, || sequence(&automata[0], &automata[1], &automata[2]))?;
            println!("{}", result);
            elapsed
        }

        Command::Dot => {
            print!("{}", a.to_dot()?);
            Duration::ZERO
        }
    };

    log::info!("Algorithm time: {:?} per run", elapsed);
    log::info!("All done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}

/// Complete DFA for the complement of `L(a)`.
fn complement_of(a: &Automaton) -> Result<Automaton> {
    let mut dfa = a.determinize_with(&DeterminizeConfig::default().with_sink_state(true));
    dfa.complement()?;
    Ok(dfa)
}

/// complement(determinize((A ∩ B) ∪ C))
fn sequence(a: &Automaton, b: &Automaton, c: &Automaton) -> Result<Automaton> {
    let product = a.intersect(b)?;
    let union = product.union(c)?;
    complement_of(&union)
}
