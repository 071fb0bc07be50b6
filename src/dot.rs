//! Automaton to DOT (Graphviz) conversion.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **States** are circles labelled with their names; **final states** are double circles
//! - **Start states** get an incoming arrow from an invisible point node
//! - **Transitions** are directed edges labelled with their symbol; parallel
//!   edges between the same pair of states are merged into one edge with a
//!   comma-separated label unless configured otherwise
//!
//! # Examples
//!
//! ```
//! use nfa_rs::automaton::Automaton;
//!
//! let a = Automaton::from_parts("A", ["a", "b"], ["p", "q"], ["p"], ["q"], [("p", "a", "q"), ("p", "b", "q")]).unwrap();
//! let dot = a.to_dot().unwrap();
//! assert!(dot.contains("\"p\" -> \"q\" [label=\"a,b\"];"));
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeMap;

use crate::automaton::Automaton;
use crate::reference::StateId;

/// Configuration options for DOT output generation.
///
/// ```
/// use nfa_rs::dot::DotConfig;
///
/// let config = DotConfig::default().with_rankdir("TB").with_merge_parallel_edges(false);
/// assert_eq!(config.rankdir, "TB");
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for non-final states (default: "circle")
    pub state_shape: &'static str,
    /// Shape for final states (default: "doublecircle")
    pub final_shape: &'static str,
    /// Layout direction (default: "LR")
    pub rankdir: &'static str,
    /// Merge edges between the same pair of states into one labelled edge (default: true)
    pub merge_parallel_edges: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "circle",
            final_shape: "doublecircle",
            rankdir: "LR",
            merge_parallel_edges: true,
        }
    }
}

impl DotConfig {
    pub fn with_state_shape(mut self, shape: &'static str) -> Self {
        self.state_shape = shape;
        self
    }

    pub fn with_final_shape(mut self, shape: &'static str) -> Self {
        self.final_shape = shape;
        self
    }

    pub fn with_rankdir(mut self, rankdir: &'static str) -> Self {
        self.rankdir = rankdir;
        self
    }

    pub fn with_merge_parallel_edges(mut self, merge: bool) -> Self {
        self.merge_parallel_edges = merge;
        self
    }
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Automaton {
    /// Converts the automaton to DOT format with the default configuration.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the automaton to DOT format.
    ///
    /// Tombstoned states are skipped. States are emitted as `"name"` nodes;
    /// should two live states share a name, their handles are appended to keep
    /// the nodes apart.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let node = |s: StateId| {
            let name = self.state_name(s);
            let shared = self.states().filter(|&t| self.state_name(t) == name).count() > 1;
            if shared {
                format!("\"{}{}\"", escape(name), s)
            } else {
                format!("\"{}\"", escape(name))
            }
        };

        let mut dot = String::new();
        writeln!(dot, "digraph \"{}\" {{", escape(self.name()))?;
        writeln!(dot, "rankdir={};", config.rankdir)?;
        writeln!(dot, "node [shape={}];", config.state_shape)?;

        for s in self.states() {
            let shape = if self.is_final(s) { config.final_shape } else { config.state_shape };
            writeln!(dot, "{} [shape={}, label=\"{}\"];", node(s), shape, escape(self.state_name(s)))?;
        }

        for (i, &s) in self.starts().iter().enumerate() {
            writeln!(dot, "start{} [shape=point, style=invis];", i)?;
            writeln!(dot, "start{} -> {};", i, node(s))?;
        }

        for s in self.states() {
            if config.merge_parallel_edges {
                let mut labels: BTreeMap<StateId, Vec<&str>> = BTreeMap::new();
                for (a, t) in self.state(s).transitions() {
                    labels.entry(t).or_default().push(self.alphabet().name(a));
                }
                for (t, symbols) in labels {
                    writeln!(dot, "{} -> {} [label=\"{}\"];", node(s), node(t), escape(&symbols.join(",")))?;
                }
            } else {
                for (a, t) in self.state(s).transitions() {
                    writeln!(
                        dot,
                        "{} -> {} [label=\"{}\"];",
                        node(s),
                        node(t),
                        escape(self.alphabet().name(a))
                    )?;
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Automaton {
        Automaton::from_parts(
            "A",
            ["a", "b"],
            ["p", "q"],
            ["p"],
            ["q"],
            [("p", "a", "q"), ("p", "b", "q"), ("q", "a", "q")],
        )
        .unwrap()
    }

    #[test]
    fn test_to_dot_basic() {
        let dot = sample().to_dot().unwrap();
        assert!(dot.starts_with("digraph \"A\" {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("\"q\" [shape=doublecircle, label=\"q\"];"));
        assert!(dot.contains("start0 -> \"p\";"));
        assert!(dot.contains("\"p\" -> \"q\" [label=\"a,b\"];"));
    }

    #[test]
    fn test_to_dot_unmerged_edges() {
        let config = DotConfig::default().with_merge_parallel_edges(false);
        let dot = sample().to_dot_with_config(&config).unwrap();
        assert!(dot.contains("\"p\" -> \"q\" [label=\"a\"];"));
        assert!(dot.contains("\"p\" -> \"q\" [label=\"b\"];"));
    }

    #[test]
    fn test_to_dot_shared_names() {
        let mut a = Automaton::new("A", crate::types::Alphabet::new(["a"]));
        let p0 = a.add_state("p");
        let p1 = a.add_state("p");
        a.set_start(p0, true);
        let dot = a.to_dot().unwrap();
        assert!(dot.contains(&format!("\"p{}\"", p0)));
        assert!(dot.contains(&format!("\"p{}\"", p1)));
    }

    /// Helper test to write DOT file for manual inspection (disabled by default)
    #[test]
    #[ignore]
    fn test_write_dot_file() {
        let dot = sample().determinize().to_dot().unwrap();
        std::fs::write("test_output.dot", &dot).unwrap();
        println!("DOT output:\n{}", dot);
    }
}
