use num_bigint::BigUint;

use crate::automaton::Automaton;
use crate::error::Result;

impl Automaton {
    /// Returns the number of accepted words of exactly `length` symbols.
    ///
    /// Counts accepting runs, which coincide with accepted words only for a
    /// deterministic automaton; fails with
    /// [`Error::NotDeterministic`](crate::error::Error::NotDeterministic)
    /// otherwise. Determinize first to count the words of an NFA.
    pub fn count_words(&self, length: usize) -> Result<BigUint> {
        self.check_deterministic()?;

        let mut runs: Vec<BigUint> = vec![BigUint::ZERO; self.capacity()];
        for &s in self.starts() {
            runs[s.index()] = BigUint::from(1u32);
        }

        for _ in 0..length {
            let mut next: Vec<BigUint> = vec![BigUint::ZERO; self.capacity()];
            for s in self.states() {
                let count = &runs[s.index()];
                if *count == BigUint::ZERO {
                    continue;
                }
                for (_, t) in self.state(s).transitions() {
                    next[t.index()] += count;
                }
            }
            runs = next;
        }

        Ok(self.finals().iter().map(|s| &runs[s.index()]).sum())
    }
}
