use std::fmt::{Display, Formatter};

/// Handle of a state inside the arena of its owning [`Automaton`][crate::automaton::Automaton].
///
/// Handles are plain indices: they stay valid while states are added, merged or
/// tombstoned, and are invalidated only by [`compact`][crate::automaton::Automaton::compact]
/// (and by the operations documented as compacting).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(u32);

impl StateId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the arena index of the state.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Return the internal representation of the handle.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Shift the handle by `offset` slots.
    pub(crate) const fn offset(self, offset: usize) -> Self {
        Self(self.0 + offset as u32)
    }
}

impl From<usize> for StateId {
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}

impl From<StateId> for usize {
    fn from(id: StateId) -> Self {
        id.index()
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}
