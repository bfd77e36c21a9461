use std::fmt;

/// Lifecycle state of a [`Cursor`](super::Cursor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Undecoded documents remain in the local batch
    Active,

    /// Local batch drained; the server may still hold more
    PendingFetch,

    /// Server reported the cursor exhausted
    Exhausted,

    /// A failure was recorded; iteration is over
    Failed,

    /// `close` has been called
    Terminated,
}

impl CursorState {
    /// Whether `next` can still yield documents from this state
    pub fn can_yield(&self) -> bool {
        matches!(self, CursorState::Active | CursorState::PendingFetch)
    }
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CursorState::Active => "active",
            CursorState::PendingFetch => "pending-fetch",
            CursorState::Exhausted => "exhausted",
            CursorState::Failed => "failed",
            CursorState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
