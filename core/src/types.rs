/// Terminal state of a submitted push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome<T> {
    /// The element was appended to the tail of the queue.
    Committed,
    /// No space opened up within the wait bound; the element is handed back.
    Dropped(T),
}

impl<T> PushOutcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, PushOutcome::Committed)
    }
}

/// Terminal state of a submitted pop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopOutcome<T> {
    /// The head of the queue was removed.
    Committed(T),
    /// No element arrived within the wait bound.
    Dropped,
}

impl<T> PopOutcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, PopOutcome::Committed(_))
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            PopOutcome::Committed(value) => Some(value),
            PopOutcome::Dropped => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    Active = 0,
    Closing = 1,
    Closed = 2,
}

impl Lifecycle {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Lifecycle::Active,
            1 => Lifecycle::Closing,
            _ => Lifecycle::Closed,
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Lifecycle::Active => "active",
            Lifecycle::Closing => "closing",
            Lifecycle::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Outcome counters since the queue was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub pushes_committed: u64,
    pub pushes_dropped: u64,
    pub pops_committed: u64,
    pub pops_dropped: u64,
}

impl QueueStats {
    pub fn committed(&self) -> u64 {
        self.pushes_committed + self.pops_committed
    }

    pub fn dropped(&self) -> u64 {
        self.pushes_dropped + self.pops_dropped
    }
}
