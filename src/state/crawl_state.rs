use std::fmt;

/// Lifecycle of a crawl run
///
/// `Idle` is the state before the first run and after a run that stopped
/// because its step budget ran out. `Drained` and `Interrupted` are the two
/// ways a run can end early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlState {
    #[default]
    Idle,
    Running,
    /// No pending pages were left
    Drained,
    /// Stopped by a cancellation request; committed state is intact
    Interrupted,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Drained => "drained",
            Self::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}
