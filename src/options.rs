/// Knobs for a single [`Puzzle::solve_with`](crate::Puzzle::solve_with) call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SolverOptions {
    pub(crate) hypotheses: bool,
    pub(crate) record_transitions: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            hypotheses: true,
            record_transitions: true,
        }
    }
}

impl SolverOptions {
    /// Whether to fall back to one-step hypothesis testing once propagation stalls. On by default.
    pub fn with_hypotheses(mut self, enabled: bool) -> Self {
        self.hypotheses = enabled;
        self
    }

    /// Whether to keep a [`Transition`](crate::Transition) log while solving. On by default.
    pub fn with_transitions(mut self, enabled: bool) -> Self {
        self.record_transitions = enabled;
        self
    }
}

/// Counters describing how much work a solve took.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Statistics {
    /// Full passes over the active constraints, across every propagation.
    pub sweeps: usize,
    /// Trial assignments applied.
    pub hypotheses_tried: usize,
    /// Trial assignments that led to a contradiction.
    pub hypotheses_rejected: usize,
    /// Trial assignments committed as the only consistent option.
    pub hypotheses_kept: usize,
}
