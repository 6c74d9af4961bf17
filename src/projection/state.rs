//! Running totals carried from one period to the next during a projection

/// Accumulated state of a single projection run
///
/// Lives only for the duration of one `project` call; nothing survives
/// between calls.
#[derive(Debug, Clone, Default)]
pub struct ProjectionState {
    /// Last period recorded (0-indexed)
    pub period: u32,

    /// Sum of risk-adjusted revenue to date, full precision
    pub cumulative_revenue: f64,

    /// Sum of period costs to date, full precision
    pub cumulative_cost: f64,

    /// First period whose cumulative profit was strictly positive
    pub break_even: Option<u32>,
}

impl ProjectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one period's figures into the running totals
    pub fn record(&mut self, period: u32, revenue: f64, cost: f64) {
        self.period = period;
        self.cumulative_revenue += revenue;
        self.cumulative_cost += cost;

        if self.break_even.is_none() && self.cumulative_profit() > 0.0 {
            self.break_even = Some(period);
        }
    }

    pub fn cumulative_profit(&self) -> f64 {
        self.cumulative_revenue - self.cumulative_cost
    }
}
