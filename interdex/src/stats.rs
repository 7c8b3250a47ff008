use crate::helpe::*;

pub const METRIC_COLD_START_SET_DEX_COUNT: &str = "num_cold_start_set_dexes";
pub const METRIC_SCROLL_SET_DEX_COUNT: &str = "num_scroll_dexes";
pub const METRIC_OVER_BUDGET_DEX_COUNT: &str = "num_over_budget_dexes";
pub const METRIC_PRUNED_CLASS_COUNT: &str = "num_pruned_classes";

/// Receives the pass's counters. Transport is somebody else's problem.
pub trait MetricsSink {
    fn set_metric(&mut self, key: &str, value: u64);
}

impl MetricsSink for HashMap<String, u64> {
    fn set_metric(&mut self, key: &str, value: u64) {
        self.insert(key.to_string(), value);
    }
}

impl MetricsSink for BTreeMap<String, u64> {
    fn set_metric(&mut self, key: &str, value: u64) {
        self.insert(key.to_string(), value);
    }
}

/// Placement statistics, updated as dexes close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackingStats {
    /// Dexes made up entirely of coldstart classes.
    pub coldstart_dexes:    usize,
    /// Dexes made up entirely of scroll classes.
    pub scroll_dexes:       usize,
    pub dexes:              usize,
    pub mixed_mode_dexes:   usize,
    pub canaries:           usize,
    pub over_budget_dexes:  usize,
    pub pruned_classes:     usize,
    /// Companion classes injected by plugins.
    pub injected_classes:   usize,
}

impl PackingStats {
    /// Accounts for a freshly closed dex.
    pub fn record_dex(&mut self, dex: &Dex) {
        self.dexes += 1;
        if dex.all_labeled(PriorityLabel::Coldstart) { self.coldstart_dexes += 1; }
        if dex.all_labeled(PriorityLabel::Scroll) { self.scroll_dexes += 1; }
        if dex.is_mixed_mode() { self.mixed_mode_dexes += 1; }
        if dex.canary().is_some() { self.canaries += 1; }
        if dex.is_over_budget() { self.over_budget_dexes += 1; }
    }

    pub fn merge(&mut self, other: &Self) {
        self.coldstart_dexes += other.coldstart_dexes;
        self.scroll_dexes += other.scroll_dexes;
        self.dexes += other.dexes;
        self.mixed_mode_dexes += other.mixed_mode_dexes;
        self.canaries += other.canaries;
        self.over_budget_dexes += other.over_budget_dexes;
        self.pruned_classes += other.pruned_classes;
        self.injected_classes += other.injected_classes;
    }

    pub fn report(&self, sink: &mut dyn MetricsSink) {
        sink.set_metric(METRIC_COLD_START_SET_DEX_COUNT, self.coldstart_dexes as u64);
        sink.set_metric(METRIC_SCROLL_SET_DEX_COUNT, self.scroll_dexes as u64);
        sink.set_metric(METRIC_OVER_BUDGET_DEX_COUNT, self.over_budget_dexes as u64);
        sink.set_metric(METRIC_PRUNED_CLASS_COUNT, self.pruned_classes as u64);
    }
}
