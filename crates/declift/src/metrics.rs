//! Lifting metrics through the `metrics` facade.
//!
//! Counters are recorded unconditionally; they cost nothing until a
//! recorder is installed. The CLI installs [`SummaryRecorder`] for
//! `--metrics`.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter,
};
use parking_lot::RwLock;

pub const INSTRUCTIONS_LIFTED: &str = "declift_instructions_lifted_total";
pub const INSTRUCTIONS_DEGRADED: &str = "declift_instructions_degraded_total";
pub const FUNCTIONS_LIFTED: &str = "declift_functions_lifted_total";

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(
        INSTRUCTIONS_LIFTED,
        Unit::Count,
        "Instructions decoded and lifted"
    );
    describe_counter!(
        INSTRUCTIONS_DEGRADED,
        Unit::Count,
        "Instructions lifted as an opaque effect or skipped"
    );
    describe_counter!(FUNCTIONS_LIFTED, Unit::Count, "Functions lifted");
}

/// Record one lifted function.
pub fn record_function(arch: &str, instructions: u64) {
    let labels = [("arch", arch.to_string())];
    counter!(FUNCTIONS_LIFTED, &labels).increment(1);
    counter!(INSTRUCTIONS_LIFTED, &labels).increment(instructions);
}

/// Record one degraded instruction. `reason` is a short error label.
pub fn record_degraded(reason: &'static str) {
    counter!(INSTRUCTIONS_DEGRADED, "reason" => reason).increment(1);
}

#[derive(Default)]
struct CounterStorage {
    values: RwLock<HashMap<String, u64>>,
}

struct SummaryCounter {
    key: String,
    storage: Arc<CounterStorage>,
}

impl metrics::CounterFn for SummaryCounter {
    fn increment(&self, value: u64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        self.storage.values.write().insert(self.key.clone(), value);
    }
}

/// Recorder that keeps counters in memory and prints them at exit.
///
/// Gauges and histograms are not used by the lifter and are dropped.
#[derive(Default)]
pub struct SummaryRecorder {
    counters: Arc<CounterStorage>,
}

impl SummaryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the global recorder.
    ///
    /// Returns `None` if a recorder is already installed.
    #[must_use]
    pub fn install(self) -> Option<SummaryHandle> {
        let counters = Arc::clone(&self.counters);
        metrics::set_global_recorder(self).ok()?;
        Some(SummaryHandle { counters })
    }
}

fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for SummaryRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(SummaryCounter {
            key: key_to_string(key),
            storage: Arc::clone(&self.counters),
        }))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

/// Read access to the counters of an installed [`SummaryRecorder`].
pub struct SummaryHandle {
    counters: Arc<CounterStorage>,
}

impl SummaryHandle {
    /// Counter value by rendered key, e.g. `declift_functions_lifted_total{arch=spu}`.
    #[must_use]
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.counters.values.read().get(key).copied()
    }

    #[must_use]
    pub fn all_counters(&self) -> HashMap<String, u64> {
        self.counters.values.read().clone()
    }

    /// Render all counters, sorted by key.
    #[must_use]
    pub fn render(&self) -> String {
        let counters = self.counters.values.read();
        if counters.is_empty() {
            return "No metrics collected.\n".to_string();
        }
        let mut keys: Vec<_> = counters.keys().collect();
        keys.sort();
        let mut out = String::from("\n## Metrics Summary\n\n### Counters\n");
        for key in keys {
            out.push_str(&format!("  {key}: {}\n", counters[key]));
        }
        out
    }

    pub fn print_summary(&self) {
        print!("{}", self.render());
    }
}
