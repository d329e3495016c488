use serde::{Deserialize, Serialize};

/// Identifier of one benchmark configuration, taken from where the record came from
/// (the result file stem), never from its contents.
pub type Case = String;

/// Normalized measurements of one case in one run.
///
/// Bandwidth is always MiB/s. Unit conversion happens once, when a record is normalized.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricTriple {
    pub bandwidth: f64,
    pub throughput: f64,
    pub cpu_percent: f64,
}

impl MetricTriple {
    /// Builds a triple, clamping negative and non-finite inputs to zero.
    pub fn new(bandwidth: f64, throughput: f64, cpu_percent: f64) -> Self {
        Self {
            bandwidth: non_negative(bandwidth),
            throughput: non_negative(throughput),
            cpu_percent: non_negative(cpu_percent),
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Bandwidth => self.bandwidth,
            Metric::Throughput => self.throughput,
            Metric::Cpu => self.cpu_percent,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Anything that can be reduced to a [`MetricTriple`].
pub trait Record {
    fn metrics(&self) -> MetricTriple;
}

impl Record for MetricTriple {
    fn metrics(&self) -> MetricTriple {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Bandwidth,
    Throughput,
    Cpu,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Bandwidth, Metric::Throughput, Metric::Cpu];

    /// Axis label used on charts
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Bandwidth => "Bandwidth (MiB/s)",
            Metric::Throughput => "IOPS",
            Metric::Cpu => "CPU usage (%)",
        }
    }

    /// Human name used in chart titles
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Bandwidth => "Bandwidth",
            Metric::Throughput => "IOPS",
            Metric::Cpu => "CPU usage",
        }
    }

    /// Output file stem, ie. `bandwidth` for `bandwidth.svg`
    pub fn filename(&self) -> &'static str {
        match self {
            Metric::Bandwidth => "bandwidth",
            Metric::Throughput => "iops",
            Metric::Cpu => "cpu_usage",
        }
    }
}
