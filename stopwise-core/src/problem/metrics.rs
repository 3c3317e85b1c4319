//! Comparative solution metrics and their CSV export.

use std::io;

use serde::{Deserialize, Serialize};

/// Metric label used for totals obtained from live road routes.
pub const LIVE_ROUTE_METRIC: &str = "live_route";

/// CSV field separator used by [`MetricsReport::write_csv`].
pub const CSV_DELIMITER: u8 = b';';

/// Total cost of one solution under one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Problem name.
    pub problem: String,
    /// Solution name.
    pub solution: String,
    /// Matrix name, or [`LIVE_ROUTE_METRIC`].
    pub metric: String,
    /// Sum of route costs; `+∞` when a leg is unreachable.
    pub total: f64,
    /// Fractional saving against the baseline on the same metric.
    pub improvement: f64,
}

/// `(baseline - candidate) / baseline`, or zero when undefined.
///
/// The ratio is undefined without a baseline, or when the baseline total is
/// zero or not finite.
#[must_use]
pub fn improvement(candidate: f64, baseline: Option<f64>) -> f64 {
    match baseline {
        Some(base) if base.is_finite() && base != 0.0 => (base - candidate) / base,
        _ => 0.0,
    }
}

/// Metric records accumulated across problems.
///
/// # Examples
///
/// ```
/// use stopwise_core::{MetricRecord, MetricsReport};
///
/// let mut report = MetricsReport::new();
/// report.push(MetricRecord {
///     problem: "ghent".into(),
///     solution: "optimal".into(),
///     metric: "geodesic".into(),
///     total: 1200.5,
///     improvement: 0.25,
/// });
/// let mut out = Vec::new();
/// report.write_csv(&mut out)?;
/// let text = String::from_utf8(out)?;
/// assert!(text.starts_with("problem;solution;metric;total;improvement\n"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsReport {
    records: Vec<MetricRecord>,
}

impl MetricsReport {
    /// An empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record.
    pub fn push(&mut self, record: MetricRecord) {
        self.records.push(record);
    }

    /// Records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// Whether the report is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write a header and one row per record, `;`-separated.
    ///
    /// # Errors
    ///
    /// Returns any serialisation or IO error from the CSV writer.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(CSV_DELIMITER)
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(["problem", "solution", "metric", "total", "improvement"])?;
        for record in &self.records {
            csv.serialize(record)?;
        }
        csv.flush()?;
        Ok(())
    }
}

impl Extend<MetricRecord> for MetricsReport {
    fn extend<I: IntoIterator<Item = MetricRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl FromIterator<MetricRecord> for MetricsReport {
    fn from_iter<I: IntoIterator<Item = MetricRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
