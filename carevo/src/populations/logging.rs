//! Collection of per-generation statistics.
//!
//! A [`Population`] reports to a [`StatsRecorder`] after
//! every successful generation transition. The recorded
//! data sets are named by the constants in this module,
//! plus one `topology-trends/<inputs>-<hidden>` count for
//! each topology present in the evaluated generation.
//!
//! [`Population`]: crate::Population
use ahash::RandomState;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Highest fitness of a generation.
pub const MAX_FITNESS: &str = "max-fitness";
/// Lowest fitness of a generation.
pub const MIN_FITNESS: &str = "min-fitness";
/// Mean fitness of a generation.
pub const AVG_FITNESS: &str = "avg-fitness";
/// Prefix of the per-topology network counts.
pub const TOPOLOGY_TRENDS: &str = "topology-trends";

/// A sink for named numeric data points.
pub trait StatsRecorder: Send {
    /// Appends `value` to the data set called `name`.
    fn record(&mut self, name: &str, value: f32);
}

/// Shared recorders let the caller read
/// the data while the population holds it.
impl<R: StatsRecorder> StatsRecorder for Arc<Mutex<R>> {
    fn record(&mut self, name: &str, value: f32) {
        let mut recorder = match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        recorder.record(name, value);
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a
    /// sequence, or `None` if it is empty.
    ///
    /// # Examples
    /// ```
    /// use carevo::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied()).unwrap();
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// assert!(Stats::from(std::iter::empty()).is_none());
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Option<Stats> {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return None;
        }
        data.sort_by(f32::total_cmp);

        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Some(Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f32>() / data.len() as f32,
            median,
        })
    }
}

/// An in-memory log of every recorded data set,
/// in recording order.
#[derive(Clone, Debug, Default)]
pub struct EvolutionLogger {
    series: HashMap<String, Vec<f32>, RandomState>,
}

impl EvolutionLogger {
    /// Creates an empty logger.
    pub fn new() -> EvolutionLogger {
        EvolutionLogger::default()
    }

    /// Returns the values recorded under `name`.
    pub fn series(&self, name: &str) -> Option<&[f32]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Returns the last value recorded under `name`.
    pub fn latest(&self, name: &str) -> Option<f32> {
        self.series.get(name).and_then(|s| s.last().copied())
    }

    /// Summarizes the values recorded under `name`.
    pub fn stats(&self, name: &str) -> Option<Stats> {
        self.series
            .get(name)
            .and_then(|s| Stats::from(s.iter().copied()))
    }

    /// Returns the names of all data sets, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.series.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Removes all recorded data.
    pub fn clear(&mut self) {
        self.series.clear();
    }
}

impl StatsRecorder for EvolutionLogger {
    fn record(&mut self, name: &str, value: f32) {
        match self.series.get_mut(name) {
            Some(series) => series.push(value),
            None => {
                self.series.insert(name.to_owned(), vec![value]);
            }
        }
    }
}

impl fmt::Display for EvolutionLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EvolutionLogger {{")?;
        for name in self.names() {
            if let Some(stats) = self.stats(name) {
                writeln!(f, "\t{}: {:?}", name, stats)?;
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_length_median() {
        let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied()).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.minimum, 1.0);
        assert_eq!(stats.maximum, 4.0);
    }

    #[test]
    fn logger_keeps_series_in_order() {
        let mut logger = EvolutionLogger::new();
        logger.record(MAX_FITNESS, 1.0);
        logger.record(MIN_FITNESS, 0.0);
        logger.record(MAX_FITNESS, 3.0);

        assert_eq!(logger.series(MAX_FITNESS), Some(&[1.0, 3.0][..]));
        assert_eq!(logger.latest(MAX_FITNESS), Some(3.0));
        assert_eq!(logger.names(), vec![MAX_FITNESS, MIN_FITNESS]);
        assert_eq!(logger.stats(MAX_FITNESS).unwrap().mean, 2.0);
        assert!(logger.series(AVG_FITNESS).is_none());

        logger.clear();
        assert!(logger.names().is_empty());
    }

    #[test]
    fn shared_logger_records() {
        let shared = Arc::new(Mutex::new(EvolutionLogger::new()));
        let mut handle = Arc::clone(&shared);
        handle.record(AVG_FITNESS, 0.5);
        assert_eq!(shared.lock().unwrap().latest(AVG_FITNESS), Some(0.5));
    }

    #[test]
    fn display_lists_every_series() {
        let mut logger = EvolutionLogger::new();
        logger.record("a", 1.0);
        logger.record("b", 2.0);
        let text = logger.to_string();
        assert!(text.contains("\ta: "));
        assert!(text.contains("\tb: "));
    }
}
