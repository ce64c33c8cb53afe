use std::ops::Deref;

use serde_json::Value;

/// Activity count per day. Index 0 is the oldest day of the range, the last index is today.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DailyCounts(Vec<u64>);

impl DailyCounts {
    pub fn zeroed(days: usize) -> Self {
        Self(vec![0; days])
    }

    /// Pads with zeros or truncates so that exactly `days` entries remain.
    pub fn normalized(mut self, days: usize) -> Self {
        self.0.resize(days, 0);
        self
    }

    /// Sum of all days, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    pub fn max(&self) -> u64 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    pub(crate) fn add(&mut self, index: usize, count: u64) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot += count;
        }
    }

    /// Reads counts back from their persisted json form. Any entry that isn't a whole
    /// non-negative number a log could have produced (at most `i64::MAX`) invalidates the whole
    /// sequence.
    pub fn from_json(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        items
            .iter()
            .map(coerce_count)
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    pub fn to_json(&self) -> Value {
        Value::from(self.0.clone())
    }
}

const MAX_COUNT: u64 = i64::MAX as u64;

fn coerce_count(value: &Value) -> Option<u64> {
    if let Some(v) = value.as_u64() {
        return (v <= MAX_COUNT).then_some(v);
    }
    // Counts written by other tools may come back as 5.0.
    value
        .as_f64()
        .filter(|v| *v >= 0. && v.fract() == 0. && *v < MAX_COUNT as f64)
        .map(|v| v as u64)
}

impl From<Vec<u64>> for DailyCounts {
    fn from(value: Vec<u64>) -> Self {
        Self(value)
    }
}

impl Deref for DailyCounts {
    type Target = [u64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod counts_tests {
    use serde_json::json;

    use super::DailyCounts;

    #[test]
    fn test_normalized() {
        let counts = DailyCounts::from(vec![1, 2, 3]);
        assert_eq!(*counts.clone().normalized(5), [1, 2, 3, 0, 0]);
        assert_eq!(*counts.normalized(2), [1, 2]);
    }

    #[test]
    fn test_from_json_coercion() {
        assert_eq!(
            DailyCounts::from_json(&json!([1, 2.0, 0])),
            Some(DailyCounts::from(vec![1, 2, 0]))
        );
        assert_eq!(DailyCounts::from_json(&json!([1, "2"])), None);
        assert_eq!(DailyCounts::from_json(&json!([1, -2])), None);
        assert_eq!(DailyCounts::from_json(&json!([1.5])), None);
        assert_eq!(DailyCounts::from_json(&json!("1,2")), None);
        assert_eq!(DailyCounts::from_json(&json!([u64::MAX, 1])), None);
        assert_eq!(DailyCounts::from_json(&json!([1e300])), None);
    }

    #[test]
    fn test_total_and_max() {
        let counts = DailyCounts::from(vec![4, 0, 9]);
        assert_eq!(counts.total(), 13);
        assert_eq!(counts.max(), 9);
        assert_eq!(DailyCounts::zeroed(0).max(), 0);
        assert_eq!(DailyCounts::from(vec![u64::MAX, 1]).total(), u64::MAX);
    }
}
