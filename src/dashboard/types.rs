//! Type definitions for dashboard data structures

use serde::Serialize;
use thiserror::Error;

/// A sample or payload that failed shape validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' has invalid value {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// One timestamped observation of the three tracked metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    timestamp: String,
    throughput: f64,
    pdr: f64,
    eed: f64,
}

impl MetricSample {
    /// Build a sample, rejecting non-finite or out-of-range metrics.
    ///
    /// `throughput` and `eed` must be >= 0, `pdr` must lie in [0, 1].
    pub fn new(
        timestamp: impl Into<String>,
        throughput: f64,
        pdr: f64,
        eed: f64,
    ) -> Result<Self, SampleError> {
        check("throughput", throughput, |v| v >= 0.0)?;
        check("pdr", pdr, |v| (0.0..=1.0).contains(&v))?;
        check("eed", eed, |v| v >= 0.0)?;

        Ok(Self {
            timestamp: timestamp.into(),
            throughput,
            pdr,
            eed,
        })
    }

    /// Parse a `new_data` push event.
    ///
    /// All of `throughput`, `pdr`, `eed` and `formatted_time` must be present;
    /// a partial payload is rejected as a whole.
    pub fn from_event(payload: &serde_json::Value) -> Result<Self, SampleError> {
        let obj = payload.as_object().ok_or(SampleError::NotAnObject)?;

        let number = |field: &'static str| -> Result<f64, SampleError> {
            let value = obj.get(field).ok_or(SampleError::MissingField(field))?;
            value.as_f64().ok_or_else(|| SampleError::InvalidValue {
                field,
                value: value.to_string(),
            })
        };

        let throughput = number("throughput")?;
        let pdr = number("pdr")?;
        let eed = number("eed")?;

        let time = obj
            .get("formatted_time")
            .ok_or(SampleError::MissingField("formatted_time"))?;
        let timestamp = match time {
            serde_json::Value::String(s) => s.clone(),
            other => {
                return Err(SampleError::InvalidValue {
                    field: "formatted_time",
                    value: other.to_string(),
                })
            }
        };

        Self::new(timestamp, throughput, pdr, eed)
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn throughput(&self) -> f64 {
        self.throughput
    }

    pub fn pdr(&self) -> f64 {
        self.pdr
    }

    pub fn eed(&self) -> f64 {
        self.eed
    }
}

fn check(field: &'static str, value: f64, ok: impl Fn(f64) -> bool) -> Result<(), SampleError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(SampleError::InvalidValue {
            field,
            value: value.to_string(),
        })
    }
}

/// Owned, index-aligned copy of the buffered series handed to a render sink
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesView {
    pub timestamps: Vec<String>,
    pub throughput: Vec<f64>,
    pub pdr: Vec<f64>,
    pub eed: Vec<f64>,
}

impl SeriesView {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

impl<'a> FromIterator<&'a MetricSample> for SeriesView {
    fn from_iter<I: IntoIterator<Item = &'a MetricSample>>(iter: I) -> Self {
        let mut view = SeriesView::default();
        for sample in iter {
            view.timestamps.push(sample.timestamp.clone());
            view.throughput.push(sample.throughput);
            view.pdr.push(sample.pdr);
            view.eed.push(sample.eed);
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_accepts_valid_sample() {
        let sample = MetricSample::new("12:00:01", 3.5, 0.97, 12.0).unwrap();
        assert_eq!(sample.timestamp(), "12:00:01");
        assert_eq!(sample.throughput(), 3.5);
        assert_eq!(sample.pdr(), 0.97);
        assert_eq!(sample.eed(), 12.0);
    }

    #[test]
    fn test_sample_serializes_all_fields() {
        let sample = MetricSample::new("12:00:01", 3.5, 0.97, 12.0).unwrap();
        assert_eq!(
            serde_json::to_value(&sample).unwrap(),
            json!({"timestamp": "12:00:01", "throughput": 3.5, "pdr": 0.97, "eed": 12.0})
        );
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(
            MetricSample::new("t", -1.0, 0.5, 1.0),
            Err(SampleError::InvalidValue { field: "throughput", .. })
        ));
        assert!(matches!(
            MetricSample::new("t", 1.0, 1.2, 1.0),
            Err(SampleError::InvalidValue { field: "pdr", .. })
        ));
        assert!(matches!(
            MetricSample::new("t", 1.0, 0.5, f64::NAN),
            Err(SampleError::InvalidValue { field: "eed", .. })
        ));
    }

    #[test]
    fn test_from_event_full_payload() {
        let payload = json!({
            "timestamp": 1700000000.0,
            "throughput": 2.25,
            "pdr": 0.9,
            "eed": 15.5,
            "node_info": {},
            "formatted_time": "10:15:00"
        });

        let sample = MetricSample::from_event(&payload).unwrap();
        assert_eq!(sample.timestamp(), "10:15:00");
        assert_eq!(sample.pdr(), 0.9);
    }

    #[test]
    fn test_from_event_missing_eed() {
        let payload = json!({"throughput": 1.0, "pdr": 0.5, "formatted_time": "10:00:00"});
        assert_eq!(
            MetricSample::from_event(&payload),
            Err(SampleError::MissingField("eed"))
        );
    }

    #[test]
    fn test_from_event_missing_time() {
        let payload = json!({"throughput": 1.0, "pdr": 0.5, "eed": 3.0});
        assert_eq!(
            MetricSample::from_event(&payload),
            Err(SampleError::MissingField("formatted_time"))
        );
    }

    #[test]
    fn test_from_event_wrong_types() {
        let payload = json!({"throughput": "fast", "pdr": 0.5, "eed": 3.0, "formatted_time": "t"});
        assert!(matches!(
            MetricSample::from_event(&payload),
            Err(SampleError::InvalidValue { field: "throughput", .. })
        ));
        assert_eq!(
            MetricSample::from_event(&json!([1, 2, 3])),
            Err(SampleError::NotAnObject)
        );
    }

    #[test]
    fn test_series_view_is_aligned() {
        let samples = [
            MetricSample::new("a", 1.0, 0.1, 10.0).unwrap(),
            MetricSample::new("b", 2.0, 0.2, 20.0).unwrap(),
        ];
        let view: SeriesView = samples.iter().collect();
        assert_eq!(view.len(), 2);
        assert_eq!(view.timestamps, vec!["a", "b"]);
        assert_eq!(view.throughput, vec![1.0, 2.0]);
        assert_eq!(view.pdr, vec![0.1, 0.2]);
        assert_eq!(view.eed, vec![10.0, 20.0]);
    }
}
