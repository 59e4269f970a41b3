use crate::error::Error;
use std::ops::Deref;
use tracing::debug;

/// Smallest number of samples a range can be split into
pub const MIN_SAMPLES: usize = 2;

/// Evenly spaced, strictly increasing samples of a closed interval. The first
/// element is exactly the lower bound and the last exactly the upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleVector(Vec<f64>);

impl SampleVector {
    /// Unwrap the samples
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for SampleVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// Sample `count` evenly spaced points in `[min, max]`.
///
/// # Examples
///
/// ```
/// # use calcplot::sample;
/// let x = sample(-10.0, 10.0, 5).unwrap();
/// assert_eq!(&*x, &[-10.0, -5.0, 0.0, 5.0, 10.0]);
///
/// assert!(sample(1.0, 1.0, 5).is_err());
/// assert!(sample(0.0, 1.0, 1).is_err());
/// ```
pub fn sample(min: f64, max: f64, count: usize) -> Result<SampleVector, Error> {
    if !min.is_finite() || !max.is_finite() {
        return Err(Error::InvalidRange(format!(
            "bounds must be finite, got [{}, {}]",
            min, max
        )));
    }
    if min >= max {
        return Err(Error::InvalidRange(format!(
            "minimum {} must be less than maximum {}",
            min, max
        )));
    }
    if count < MIN_SAMPLES {
        return Err(Error::InvalidRange(format!(
            "at least {} samples are needed, got {}",
            MIN_SAMPLES, count
        )));
    }

    let width = max - min;
    if !width.is_finite() {
        return Err(Error::InvalidRange(format!(
            "interval [{}, {}] is too wide",
            min, max
        )));
    }

    let step = width / (count - 1) as f64;
    let mut samples: Vec<f64> = (0..count).map(|i| min + i as f64 * step).collect();
    samples[count - 1] = max;

    if samples.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(Error::InvalidRange(format!(
            "interval [{}, {}] is too narrow for {} distinct samples",
            min, max, count
        )));
    }

    debug!(min, max, count, step, "sampled range");
    Ok(SampleVector(samples))
}

#[cfg(test)]
mod tests {
    use super::sample;
    use crate::error::Error;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn evenly_spaced() {
        let x = sample(-10.0, 10.0, 5).unwrap();
        assert_eq!(x.into_vec(), vec![-10.0, -5.0, 0.0, 5.0, 10.0]);

        let x = sample(0.0, 1.0, 2).unwrap();
        assert_eq!(&*x, &[0.0, 1.0]);
    }

    #[test_case(1.0, 1.0, 10 ; "empty interval")]
    #[test_case(2.0, 1.0, 10 ; "reversed interval")]
    #[test_case(0.0, 1.0, 1 ; "single sample")]
    #[test_case(0.0, 1.0, 0 ; "no samples")]
    #[test_case(f64::NAN, 1.0, 10 ; "nan bound")]
    #[test_case(0.0, f64::INFINITY, 10 ; "infinite bound")]
    #[test_case(-f64::MAX, f64::MAX, 10 ; "overflowing width")]
    #[test_case(1e16, 1e16 + 2.0, 1000 ; "too narrow")]
    fn invalid_ranges(min: f64, max: f64, count: usize) {
        assert!(matches!(sample(min, max, count), Err(Error::InvalidRange(_))));
    }

    proptest! {
        #[test]
        fn invariants(min in -1e6f64..1e6, width in 1e-3f64..1e6, count in 2usize..2000) {
            let max = min + width;
            let x = sample(min, max, count).unwrap();
            prop_assert_eq!(x.len(), count);
            prop_assert_eq!(x[0], min);
            prop_assert_eq!(x[count - 1], max);
            prop_assert!(x.windows(2).all(|pair| pair[0] < pair[1]));

            let step = (max - min) / (count - 1) as f64;
            for pair in x.windows(2) {
                assert_relative_eq!(pair[1] - pair[0], step, epsilon = 1e-6, max_relative = 1e-6);
            }
        }
    }
}
