//! Common numeric helpers shared by the simulator and the metrics engine
//!
//! All helpers use population (biased) conventions unless the name says otherwise,
//! and return NaN instead of panicking on empty input.

/// Calculate the sum of a slice
#[inline]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Calculate the mean of a slice
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    sum(values) / values.len() as f64
}

/// Population variance (divisor `n`)
pub fn variance(values: &[f64]) -> f64 {
    central_moment(values, 2)
}

/// Population standard deviation (divisor `n`)
#[inline]
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// k-th central moment: mean((x - mean)^k)
pub fn central_moment(values: &[f64], k: i32) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(k)).sum::<f64>() / values.len() as f64
}

/// Sample covariance (divisor `n - 1`)
///
/// NaN when the lengths differ or fewer than two observations exist.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return f64::NAN;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);
    let cross: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    cross / (a.len() - 1) as f64
}

/// Find the maximum value in a slice
#[inline]
pub fn max(values: &[f64]) -> f64 {
    values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}

/// Safe division that returns NaN on divide by zero
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Period-over-period fractional change: (v[i+1] - v[i]) / v[i]
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return vec![];
    }
    values.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Running maximum, element by element
pub fn running_max(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            if v > peak {
                peak = v;
            }
            peak
        })
        .collect()
}

/// Separate strictly positive and strictly negative values, zeros dropped
pub fn split_signs(values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let positive: Vec<f64> = values.iter().copied().filter(|&v| v > 0.0).collect();
    let negative: Vec<f64> = values.iter().copied().filter(|&v| v < 0.0).collect();
    (positive, negative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum() {
        assert_eq!(sum(&[1.0, 2.0, 3.0]), 6.0);
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[2.0, 4.0, 6.0]), 4.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_population_std_dev() {
        // population variance of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 4
        let v = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(variance(&v), 4.0);
        assert_eq!(std_dev(&v), 2.0);
        assert!(std_dev(&[]).is_nan());
    }

    #[test]
    fn test_sample_covariance() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![2.0, 4.0, 6.0];
        // cross deviations sum to 4, divided by n - 1
        assert_eq!(sample_covariance(&a, &b), 2.0);
        assert!(sample_covariance(&[1.0], &[1.0]).is_nan());
        assert!(sample_covariance(&a, &[1.0, 2.0]).is_nan());
    }

    #[test]
    fn test_max() {
        let v = vec![3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(max(&v), 5.0);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 2.0), 5.0);
        assert!(safe_div(10.0, 0.0).is_nan());
    }

    #[test]
    fn test_pct_change() {
        let v = vec![1.0, 1.5, 0.75];
        assert_eq!(pct_change(&v), vec![0.5, -0.5]);
        assert!(pct_change(&[1.0]).is_empty());
    }

    #[test]
    fn test_running_max() {
        let v = vec![1.0, 1.2, 0.9, 1.5];
        assert_eq!(running_max(&v), vec![1.0, 1.2, 1.2, 1.5]);
    }

    #[test]
    fn test_split_signs() {
        let (pos, neg) = split_signs(&[0.1, 0.0, -0.2, 0.3]);
        assert_eq!(pos, vec![0.1, 0.3]);
        assert_eq!(neg, vec![-0.2]);
    }
}
