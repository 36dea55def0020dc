pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Population standard deviation (divides by N).
    pub fn std_dev(samples: &[f64], mean: f64) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| (v - mean) * (v - mean)).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    /// Median of an ascending slice; averages the middle pair for even lengths.
    pub fn median_sorted(sorted: &[f64]) -> f64 {
        let n = sorted.len();
        match n {
            0 => 0.0,
            _ if n % 2 == 0 => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
            _ => sorted[n / 2],
        }
    }

    pub fn sorted(samples: &[f64]) -> Vec<f64> {
        let mut out = samples.to_vec();
        out.sort_by(f64::total_cmp);
        out
    }
}
