//! Bin-wise running averages of complex spectra
//!
//! Reduces measurement noise by folding each completed analysis window into
//! a persistent per-bin mean, with an optional fixed averaging horizon

use num_complex::Complex;

/// Bin-wise running mean of complex spectra
///
/// Uses the incremental update `mean += (x - mean) / n`, which stays
/// numerically stable over thousands of windows. With a non-zero depth the
/// divisor is capped at `depth`, turning the unbounded mean into a
/// fixed-horizon moving average without keeping any history.
#[derive(Debug, Clone)]
pub struct RunningMean {
    mean: Vec<Complex<f64>>,
    count: u64,
    depth: usize,
}

impl RunningMean {
    /// Create an empty accumulator for the given number of bins
    ///
    /// # Arguments
    /// * `bins` - Sequence length of each observation
    /// * `depth` - Averaging horizon; 0 means unbounded
    pub fn new(bins: usize, depth: usize) -> Self {
        Self {
            mean: vec![Complex::new(0.0, 0.0); bins],
            count: 0,
            depth,
        }
    }

    /// Fold one observation into the mean
    ///
    /// # Arguments
    /// * `observed` - New spectrum, same length as the accumulator
    pub fn push(&mut self, observed: &[Complex<f64>]) {
        assert_eq!(
            observed.len(),
            self.mean.len(),
            "observation length must match the accumulator"
        );

        self.count += 1;
        let n = if self.depth > 0 {
            self.count.min(self.depth as u64)
        } else {
            self.count
        } as f64;

        for (m, &x) in self.mean.iter_mut().zip(observed.iter()) {
            *m += (x - *m) / n;
        }
    }

    /// Get the current mean
    ///
    /// All zeros before the first observation.
    pub fn mean(&self) -> &[Complex<f64>] {
        &self.mean
    }

    /// Get the number of observations folded in since the last reset
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Clear the accumulator and observation counter
    pub fn reset(&mut self) {
        self.mean.fill(Complex::new(0.0, 0.0));
        self.count = 0;
    }

    /// Change the averaging horizon
    ///
    /// Takes effect on the next observation; accumulated history is kept.
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// Get the averaging horizon (0 = unbounded)
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Smooth a magnitude sequence with a centered moving average
///
/// Display-time transform only; the window shrinks near the edges so the
/// output length matches the input.
pub fn smooth_bins(data: &[f64], window: usize) -> Vec<f64> {
    if data.is_empty() || window < 2 {
        return data.to_vec();
    }

    let half = window / 2;
    let mut smoothed = Vec::with_capacity(data.len());

    for i in 0..data.len() {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(data.len());
        let sum: f64 = data[start..end].iter().sum();
        smoothed.push(sum / (end - start) as f64);
    }

    smoothed
}
