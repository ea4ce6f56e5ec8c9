//! FFT engine using realfft for real-valued signals
//!
//! Plans forward and inverse transforms once per analysis length; all
//! per-window work reuses the same scratch buffers

use num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Paired forward/inverse FFT for one analysis length
pub struct FftEngine {
    /// Transform size (number of real samples)
    len: usize,

    /// Real-to-complex forward transform
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Complex-to-real inverse transform
    c2r: Arc<dyn ComplexToReal<f64>>,

    /// Reusable forward input buffer
    forward_input: Vec<f64>,

    /// Reusable inverse input buffer
    inverse_input: Vec<Complex<f64>>,
}

impl FftEngine {
    /// Create an engine for the given analysis length
    pub fn new(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(len);
        let c2r = planner.plan_fft_inverse(len);

        Self {
            len,
            r2c,
            c2r,
            forward_input: vec![0.0; len],
            inverse_input: vec![Complex::new(0.0, 0.0); len / 2 + 1],
        }
    }

    /// Compute the forward transform of a real signal
    ///
    /// The signal is zero-padded if shorter than the analysis length.
    ///
    /// # Returns
    /// Half spectrum X[k] for k = 0..len/2 (positive frequencies only)
    pub fn forward(&mut self, signal: &[f64]) -> Vec<Complex<f64>> {
        let copy_len = signal.len().min(self.len);
        self.forward_input[..copy_len].copy_from_slice(&signal[..copy_len]);
        if copy_len < self.len {
            self.forward_input[copy_len..].fill(0.0);
        }

        let mut spectrum = vec![Complex::new(0.0, 0.0); self.num_bins()];
        self.r2c
            .process(&mut self.forward_input, &mut spectrum)
            .expect("forward FFT failed");
        spectrum
    }

    /// Compute the inverse transform of a half spectrum
    ///
    /// Output is normalized by 1/len so that `inverse(forward(x))`
    /// reproduces `x`. The DC and Nyquist bins of a real signal's spectrum
    /// are purely real; any residual imaginary parts are zeroed before the
    /// c2r transform.
    ///
    /// # Arguments
    /// * `spectrum` - Half spectrum of length len/2 + 1
    ///
    /// # Returns
    /// Real signal of the analysis length
    pub fn inverse(&mut self, spectrum: &[Complex<f64>]) -> Vec<f64> {
        assert_eq!(
            spectrum.len(),
            self.num_bins(),
            "spectrum length must match the analysis length"
        );

        self.inverse_input.copy_from_slice(spectrum);
        self.inverse_input[0].im = 0.0;
        if self.len % 2 == 0 {
            let last = self.num_bins() - 1;
            self.inverse_input[last].im = 0.0;
        }

        let mut signal = vec![0.0; self.len];
        self.c2r
            .process(&mut self.inverse_input, &mut signal)
            .expect("inverse FFT failed");

        let scale = 1.0 / self.len as f64;
        for s in signal.iter_mut() {
            *s *= scale;
        }
        signal
    }

    /// Get the analysis length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Get the number of frequency bins (len/2 + 1)
    pub fn num_bins(&self) -> usize {
        self.len / 2 + 1
    }

    /// Convert a bin index to a frequency in Hz
    pub fn bin_to_hz(&self, bin: usize, sample_rate: f64) -> f64 {
        bin as f64 * sample_rate / self.len as f64
    }

    /// Get the frequency axis in Hz, spanning [0, sample_rate/2]
    pub fn frequency_axis_hz(&self, sample_rate: f64) -> Vec<f64> {
        (0..self.num_bins())
            .map(|bin| self.bin_to_hz(bin, sample_rate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_forward_dc_signal() {
        let mut fft = FftEngine::new(1024);

        let signal = vec![1.0; 1024];
        let spectrum = fft.forward(&signal);

        assert_eq!(spectrum.len(), 513);
        // All energy in the DC bin
        assert!((spectrum[0].re - 1024.0).abs() < 1e-6);
        assert!(spectrum[10].norm() < 1e-6);
    }

    #[test]
    fn test_forward_sine_peak() {
        let mut fft = FftEngine::new(1024);

        // Sine at exactly bin 64
        let signal: Vec<f64> = (0..1024)
            .map(|n| (2.0 * PI * 64.0 * n as f64 / 1024.0).sin())
            .collect();
        let spectrum = fft.forward(&signal);

        let (peak_bin, peak_mag) = spectrum
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.norm()))
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        assert_eq!(peak_bin, 64);
        // Peak magnitude is N/2 for a unit sine on a bin center
        assert!((peak_mag - 512.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let mut fft = FftEngine::new(256);

        let signal: Vec<f64> = (0..256)
            .map(|n| (2.0 * PI * 3.0 * n as f64 / 256.0).sin() + 0.25)
            .collect();

        let spectrum = fft.forward(&signal);
        let restored = fft.inverse(&spectrum);

        assert_eq!(restored.len(), 256);
        for (a, b) in signal.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_inverse_flat_spectrum_is_impulse() {
        let mut fft = FftEngine::new(128);

        // A flat unity spectrum transforms back to a unit impulse at n = 0
        let spectrum = vec![Complex::new(1.0, 0.0); 65];
        let signal = fft.inverse(&spectrum);

        assert!((signal[0] - 1.0).abs() < 1e-9);
        for s in &signal[1..] {
            assert!(s.abs() < 1e-9);
        }
    }

    #[test]
    fn test_frequency_axis() {
        let fft = FftEngine::new(1024);
        let freqs = fft.frequency_axis_hz(48000.0);

        assert_eq!(freqs.len(), 513);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[512] - 24000.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_padding() {
        let mut fft = FftEngine::new(1024);

        let signal = vec![1.0; 100];
        let spectrum = fft.forward(&signal);

        // 100 ones zero-padded: DC bin sums the samples
        assert!((spectrum[0].re - 100.0).abs() < 1e-6);
    }
}
