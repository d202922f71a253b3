#![allow(dead_code)]

use marginal_footprints::error::Result;
use marginal_footprints::onehot::one_hot_batch;
use marginal_footprints::predictor::ProfilePredictor;
use marginal_footprints::types::{OneHotBatch, Prediction};
use ndarray::{Array1, Array2, ArrayView3, Axis};

/// Predicts flat logits and zero log-counts for everything
pub struct ZeroPredictor {
    pub input_length: usize,
    pub output_length: usize,
}

impl ProfilePredictor for ZeroPredictor {
    fn input_length(&self) -> usize {
        self.input_length
    }

    fn output_length(&self) -> usize {
        self.output_length
    }

    fn predict_batch(&self, batch: &ArrayView3<f32>) -> Result<Prediction> {
        let n = batch.len_of(Axis(0));
        Ok(Prediction {
            logits: Array2::zeros((n, self.output_length)),
            log_counts: Array1::zeros(n),
        })
    }
}

/// Position- and base-dependent toy model reading the central output window
pub struct WindowPredictor {
    pub input_length: usize,
    pub output_length: usize,
}

impl ProfilePredictor for WindowPredictor {
    fn input_length(&self) -> usize {
        self.input_length
    }

    fn output_length(&self) -> usize {
        self.output_length
    }

    fn predict_batch(&self, batch: &ArrayView3<f32>) -> Result<Prediction> {
        let n = batch.len_of(Axis(0));
        let offset = (self.input_length - self.output_length) / 2;
        let mut logits = Array2::<f64>::zeros((n, self.output_length));
        let mut log_counts = Array1::<f64>::zeros(n);

        for (idx, seq) in batch.outer_iter().enumerate() {
            for j in 0..self.output_length {
                let base = seq.row(offset + j);
                logits[[idx, j]] = 2.0 * base[0] as f64 + 0.5 * base[2] as f64 - base[3] as f64
                    + 0.01 * j as f64;
            }
            let gc: f32 = seq.column(1).sum() + seq.column(2).sum();
            log_counts[idx] = (1.0 + gc as f64 * 3.0).ln();
        }

        Ok(Prediction { logits, log_counts })
    }
}

/// Deterministic pseudo-random DNA
pub fn random_sequences(n: usize, length: usize, seed: u64) -> Vec<String> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            (0..length)
                .map(|_| {
                    state = state
                        .wrapping_mul(6364136223846793005)
                        .wrapping_add(1442695040888963407);
                    b"ACGT"[(state >> 33) as usize % 4] as char
                })
                .collect()
        })
        .collect()
}

pub fn random_batch(n: usize, length: usize, seed: u64) -> OneHotBatch {
    one_hot_batch(&random_sequences(n, length, seed)).unwrap()
}

pub fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "{} != {} (tol {})", a, b, tol);
}
