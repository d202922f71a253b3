use crate::error::{FootprintError, Result};
use crate::types::Prediction;
use ndarray::{concatenate, Array1, Array2, ArrayView3, Axis};

/// A sequence-to-profile model.
///
/// Implementations map a one-hot batch of shape (n, input_length, 4) to
/// profile logits of shape (n, output_length) and one log-total-count per
/// window. Prediction must be a pure function of the batch.
pub trait ProfilePredictor {
    fn input_length(&self) -> usize;

    fn output_length(&self) -> usize;

    fn predict_batch(&self, batch: &ArrayView3<f32>) -> Result<Prediction>;
}

impl<P: ProfilePredictor + ?Sized> ProfilePredictor for &P {
    fn input_length(&self) -> usize {
        (**self).input_length()
    }

    fn output_length(&self) -> usize {
        (**self).output_length()
    }

    fn predict_batch(&self, batch: &ArrayView3<f32>) -> Result<Prediction> {
        (**self).predict_batch(batch)
    }
}

/// Runs `predictor` over `batch` in sub-batches of at most `batch_size`
/// windows and concatenates the results in input order.
///
/// # Errors
/// * `FootprintError::InvalidParameter` if `batch_size` is zero
/// * `FootprintError::PredictionShape` if the input windows do not match the
///   model input length, or a sub-batch result has the wrong shape
pub fn predict<P: ProfilePredictor + ?Sized>(
    predictor: &P,
    batch: &ArrayView3<f32>,
    batch_size: usize,
) -> Result<Prediction> {
    if batch_size == 0 {
        return Err(FootprintError::invalid_parameter(
            "batch_size",
            batch_size,
            "must be at least 1",
        ));
    }

    let (n, input_len, channels) = batch.dim();
    if input_len != predictor.input_length() || channels != 4 {
        return Err(FootprintError::PredictionShape {
            expected: vec![n, predictor.input_length(), 4],
            found: vec![n, input_len, channels],
        });
    }

    let output_len = predictor.output_length();
    if n == 0 {
        return Ok(Prediction {
            logits: Array2::zeros((0, output_len)),
            log_counts: Array1::zeros(0),
        });
    }

    let mut logits = Vec::with_capacity(n.div_ceil(batch_size));
    let mut log_counts = Vec::with_capacity(n.div_ceil(batch_size));

    for (idx, chunk) in batch.axis_chunks_iter(Axis(0), batch_size).enumerate() {
        let rows = chunk.len_of(Axis(0));
        log::debug!("predicting sub-batch {} ({} windows)", idx, rows);

        let prediction = predictor.predict_batch(&chunk)?;
        if prediction.logits.dim() != (rows, output_len) {
            let (found_rows, found_len) = prediction.logits.dim();
            return Err(FootprintError::PredictionShape {
                expected: vec![rows, output_len],
                found: vec![found_rows, found_len],
            });
        }
        if prediction.log_counts.len() != rows {
            return Err(FootprintError::PredictionShape {
                expected: vec![rows],
                found: vec![prediction.log_counts.len()],
            });
        }

        logits.push(prediction.logits);
        log_counts.push(prediction.log_counts);
    }

    let logit_views: Vec<_> = logits.iter().map(|a| a.view()).collect();
    let count_views: Vec<_> = log_counts.iter().map(|a| a.view()).collect();

    Ok(Prediction {
        logits: concatenate(Axis(0), &logit_views)?,
        log_counts: concatenate(Axis(0), &count_views)?,
    })
}
