use crate::error::{FootprintError, Result};
use crate::insert::insert_motif;
use crate::predictor::{predict, ProfilePredictor};
use crate::types::{Footprint, Prediction};
use ndarray::{s, Array1, Array2, ArrayView2, ArrayView3, Axis};

/// Row-wise softmax with temperature `temp`.
///
/// Rows are centered on their mean before exponentiating.
pub fn softmax(logits: &ArrayView2<f64>, temp: f64) -> Array2<f64> {
    let mut probs = logits.to_owned();
    for mut row in probs.rows_mut() {
        let mean = row.mean().unwrap_or(0.0);
        row.mapv_inplace(|x| (temp * (x - mean)).exp());
        let total = row.sum();
        row /= total;
    }
    probs
}

/// Per-window probability profile and expected total count (exp(x) - 1)
fn expected_profile(prediction: &Prediction) -> (Array2<f64>, Array1<f64>) {
    let probs = softmax(&prediction.logits.view(), 1.0);
    let counts = prediction.log_counts.mapv(f64::exp_m1);
    (probs, counts)
}

/// Computes the marginal footprint of `motif` over `background`.
///
/// The motif is inserted at the center of every background window, both the
/// modified windows and their reverse complements are predicted, and the
/// reverse-complement profiles are flipped back to forward coordinates. The
/// expected-count profiles of both orientations are summed, averaged over
/// the batch, and the average is renormalized to sum to 1.
///
/// If every expected count is zero the count-weighted profile has no mass;
/// the footprint then falls back to the average of the two probability
/// profiles.
///
/// # Errors
/// * `FootprintError::EmptyBatch` if `background` has no windows
/// * `FootprintError::InvalidMotifLength` if the motif is longer than the windows
/// * `FootprintError::DegenerateFootprint` if the combined profile mass is not finite
/// * any error raised by the predictor
pub fn footprint_for_motif<P: ProfilePredictor + ?Sized>(
    background: &ArrayView3<f32>,
    motif: &str,
    predictor: &P,
    batch_size: usize,
) -> Result<Footprint> {
    if background.len_of(Axis(0)) == 0 {
        return Err(FootprintError::EmptyBatch);
    }

    let (forward, reverse) = insert_motif(background, motif)?;

    let (probs_fwd, counts_fwd) = expected_profile(&predict(predictor, &forward.view(), batch_size)?);
    let (probs_rev, counts_rev) = expected_profile(&predict(predictor, &reverse.view(), batch_size)?);
    let probs_rev = probs_rev.slice(s![.., ..;-1]);

    let profile_fwd = &probs_fwd * &counts_fwd.view().insert_axis(Axis(1));
    let profile_rev = &probs_rev * &counts_rev.view().insert_axis(Axis(1));

    let combined = (profile_fwd + profile_rev)
        .mean_axis(Axis(0))
        .ok_or(FootprintError::EmptyBatch)?;
    let count = (&counts_fwd + &counts_rev)
        .mean()
        .ok_or(FootprintError::EmptyBatch)?;

    let mass = combined.sum();
    let profile = if mass == 0.0 {
        log::warn!(
            "motif {} has zero expected counts; using the unweighted profile",
            motif
        );
        let shape = (&probs_fwd + &probs_rev)
            .mean_axis(Axis(0))
            .ok_or(FootprintError::EmptyBatch)?;
        let shape_mass = shape.sum();
        shape / shape_mass
    } else if mass.is_finite() {
        combined / mass
    } else {
        return Err(FootprintError::DegenerateFootprint(mass));
    };

    if !profile.iter().all(|v| v.is_finite()) {
        return Err(FootprintError::DegenerateFootprint(profile.sum()));
    }

    Ok(Footprint { profile, count })
}
