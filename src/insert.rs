use crate::error::{FootprintError, Result};
use crate::onehot::{dna_to_one_hot, reverse_complement, reverse_complement_batch, validate_motif};
use crate::types::OneHotBatch;
use ndarray::{s, ArrayView3, Axis};

/// First position of a motif of length `motif_len` centered in a window of
/// length `input_len`.
///
/// Both halves are floored, so odd-length motifs sit one base left of the
/// true center.
pub fn insertion_start(input_len: usize, motif_len: usize) -> Result<usize> {
    if motif_len > input_len {
        return Err(FootprintError::InvalidMotifLength {
            motif_len,
            input_len,
        });
    }
    Ok(input_len / 2 - motif_len / 2)
}

/// Writes `motif` into the middle of every window of `batch`.
///
/// Returns the modified forward batch and its reverse complement. The input
/// batch is left untouched and the two outputs share no storage.
///
/// # Errors
/// * `FootprintError::InvalidMotifLength` if the motif is longer than the windows
/// * `FootprintError::InvalidSequence` if the motif has non-IUPAC symbols
pub fn insert_motif(batch: &ArrayView3<f32>, motif: &str) -> Result<(OneHotBatch, OneHotBatch)> {
    validate_motif(motif)?;

    let input_len = batch.len_of(Axis(1));
    let motif_len = motif.len();
    let start = insertion_start(input_len, motif_len)?;
    log::debug!(
        "inserting {} (reverse strand {}) at [{}, {}) of {}bp windows",
        motif,
        reverse_complement(motif)?,
        start,
        start + motif_len,
        input_len
    );

    let mut forward = batch.to_owned();
    forward
        .slice_mut(s![.., start..start + motif_len, ..])
        .assign(&dna_to_one_hot(motif));
    let reverse = reverse_complement_batch(&forward.view());

    Ok((forward, reverse))
}
