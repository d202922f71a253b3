use crate::error::{FootprintError, Result};
use crate::types::{OneHot, OneHotBatch};
use ndarray::{s, Array2, Array3, ArrayView3};
use phf::phf_map;

/// Channel index of each nucleotide; anything else is an all-zero position
static NUCLEOTIDE_INDEX: phf::Map<char, usize> = phf_map! {
    'A' => 0, 'C' => 1, 'G' => 2, 'T' => 3,
    'a' => 0, 'c' => 1, 'g' => 2, 't' => 3,
};

/// Complement of every IUPAC nucleotide code
static COMPLEMENT: phf::Map<char, char> = phf_map! {
    'A' => 'T', 'T' => 'A', 'C' => 'G', 'G' => 'C', 'N' => 'N',
    'R' => 'Y', 'Y' => 'R', 'S' => 'S', 'W' => 'W', 'K' => 'M', 'M' => 'K',
    'B' => 'V', 'V' => 'B', 'D' => 'H', 'H' => 'D',
    'a' => 't', 't' => 'a', 'c' => 'g', 'g' => 'c', 'n' => 'n',
    'r' => 'y', 'y' => 'r', 's' => 's', 'w' => 'w', 'k' => 'm', 'm' => 'k',
    'b' => 'v', 'v' => 'b', 'd' => 'h', 'h' => 'd',
};

/// Generates the reverse complement of a DNA sequence.
///
/// # Arguments
/// * `sequence` - Input DNA sequence string (IUPAC codes in either case)
///
/// # Errors
/// * Returns `FootprintError::InvalidSequence` naming the first offending position
pub fn reverse_complement(sequence: &str) -> Result<String> {
    sequence
        .chars()
        .enumerate()
        .map(|(position, c)| {
            COMPLEMENT.get(&c).copied().ok_or_else(|| {
                FootprintError::invalid_sequence(position, format!("unexpected nucleotide '{}'", c))
            })
        })
        .collect::<Result<Vec<char>>>()
        .map(|bases| bases.into_iter().rev().collect())
}

/// Checks that a motif consists only of IUPAC nucleotide codes.
///
/// Codes other than A, C, G and T are accepted and encode as all-zero
/// positions.
pub fn validate_motif(sequence: &str) -> Result<()> {
    match sequence.chars().position(|c| !COMPLEMENT.contains_key(&c)) {
        Some(position) => Err(FootprintError::invalid_sequence(
            position,
            format!("unexpected nucleotide in motif {}", sequence),
        )),
        None => Ok(()),
    }
}

/// One-hot encodes a sequence into shape (length, 4).
pub fn dna_to_one_hot(sequence: &str) -> OneHot {
    let mut encoded = Array2::<f32>::zeros((sequence.chars().count(), 4));
    for (position, c) in sequence.chars().enumerate() {
        if let Some(&channel) = NUCLEOTIDE_INDEX.get(&c) {
            encoded[[position, channel]] = 1.0;
        }
    }
    encoded
}

/// One-hot encodes a set of equal-length sequences into shape (n, length, 4).
///
/// # Errors
/// * Returns `FootprintError::DataError` if the sequences differ in length or
///   hold non-ASCII characters
pub fn one_hot_batch<S: AsRef<str>>(sequences: &[S]) -> Result<OneHotBatch> {
    let length = sequences.first().map(|s| s.as_ref().len()).unwrap_or(0);
    let mut batch = Array3::<f32>::zeros((sequences.len(), length, 4));

    for (idx, sequence) in sequences.iter().enumerate() {
        let sequence = sequence.as_ref();
        if !sequence.is_ascii() {
            return Err(FootprintError::DataError(format!(
                "sequence {} has non-ASCII characters",
                idx
            )));
        }
        if sequence.len() != length {
            return Err(FootprintError::DataError(format!(
                "sequence {} has length {}, expected {}",
                idx,
                sequence.len(),
                length
            )));
        }
        batch
            .slice_mut(s![idx, .., ..])
            .assign(&dna_to_one_hot(sequence));
    }

    Ok(batch)
}

/// Reverse complements every window of a batch by reversing both the position
/// and the channel axis.
pub fn reverse_complement_batch(batch: &ArrayView3<f32>) -> OneHotBatch {
    batch.slice(s![.., ..;-1, ..;-1]).to_owned()
}
