use crate::error::{FootprintError, Result};
use crate::onehot::one_hot_batch;
use crate::types::{Genome, OneHotBatch};
use polars::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Column names of a 10-column narrowPeak file
pub const NARROWPEAK_SCHEMA: [&str; 10] = [
    "chr", "start", "end", "1", "2", "3", "4", "5", "6", "summit",
];

/// A peak anchored at `start + summit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub chrom: String,
    pub start: i64,
    pub summit: i64,
}

impl Region {
    pub fn center(&self) -> i64 {
        self.start + self.summit
    }
}

/// Chromosome assignment of the train/validation/test folds
#[derive(Debug, Clone, Deserialize)]
pub struct ChromSplits {
    #[serde(default)]
    pub train: Vec<String>,
    #[serde(default)]
    pub valid: Vec<String>,
    pub test: Vec<String>,
}

impl ChromSplits {
    pub fn test_chroms(&self) -> HashSet<String> {
        self.test.iter().cloned().collect()
    }
}

/// Reads a JSON chromosome split file with at least a `test` list.
pub fn read_chrom_splits(filename: impl AsRef<Path>) -> Result<ChromSplits> {
    let reader = BufReader::new(File::open(filename)?);
    Ok(serde_json::from_reader(reader)?)
}

fn narrowpeak_schema() -> Schema {
    NARROWPEAK_SCHEMA
        .iter()
        .map(|&name| {
            let dtype = match name {
                "start" | "end" | "summit" => DataType::Int64,
                _ => DataType::String,
            };
            Field::new(name.into(), dtype)
        })
        .collect()
}

/// Reads peaks from a headerless, tab-separated narrowPeak file.
///
/// # Returns
/// * `Result<Vec<Region>>` - Regions in file order
///
/// # Errors
/// * Returns `FootprintError::Polars` if the table cannot be parsed
/// * Returns `FootprintError::InvalidFileFormat` if a coordinate is missing
pub fn read_regions(filename: impl AsRef<Path>) -> Result<Vec<Region>> {
    let df = LazyCsvReader::new(filename.as_ref())
        .with_has_header(false)
        .with_separator(b'\t')
        .with_schema(Some(Arc::new(narrowpeak_schema())))
        .finish()?
        .select([col("chr"), col("start"), col("summit")])
        .collect()?;

    let chroms = df.column("chr")?.str()?;
    let starts = df.column("start")?.i64()?;
    let summits = df.column("summit")?.i64()?;

    chroms
        .into_iter()
        .zip(starts)
        .zip(summits)
        .enumerate()
        .map(|(idx, ((chrom, start), summit))| match (chrom, start, summit) {
            (Some(chrom), Some(start), Some(summit)) => Ok(Region {
                chrom: chrom.to_string(),
                start,
                summit,
            }),
            _ => Err(FootprintError::InvalidFileFormat(format!(
                "missing chr/start/summit in region row {}",
                idx
            ))),
        })
        .collect()
}

/// Keeps the regions on `chroms`, preserving order.
pub fn select_regions(regions: Vec<Region>, chroms: &HashSet<String>) -> Vec<Region> {
    regions
        .into_iter()
        .filter(|region| chroms.contains(&region.chrom))
        .collect()
}

/// One-hot encodes a `width`-long window centered on each region.
///
/// The window of a region is `[center - width/2, center - width/2 + width)`.
///
/// # Errors
/// * `FootprintError::UnknownChromosome` if a region's chromosome is not in the genome
/// * `FootprintError::RegionOutOfBounds` if a window runs off its chromosome
pub fn extract_sequences(genome: &Genome, regions: &[Region], width: usize) -> Result<OneHotBatch> {
    let sequences = regions
        .iter()
        .map(|region| {
            let chrom_seq = genome
                .get(&region.chrom)
                .ok_or_else(|| FootprintError::UnknownChromosome(region.chrom.clone()))?;

            let start = region.center() - (width / 2) as i64;
            let end = start + width as i64;
            if start < 0 || end > chrom_seq.len() as i64 {
                return Err(FootprintError::RegionOutOfBounds {
                    chrom: region.chrom.clone(),
                    start,
                    end,
                    chrom_len: chrom_seq.len(),
                });
            }

            chrom_seq
                .get(start as usize..end as usize)
                .ok_or_else(|| {
                    FootprintError::DataError(format!(
                        "non-ASCII sequence in {}:{}-{}",
                        region.chrom, start, end
                    ))
                })
        })
        .collect::<Result<Vec<&str>>>()?;

    log::info!("extracted {} background windows of {}bp", sequences.len(), width);
    if sequences.is_empty() {
        return Ok(OneHotBatch::zeros((0, width, 4)));
    }
    one_hot_batch(&sequences)
}
