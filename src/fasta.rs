use crate::error::{FootprintError, Result};
use crate::types::Genome;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Reads a reference genome from a FASTA file, gzip-compressed if the name
/// ends in `.gz`.
///
/// Every sequence is held in memory, so a whole human genome takes about
/// 3 GB.
///
/// # Arguments
/// * `filename` - Path to the FASTA file to read
///
/// # Returns
/// * `Result<Genome>` - Sequences keyed by the first whitespace-separated
///   token of their header line
///
/// # Errors
/// * Returns `FootprintError::InvalidFileFormat` if no sequences are found or a
///   header is repeated
/// * Returns `FootprintError::Io` for file reading issues
pub fn read_genome(filename: impl AsRef<Path>) -> Result<Genome> {
    let path = filename.as_ref();
    let file = File::open(path)?;
    let inner: Box<dyn Read> = match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Box::new(MultiGzDecoder::new(file)),
        _ => Box::new(file),
    };
    let reader = BufReader::new(inner);

    let mut genome = Genome::new();
    let mut current_header = String::new();
    let mut current_sequence = String::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if let Some(header) = line.strip_prefix('>') {
            if !current_header.is_empty() {
                insert_record(&mut genome, current_header, current_sequence)?;
                current_sequence = String::new();
            }
            current_header = header.split_whitespace().next().unwrap_or("").to_string();
            if current_header.is_empty() {
                return Err(FootprintError::InvalidFileFormat(
                    "FASTA header without a name".into(),
                ));
            }
        } else if !line.is_empty() {
            current_sequence.push_str(line);
        }
    }

    if !current_header.is_empty() {
        insert_record(&mut genome, current_header, current_sequence)?;
    }

    if genome.is_empty() {
        return Err(FootprintError::InvalidFileFormat("No sequences found".into()));
    }

    log::info!("read {} sequences from {}", genome.len(), path.display());
    Ok(genome)
}

fn insert_record(genome: &mut Genome, header: String, sequence: String) -> Result<()> {
    if genome.contains_key(&header) {
        return Err(FootprintError::InvalidFileFormat(format!(
            "duplicate sequence name {}",
            header
        )));
    }
    genome.insert(header, sequence);
    Ok(())
}
