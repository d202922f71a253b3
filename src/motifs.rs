use crate::error::{FootprintError, Result};
use crate::onehot::validate_motif;
use crate::types::Motif;
use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable naming the directory of default motif tables
pub const DATA_DIR_ENV: &str = "MARGINAL_FOOTPRINTS_DATA";

/// Assay the model was trained on; selects the default motif table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assay {
    Atac,
    Dnase,
    Tf,
}

impl Assay {
    /// File name of the default motif table for this assay
    pub fn default_motif_table(&self) -> &'static str {
        match self {
            Assay::Atac => "motif_to_pwm.ATAC.tsv",
            Assay::Dnase => "motif_to_pwm.DNASE.tsv",
            Assay::Tf => "motif_to_pwm.TF.tsv",
        }
    }
}

impl fmt::Display for Assay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assay::Atac => write!(f, "ATAC"),
            Assay::Dnase => write!(f, "DNASE"),
            Assay::Tf => write!(f, "TF"),
        }
    }
}

impl FromStr for Assay {
    type Err = FootprintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ATAC" => Ok(Assay::Atac),
            "DNASE" => Ok(Assay::Dnase),
            "TF" => Ok(Assay::Tf),
            _ => Err(FootprintError::invalid_parameter(
                "assay",
                s,
                "expected one of ATAC, DNASE, TF",
            )),
        }
    }
}

/// Directory holding the default motif tables: `explicit`, else
/// `$MARGINAL_FOOTPRINTS_DATA`, else `./data`.
pub fn data_dir(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Picks the motif table to use. An explicit path always wins; otherwise the
/// assay's default table in `data_dir` must exist.
///
/// # Errors
/// * `FootprintError::MissingDefaultMapping` if no explicit table was given
///   and the default one is absent
pub fn resolve_motif_table(
    assay: Assay,
    explicit: Option<&Path>,
    data_dir: &Path,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let path = data_dir.join(assay.default_motif_table());
    if !path.is_file() {
        return Err(FootprintError::MissingDefaultMapping {
            assay: assay.to_string(),
            path: path.display().to_string(),
        });
    }
    Ok(path)
}

/// Reads a headerless two-column TSV of motif name and forward motif.
///
/// # Returns
/// * `Result<Vec<Motif>>` - Motifs in file order
///
/// # Errors
/// * `FootprintError::InvalidFileFormat` if the table is empty or a cell is missing
/// * `FootprintError::DuplicateMotif` if a name appears twice
/// * `FootprintError::InvalidSequence` if a motif has non-nucleotide symbols
pub fn read_motif_table(filename: impl AsRef<Path>) -> Result<Vec<Motif>> {
    let schema: Schema = [
        Field::new("MOTIF_NAME".into(), DataType::String),
        Field::new("MOTIF_PWM_FWD".into(), DataType::String),
    ]
    .into_iter()
    .collect();

    let df = LazyCsvReader::new(filename.as_ref())
        .with_has_header(false)
        .with_separator(b'\t')
        .with_schema(Some(Arc::new(schema)))
        .finish()?
        .collect()?;

    let names = df.column("MOTIF_NAME")?.str()?;
    let sequences = df.column("MOTIF_PWM_FWD")?.str()?;

    let mut seen = HashSet::new();
    let mut motifs = Vec::with_capacity(df.height());

    for (idx, (name, sequence)) in names.into_iter().zip(sequences).enumerate() {
        let (name, sequence) = match (name, sequence) {
            (Some(name), Some(sequence)) => (name.trim(), sequence.trim()),
            _ => {
                return Err(FootprintError::InvalidFileFormat(format!(
                    "missing motif name or sequence in row {}",
                    idx
                )))
            }
        };

        if !seen.insert(name.to_string()) {
            return Err(FootprintError::DuplicateMotif(name.to_string()));
        }
        validate_motif(sequence).map_err(|e| e.for_motif(name))?;
        motifs.push(Motif::new(name, sequence));
    }

    if motifs.is_empty() {
        return Err(FootprintError::InvalidFileFormat("No motifs found".into()));
    }

    log::debug!("read {} motifs", motifs.len());
    Ok(motifs)
}
