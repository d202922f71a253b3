use polars::prelude::PolarsError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FootprintError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Invalid sequence at position {position}: {message}")]
    InvalidSequence { position: usize, message: String },

    #[error("Motif of length {motif_len} does not fit in model input of length {input_len}")]
    InvalidMotifLength { motif_len: usize, input_len: usize },

    #[error("Background batch contains no sequences")]
    EmptyBatch,

    #[error("No default motif_to_pwm mapping for assay {assay} (looked for {path}); provide a motif table explicitly")]
    MissingDefaultMapping { assay: String, path: String },

    #[error("No tn5/dnase control motifs present; the central-peak score is undefined")]
    UndefinedAggregateScore,

    #[error("Combined footprint has non-finite mass {0}")]
    DegenerateFootprint(f64),

    #[error("Prediction has shape {found:?}, expected {expected:?}")]
    PredictionShape {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Duplicate motif name: {0}")]
    DuplicateMotif(String),

    #[error("Chromosome not found in genome: {0}")]
    UnknownChromosome(String),

    #[error("Region {chrom}:{start}-{end} falls outside chromosome of length {chrom_len}")]
    RegionOutOfBounds {
        chrom: String,
        start: i64,
        end: i64,
        chrom_len: usize,
    },

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Failed to decode footprints: {0}")]
    Decode(String),

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },

    #[error("Motif {name}: {source}")]
    Motif {
        name: String,
        #[source]
        source: Box<FootprintError>,
    },
}

pub type Result<T> = std::result::Result<T, FootprintError>;

impl FootprintError {
    /// Create a new InvalidSequence error
    pub fn invalid_sequence(position: usize, message: impl Into<String>) -> Self {
        FootprintError::InvalidSequence {
            position,
            message: message.into(),
        }
    }

    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        FootprintError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// Attach the name of the motif whose computation failed
    pub fn for_motif(self, name: impl Into<String>) -> Self {
        FootprintError::Motif {
            name: name.into(),
            source: Box::new(self),
        }
    }
}
