use crate::error::{FootprintError, Result};
use crate::predictor::ProfilePredictor;
use crate::types::*;
use ndarray::{s, Array1, Array2, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::Peekable;
use std::path::Path;

const PSEUDOCOUNT: f64 = 0.0001;
const RT: f64 = 2.5;
/// Added to the landscape before taking logs
const LANDSCAPE_FLOOR: f64 = 1e-3;

/// Advances the iterator until a MOTIF line is found
fn skip_until_motif<I>(lines: &mut Peekable<I>)
where
    I: Iterator<Item = std::result::Result<String, std::io::Error>>,
{
    while let Some(Ok(line)) = lines.peek() {
        if line.starts_with("MOTIF") {
            break;
        }
        lines.next();
    }
}

/// Parses one probability row; `None` if the line is not a matrix row
fn parse_pwm_row(line: &str) -> Option<std::result::Result<Vec<f64>, std::num::ParseFloatError>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || !trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    Some(trimmed.split_whitespace().map(str::parse::<f64>).collect())
}

/// Parses a single PWM from the iterator
fn parse_pwm<I>(lines: &mut Peekable<I>) -> Result<Option<(String, PWM)>>
where
    I: Iterator<Item = std::result::Result<String, std::io::Error>>,
{
    let motif_line = match lines.next() {
        Some(line) => line?,
        None => return Ok(None),
    };
    if !motif_line.starts_with("MOTIF") {
        return Ok(None);
    }

    let motif_id = motif_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| FootprintError::InvalidFileFormat("Missing motif ID".into()))?
        .to_string();

    // Header lines up to the matrix
    while let Some(Ok(line)) = lines.peek() {
        if line.starts_with("MOTIF") || parse_pwm_row(line).is_some() {
            break;
        }
        lines.next();
    }

    let mut values = Vec::new();
    let mut width = 0;
    while let Some(Ok(line)) = lines.peek() {
        let row = match parse_pwm_row(line) {
            Some(row) => row.map_err(|e| {
                FootprintError::InvalidFileFormat(format!("Invalid PWM value in {}: {}", motif_id, e))
            })?,
            None => break,
        };
        if row.len() != 4 {
            return Err(FootprintError::InvalidFileFormat(format!(
                "PWM {} row has {} columns, expected 4",
                motif_id,
                row.len()
            )));
        }
        values.extend(row);
        width += 1;
        lines.next();
    }

    if width == 0 {
        return Err(FootprintError::InvalidFileFormat(format!("Empty PWM {}", motif_id)));
    }

    Ok(Some((motif_id, Array2::from_shape_vec((width, 4), values)?)))
}

/// Reads Position Weight Matrices (PWMs) from a MEME format file
///
/// Each PWM is preceded by a "MOTIF" line carrying its ID, followed by the
/// letter-probability rows (columns A, C, G, T).
///
/// # Errors
/// * `FootprintError::Io` - If the file cannot be opened or read
/// * `FootprintError::InvalidFileFormat` - If the file format is invalid or no PWMs are found
pub fn read_pwm_files(filename: impl AsRef<Path>) -> Result<PWMCollection> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines().peekable();
    let mut pwms = Vec::new();

    skip_until_motif(&mut lines);

    while let Some((id, pwm)) = parse_pwm(&mut lines)? {
        pwms.push((id, pwm));
        skip_until_motif(&mut lines);
    }

    if pwms.is_empty() {
        return Err(FootprintError::InvalidFileFormat("No PWMs found".into()));
    }

    Ok(pwms)
}

/// Converts a PWM to an Energy Weight Matrix (EWM)
///
/// Pseudocounts are added, each position is normalized by its most frequent
/// base, and ddG = -RT ln(p_b,i / p_c,i) is applied (kJ/mol).
pub fn pwm_to_ewm(pwm: &ArrayView2<f64>) -> EWM {
    let mut ewm = pwm.mapv(|p| p + PSEUDOCOUNT);
    for mut row in ewm.rows_mut() {
        let max_val = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| -RT * (v / max_val).ln());
    }
    ewm
}

/// Reads PWMs from a MEME file and converts them to EWMs
pub fn read_pwm_to_ewm(filename: impl AsRef<Path>) -> Result<EWMCollection> {
    Ok(read_pwm_files(filename)?
        .into_iter()
        .map(|(id, pwm)| {
            let ewm = pwm_to_ewm(&pwm.view());
            (id, ewm)
        })
        .collect())
}

/// Shape and binding parameters of an [`OccupancyModel`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyConfig {
    pub input_length: usize,
    pub output_length: usize,
    /// Chemical potential of the binding proteins, in kT
    pub mu: f64,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        OccupancyConfig {
            input_length: 2114,
            output_length: 1000,
            mu: 9.0,
        }
    }
}

/// Profile predictor from equilibrium occupancy of a set of motifs.
///
/// Each window's profile is the summed predicted occupancy of every motif on
/// both strands over the central `output_length` positions.
#[derive(Debug, Clone)]
pub struct OccupancyModel {
    /// Forward and reverse-complement EWM per motif
    ewms: Vec<(String, EWM, EWM)>,
    config: OccupancyConfig,
}

impl OccupancyModel {
    /// Loads the motifs of a MEME file. All options are taken from `config`.
    pub fn load(filename: impl AsRef<Path>, config: OccupancyConfig) -> Result<Self> {
        let path = filename.as_ref();
        let model = Self::from_ewms(read_pwm_to_ewm(path)?, config)?;
        log::info!(
            "loaded occupancy model with {} motifs from {} (input {}bp, output {}bp)",
            model.ewms.len(),
            path.display(),
            config.input_length,
            config.output_length
        );
        Ok(model)
    }

    pub fn from_ewms(ewms: EWMCollection, config: OccupancyConfig) -> Result<Self> {
        if config.output_length == 0 || config.output_length > config.input_length {
            return Err(FootprintError::invalid_parameter(
                "output_length",
                config.output_length,
                format!("must be between 1 and input_length ({})", config.input_length),
            ));
        }
        if ewms.is_empty() {
            return Err(FootprintError::invalid_parameter(
                "ewms",
                0,
                "occupancy model needs at least one motif",
            ));
        }

        let ewms = ewms
            .into_iter()
            .map(|(id, ewm)| {
                let rc = ewm.slice(s![..;-1, ..;-1]).to_owned();
                (id, ewm, rc)
            })
            .collect();

        Ok(OccupancyModel { ewms, config })
    }

    /// Summed occupancy of every motif and strand, each site deposited at
    /// `start + width / 2`
    pub fn landscape(&self, sequence: &ArrayView2<f32>) -> Array1<f64> {
        let length = sequence.len_of(Axis(0));
        let mut landscape = Array1::<f64>::zeros(length);

        for (_, forward, reverse) in &self.ewms {
            let width = forward.len_of(Axis(0));
            if width > length {
                continue;
            }
            for start in 0..=length - width {
                let window = sequence.slice(s![start..start + width, ..]);
                for ewm in [forward, reverse] {
                    let ddg = window_energy(&window, &ewm.view());
                    landscape[start + width / 2] += 1.0 / (1.0 + (ddg / RT - self.config.mu).exp());
                }
            }
        }

        landscape
    }

    fn predict_one(&self, sequence: &ArrayView2<f32>) -> (Array1<f64>, f64) {
        let offset = (self.config.input_length - self.config.output_length) / 2;
        let landscape = self.landscape(sequence);
        let window = landscape.slice(s![offset..offset + self.config.output_length]);

        let logits = window.mapv(|v| (v + LANDSCAPE_FLOOR).ln());
        let log_count = window.sum().ln_1p();
        (logits, log_count)
    }
}

/// Energy of a one-hot window under an EWM; positions with no base take the
/// mean of their EWM row
fn window_energy(window: &ArrayView2<f32>, ewm: &ArrayView2<f64>) -> f64 {
    window
        .outer_iter()
        .zip(ewm.outer_iter())
        .map(|(bases, energies)| {
            let mass: f32 = bases.sum();
            if mass == 0.0 {
                energies.mean().unwrap_or(0.0)
            } else {
                bases
                    .iter()
                    .zip(energies.iter())
                    .map(|(&b, &e)| b as f64 * e)
                    .sum()
            }
        })
        .sum()
}

impl ProfilePredictor for OccupancyModel {
    fn input_length(&self) -> usize {
        self.config.input_length
    }

    fn output_length(&self) -> usize {
        self.config.output_length
    }

    fn predict_batch(&self, batch: &ArrayView3<f32>) -> Result<Prediction> {
        let (n, input_len, _) = batch.dim();
        if input_len != self.config.input_length {
            return Err(FootprintError::PredictionShape {
                expected: vec![n, self.config.input_length, 4],
                found: vec![n, input_len, 4],
            });
        }

        let rows: Vec<(Array1<f64>, f64)> = (0..n)
            .into_par_iter()
            .map(|idx| self.predict_one(&batch.index_axis(Axis(0), idx)))
            .collect();

        let mut logits = Array2::<f64>::zeros((n, self.config.output_length));
        let mut log_counts = Array1::<f64>::zeros(n);
        for (idx, (row, count)) in rows.into_iter().enumerate() {
            logits.row_mut(idx).assign(&row);
            log_counts[idx] = count;
        }

        Ok(Prediction { logits, log_counts })
    }
}
