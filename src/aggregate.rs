use crate::error::{FootprintError, Result};
use crate::footprint::footprint_for_motif;
use crate::predictor::ProfilePredictor;
use crate::types::{Footprint, Motif};
use ndarray::{s, ArrayView1, ArrayView3};
use std::collections::HashSet;
use std::fmt;

/// Mean central-peak score below which a model counts as bias-corrected
pub const CORRECTED_THRESHOLD: f64 = 0.006;

/// Substrings marking enzyme-bias control motifs
pub const CONTROL_MARKERS: [&str; 2] = ["tn5", "dnase"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootprintConfig {
    /// Windows per predictor call
    pub batch_size: usize,
    /// Width of the central window searched for the control peak
    pub control_window: usize,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        FootprintConfig {
            batch_size: 64,
            control_window: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotifFootprint {
    pub name: String,
    pub footprint: Footprint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlScore {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Corrected,
    Uncorrected,
}

impl Verdict {
    /// Strictly below the threshold is corrected.
    pub fn classify(mean_score: f64) -> Self {
        if mean_score < CORRECTED_THRESHOLD {
            Verdict::Corrected
        } else {
            Verdict::Uncorrected
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Corrected => write!(f, "corrected"),
            Verdict::Uncorrected => write!(f, "uncorrected"),
        }
    }
}

/// Overall quality of a run, derived from the control-motif scores
#[derive(Debug, Clone, PartialEq)]
pub struct QualityScore {
    pub verdict: Verdict,
    /// Mean of the control scores, rounded to 3 decimals
    pub mean: f64,
    pub scores: Vec<f64>,
}

impl fmt::Display for QualityScore {
    /// `<verdict>_<mean>_<score>/<score>/...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scores: Vec<String> = self.scores.iter().map(|&s| format_float(s)).collect();
        write!(
            f,
            "{}_{}_{}",
            self.verdict,
            format_float(self.mean),
            scores.join("/")
        )
    }
}

/// Footprints of every motif in table order, plus control scores
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FootprintReport {
    pub footprints: Vec<MotifFootprint>,
    pub control_scores: Vec<ControlScore>,
}

impl FootprintReport {
    pub fn get(&self, name: &str) -> Option<&Footprint> {
        self.footprints
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.footprint)
    }

    /// Classifies the run from its control scores.
    ///
    /// # Errors
    /// * `FootprintError::UndefinedAggregateScore` if no control motif was footprinted
    pub fn quality(&self) -> Result<QualityScore> {
        if self.control_scores.is_empty() {
            return Err(FootprintError::UndefinedAggregateScore);
        }

        let scores: Vec<f64> = self.control_scores.iter().map(|c| c.score).collect();
        // sum / len, not an incremental mean
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;

        Ok(QualityScore {
            verdict: Verdict::classify(mean),
            mean: round3(mean),
            scores,
        })
    }
}

/// Whether `name` marks an enzyme-bias control motif (case-sensitive).
pub fn is_control_motif(name: &str) -> bool {
    CONTROL_MARKERS.iter().any(|marker| name.contains(marker))
}

/// The `window` positions around the midpoint of `profile`, clipped to its
/// bounds.
pub fn central_window<'a>(profile: &ArrayView1<'a, f64>, window: usize) -> ArrayView1<'a, f64> {
    let mid = profile.len() / 2;
    let lo = mid.saturating_sub(window / 2);
    let hi = (mid + window / 2).min(profile.len());
    profile.slice_move(s![lo..hi])
}

/// Maximum of the central `window` positions of `profile`, rounded to 3
/// decimals.
///
/// # Errors
/// * `FootprintError::InvalidParameter` if the central window is empty
pub fn central_peak_score(profile: &ArrayView1<f64>, window: usize) -> Result<f64> {
    let central = central_window(profile, window);
    if central.is_empty() {
        return Err(FootprintError::invalid_parameter(
            "control_window",
            window,
            format!("no positions to score in a profile of length {}", profile.len()),
        ));
    }
    let peak = central.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    Ok(round3(peak))
}

/// Computes footprints for every motif in `motifs`, in order, and scores the
/// control motifs among them.
///
/// Any failure aborts the run; the error names the motif responsible.
/// Motif names must be unique.
///
/// # Errors
/// * `FootprintError::InvalidParameter` if `batch_size` or `control_window` is zero
/// * `FootprintError::DuplicateMotif` if a motif name repeats
pub fn aggregate<P: ProfilePredictor + ?Sized>(
    background: &ArrayView3<f32>,
    motifs: &[Motif],
    predictor: &P,
    config: &FootprintConfig,
) -> Result<FootprintReport> {
    if config.batch_size == 0 {
        return Err(FootprintError::invalid_parameter(
            "batch_size",
            config.batch_size,
            "must be at least 1",
        ));
    }
    if config.control_window == 0 {
        return Err(FootprintError::invalid_parameter(
            "control_window",
            config.control_window,
            "must be at least 1",
        ));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = motifs.iter().find(|m| !seen.insert(m.name.as_str())) {
        return Err(FootprintError::DuplicateMotif(dup.name.clone()));
    }

    let mut report = FootprintReport::default();

    for (idx, motif) in motifs.iter().enumerate() {
        log::info!(
            "inserting motif {} ({}) [{}/{}]",
            motif.name,
            motif.sequence,
            idx + 1,
            motifs.len()
        );

        let footprint =
            footprint_for_motif(background, &motif.sequence, predictor, config.batch_size)
                .map_err(|e| e.for_motif(&motif.name))?;

        if is_control_motif(&motif.name) {
            let score = central_peak_score(&footprint.profile.view(), config.control_window)
                .map_err(|e| e.for_motif(&motif.name))?;
            log::debug!("control motif {} central peak {}", motif.name, score);
            report.control_scores.push(ControlScore {
                name: motif.name.clone(),
                score,
            });
        }

        report.footprints.push(MotifFootprint {
            name: motif.name.clone(),
            footprint,
        });
    }

    Ok(report)
}

/// Rounds half to even at 3 decimals
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

/// Formats a float with at least one fractional digit (`0.0`, `0.004`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
