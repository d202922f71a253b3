use crate::aggregate::{FootprintReport, MotifFootprint, QualityScore};
use crate::error::{FootprintError, Result};
use crate::types::Footprint;
use bitcode::{Decode, Encode};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{Array1, ArrayView1};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const PLOT_WIDTH: f64 = 640.0;
const PLOT_HEIGHT: f64 = 480.0;
const PLOT_PADDING: f64 = 48.0;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
struct StoredFootprint {
    name: String,
    profile: Vec<f64>,
    count: f64,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
struct StoredFootprints {
    footprints: Vec<StoredFootprint>,
}

/// `<prefix>_footprints_score.txt`
pub fn score_path(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{}_footprints_score.txt", prefix))
}

/// `<prefix>_footprints.bin.gz`
pub fn footprints_path(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{}_footprints.bin.gz", prefix))
}

/// `<prefix>.<motif>.footprint.svg`
pub fn plot_path(prefix: &str, motif: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}.footprint.svg", prefix, motif))
}

/// Writes the one-line quality score, without a trailing newline.
pub fn write_score_file(prefix: &str, quality: &QualityScore) -> Result<PathBuf> {
    let path = score_path(prefix);
    let mut file = File::create(&path)?;
    write!(file, "{}", quality)?;
    Ok(path)
}

/// Saves every footprint and count, in report order, as gzip-compressed
/// bitcode.
pub fn write_footprints(prefix: &str, report: &FootprintReport) -> Result<PathBuf> {
    let stored = StoredFootprints {
        footprints: report
            .footprints
            .iter()
            .map(|entry| StoredFootprint {
                name: entry.name.clone(),
                profile: entry.footprint.profile.to_vec(),
                count: entry.footprint.count,
            })
            .collect(),
    };

    let path = footprints_path(prefix);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(&path)?), Compression::default());
    encoder.write_all(&bitcode::encode(&stored))?;
    encoder.finish()?.flush()?;
    Ok(path)
}

/// Loads footprints written by [`write_footprints`].
pub fn read_footprints(path: impl AsRef<Path>) -> Result<Vec<MotifFootprint>> {
    let mut bytes = Vec::new();
    GzDecoder::new(BufReader::new(File::open(path)?)).read_to_end(&mut bytes)?;
    let stored: StoredFootprints =
        bitcode::decode(&bytes).map_err(|e| FootprintError::Decode(e.to_string()))?;

    Ok(stored
        .footprints
        .into_iter()
        .map(|entry| MotifFootprint {
            name: entry.name,
            footprint: Footprint {
                profile: Array1::from(entry.profile),
                count: entry.count,
            },
        })
        .collect())
}

/// Draws `values` as an SVG line plot.
///
/// The y-axis spans `ylim` when given, else the range of the data.
pub fn write_footprint_plot(
    path: impl AsRef<Path>,
    values: &ArrayView1<f64>,
    ylim: Option<(f64, f64)>,
) -> Result<()> {
    let (ymin, ymax) = match ylim {
        Some((low, high)) if high > low => (low, high),
        Some((low, high)) => {
            return Err(FootprintError::invalid_parameter(
                "ylim",
                format!("({}, {})", low, high),
                "upper limit must exceed lower limit",
            ))
        }
        None => data_range(values),
    };

    let span_x = (values.len().max(2) - 1) as f64;
    let inner_w = PLOT_WIDTH - 2.0 * PLOT_PADDING;
    let inner_h = PLOT_HEIGHT - 2.0 * PLOT_PADDING;
    let to_x = |i: usize| PLOT_PADDING + inner_w * i as f64 / span_x;
    let to_y = |v: f64| PLOT_PADDING + inner_h * (1.0 - (v - ymin) / (ymax - ymin));

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| format!("{:.2},{:.2}", to_x(i), to_y(v.clamp(ymin, ymax))))
        .collect();

    let mut file = BufWriter::new(File::create(path)?);
    writeln!(
        file,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        PLOT_WIDTH, PLOT_HEIGHT
    )?;
    writeln!(file, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        file,
        r#"<rect x="{p}" y="{p}" width="{w}" height="{h}" fill="none" stroke="black"/>"#,
        p = PLOT_PADDING,
        w = inner_w,
        h = inner_h
    )?;
    for (tick, y) in [(ymax, PLOT_PADDING), (ymin, PLOT_HEIGHT - PLOT_PADDING)] {
        writeln!(
            file,
            r#"<text x="{}" y="{}" font-family="monospace" font-size="11px" text-anchor="end">{:.4}</text>"#,
            PLOT_PADDING - 4.0,
            y + 4.0,
            tick
        )?;
    }
    writeln!(
        file,
        r#"<polyline fill="none" stroke="steelblue" stroke-width="1.5" points="{}"/>"#,
        points.join(" ")
    )?;
    writeln!(file, "</svg>")?;
    file.flush()?;
    Ok(())
}

fn data_range(values: &ArrayView1<f64>) -> (f64, f64) {
    let low = values.fold(f64::INFINITY, |acc, &v| acc.min(v));
    let high = values.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    if !low.is_finite() || !high.is_finite() {
        (0.0, 1.0)
    } else if high > low {
        (low, high)
    } else {
        (low - 0.5, high + 0.5)
    }
}
