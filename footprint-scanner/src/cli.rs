use clap::{ArgAction, Parser};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use marginal_footprints::motifs::Assay;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "footprint-scanner",
    about = "Computes marginal footprints of motifs inserted into background sequences",
    long_about = "Inserts each motif of a motif table at the center of background sequences taken from \
                  test-chromosome peaks, predicts profiles for both orientations, and averages them into \
                  one footprint per motif. Tn5/DNase control motifs are scored to decide whether the \
                  model is bias-corrected.",
    version,
    after_help = "Example usage:\n    \
                  footprint-scanner -g hg38.fa -r peaks.narrowPeak -f fold_0.json -m motifs.meme -o out/model -a ATAC\n    \
                  footprint-scanner -g hg38.fa -r peaks.narrowPeak -f fold_0.json -m motifs.meme -o out/model -a TF -p motifs.tsv",
    color = clap::ColorChoice::Always
)]
pub struct Args {
    /// Genome FASTA (optionally gzip-compressed)
    #[arg(short = 'g', long = "genome", value_name = "FASTA", value_parser = check_file_exists)]
    pub genome: PathBuf,

    /// 10 column narrowPeak file; windows are centered at start (2nd col) + summit (10th col)
    #[arg(short = 'r', long = "regions", value_name = "PEAKS", value_parser = check_file_exists)]
    pub regions: PathBuf,

    /// JSON file of chromosome splits; only the test chromosomes are used
    #[arg(short = 'f', long = "chr-fold-path", value_name = "JSON", value_parser = check_file_exists)]
    pub chr_fold_path: PathBuf,

    /// MEME file of motifs driving the occupancy model
    #[arg(short = 'm', long = "model", value_name = "MEME", value_parser = check_file_exists)]
    pub model: PathBuf,

    /// Input batch size for the model
    #[arg(short = 'b', long = "batch-size", default_value = "64", value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: u64,

    /// Output prefix
    #[arg(short = 'o', long = "output-prefix", value_name = "PREFIX")]
    pub output_prefix: String,

    /// Assay the model was trained on
    #[arg(short = 'a', long = "assay", value_parser = parse_assay)]
    pub assay: Assay,

    /// TSV of motif names and motif strings; defaults to motif_to_pwm.<ASSAY>.tsv in the data directory
    #[arg(short = 'p', long = "motifs-to-pwm", value_name = "TSV", value_parser = check_file_exists)]
    pub motifs_to_pwm: Option<PathBuf>,

    /// Directory holding the default motif tables [env: MARGINAL_FOOTPRINTS_DATA, default: ./data]
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Lower and upper y-limits of the footprint plots; autodetermined if unset
    #[arg(long = "ylim", num_args = 2, value_names = ["LOW", "HIGH"])]
    pub ylim: Option<Vec<f64>>,

    /// Model input length
    #[arg(long = "input-length", default_value = "2114")]
    pub input_length: usize,

    /// Model output length
    #[arg(long = "output-length", default_value = "1000")]
    pub output_length: usize,

    /// Chemical potential of the occupancy model, in kT
    #[arg(long = "mu", default_value = "9.0")]
    pub mu: f64,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbosity: u8,
}

impl Args {
    pub fn ylim(&self) -> Option<(f64, f64)> {
        match self.ylim.as_deref() {
            Some([low, high]) => Some((*low, *high)),
            _ => None,
        }
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf, String> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}

fn parse_assay(s: &str) -> Result<Assay, String> {
    s.parse::<Assay>().map_err(|e| e.to_string())
}

pub fn init_verbose(args: &Args) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}
