mod cli;

use clap::Parser;
use cli::{init_verbose, Args};
use marginal_footprints::aggregate::{aggregate, central_window, FootprintConfig};
use marginal_footprints::error::FootprintError;
use marginal_footprints::fasta::read_genome;
use marginal_footprints::motifs::{data_dir, read_motif_table, resolve_motif_table};
use marginal_footprints::occupancy::{OccupancyConfig, OccupancyModel};
use marginal_footprints::predictor::ProfilePredictor;
use marginal_footprints::regions::{extract_sequences, read_chrom_splits, read_regions, select_regions};
use marginal_footprints::report::{plot_path, write_footprint_plot, write_footprints, write_score_file};
use std::fs;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum ScannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Footprint(#[from] FootprintError),
}

fn runner(args: Args) -> Result<(), ScannerError> {
    let start_time = std::time::Instant::now();

    if let Some(parent) = Path::new(&args.output_prefix).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let motif_table = resolve_motif_table(
        args.assay,
        args.motifs_to_pwm.as_deref(),
        &data_dir(args.data_dir.as_deref()),
    )?;
    log::info!("using motif table {}", motif_table.display());
    let motifs = read_motif_table(&motif_table)?;

    let model = OccupancyModel::load(
        &args.model,
        OccupancyConfig {
            input_length: args.input_length,
            output_length: args.output_length,
            mu: args.mu,
        },
    )?;
    log::info!("inferred model inputlen: {}", model.input_length());
    log::info!("inferred model outputlen: {}", model.output_length());

    let genome = read_genome(&args.genome)?;
    let test_chroms = read_chrom_splits(&args.chr_fold_path)?.test_chroms();
    let regions = select_regions(read_regions(&args.regions)?, &test_chroms);
    log::info!("{} regions on {} test chromosomes", regions.len(), test_chroms.len());
    let background = extract_sequences(&genome, &regions, model.input_length())?;

    let config = FootprintConfig {
        batch_size: args.batch_size as usize,
        ..FootprintConfig::default()
    };
    let report = aggregate(&background.view(), &motifs, &model, &config)?;

    for entry in &report.footprints {
        let window = central_window(&entry.footprint.profile.view(), config.control_window);
        write_footprint_plot(plot_path(&args.output_prefix, &entry.name), &window, args.ylim())?;
    }

    log::info!("Saving marginal footprints");
    let saved = write_footprints(&args.output_prefix, &report)?;
    log::info!("footprints written to {}", saved.display());

    let quality = report.quality()?;
    let score_file = write_score_file(&args.output_prefix, &quality)?;
    log::info!("{} ({})", quality, score_file.display());

    log::info!(
        "Total execution time: {:.4} minutes",
        start_time.elapsed().as_secs_f64() / 60.0
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_verbose(&args);
    log::info!("Running {}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if let Err(e) = runner(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
