mod common;

use common::{assert_close, random_batch, WindowPredictor, ZeroPredictor};
use marginal_footprints::aggregate::{
    aggregate, central_peak_score, central_window, format_float, is_control_motif, round3,
    ControlScore, FootprintConfig, FootprintReport, Verdict, CORRECTED_THRESHOLD,
};
use marginal_footprints::error::FootprintError;
use marginal_footprints::types::{Motif, OneHotBatch};
use ndarray::Array1;

fn control_report(scores: &[f64]) -> FootprintReport {
    FootprintReport {
        footprints: Vec::new(),
        control_scores: scores
            .iter()
            .enumerate()
            .map(|(idx, &score)| ControlScore {
                name: format!("tn5_{}", idx),
                score,
            })
            .collect(),
    }
}

#[test]
fn test_verdict_boundary() {
    assert_eq!(CORRECTED_THRESHOLD, 0.006);
    assert_eq!(Verdict::classify(0.006), Verdict::Uncorrected);
    assert_eq!(Verdict::classify(0.0059), Verdict::Corrected);
    assert_eq!(Verdict::classify(0.0061), Verdict::Uncorrected);
    assert_eq!(Verdict::classify(0.0), Verdict::Corrected);
}

#[test]
fn test_control_motif_names() {
    assert!(is_control_motif("tn5_1"));
    assert!(is_control_motif("motif_dnase_3"));
    assert!(!is_control_motif("Tn5_1"));
    assert!(!is_control_motif("DNASE"));
    assert!(!is_control_motif("CTCF"));
}

#[test]
fn test_rounding_and_formatting() {
    assert_eq!(round3(0.0123456), 0.012);
    assert_eq!(round3(0.0), 0.0);
    assert_eq!(format_float(0.0), "0.0");
    assert_eq!(format_float(1.0), "1.0");
    assert_eq!(format_float(0.001), "0.001");
    assert_eq!(format_float(0.012), "0.012");
}

#[test]
fn test_central_peak_score() {
    let mut profile = Array1::<f64>::zeros(1000);
    profile[499] = 0.25;
    profile[10] = 0.9;
    profile[600] = 0.5;
    assert_eq!(central_peak_score(&profile.view(), 200).unwrap(), 0.25);
    assert_eq!(central_window(&profile.view(), 200).len(), 200);

    // wider than the profile: the whole profile is searched
    let short = Array1::from(vec![0.1, 0.3, 0.2, 0.4]);
    assert_eq!(central_peak_score(&short.view(), 200).unwrap(), 0.4);

    // nothing to score
    assert!(matches!(
        central_peak_score(&profile.view(), 0),
        Err(FootprintError::InvalidParameter { .. })
    ));
    let empty = Array1::<f64>::zeros(0);
    assert!(central_peak_score(&empty.view(), 200).is_err());
    assert_eq!(central_window(&short.view(), 200).len(), 4);
}

#[test]
fn test_quality_score_line() {
    let quality = control_report(&[0.004, 0.006]).quality().unwrap();
    assert_eq!(quality.verdict, Verdict::Corrected);
    assert_eq!(quality.mean, 0.005);
    assert_eq!(quality.to_string(), "corrected_0.005_0.004/0.006");

    let quality = control_report(&[0.006]).quality().unwrap();
    assert_eq!(quality.verdict, Verdict::Uncorrected);
    assert_eq!(quality.to_string(), "uncorrected_0.006_0.006");

    let quality = control_report(&[0.0, 0.0]).quality().unwrap();
    assert_eq!(quality.to_string(), "corrected_0.0_0.0/0.0");
}

#[test]
fn test_quality_mean_at_threshold() {
    // scores whose arithmetic mean is exactly the threshold
    for scores in [[0.001, 0.011], [0.002, 0.010], [0.005, 0.007]] {
        let quality = control_report(&scores).quality().unwrap();
        assert_eq!(quality.verdict, Verdict::Uncorrected, "{:?}", scores);
        assert_eq!(quality.mean, 0.006);
    }
    assert_eq!(
        control_report(&[0.001, 0.011]).quality().unwrap().to_string(),
        "uncorrected_0.006_0.001/0.011"
    );

    let quality = control_report(&[0.001, 0.010]).quality().unwrap();
    assert_eq!(quality.verdict, Verdict::Corrected);
}

#[test]
fn test_quality_without_controls() {
    assert!(matches!(
        control_report(&[]).quality(),
        Err(FootprintError::UndefinedAggregateScore)
    ));
}

#[test]
fn test_aggregate_end_to_end() {
    let background = OneHotBatch::zeros((10, 2114, 4));
    let motifs = vec![Motif::new("tn5_control", "GATC")];
    let model = ZeroPredictor {
        input_length: 2114,
        output_length: 1000,
    };

    let report = aggregate(&background.view(), &motifs, &model, &FootprintConfig::default()).unwrap();

    let footprint = report.get("tn5_control").unwrap();
    assert_eq!(footprint.profile.len(), 1000);
    for v in footprint.profile.iter() {
        assert_close(*v, 0.001, 1e-12);
    }
    assert_eq!(footprint.count, 0.0);

    assert_eq!(report.control_scores.len(), 1);
    assert_eq!(report.control_scores[0].score, 0.001);

    let quality = report.quality().unwrap();
    assert_eq!(quality.verdict, Verdict::Corrected);
    assert_eq!(quality.to_string(), "corrected_0.001_0.001");
}

#[test]
fn test_aggregate_short_output_is_uncorrected() {
    // 1/100 is above the threshold
    let background = OneHotBatch::zeros((3, 300, 4));
    let motifs = vec![Motif::new("dnase_control", "GATC")];
    let model = ZeroPredictor {
        input_length: 300,
        output_length: 100,
    };

    let report = aggregate(&background.view(), &motifs, &model, &FootprintConfig::default()).unwrap();
    let quality = report.quality().unwrap();
    assert_eq!(quality.verdict, Verdict::Uncorrected);
    assert_eq!(quality.to_string(), "uncorrected_0.01_0.01");
}

#[test]
fn test_aggregate_preserves_order() {
    let background = random_batch(6, 64, 2);
    let motifs = vec![
        Motif::new("CTCF", "CCACCAGGGGGCGC"),
        Motif::new("tn5_1", "GCACAGTACAGAGCTG"),
        Motif::new("AP1", "TGACTCA"),
        Motif::new("dnase_2", "TTTACGTAAA"),
    ];
    let model = WindowPredictor {
        input_length: 64,
        output_length: 32,
    };
    let config = FootprintConfig {
        batch_size: 4,
        control_window: 200,
    };

    let report = aggregate(&background.view(), &motifs, &model, &config).unwrap();

    let names: Vec<&str> = report.footprints.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["CTCF", "tn5_1", "AP1", "dnase_2"]);
    let controls: Vec<&str> = report.control_scores.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(controls, ["tn5_1", "dnase_2"]);

    for entry in &report.footprints {
        assert_eq!(entry.footprint.profile.len(), 32);
        assert_close(entry.footprint.profile.sum(), 1.0, 1e-6);
    }
    assert!(report.get("AP1").is_some());
    assert!(report.get("GATA").is_none());
}

#[test]
fn test_aggregate_aborts_on_bad_motif() {
    let background = random_batch(2, 16, 4);
    let motifs = vec![
        Motif::new("short", "GATA"),
        Motif::new("too_long", "ACGTACGTACGTACGTACGT"),
        Motif::new("never_reached", "GATA"),
    ];
    let model = WindowPredictor {
        input_length: 16,
        output_length: 8,
    };

    let err = aggregate(&background.view(), &motifs, &model, &FootprintConfig::default()).unwrap_err();
    match err {
        FootprintError::Motif { name, source } => {
            assert_eq!(name, "too_long");
            assert!(matches!(*source, FootprintError::InvalidMotifLength { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_aggregate_rejects_duplicates_and_empty_background() {
    let model = ZeroPredictor {
        input_length: 16,
        output_length: 8,
    };
    let background = random_batch(2, 16, 4);
    let motifs = vec![Motif::new("tn5", "GATC"), Motif::new("tn5", "GGCC")];
    assert!(matches!(
        aggregate(&background.view(), &motifs, &model, &FootprintConfig::default()),
        Err(FootprintError::DuplicateMotif(name)) if name == "tn5"
    ));

    let empty = OneHotBatch::zeros((0, 16, 4));
    let err = aggregate(&empty.view(), &[Motif::new("tn5", "GATC")], &model, &FootprintConfig::default())
        .unwrap_err();
    assert!(matches!(err, FootprintError::Motif { ref source, .. } if matches!(**source, FootprintError::EmptyBatch)));
}

#[test]
fn test_aggregate_rejects_invalid_config() {
    let model = ZeroPredictor {
        input_length: 16,
        output_length: 8,
    };
    let background = random_batch(2, 16, 4);
    let motifs = vec![Motif::new("tn5", "GATC")];

    let no_window = FootprintConfig {
        control_window: 0,
        ..FootprintConfig::default()
    };
    assert!(matches!(
        aggregate(&background.view(), &motifs, &model, &no_window),
        Err(FootprintError::InvalidParameter { ref name, .. }) if name == "control_window"
    ));

    // rejected even with nothing to footprint
    let no_batch = FootprintConfig {
        batch_size: 0,
        ..FootprintConfig::default()
    };
    assert!(matches!(
        aggregate(&background.view(), &[], &model, &no_batch),
        Err(FootprintError::InvalidParameter { ref name, .. }) if name == "batch_size"
    ));
}

#[test]
fn test_aggregate_rejects_empty_control_profile() {
    let model = ZeroPredictor {
        input_length: 16,
        output_length: 0,
    };
    let background = random_batch(2, 16, 4);
    let err = aggregate(
        &background.view(),
        &[Motif::new("dnase_1", "GATC")],
        &model,
        &FootprintConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FootprintError::Motif { ref name, .. } if name == "dnase_1"));
}
