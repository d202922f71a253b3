use flate2::write::GzEncoder;
use flate2::Compression;
use marginal_footprints::error::FootprintError;
use marginal_footprints::fasta;
use marginal_footprints::onehot::{dna_to_one_hot, one_hot_batch, reverse_complement, reverse_complement_batch};
use ndarray::{array, s};
use std::io::Write;

#[test]
fn test_read_genome() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("genome.fa");
    std::fs::write(&path, ">chr1 assembled chromosome\nACGT\nNNac\n\n>chr2\nGG\n").unwrap();

    let genome = fasta::read_genome(&path).unwrap();
    assert_eq!(genome.len(), 2);
    assert_eq!(genome["chr1"], "ACGTNNac");
    assert_eq!(genome["chr2"], "GG");

    // test file does not exist
    let result = fasta::read_genome(dir.path().join("nonexistent.fa"));
    assert!(result.is_err());
}

#[test]
fn test_read_genome_gzip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("genome.fa.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(b">chrX\nACGTACGT\n").unwrap();
    encoder.finish().unwrap();

    let genome = fasta::read_genome(&path).unwrap();
    assert_eq!(genome["chrX"], "ACGTACGT");
}

#[test]
fn test_read_genome_invalid() {
    let dir = tempfile::tempdir().unwrap();

    let empty = dir.path().join("empty.fa");
    std::fs::write(&empty, "\n").unwrap();
    assert!(fasta::read_genome(&empty).is_err());

    let duplicated = dir.path().join("dup.fa");
    std::fs::write(&duplicated, ">chr1\nAC\n>chr1\nGT\n").unwrap();
    assert!(fasta::read_genome(&duplicated).is_err());
}

#[test]
fn test_reverse_complement() {
    // Test basic reverse complement
    let sequence = "ATCG";
    assert_eq!(reverse_complement(sequence).unwrap(), "CGAT");

    // Test longer sequence
    let sequence = "AATTCCGG";
    assert_eq!(reverse_complement(sequence).unwrap(), "CCGGAATT");

    // Test palindromic sequence
    let sequence = "GATC";
    assert_eq!(reverse_complement(sequence).unwrap(), "GATC");

    // Masked bases and lower case
    assert_eq!(reverse_complement("acNg").unwrap(), "cNgt");

    // IUPAC ambiguity codes
    assert_eq!(reverse_complement("TGASTCA").unwrap(), "TGASTCA");
    assert_eq!(reverse_complement("RYKMBD").unwrap(), "HVKMRY");

    // Test error case with invalid nucleotide
    let sequence = "ATCGX";
    assert!(reverse_complement(sequence).is_err());
}

#[test]
fn test_dna_to_one_hot() {
    let encoded = dna_to_one_hot("ACgtN");
    assert_eq!(
        encoded,
        array![
            [1.0f32, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 0.0]
        ]
    );
}

#[test]
fn test_one_hot_batch() {
    let batch = one_hot_batch(&["ACGT", "TTNA"]).unwrap();
    assert_eq!(batch.dim(), (2, 4, 4));
    assert_eq!(batch.slice(s![1, .., ..]), dna_to_one_hot("TTNA"));

    assert!(one_hot_batch(&["ACGT", "ACG"]).is_err());

    // same byte length, fewer characters
    assert!(matches!(
        one_hot_batch(&["ACGTA", "ACGé"]),
        Err(FootprintError::DataError(_))
    ));
}

#[test]
fn test_reverse_complement_batch() {
    let batch = one_hot_batch(&["AACGN", "GATCA"]).unwrap();
    let rc = reverse_complement_batch(&batch.view());

    assert_eq!(rc.slice(s![0, .., ..]), dna_to_one_hot("NCGTT"));
    assert_eq!(rc.slice(s![1, .., ..]), dna_to_one_hot("TGATC"));
    assert_eq!(reverse_complement_batch(&rc.view()), batch);
}
