//! Marginal footprinting of DNA motifs for sequence-to-profile models

pub mod aggregate;
pub mod error;
pub mod fasta;
pub mod footprint;
pub mod insert;
pub mod motifs;
pub mod occupancy;
pub mod onehot;
pub mod predictor;
pub mod regions;
pub mod report;
pub mod types;
