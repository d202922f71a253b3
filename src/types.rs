use ndarray::{Array1, Array2, Array3};
use std::collections::HashMap;

/// One-hot encoded DNA window, shape (length, 4) with channels A, C, G, T
pub type OneHot = Array2<f32>;

/// Batch of one-hot windows sharing one length, shape (n, length, 4)
pub type OneHotBatch = Array3<f32>;

/// Chromosome name to sequence
pub type Genome = HashMap<String, String>;

/// Represents a Position Weight Matrix (PWM)
/// Stored as an array of shape (width, 4) with columns A, C, G, T
pub type PWM = Array2<f64>;

/// Collection of PWMs in file order
pub type PWMCollection = Vec<(String, PWM)>;

/// Represents an Energy Weight Matrix (EWM), ddG values in kJ/mol
/// Stored as an array of shape (width, 4) with columns A, C, G, T
pub type EWM = Array2<f64>;

/// Collection of EWMs in file order
pub type EWMCollection = Vec<(String, EWM)>;

/// A named motif to insert, forward strand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Motif {
    pub name: String,
    pub sequence: String,
}

impl Motif {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Motif {
            name: name.into(),
            sequence: sequence.into(),
        }
    }
}

/// Model output for a batch: profile logits (n, output_length) and
/// log-total-counts (n)
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub logits: Array2<f64>,
    pub log_counts: Array1<f64>,
}

/// Marginal footprint of a single motif
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    /// Position-wise distribution over the model output window, sums to 1
    pub profile: Array1<f64>,
    /// Mean expected total count, forward plus reverse-complement
    pub count: f64,
}
