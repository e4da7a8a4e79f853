//! Cross-depth aggregation of sampled features.

use std::fmt;
use std::str::FromStr;

use burn::prelude::*;

use crate::error::{NeuralSvhError, Result};

/// How the decoder combines the features sampled at each depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// Concatenate along the channel axis; width grows with the depth count.
    #[default]
    Concatenate,
    /// Elementwise sum; width stays at the per-depth width.
    Sum,
}

fn nothing_to_aggregate() -> NeuralSvhError {
    NeuralSvhError::InvalidConfig {
        message: "no per-depth features to aggregate".to_string(),
    }
}

impl Aggregation {
    /// Canonical name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Concatenate => "cat",
            Aggregation::Sum => "sum",
        }
    }

    /// Width of the aggregated feature for `depths` inputs of width `c_each`.
    pub fn feature_dim(&self, c_each: usize, depths: usize) -> usize {
        match self {
            Aggregation::Concatenate => c_each * depths,
            Aggregation::Sum => c_each,
        }
    }

    /// Combine per-depth features, each of shape [M, C], in depth order.
    ///
    /// Output shape: [M, C * depths] for concatenation, [M, C] for sum.
    pub fn aggregate<B: Backend>(&self, features: Vec<Tensor<B, 2>>) -> Result<Tensor<B, 2>> {
        let expected = features.first().ok_or_else(nothing_to_aggregate)?.dims();
        if let Some(bad) = features.iter().find(|f| f.dims() != expected) {
            return Err(NeuralSvhError::ShapeMismatch {
                expected: expected.to_vec(),
                got: bad.dims().to_vec(),
            });
        }

        match self {
            Aggregation::Concatenate => Ok(Tensor::cat(features, 1)),
            Aggregation::Sum => features
                .into_iter()
                .reduce(|acc, f| acc + f)
                .ok_or_else(nothing_to_aggregate),
        }
    }
}

impl FromStr for Aggregation {
    type Err = NeuralSvhError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cat" | "concatenate" => Ok(Aggregation::Concatenate),
            "sum" => Ok(Aggregation::Sum),
            other => Err(NeuralSvhError::UnsupportedAggregation {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
