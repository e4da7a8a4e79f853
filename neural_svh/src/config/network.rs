//! Neural network configuration types.

use burn::config::Config;
use burn::prelude::Backend;

use crate::error::{NeuralSvhError, Result as SvhResult};
use crate::nn::{Aggregation, MultiscalePointDecoder, PointEncoder};

/// Configuration for the point encoder.
#[derive(Config, Debug)]
pub struct PointEncoderConfig {
    /// Width of the per-point input: 3 for positions only, `3 + F` with point features.
    pub dim: usize,

    /// Width of the per-voxel latent code.
    #[config(default = 32)]
    pub c_dim: usize,

    /// Hidden width of the residual blocks.
    #[config(default = 32)]
    pub hidden_dim: usize,

    /// Number of residual blocks (pooling stages = `n_blocks - 1`).
    #[config(default = 3)]
    pub n_blocks: usize,
}

impl PointEncoderConfig {
    /// Initialize a [`PointEncoder`].
    pub fn init<B: Backend>(&self, device: &B::Device) -> SvhResult<PointEncoder<B>> {
        PointEncoder::new(self, device)
    }

    /// Width of the optional per-point feature vector (`dim - 3`).
    pub fn feature_dim(&self) -> usize {
        self.dim.saturating_sub(3)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SvhResult<()> {
        if self.dim < 3 {
            return Err(NeuralSvhError::InvalidConfig {
                message: format!("encoder input dim {} must include the 3 coordinates", self.dim),
            });
        }
        if self.n_blocks == 0 {
            return Err(NeuralSvhError::InvalidConfig {
                message: "encoder needs at least one residual block".to_string(),
            });
        }
        if self.c_dim == 0 || self.hidden_dim == 0 {
            return Err(NeuralSvhError::InvalidConfig {
                message: "encoder widths must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration for the multiscale point decoder.
#[derive(Config, Debug)]
pub struct MultiscaleDecoderConfig {
    /// Latent code width of each depth.
    #[config(default = 16)]
    pub c_each_dim: usize,

    /// Number of depths sampled for features (`0..multiscale_depths`).
    #[config(default = 4)]
    pub multiscale_depths: usize,

    /// Width of the decoded field value.
    #[config(default = 1)]
    pub out_dim: usize,

    /// Hidden width of the residual stack.
    #[config(default = 32)]
    pub hidden_size: usize,

    /// Number of residual blocks.
    #[config(default = 2)]
    pub n_blocks: usize,

    /// How sampled features are combined across depths: `"cat"` or `"sum"`.
    #[config(default = "String::from(\"cat\")")]
    pub aggregation: String,

    /// When set, the output layer starts with zero weight and this constant bias.
    pub out_init: Option<f32>,

    /// Depths used for the positional encoding. Defaults to all feature depths.
    pub coords_depths: Option<Vec<usize>>,
}

impl MultiscaleDecoderConfig {
    /// Initialize a [`MultiscalePointDecoder`].
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> SvhResult<MultiscalePointDecoder<B>> {
        MultiscalePointDecoder::new(self, device)
    }

    /// Parse the aggregation mode.
    pub fn aggregation_mode(&self) -> SvhResult<Aggregation> {
        self.aggregation.parse()
    }

    /// Width of the aggregated multiscale feature.
    pub fn c_dim(&self) -> SvhResult<usize> {
        Ok(self
            .aggregation_mode()?
            .feature_dim(self.c_each_dim, self.multiscale_depths))
    }

    /// Positional encoding depths, sorted and deduplicated.
    pub fn resolved_coords_depths(&self) -> Vec<usize> {
        let mut depths = match &self.coords_depths {
            Some(depths) => depths.clone(),
            None => (0..self.multiscale_depths).collect(),
        };
        depths.sort_unstable();
        depths.dedup();
        depths
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SvhResult<()> {
        self.aggregation_mode()?;
        if self.multiscale_depths == 0 {
            return Err(NeuralSvhError::InvalidConfig {
                message: "decoder needs at least one feature depth".to_string(),
            });
        }
        if self.resolved_coords_depths().is_empty() {
            return Err(NeuralSvhError::InvalidConfig {
                message: "decoder needs at least one positional encoding depth".to_string(),
            });
        }
        if self.c_each_dim == 0 || self.hidden_size == 0 || self.out_dim == 0 {
            return Err(NeuralSvhError::InvalidConfig {
                message: "decoder widths must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_config_defaults() {
        let config = PointEncoderConfig::new(3);
        assert_eq!(config.c_dim, 32);
        assert_eq!(config.hidden_dim, 32);
        assert_eq!(config.n_blocks, 3);
        assert_eq!(config.feature_dim(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_encoder_config_validation() {
        assert!(PointEncoderConfig::new(2).validate().is_err());
        assert!(PointEncoderConfig::new(3).with_n_blocks(0).validate().is_err());
        assert_eq!(PointEncoderConfig::new(6).feature_dim(), 3);
    }

    #[test]
    fn test_decoder_config_defaults() {
        let config = MultiscaleDecoderConfig::new();
        assert_eq!(config.c_each_dim, 16);
        assert_eq!(config.multiscale_depths, 4);
        assert_eq!(config.aggregation, "cat");
        assert_eq!(config.c_dim().unwrap(), 64);
        assert_eq!(config.resolved_coords_depths(), vec![0, 1, 2, 3]);
        assert!(config.out_init.is_none());
    }

    #[test]
    fn test_decoder_config_sum_width() {
        let config = MultiscaleDecoderConfig::new().with_aggregation("sum".to_string());
        assert_eq!(config.c_dim().unwrap(), 16);
    }

    #[test]
    fn test_coords_depths_sorted() {
        let config = MultiscaleDecoderConfig::new().with_coords_depths(Some(vec![3, 0, 2, 0]));
        assert_eq!(config.resolved_coords_depths(), vec![0, 2, 3]);
    }

    #[test]
    fn test_decoder_config_rejects_unknown_aggregation() {
        let config = MultiscaleDecoderConfig::new().with_aggregation("max".to_string());
        assert!(matches!(
            config.validate(),
            Err(NeuralSvhError::UnsupportedAggregation { .. })
        ));
        assert!(config.c_dim().is_err());
    }

    #[test]
    fn test_decoder_config_rejects_zero_depths() {
        let config = MultiscaleDecoderConfig::new().with_multiscale_depths(0);
        assert!(matches!(
            config.validate(),
            Err(NeuralSvhError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_decoder_config_json_round_trip() {
        let config = MultiscaleDecoderConfig::new()
            .with_aggregation("sum".to_string())
            .with_out_init(Some(0.5))
            .with_coords_depths(Some(vec![0, 2]));

        let path = std::env::temp_dir().join("neural_svh_decoder_config.json");
        config.save(&path).unwrap();
        let loaded = MultiscaleDecoderConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.aggregation, "sum");
        assert_eq!(loaded.out_init, Some(0.5));
        assert_eq!(loaded.resolved_coords_depths(), vec![0, 2]);
        assert_eq!(loaded.c_dim().unwrap(), config.c_dim().unwrap());
    }
}
