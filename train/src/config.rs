//! Training program configuration format.

use crate::common::*;

/// The main training configuration. Defaults reproduce the original
/// experiment constants, so an empty config file is a valid run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: Default::default(),
            model: Default::default(),
            training: Default::default(),
            logging: Default::default(),
        }
    }
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }
}

/// Dataset options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub image_dir: PathBuf,
    pub label_file: PathBuf,
    /// Fraction of each class held out for validation.
    pub val_fraction: R64,
    pub seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("data/images"),
            label_file: PathBuf::from("data/train.csv"),
            val_fraction: r64(0.25),
            seed: 42,
        }
    }
}

/// The model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub backbone: BackboneKind,
    /// Optional `.ot` weight file loaded partially into the variable
    /// store before training; only meaningful for pretrained variants.
    pub pretrained_weights: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backbone: BackboneKind::Resnet34,
            pretrained_weights: None,
        }
    }
}

/// The training options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub batch_size: NonZeroUsize,
    pub image_size: NonZeroUsize,
    pub epochs: NonZeroUsize,
    pub learning_rate: R64,
    pub augment: AugmentKind,
    /// The weighting factor of the classification loss.
    pub class_loss_weight: R64,
    /// The weighting factor of the box regression loss.
    pub box_loss_weight: R64,
    #[serde(with = "tch_serde::serde_device")]
    pub device: Device,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(32).expect("nonzero"),
            image_size: NonZeroUsize::new(224).expect("nonzero"),
            epochs: NonZeroUsize::new(24).expect("nonzero"),
            learning_rate: r64(1e-4),
            augment: AugmentKind::Basic,
            class_loss_weight: r64(1.0),
            box_loss_weight: r64(1.0),
            device: Device::cuda_if_available(),
        }
    }
}

/// Data logging options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = json5::from_str("{}").unwrap();
        assert_eq!(config.training.batch_size.get(), 32);
        assert_eq!(config.training.image_size.get(), 224);
        assert_eq!(config.training.epochs.get(), 24);
        assert_eq!(config.dataset.val_fraction, r64(0.25));
        assert_eq!(config.model.backbone, BackboneKind::Resnet34);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: Config = json5::from_str(
            r#"{ model: { backbone: "scratch" }, training: { augment: "aggressive" } }"#,
        )
        .unwrap();
        assert_eq!(config.model.backbone, BackboneKind::Scratch);
        assert_eq!(config.training.augment, AugmentKind::Aggressive);
        assert_eq!(config.training.batch_size.get(), 32);
    }
}
