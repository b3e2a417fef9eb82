//! Submission program configuration format.

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub model: ModelConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: Default::default(),
            model: Default::default(),
            output: Default::default(),
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

/// Held-out input options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub image_dir: PathBuf,
    pub label_file: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("data/images"),
            label_file: PathBuf::from("data/test.csv"),
        }
    }
}

/// Model loading options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub backbone: BackboneKind,
    /// Checkpoint file produced by the training program.
    pub checkpoint_file: PathBuf,
    pub image_size: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    #[serde(with = "tch_serde::serde_device")]
    pub device: Device,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backbone: BackboneKind::Resnet34,
            checkpoint_file: PathBuf::from("checkpoints/resnet34.ckpt"),
            image_size: NonZeroUsize::new(224).expect("nonzero"),
            batch_size: NonZeroUsize::new(32).expect("nonzero"),
            device: Device::cuda_if_available(),
        }
    }
}

/// Submission output options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("submissions"),
        }
    }
}
