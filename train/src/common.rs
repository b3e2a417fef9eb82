//! Common imports from external crates.

pub use aero_dl::{
    classes,
    dataset::{
        stratified_split, Batch, CsvDataset, DataStream, DataStreamInit, SOURCE_IMAGE_SIZE,
    },
    loss::{LossOutput, MultiTaskLoss, MultiTaskLossInit},
    metric,
    model::{BackboneKind, ModelOutput, MultiTaskModel, MultiTaskModelInit},
    processor::AugmentKind,
};
pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use chrono::Local;
pub use futures::stream::{Stream, StreamExt as _};
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};
pub use tch::{
    nn::{self, OptimizerConfig as _},
    Device, Tensor,
};
pub use tracing::{info, warn};
