//! Common imports from external crates.

pub use aero_dl::{
    classes,
    dataset::{load_test_filenames, ImageLoader, ImageLoaderInit, SOURCE_IMAGE_SIZE},
    model::{BackboneKind, ModelOutput, MultiTaskModel, MultiTaskModelInit},
};
pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use bbox::RatioTlbr;
pub use futures::stream::{self, Stream, StreamExt as _};
pub use par_stream::ParStreamExt as _;
pub use serde::{Deserialize, Serialize};
pub use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};
pub use tch::{nn, Device, Kind, Tensor};
pub use tracing::{info, warn};
