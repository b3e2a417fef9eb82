//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use bbox::{PixelSize, PixelTlbr, RatioTlbr, Transform};
pub use futures::stream::{self, Stream, StreamExt as _, TryStreamExt as _};
pub use indexmap::IndexSet;
pub use itertools::Itertools;
pub use log::{info, warn};
pub use once_cell::sync::Lazy;
pub use par_stream::{ParStreamExt as _, TryParStreamExt as _};
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    borrow::Borrow,
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
pub use tch::{
    nn::{self, ModuleT as _, OptimizerConfig as _},
    vision, Device, Kind, Reduction, Tensor,
};
