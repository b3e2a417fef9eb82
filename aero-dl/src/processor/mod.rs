//! Paired image/box augmentation processors.

mod augment;
mod color_jitter;
mod gaussian_noise;
mod random_affine;
mod random_erasing;

pub use augment::*;
pub use color_jitter::*;
pub use gaussian_noise::*;
pub use random_affine::*;
pub use random_erasing::*;
