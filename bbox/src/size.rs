use anyhow::{ensure, Result};

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSize {
    h: f64,
    w: f64,
}

impl PixelSize {
    pub fn from_hw(h: f64, w: f64) -> Result<Self> {
        ensure!(
            h > 0.0 && w > 0.0,
            "image size must be positive, but got {}x{}",
            h,
            w
        );
        Ok(Self { h, w })
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn w(&self) -> f64 {
        self.w
    }
}
