use crate::{PixelSize, Transform};
use anyhow::{ensure, Result};
use std::marker::PhantomData;

/// Marker for boxes in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelUnit;

/// Marker for boxes in ratio coordinates relative to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioUnit;

/// Axis-aligned rectangle in TLBR order, tagged with its coordinate unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tlbr<U> {
    t: f64,
    l: f64,
    b: f64,
    r: f64,
    _unit: PhantomData<U>,
}

pub type PixelTlbr = Tlbr<PixelUnit>;
pub type RatioTlbr = Tlbr<RatioUnit>;

impl<U> Tlbr<U> {
    pub fn try_from_tlbr(t: f64, l: f64, b: f64, r: f64) -> Result<Self> {
        ensure!(
            b > t && r > l,
            "degenerate box: require t < b and l < r, but got tlbr = ({}, {}, {}, {})",
            t,
            l,
            b,
            r
        );
        Ok(Self {
            t,
            l,
            b,
            r,
            _unit: PhantomData,
        })
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn l(&self) -> f64 {
        self.l
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn h(&self) -> f64 {
        self.b - self.t
    }

    pub fn w(&self) -> f64 {
        self.r - self.l
    }

    pub fn area(&self) -> f64 {
        self.h() * self.w()
    }

    pub fn tlbr(&self) -> [f64; 4] {
        [self.t, self.l, self.b, self.r]
    }

    pub fn intersection_area_with(&self, other: &Self) -> f64 {
        let t = self.t.max(other.t);
        let l = self.l.max(other.l);
        let b = self.b.min(other.b);
        let r = self.r.min(other.r);
        if b > t && r > l {
            (b - t) * (r - l)
        } else {
            0.0
        }
    }

    /// Intersection over union. `epsilon` guards the denominator against
    /// degenerate boxes.
    pub fn iou_with(&self, other: &Self, epsilon: f64) -> f64 {
        let inter_area = self.intersection_area_with(other);
        let union_area = self.area() + other.area() - inter_area + epsilon;
        inter_area / union_area
    }

    pub fn transform(&self, transform: &Transform) -> Result<Self> {
        let t = self.t * transform.sy + transform.ty;
        let l = self.l * transform.sx + transform.tx;
        let b = self.b * transform.sy + transform.ty;
        let r = self.r * transform.sx + transform.tx;
        Self::try_from_tlbr(t, l, b, r)
    }
}

impl RatioTlbr {
    /// A ratio box additionally requires all coordinates inside the unit
    /// square.
    pub fn try_from_ratio_tlbr(t: f64, l: f64, b: f64, r: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&t)
                && (0.0..=1.0).contains(&l)
                && (0.0..=1.0).contains(&b)
                && (0.0..=1.0).contains(&r),
            "ratio box out of unit square: tlbr = ({}, {}, {}, {})",
            t,
            l,
            b,
            r
        );
        Self::try_from_tlbr(t, l, b, r)
    }

    pub fn to_pixel(&self, size: &PixelSize) -> PixelTlbr {
        Tlbr {
            t: self.t * size.h(),
            l: self.l * size.w(),
            b: self.b * size.h(),
            r: self.r * size.w(),
            _unit: PhantomData,
        }
    }

    /// Mirror the box around the vertical image axis.
    pub fn hflip(&self) -> Self {
        Tlbr {
            t: self.t,
            l: 1.0 - self.r,
            b: self.b,
            r: 1.0 - self.l,
            _unit: PhantomData,
        }
    }

    /// Clip the box to the unit square. Fails if nothing remains.
    pub fn clamp_to_unit(&self) -> Result<Self> {
        Self::try_from_ratio_tlbr(
            self.t.clamp(0.0, 1.0),
            self.l.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.r.clamp(0.0, 1.0),
        )
    }
}

impl PixelTlbr {
    pub fn to_ratio(&self, size: &PixelSize) -> Result<RatioTlbr> {
        RatioTlbr::try_from_ratio_tlbr(
            self.t / size.h(),
            self.l / size.w(),
            self.b / size.h(),
            self.r / size.w(),
        )
    }

    /// Clamp coordinates into the image bounds.
    pub fn clamp_to(&self, size: &PixelSize) -> Self {
        Tlbr {
            t: self.t.clamp(0.0, size.h()),
            l: self.l.clamp(0.0, size.w()),
            b: self.b.clamp(0.0, size.h()),
            r: self.r.clamp(0.0, size.w()),
            _unit: PhantomData,
        }
    }
}
