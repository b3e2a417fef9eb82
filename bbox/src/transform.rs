use crate::Tlbr;

/// Axis-aligned scale-and-translate transform applied to boxes.
///
/// The same transform an augmentation applies to image pixels is applied
/// here to box corners, keeping the pair geometrically consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sy: f64,
    pub sx: f64,
    pub ty: f64,
    pub tx: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            sy: 1.0,
            sx: 1.0,
            ty: 0.0,
            tx: 0.0,
        }
    }

    /// The transform mapping `src` onto `tgt`.
    pub fn from_rects<U>(src: &Tlbr<U>, tgt: &Tlbr<U>) -> Self {
        let sy = tgt.h() / src.h();
        let sx = tgt.w() / src.w();
        let ty = tgt.t() - src.t() * sy;
        let tx = tgt.l() - src.l() * sx;
        Self { sy, sx, ty, tx }
    }

    pub fn scale_translate(scale: f64, ty: f64, tx: f64) -> Self {
        Self {
            sy: scale,
            sx: scale,
            ty,
            tx,
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            sy: 1.0 / self.sy,
            sx: 1.0 / self.sx,
            ty: -self.ty / self.sy,
            tx: -self.tx / self.sx,
        }
    }

    /// Compose with another transform; `self` applies after `rhs`.
    pub fn compose(&self, rhs: &Self) -> Self {
        Self {
            sy: self.sy * rhs.sy,
            sx: self.sx * rhs.sx,
            ty: rhs.ty * self.sy + self.ty,
            tx: rhs.tx * self.sx + self.tx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RatioTlbr;
    use approx::assert_abs_diff_eq;

    #[test]
    fn inverse_round_trips() {
        let orig = Transform {
            sy: 2.0,
            sx: 2.0,
            ty: 1.0,
            tx: 1.0,
        };
        let double = orig.inverse().inverse();
        assert_abs_diff_eq!(double.sy, orig.sy);
        assert_abs_diff_eq!(double.sx, orig.sx);
        assert_abs_diff_eq!(double.ty, orig.ty);
        assert_abs_diff_eq!(double.tx, orig.tx);
    }

    #[test]
    fn from_rects_maps_src_onto_tgt() {
        let src = RatioTlbr::try_from_ratio_tlbr(0.0, 0.0, 1.0, 1.0).unwrap();
        let tgt = RatioTlbr::try_from_ratio_tlbr(0.25, 0.25, 0.75, 0.75).unwrap();
        let transform = Transform::from_rects(&src, &tgt);
        let mapped = src.transform(&transform).unwrap();
        assert_abs_diff_eq!(mapped.t(), tgt.t());
        assert_abs_diff_eq!(mapped.l(), tgt.l());
        assert_abs_diff_eq!(mapped.b(), tgt.b());
        assert_abs_diff_eq!(mapped.r(), tgt.r());
    }

    #[test]
    fn transform_then_inverse_restores_box() {
        let boxed = RatioTlbr::try_from_ratio_tlbr(0.2, 0.3, 0.6, 0.7).unwrap();
        let transform = Transform::scale_translate(0.8, 0.05, -0.02);
        let forward = boxed.transform(&transform).unwrap();
        let back = forward.transform(&transform.inverse()).unwrap();
        assert_abs_diff_eq!(back.t(), boxed.t(), epsilon = 1e-9);
        assert_abs_diff_eq!(back.l(), boxed.l(), epsilon = 1e-9);
        assert_abs_diff_eq!(back.b(), boxed.b(), epsilon = 1e-9);
        assert_abs_diff_eq!(back.r(), boxed.r(), epsilon = 1e-9);
    }
}
