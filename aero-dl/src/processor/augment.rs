use super::{
    ColorJitter, ColorJitterInit, GaussianNoise, GaussianNoiseInit, RandomAffine,
    RandomAffineInit, RandomErasing, RandomErasingInit,
};
use crate::common::*;

/// The augmentation strategy applied during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentKind {
    /// No augmentation.
    None,
    /// Flip, mild affine, color jitter.
    Basic,
    /// Basic plus occlusion and pixel noise.
    Aggressive,
}

impl AugmentKind {
    /// Build the pipeline for this strategy; `None` yields no pipeline.
    pub fn build(self) -> Result<Option<Augment>> {
        let augment = match self {
            Self::None => None,
            Self::Basic => Some(Augment {
                affine: RandomAffineInit {
                    horizontal_flip: true,
                    scale: Some((0.9, 1.1)),
                    translation: Some(0.1),
                }
                .build()?,
                color: ColorJitterInit {
                    hue_shift: Some(0.02),
                    saturation_shift: Some(0.3),
                    value_shift: Some(0.3),
                }
                .build()?,
                erasing: None,
                noise: None,
            }),
            Self::Aggressive => Some(Augment {
                affine: RandomAffineInit {
                    horizontal_flip: true,
                    scale: Some((0.8, 1.2)),
                    translation: Some(0.15),
                }
                .build()?,
                color: ColorJitterInit {
                    hue_shift: Some(0.05),
                    saturation_shift: Some(0.5),
                    value_shift: Some(0.5),
                }
                .build()?,
                erasing: Some(
                    RandomErasingInit {
                        prob: 0.5,
                        area_range: (0.02, 0.2),
                        aspect_range: (0.5, 2.0),
                    }
                    .build()?,
                ),
                noise: Some(
                    GaussianNoiseInit {
                        prob: 0.3,
                        sigma: 0.05,
                    }
                    .build()?,
                ),
            }),
        };
        Ok(augment)
    }
}

/// A configured augmentation pipeline. Geometric steps transform the
/// image and box together; photometric steps leave the box alone.
#[derive(Debug, Clone)]
pub struct Augment {
    affine: RandomAffine,
    color: ColorJitter,
    erasing: Option<RandomErasing>,
    noise: Option<GaussianNoise>,
}

impl Augment {
    pub fn forward(&self, image: &Tensor, bbox: &RatioTlbr) -> Result<(Tensor, RatioTlbr)> {
        let (image, bbox) = self.affine.forward(image, bbox)?;
        let mut image = self.color.forward(&image)?;
        if let Some(erasing) = &self.erasing {
            image = erasing.forward(&image)?;
        }
        if let Some(noise) = &self.noise {
            image = noise.forward(&image)?;
        }
        Ok((image, bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipelines_preserve_shape_and_box_validity() {
        for kind in [AugmentKind::Basic, AugmentKind::Aggressive] {
            let augment = kind.build().unwrap().unwrap();
            let image = Tensor::rand(&[3, 64, 64], (Kind::Float, Device::Cpu));
            let bbox = RatioTlbr::try_from_ratio_tlbr(0.25, 0.25, 0.75, 0.75).unwrap();

            for _round in 0..5 {
                let (out_image, out_bbox) = augment.forward(&image, &bbox).unwrap();
                assert_eq!(out_image.size(), image.size());
                let [t, l, b, r] = out_bbox.tlbr();
                assert!(t < b && l < r);
                assert!((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&r));
            }
        }
    }

    #[test]
    fn none_kind_builds_no_pipeline() {
        assert!(AugmentKind::None.build().unwrap().is_none());
    }
}
