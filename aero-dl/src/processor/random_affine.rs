use crate::common::*;

/// Minimum side of an augmented box in ratio units. Draws that collapse
/// the box below this fall back to the untransformed pair.
const MIN_BOX_SIZE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct RandomAffineInit {
    pub horizontal_flip: bool,
    /// Uniform scale range `(min, max)`.
    pub scale: Option<(f64, f64)>,
    /// Maximum translation in ratio units, both axes.
    pub translation: Option<f64>,
}

impl RandomAffineInit {
    pub fn build(self) -> Result<RandomAffine> {
        let Self {
            horizontal_flip,
            scale,
            translation,
        } = self;

        if let Some((lo, up)) = scale {
            ensure!(lo > 0.0, "scale min must be positive");
            ensure!(lo < up, "scale min must be less than scale max");
        }
        if let Some(max) = translation {
            ensure!(max > 0.0, "translation must be positive");
        }

        Ok(RandomAffine {
            horizontal_flip,
            scale,
            translation,
        })
    }
}

/// Random flip plus scale/translate, applied consistently to the image
/// and its box.
#[derive(Debug, Clone)]
pub struct RandomAffine {
    horizontal_flip: bool,
    scale: Option<(f64, f64)>,
    translation: Option<f64>,
}

impl RandomAffine {
    pub fn forward(&self, image: &Tensor, bbox: &RatioTlbr) -> Result<(Tensor, RatioTlbr)> {
        tch::no_grad(|| {
            let mut rng = StdRng::from_entropy();

            let (image, bbox) = if self.horizontal_flip && rng.gen::<bool>() {
                (image.flip(&[2]), bbox.hflip())
            } else {
                (image.shallow_clone(), *bbox)
            };

            let scale = match self.scale {
                Some((lo, up)) => rng.gen_range(lo..up),
                None => 1.0,
            };
            let (ty, tx) = match self.translation {
                Some(max) => (rng.gen_range(-max..max), rng.gen_range(-max..max)),
                None => (0.0, 0.0),
            };
            if scale == 1.0 && ty == 0.0 && tx == 0.0 {
                return Ok((image, bbox));
            }

            let transform = Transform::scale_translate(scale, ty, tx);
            let new_bbox = bbox
                .transform(&transform)
                .and_then(|moved| moved.clamp_to_unit());
            let new_bbox = match new_bbox {
                Ok(moved) if moved.h() >= MIN_BOX_SIZE && moved.w() >= MIN_BOX_SIZE => moved,
                // the draw pushed the box out of frame; keep the original
                _ => return Ok((image, bbox)),
            };

            let new_image = Self::warp_image(&image, scale, ty, tx)?;
            Ok((new_image, new_bbox))
        })
    }

    /// Apply `out = scale * in + t` (in ratio coordinates) to the image
    /// pixels. The sampling grid uses the inverse mapping.
    fn warp_image(image: &Tensor, scale: f64, ty: f64, tx: f64) -> Result<Tensor> {
        let (channels, height, width) = image.size3()?;

        let theta: [f32; 6] = [
            (1.0 / scale) as f32,
            0.0,
            ((1.0 - 2.0 * tx) / scale - 1.0) as f32,
            0.0,
            (1.0 / scale) as f32,
            ((1.0 - 2.0 * ty) / scale - 1.0) as f32,
        ];
        let theta = Tensor::of_slice(&theta)
            .view([1, 2, 3])
            .to_device(image.device());

        let grid = Tensor::affine_grid_generator(&theta, &[1, channels, height, width], false);
        let warped = image
            .view([1, channels, height, width])
            .grid_sampler(&grid, 0, 0, false)
            .view([channels, height, width]);

        Ok(warped)
    }
}
