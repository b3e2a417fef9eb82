use crate::common::*;

#[derive(Debug, Clone, PartialEq)]
pub struct RandomErasingInit {
    pub prob: f64,
    /// Erased area as a fraction of the image area, `(min, max)`.
    pub area_range: (f64, f64),
    /// Height/width ratio range of the erased rectangle.
    pub aspect_range: (f64, f64),
}

impl RandomErasingInit {
    pub fn build(self) -> Result<RandomErasing> {
        let Self {
            prob,
            area_range: (area_lo, area_up),
            aspect_range: (aspect_lo, aspect_up),
        } = self;

        ensure!((0.0..=1.0).contains(&prob), "prob must lie in [0, 1]");
        ensure!(
            0.0 < area_lo && area_lo < area_up && area_up < 1.0,
            "area_range must satisfy 0 < min < max < 1"
        );
        ensure!(
            0.0 < aspect_lo && aspect_lo < aspect_up,
            "aspect_range must satisfy 0 < min < max"
        );

        Ok(RandomErasing {
            prob,
            area_range: (area_lo, area_up),
            aspect_range: (aspect_lo, aspect_up),
        })
    }
}

/// Occlusion augmentation: fills a random rectangle with uniform noise.
/// The box label is left untouched.
#[derive(Debug, Clone)]
pub struct RandomErasing {
    prob: f64,
    area_range: (f64, f64),
    aspect_range: (f64, f64),
}

impl RandomErasing {
    pub fn forward(&self, image: &Tensor) -> Result<Tensor> {
        tch::no_grad(|| {
            let mut rng = StdRng::from_entropy();
            if !rng.gen_bool(self.prob) {
                return Ok(image.shallow_clone());
            }

            let (channels, height, width) = image.size3()?;
            let image_area = (height * width) as f64;

            for _attempt in 0..10 {
                let area = rng.gen_range(self.area_range.0..self.area_range.1) * image_area;
                let aspect = rng.gen_range(self.aspect_range.0..self.aspect_range.1);
                let erase_h = (area * aspect).sqrt().round() as i64;
                let erase_w = (area / aspect).sqrt().round() as i64;
                if erase_h < 1 || erase_w < 1 || erase_h >= height || erase_w >= width {
                    continue;
                }

                let top = rng.gen_range(0..=(height - erase_h));
                let left = rng.gen_range(0..=(width - erase_w));

                let output = image.copy();
                let noise = Tensor::rand(
                    &[channels, erase_h, erase_w],
                    (Kind::Float, image.device()),
                );
                output
                    .narrow(1, top, erase_h)
                    .narrow(2, left, erase_w)
                    .copy_(&noise);
                return Ok(output);
            }

            Ok(image.shallow_clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_on_erasing_changes_pixels() {
        let erasing = RandomErasingInit {
            prob: 1.0,
            area_range: (0.1, 0.3),
            aspect_range: (0.5, 2.0),
        }
        .build()
        .unwrap();

        let image = Tensor::zeros(&[3, 32, 32], (Kind::Float, Device::Cpu));
        let out = erasing.forward(&image).unwrap();
        assert_eq!(out.size(), image.size());
        assert!(f64::from((&out - &image).abs().max()) > 0.0);
        // the source tensor is untouched
        assert!(f64::from(image.abs().max()) == 0.0);
    }

    #[test]
    fn disabled_erasing_is_identity() {
        let erasing = RandomErasingInit {
            prob: 0.0,
            area_range: (0.1, 0.3),
            aspect_range: (0.5, 2.0),
        }
        .build()
        .unwrap();

        let image = Tensor::rand(&[3, 16, 16], (Kind::Float, Device::Cpu));
        let out = erasing.forward(&image).unwrap();
        assert!(f64::from((&out - &image).abs().max()) == 0.0);
    }
}
