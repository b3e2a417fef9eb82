//! The random color distortion algorithm.

use crate::{common::*, utils::TensorExt as _};

#[derive(Debug, Clone, PartialEq)]
pub struct ColorJitterInit {
    pub hue_shift: Option<f64>,
    pub saturation_shift: Option<f64>,
    pub value_shift: Option<f64>,
}

impl ColorJitterInit {
    pub fn build(self) -> Result<ColorJitter> {
        let Self {
            hue_shift,
            saturation_shift,
            value_shift,
        } = self;

        for (name, shift) in [
            ("hue_shift", hue_shift),
            ("saturation_shift", saturation_shift),
            ("value_shift", value_shift),
        ] {
            if let Some(shift) = shift {
                ensure!(
                    (0.0..=1.0).contains(&shift) && shift > 0.0,
                    "{} must lie in (0, 1], but got {}",
                    name,
                    shift
                );
            }
        }

        Ok(ColorJitter {
            max_hue_shift: hue_shift,
            max_saturation_shift: saturation_shift,
            max_value_shift: value_shift,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ColorJitter {
    max_hue_shift: Option<f64>,
    max_saturation_shift: Option<f64>,
    max_value_shift: Option<f64>,
}

impl ColorJitter {
    pub fn forward(&self, rgb: &Tensor) -> Result<Tensor> {
        tch::no_grad(|| -> Result<_> {
            let (channels, _height, _width) = rgb.size3()?;
            ensure!(channels == 3, "channel size must be 3, but get {}", channels);

            let mut rng = StdRng::from_entropy();

            let hsv = rgb.f_rgb_to_hsv()?;
            let mut hue = hsv.select(0, 0);
            let mut saturation = hsv.select(0, 1);
            let mut value = hsv.select(0, 2);

            if let Some(max_shift) = self.max_hue_shift {
                let shift = rng.gen_range(-max_shift..max_shift);
                hue.copy_(&(&hue + (shift + 1.0)).fmod(1.0));
            }

            if let Some(max_shift) = self.max_saturation_shift {
                let shift = rng.gen_range(-max_shift..max_shift);
                saturation.copy_(&(&saturation + shift).clamp(0.0, 1.0));
            }

            if let Some(max_shift) = self.max_value_shift {
                let shift = rng.gen_range(-max_shift..max_shift);
                value.copy_(&(&value + shift).clamp(0.0, 1.0));
            }

            hsv.f_hsv_to_rgb()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_keeps_shape_and_range() {
        let jitter = ColorJitterInit {
            hue_shift: Some(0.05),
            saturation_shift: Some(0.3),
            value_shift: Some(0.3),
        }
        .build()
        .unwrap();

        let rgb = Tensor::rand(&[3, 16, 16], (Kind::Float, Device::Cpu));
        let out = jitter.forward(&rgb).unwrap();
        assert_eq!(out.size(), rgb.size());
        assert!(f64::from(out.min()) >= -1e-4);
        assert!(f64::from(out.max()) <= 1.0 + 1e-4);
    }

    #[test]
    fn zero_shift_config_is_rejected() {
        let result = ColorJitterInit {
            hue_shift: Some(0.0),
            saturation_shift: None,
            value_shift: None,
        }
        .build();
        assert!(result.is_err());
    }
}
