use crate::common::*;

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianNoiseInit {
    pub prob: f64,
    /// Standard deviation of the additive noise, in `[0, 1]` pixel scale.
    pub sigma: f64,
}

impl GaussianNoiseInit {
    pub fn build(self) -> Result<GaussianNoise> {
        let Self { prob, sigma } = self;
        ensure!((0.0..=1.0).contains(&prob), "prob must lie in [0, 1]");
        ensure!(sigma > 0.0, "sigma must be positive");
        Ok(GaussianNoise { prob, sigma })
    }
}

/// Additive Gaussian pixel noise, clamped back to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    prob: f64,
    sigma: f64,
}

impl GaussianNoise {
    pub fn forward(&self, image: &Tensor) -> Result<Tensor> {
        tch::no_grad(|| {
            let mut rng = StdRng::from_entropy();
            if !rng.gen_bool(self.prob) {
                return Ok(image.shallow_clone());
            }

            let noise = image.randn_like() * self.sigma;
            Ok((image + noise).clamp(0.0, 1.0))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noisy_output_stays_in_range() {
        let noise = GaussianNoiseInit {
            prob: 1.0,
            sigma: 0.1,
        }
        .build()
        .unwrap();

        let image = Tensor::rand(&[3, 16, 16], (Kind::Float, Device::Cpu));
        let out = noise.forward(&image).unwrap();
        assert_eq!(out.size(), image.size());
        assert!(f64::from(out.min()) >= 0.0);
        assert!(f64::from(out.max()) <= 1.0);
        assert!(f64::from((&out - &image).abs().max()) > 0.0);
    }
}
