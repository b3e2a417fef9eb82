//! Tensor extensions shared by the processors.

use crate::common::*;

pub trait TensorExt {
    fn f_rgb_to_hsv(&self) -> Result<Tensor>;

    fn rgb_to_hsv(&self) -> Tensor {
        self.f_rgb_to_hsv().unwrap()
    }

    fn f_hsv_to_rgb(&self) -> Result<Tensor>;

    fn hsv_to_rgb(&self) -> Tensor {
        self.f_hsv_to_rgb().unwrap()
    }
}

impl TensorExt for Tensor {
    fn f_rgb_to_hsv(&self) -> Result<Tensor> {
        let eps = 1e-4;
        let rgb = self;
        let (channels, _height, _width) = rgb.size3()?;
        ensure!(channels == 3, "channel size must be 3, but get {}", channels);

        let red = rgb.select(0, 0);
        let green = rgb.select(0, 1);
        let blue = rgb.select(0, 2);

        let (max, argmax) = rgb.max2(0, false);
        let (min, _argmin) = rgb.min2(0, false);
        let diff = &max - &min;

        let value = max;
        let saturation = (&diff / &value).where1(&value.gt(eps), &value.zeros_like());

        let case1 = value.zeros_like();
        let case2 = (&green - &blue) / &diff;
        let case3 = (&blue - &red) / &diff + 2.0;
        let case4 = (&red - &green) / &diff + 4.0;

        let hue = {
            let hue = case1.where1(
                &diff.le(eps),
                &case2.where1(&argmax.eq(0), &case3.where1(&argmax.eq(1), &case4)),
            );
            let hue = hue.where1(&hue.ge(0.0), &(&hue + 6.0));
            hue / 6.0
        };

        Ok(Tensor::stack(&[hue, saturation, value], 0))
    }

    fn f_hsv_to_rgb(&self) -> Result<Tensor> {
        let hsv = self;
        let (channels, _height, _width) = hsv.size3()?;
        ensure!(channels == 3, "channel size must be 3, but get {}", channels);

        let hue = hsv.select(0, 0);
        let saturation = hsv.select(0, 1);
        let value = hsv.select(0, 2);

        // f(n) = V - V*S*max(0, min(k, 4 - k, 1)), k = (n + 6H) mod 6
        let func = |n: f64| {
            let k = (&hue * 6.0 + n).fmod(6.0);
            &value - &value * &saturation * k.min1(&(-&k + 4.0)).clamp(0.0, 1.0)
        };

        let red = func(5.0);
        let green = func(3.0);
        let blue = func(1.0);

        Ok(Tensor::stack(&[red, green, blue], 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_round_trip_preserves_rgb() {
        let rgb = Tensor::rand(&[3, 8, 8], (Kind::Float, Device::Cpu));
        let restored = rgb.f_rgb_to_hsv().unwrap().f_hsv_to_rgb().unwrap();
        let max_err = f64::from((&restored - &rgb).abs().max());
        assert!(max_err < 1e-3, "round trip error {}", max_err);
    }

    #[test]
    fn pure_red_maps_to_zero_hue() {
        let mut components = vec![0.0f32; 3];
        components[0] = 1.0;
        let rgb = Tensor::of_slice(&components).view([3, 1, 1]);
        let hsv = rgb.f_rgb_to_hsv().unwrap();
        let hue = f64::from(hsv.select(0, 0));
        let saturation = f64::from(hsv.select(0, 1));
        let value = f64::from(hsv.select(0, 2));
        assert!(hue.abs() < 1e-6);
        assert!((saturation - 1.0).abs() < 1e-6);
        assert!((value - 1.0).abs() < 1e-6);
    }
}
