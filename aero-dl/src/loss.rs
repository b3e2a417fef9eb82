//! The combined classification + box regression loss.

use crate::{common::*, model::ModelOutput};

#[derive(Debug, Clone, PartialEq)]
pub struct MultiTaskLossInit {
    pub class_weight: f64,
    pub box_weight: f64,
}

impl Default for MultiTaskLossInit {
    fn default() -> Self {
        Self {
            class_weight: 1.0,
            box_weight: 1.0,
        }
    }
}

impl MultiTaskLossInit {
    pub fn build(self) -> Result<MultiTaskLoss> {
        let Self {
            class_weight,
            box_weight,
        } = self;
        ensure!(
            class_weight > 0.0 && box_weight > 0.0,
            "loss weights must be positive"
        );
        Ok(MultiTaskLoss {
            class_weight,
            box_weight,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MultiTaskLoss {
    class_weight: f64,
    box_weight: f64,
}

/// Loss components for one batch. `total` carries the gradient.
#[derive(Debug)]
pub struct LossOutput {
    pub total: Tensor,
    pub classification: Tensor,
    pub regression: Tensor,
}

impl MultiTaskLoss {
    pub fn forward(
        &self,
        output: &ModelOutput,
        classes: &Tensor,
        bboxes: &Tensor,
    ) -> Result<LossOutput> {
        ensure!(
            output.class_logits.size()[0] == classes.size()[0]
                && output.bboxes.size() == bboxes.size(),
            "prediction/target shape mismatch"
        );

        let classification = output.class_logits.cross_entropy_for_logits(classes);
        let regression = output.bboxes.smooth_l1_loss(bboxes, Reduction::Mean, 1.0);
        let total = &classification * self.class_weight + &regression * self.box_weight;

        Ok(LossOutput {
            total,
            classification,
            regression,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_boxes_zero_the_regression_term() {
        let loss = MultiTaskLossInit::default().build().unwrap();
        let bboxes = Tensor::of_slice(&[0.1f32, 0.2, 0.5, 0.6]).view([1, 4]);
        let output = ModelOutput {
            class_logits: Tensor::of_slice(&[5.0f32, 0.0, 0.0, 0.0, 0.0, 0.0]).view([1, 6]),
            bboxes: bboxes.copy(),
        };
        let classes = Tensor::of_slice(&[0i64]);

        let result = loss.forward(&output, &classes, &bboxes).unwrap();
        assert!(f64::from(&result.regression) < 1e-9);
        assert!(f64::from(&result.classification) > 0.0);
        let total = f64::from(&result.total);
        let sum =
            f64::from(&result.classification) + f64::from(&result.regression);
        assert!((total - sum).abs() < 1e-6);
    }

    #[test]
    fn weights_scale_the_components() {
        let loss = MultiTaskLossInit {
            class_weight: 2.0,
            box_weight: 0.5,
        }
        .build()
        .unwrap();
        let output = ModelOutput {
            class_logits: Tensor::of_slice(&[0.0f32, 1.0, 0.0, 0.0, 0.0, 0.0]).view([1, 6]),
            bboxes: Tensor::of_slice(&[0.2f32, 0.2, 0.6, 0.6]).view([1, 4]),
        };
        let classes = Tensor::of_slice(&[1i64]);
        let bboxes = Tensor::of_slice(&[0.3f32, 0.3, 0.7, 0.7]).view([1, 4]);

        let result = loss.forward(&output, &classes, &bboxes).unwrap();
        let expect = 2.0 * f64::from(&result.classification)
            + 0.5 * f64::from(&result.regression);
        // total is built from the weighted components
        let reconstructed = f64::from(&result.total);
        assert!((reconstructed - expect).abs() < 1e-6);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let loss = MultiTaskLossInit::default().build().unwrap();
        let output = ModelOutput {
            class_logits: Tensor::zeros(&[2, 6], (Kind::Float, Device::Cpu)),
            bboxes: Tensor::zeros(&[2, 4], (Kind::Float, Device::Cpu)),
        };
        let classes = Tensor::of_slice(&[0i64]);
        let bboxes = Tensor::zeros(&[2, 4], (Kind::Float, Device::Cpu));
        assert!(loss.forward(&output, &classes, &bboxes).is_err());
    }
}
