use super::{
    Backbone, BackboneKind, BoxRegressionHead, BoxRegressionHeadInit, ClassificationHead,
    ClassificationHeadInit,
};
use crate::common::*;

#[derive(Debug, Clone)]
pub struct MultiTaskModelInit {
    pub backbone: BackboneKind,
    pub image_size: usize,
    pub num_classes: usize,
}

impl MultiTaskModelInit {
    pub fn build<'p, P>(self, path: P) -> Result<MultiTaskModel>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            backbone,
            image_size,
            num_classes,
        } = self;

        let backbone = backbone.build(path / "backbone", image_size)?;
        let feature_dim = backbone.feature_dim();
        let class_head = ClassificationHeadInit::new(feature_dim, num_classes as i64)
            .build(path / "class_head")?;
        let box_head = BoxRegressionHeadInit::new(feature_dim).build(path / "box_head")?;

        Ok(MultiTaskModel {
            backbone,
            class_head,
            box_head,
            image_size: image_size as i64,
        })
    }
}

/// Shared feature extractor feeding two independent prediction heads.
#[derive(Debug)]
pub struct MultiTaskModel {
    backbone: Backbone,
    class_head: ClassificationHead,
    box_head: BoxRegressionHead,
    image_size: i64,
}

/// Per-batch model predictions.
#[derive(Debug)]
pub struct ModelOutput {
    /// `[batch, num_classes]` raw logits.
    pub class_logits: Tensor,
    /// `[batch, 4]` ratio TLBR box, each component in `(0, 1)`.
    pub bboxes: Tensor,
}

impl MultiTaskModel {
    pub fn backbone_kind(&self) -> BackboneKind {
        self.backbone.kind()
    }

    pub fn forward_t(&self, input: &Tensor, train: bool) -> Result<ModelOutput> {
        let (_batch, channels, height, width) = input.size4()?;
        ensure!(
            channels == 3 && height == self.image_size && width == self.image_size,
            "expect input of shape [batch, 3, {}, {}], but got {:?}",
            self.image_size,
            self.image_size,
            input.size()
        );

        let features = self.backbone.forward_t(input, train);
        let class_logits = self.class_head.forward_t(&features, train);
        let bboxes = self.box_head.forward_t(&features, train);

        Ok(ModelOutput {
            class_logits,
            bboxes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::NUM_CLASSES;

    #[test]
    fn forward_shapes_and_box_bounds() {
        let vs = nn::VarStore::new(Device::Cpu);
        let model = MultiTaskModelInit {
            backbone: BackboneKind::Scratch,
            image_size: 64,
            num_classes: NUM_CLASSES,
        }
        .build(&vs.root())
        .unwrap();

        let input = Tensor::rand(&[2, 3, 64, 64], (Kind::Float, Device::Cpu));
        let output = model.forward_t(&input, false).unwrap();

        assert_eq!(output.class_logits.size(), &[2, NUM_CLASSES as i64]);
        assert_eq!(output.bboxes.size(), &[2, 4]);
        assert!(f64::from(output.bboxes.min()) > 0.0);
        assert!(f64::from(output.bboxes.max()) < 1.0);
    }

    #[test]
    fn wrong_input_shape_is_rejected() {
        let vs = nn::VarStore::new(Device::Cpu);
        let model = MultiTaskModelInit {
            backbone: BackboneKind::Scratch,
            image_size: 64,
            num_classes: NUM_CLASSES,
        }
        .build(&vs.root())
        .unwrap();

        let input = Tensor::rand(&[2, 3, 32, 32], (Kind::Float, Device::Cpu));
        assert!(model.forward_t(&input, false).is_err());
    }
}
