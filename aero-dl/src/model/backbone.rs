use crate::common::*;

const SCRATCH_CHANNELS: i64 = 128;
const SCRATCH_DOWNSCALE: usize = 16;
pub const RESNET_FEATURE_DIM: i64 = 512;

/// Selectable feature extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackboneKind {
    /// Hand-built convolutional stack.
    Scratch,
    Resnet18,
    Resnet34,
}

impl BackboneKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scratch => "scratch",
            Self::Resnet18 => "resnet18",
            Self::Resnet34 => "resnet34",
        }
    }

    /// Whether the variant pools its feature map to a fixed-width vector
    /// internally, independent of input resolution.
    pub fn pooled(&self) -> bool {
        !matches!(self, Self::Scratch)
    }

    /// Width of the feature vector `forward_t` produces for a square
    /// input of `image_size`.
    pub fn feature_dim(&self, image_size: usize) -> Result<i64> {
        if self.pooled() {
            return Ok(RESNET_FEATURE_DIM);
        }
        ensure!(
            image_size % SCRATCH_DOWNSCALE == 0 && image_size >= SCRATCH_DOWNSCALE,
            "image size {} must be a positive multiple of {}",
            image_size,
            SCRATCH_DOWNSCALE
        );
        let cell = (image_size / SCRATCH_DOWNSCALE) as i64;
        Ok(SCRATCH_CHANNELS * cell * cell)
    }

    /// Build the feature extractor under `path`.
    ///
    /// Every variant flattens or pools to `[batch, feature_dim]` inside
    /// its own forward pass, so consumers never branch on the variant.
    pub fn build<'p, P>(self, path: P, image_size: usize) -> Result<Backbone>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let feature_dim = self.feature_dim(image_size)?;

        let net = match self {
            Self::Scratch => scratch_stack(path),
            Self::Resnet18 => nn::seq_t().add(vision::resnet::resnet18_no_final_layer(path)),
            Self::Resnet34 => nn::seq_t().add(vision::resnet::resnet34_no_final_layer(path)),
        };

        Ok(Backbone {
            kind: self,
            net,
            feature_dim,
        })
    }
}

fn conv_block<'p>(path: nn::Path<'p>, in_c: i64, out_c: i64) -> nn::SequentialT {
    nn::seq_t()
        .add(nn::conv2d(
            &path / "conv",
            in_c,
            out_c,
            3,
            nn::ConvConfig {
                padding: 1,
                ..Default::default()
            },
        ))
        .add(nn::batch_norm2d(&path / "bn", out_c, Default::default()))
        .add_fn(|xs| xs.relu())
        .add_fn(|xs| xs.max_pool2d_default(2))
}

fn scratch_stack(path: &nn::Path) -> nn::SequentialT {
    nn::seq_t()
        .add(conv_block(path / "block1", 3, 32))
        .add(conv_block(path / "block2", 32, 64))
        .add(conv_block(path / "block3", 64, 128))
        .add(conv_block(path / "block4", 128, SCRATCH_CHANNELS))
        .add_fn(|xs| xs.flat_view())
}

/// A built feature extractor producing `[batch, feature_dim]` tensors.
#[derive(Debug)]
pub struct Backbone {
    kind: BackboneKind,
    net: nn::SequentialT,
    feature_dim: i64,
}

impl Backbone {
    pub fn kind(&self) -> BackboneKind {
        self.kind
    }

    pub fn feature_dim(&self) -> i64 {
        self.feature_dim
    }
}

impl nn::ModuleT for Backbone {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        self.net.forward_t(xs, train)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_feature_dim_follows_image_size() {
        assert_eq!(
            BackboneKind::Scratch.feature_dim(224).unwrap(),
            128 * 14 * 14
        );
        assert_eq!(BackboneKind::Scratch.feature_dim(64).unwrap(), 128 * 4 * 4);
        assert!(BackboneKind::Scratch.feature_dim(50).is_err());
    }

    #[test]
    fn pooled_feature_dim_ignores_image_size() {
        assert_eq!(BackboneKind::Resnet18.feature_dim(224).unwrap(), 512);
        assert_eq!(BackboneKind::Resnet34.feature_dim(64).unwrap(), 512);
    }

    #[test]
    fn scratch_forward_shape() {
        let vs = nn::VarStore::new(Device::Cpu);
        let backbone = BackboneKind::Scratch.build(&vs.root(), 64).unwrap();
        let input = Tensor::rand(&[2, 3, 64, 64], (Kind::Float, Device::Cpu));
        let features = backbone.forward_t(&input, false);
        assert_eq!(features.size(), &[2, backbone.feature_dim()]);
    }
}
