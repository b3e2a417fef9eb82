use super::{DataRecord, FileRecord};
use crate::{common::*, processor::Augment};

/// Per-sample image loading and preprocessing.
#[derive(Debug, Clone)]
pub struct ImageLoaderInit {
    /// Output image size in pixels; images are resized to a square of
    /// this side.
    pub image_size: usize,
}

impl ImageLoaderInit {
    pub fn build(self) -> Result<ImageLoader> {
        let Self { image_size } = self;
        ensure!(image_size > 0, "image_size must be positive");
        Ok(ImageLoader {
            image_size: image_size as i64,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ImageLoader {
    image_size: i64,
}

impl ImageLoader {
    /// Load an image as a `[3, size, size]` float tensor scaled to `[0, 1]`.
    pub fn load_image(&self, path: &Path) -> Result<Tensor> {
        tch::no_grad(|| {
            let image = vision::image::load(path)?;
            let (channels, _height, _width) = image.size3()?;
            ensure!(
                channels == 3,
                "expect 3 channels, but '{}' has {}",
                path.display(),
                channels
            );

            let resized = vision::image::resize(&image, self.image_size, self.image_size)?;
            Ok(resized
                .to_kind(Kind::Float)
                .g_div1(255.0)
                .set_requires_grad(false))
        })
    }

    /// Load a label record, applying the augmentation pipeline if one is
    /// given. The output box stays in ratio units.
    pub fn load_record(
        &self,
        record: &FileRecord,
        augment: Option<&Augment>,
    ) -> Result<DataRecord> {
        let image = self
            .load_image(&record.path)
            .with_context(|| format!("failed to load image file {}", record.path.display()))?;

        let (image, bbox) = match augment {
            Some(augment) => augment.forward(&image, &record.bbox)?,
            None => (image, record.bbox),
        };

        Ok(DataRecord {
            image,
            class_id: record.class_id as i64,
            bbox,
        })
    }
}
