use crate::common::*;

/// Source image dimensions every label coordinate refers to.
pub const SOURCE_IMAGE_HEIGHT: f64 = 720.0;
pub const SOURCE_IMAGE_WIDTH: f64 = 1280.0;

pub static SOURCE_IMAGE_SIZE: Lazy<PixelSize> = Lazy::new(|| {
    PixelSize::from_hw(SOURCE_IMAGE_HEIGHT, SOURCE_IMAGE_WIDTH).expect("fixed source size")
});

/// One row of `train.csv`. Box coordinates are in source-image pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsvSample {
    pub filename: String,
    pub class: String,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// One row of `test.csv`. Only the filename column is meaningful.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestSample {
    pub filename: String,
}

/// Label record with a normalized box, before image pixels are loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub filename: String,
    pub class_id: usize,
    /// Bounding box in ratio units relative to the source image.
    pub bbox: RatioTlbr,
}

/// A fully loaded and preprocessed sample.
#[derive(Debug)]
pub struct DataRecord {
    /// Float image tensor of shape `[3, size, size]` scaled to `[0, 1]`.
    pub image: Tensor,
    pub class_id: i64,
    pub bbox: RatioTlbr,
}

/// A collated batch of samples.
#[derive(Debug)]
pub struct Batch {
    /// `[batch, 3, size, size]` float.
    pub images: Tensor,
    /// `[batch, 4]` float, ratio TLBR order.
    pub bboxes: Tensor,
    /// `[batch]` int64 class ids.
    pub classes: Tensor,
}

impl Batch {
    pub fn from_records(records: Vec<DataRecord>) -> Result<Self> {
        ensure!(!records.is_empty(), "cannot collate an empty batch");

        let images: Vec<_> = records
            .iter()
            .map(|record| record.image.shallow_clone())
            .collect();
        let images = Tensor::stack(&images, 0);

        let box_components: Vec<f32> = records
            .iter()
            .flat_map(|record| record.bbox.tlbr().map(|val| val as f32))
            .collect();
        let bboxes = Tensor::of_slice(&box_components).view([-1, 4]);

        let class_ids: Vec<i64> = records.iter().map(|record| record.class_id).collect();
        let classes = Tensor::of_slice(&class_ids);

        Ok(Self {
            images,
            bboxes,
            classes,
        })
    }

    pub fn batch_size(&self) -> i64 {
        self.images.size()[0]
    }

    pub fn to_device(&self, device: Device) -> Self {
        Self {
            images: self.images.to_device(device),
            bboxes: self.bboxes.to_device(device),
            classes: self.classes.to_device(device),
        }
    }
}
