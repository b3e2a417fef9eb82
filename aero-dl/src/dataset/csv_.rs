use super::{CsvSample, FileRecord, TestSample, SOURCE_IMAGE_SIZE};
use crate::{classes, common::*};

/// The labeled aircraft dataset backed by a CSV label file.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    pub records: Vec<Arc<FileRecord>>,
}

impl CsvDataset {
    pub async fn load(
        image_dir: impl AsRef<Path>,
        label_file: impl AsRef<Path>,
    ) -> Result<Self> {
        let image_dir = image_dir.as_ref().to_owned();
        let label_file = label_file.as_ref().to_owned();
        let records =
            tokio::task::spawn_blocking(move || load_records(&image_dir, &label_file)).await??;
        Ok(Self { records })
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }
}

fn load_records(image_dir: &Path, label_file: &Path) -> Result<Vec<Arc<FileRecord>>> {
    let samples: Vec<CsvSample> = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(label_file)
        .with_context(|| format!("failed to open label file '{}'", label_file.display()))?
        .deserialize()
        .try_collect()?;
    ensure!(
        !samples.is_empty(),
        "label file '{}' contains no samples",
        label_file.display()
    );

    let records: Vec<_> = samples
        .iter()
        .map(|sample| -> Result<_> {
            let record = sample_to_record(image_dir, sample)?;
            ensure!(
                record.path.is_file(),
                "the image file '{}' does not exist",
                record.path.display()
            );
            let imagesize::ImageSize { width, height } = imagesize::size(&record.path)?;
            ensure!(
                width as f64 == SOURCE_IMAGE_SIZE.w() && height as f64 == SOURCE_IMAGE_SIZE.h(),
                "image '{}' is {}x{}, but labels assume {}x{}",
                record.path.display(),
                width,
                height,
                SOURCE_IMAGE_SIZE.w(),
                SOURCE_IMAGE_SIZE.h()
            );
            Ok(Arc::new(record))
        })
        .try_collect()?;

    info!(
        "loaded {} records from '{}'",
        records.len(),
        label_file.display()
    );
    Ok(records)
}

/// Convert a CSV row into a label record, normalizing the box to ratio
/// units relative to the fixed source-image dimensions.
pub fn sample_to_record(image_dir: &Path, sample: &CsvSample) -> Result<FileRecord> {
    let CsvSample {
        ref filename,
        ref class,
        xmin,
        ymin,
        xmax,
        ymax,
    } = *sample;

    let class_id = classes::class_index(class)
        .with_context(|| format!("bad class in row for '{}'", filename))?;
    let bbox = PixelTlbr::try_from_tlbr(ymin, xmin, ymax, xmax)
        .and_then(|pixel| pixel.to_ratio(&SOURCE_IMAGE_SIZE))
        .with_context(|| format!("bad box in row for '{}'", filename))?;

    Ok(FileRecord {
        path: image_dir.join(filename),
        filename: filename.clone(),
        class_id,
        bbox,
    })
}

/// Load the held-out filenames from `test.csv`, in file order.
pub fn load_test_filenames(
    image_dir: impl AsRef<Path>,
    label_file: impl AsRef<Path>,
) -> Result<Vec<(String, PathBuf)>> {
    let image_dir = image_dir.as_ref();
    let label_file = label_file.as_ref();

    let samples: Vec<TestSample> = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(label_file)
        .with_context(|| format!("failed to open label file '{}'", label_file.display()))?
        .deserialize()
        .try_collect()?;

    samples
        .into_iter()
        .map(|TestSample { filename }| {
            let path = image_dir.join(&filename);
            ensure!(
                path.is_file(),
                "the image file '{}' does not exist",
                path.display()
            );
            Ok((filename, path))
        })
        .try_collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn parse_rows(text: &str) -> Vec<CsvSample> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes())
            .deserialize()
            .try_collect()
            .unwrap()
    }

    #[test]
    fn row_normalization() {
        let rows = parse_rows(
            "filename,class,xmin,ymin,xmax,ymax\n\
             img_0001.jpg,F16,100,200,300,400\n",
        );
        let record = sample_to_record(Path::new("images"), &rows[0]).unwrap();

        assert_eq!(record.class_id, 3);
        assert_eq!(record.path, Path::new("images").join("img_0001.jpg"));
        assert_abs_diff_eq!(record.bbox.l(), 0.078125);
        assert_abs_diff_eq!(record.bbox.t(), 200.0 / 720.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.bbox.r(), 0.234375);
        assert_abs_diff_eq!(record.bbox.b(), 400.0 / 720.0, epsilon = 1e-9);
    }

    #[test]
    fn inverted_box_is_rejected() {
        let rows = parse_rows(
            "filename,class,xmin,ymin,xmax,ymax\n\
             img_0001.jpg,F16,300,200,100,400\n",
        );
        assert!(sample_to_record(Path::new("images"), &rows[0]).is_err());
    }

    #[test]
    fn out_of_image_box_is_rejected() {
        let rows = parse_rows(
            "filename,class,xmin,ymin,xmax,ymax\n\
             img_0001.jpg,F16,100,200,1300,400\n",
        );
        assert!(sample_to_record(Path::new("images"), &rows[0]).is_err());
    }

    #[test]
    fn unknown_class_is_rejected() {
        let rows = parse_rows(
            "filename,class,xmin,ymin,xmax,ymax\n\
             img_0001.jpg,SU57,100,200,300,400\n",
        );
        assert!(sample_to_record(Path::new("images"), &rows[0]).is_err());
    }
}
