//! The submission program for the aircraft multi-task detector.

pub mod common;
pub mod config;

use crate::common::*;

/// One emitted submission row. Coordinates are integer pixels in the
/// source image, clamped to its bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    pub filename: String,
    pub class: String,
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

/// The entry of the submission program.
pub async fn start(config: Arc<config::Config>) -> Result<()> {
    let device = config.model.device;
    let backbone = config.model.backbone;

    // build model and load checkpoint
    info!("initializing {} model", backbone.name());
    let mut vs = nn::VarStore::new(device);
    let model = MultiTaskModelInit {
        backbone,
        image_size: config.model.image_size.get(),
        num_classes: classes::NUM_CLASSES,
    }
    .build(&vs.root())?;

    let checkpoint_file = &config.model.checkpoint_file;
    ensure!(
        checkpoint_file.is_file(),
        "checkpoint file '{}' does not exist",
        checkpoint_file.display()
    );
    info!("load checkpoint {}", checkpoint_file.display());
    vs.load(checkpoint_file)?;
    vs.freeze();

    // load held-out set
    let filenames = {
        let image_dir = config.input.image_dir.clone();
        let label_file = config.input.label_file.clone();
        tokio::task::spawn_blocking(move || load_test_filenames(&image_dir, &label_file)).await??
    };
    info!("running inference over {} images", filenames.len());

    // deterministic inference pass
    let loader = ImageLoaderInit {
        image_size: config.model.image_size.get(),
    }
    .build()?;
    let batch_size = config.model.batch_size.get();

    let batches = stream::iter(filenames)
        .par_map(None, move |(filename, path)| {
            let loader = loader.clone();
            move || -> Result<_> {
                let image = loader.load_image(&path)?;
                Ok((filename, image))
            }
        })
        .chunks(batch_size);
    futures::pin_mut!(batches);

    let mut ranked: Vec<(f64, SubmissionRecord)> = vec![];
    while let Some(results) = batches.next().await {
        let mut filenames = Vec::with_capacity(results.len());
        let mut images = Vec::with_capacity(results.len());
        for result in results {
            let (filename, image) = result?;
            filenames.push(filename);
            images.push(image);
        }

        let input = Tensor::stack(&images, 0).to_device(device);
        let output = tch::no_grad(|| model.forward_t(&input, false))?;
        ranked.extend(decode_batch(&filenames, &output)?);
    }

    // rank rows by classification confidence
    ranked.sort_by(|(lhs_conf, lhs), (rhs_conf, rhs)| {
        rhs_conf
            .partial_cmp(lhs_conf)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| lhs.filename.cmp(&rhs.filename))
    });

    // write the submission file
    tokio::fs::create_dir_all(&config.output.dir).await?;
    let output_file = config
        .output
        .dir
        .join(format!("submission_{}.csv", backbone.name()));
    {
        let mut writer = csv::Writer::from_path(&output_file)?;
        for (_confidence, record) in &ranked {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    info!(
        "wrote {} rows to {}",
        ranked.len(),
        output_file.display()
    );

    Ok(())
}

/// Turn raw model outputs into ranked submission rows.
fn decode_batch(
    filenames: &[String],
    output: &ModelOutput,
) -> Result<Vec<(f64, SubmissionRecord)>> {
    let probs = output.class_logits.softmax(-1, Kind::Float);
    let probs: Vec<f64> = Vec::from(probs.to_device(Device::Cpu).to_kind(Kind::Double).view([-1]));
    let bboxes: Vec<f64> = Vec::from(
        output
            .bboxes
            .to_device(Device::Cpu)
            .to_kind(Kind::Double)
            .view([-1]),
    );

    let num_classes = classes::NUM_CLASSES;
    filenames
        .iter()
        .enumerate()
        .map(|(index, filename)| {
            let row = &probs[index * num_classes..(index + 1) * num_classes];
            let (class_id, confidence) = row
                .iter()
                .copied()
                .enumerate()
                .max_by(|(_, lhs), (_, rhs)| {
                    lhs.partial_cmp(rhs).unwrap_or(std::cmp::Ordering::Equal)
                })
                .ok_or_else(|| format_err!("empty probability row"))?;

            let (xmin, ymin, xmax, ymax) = decode_box(&bboxes[index * 4..index * 4 + 4])?;
            let record = SubmissionRecord {
                filename: filename.clone(),
                class: classes::class_name(class_id)?.to_owned(),
                xmin,
                ymin,
                xmax,
                ymax,
            };
            Ok((confidence, record))
        })
        .collect()
}

/// Denormalize a predicted ratio box to clamped integer pixel
/// coordinates in the source image.
fn decode_box(components: &[f64]) -> Result<(i64, i64, i64, i64)> {
    let [t, l, b, r] = [components[0], components[1], components[2], components[3]];
    // sigmoid outputs carry no ordering guarantee
    let (t, b) = if t <= b { (t, b) } else { (b, t) };
    let (l, r) = if l <= r { (l, r) } else { (r, l) };

    let pixel = RatioTlbr::try_from_ratio_tlbr(t, l, b, r)
        .map(|bbox| bbox.to_pixel(&SOURCE_IMAGE_SIZE).clamp_to(&SOURCE_IMAGE_SIZE));
    let (t, l, b, r) = match pixel {
        Ok(pixel) => (pixel.t(), pixel.l(), pixel.b(), pixel.r()),
        // fully collapsed box: clamp the raw coordinates instead
        Err(_) => (
            (t * SOURCE_IMAGE_SIZE.h()).clamp(0.0, SOURCE_IMAGE_SIZE.h()),
            (l * SOURCE_IMAGE_SIZE.w()).clamp(0.0, SOURCE_IMAGE_SIZE.w()),
            (b * SOURCE_IMAGE_SIZE.h()).clamp(0.0, SOURCE_IMAGE_SIZE.h()),
            (r * SOURCE_IMAGE_SIZE.w()).clamp(0.0, SOURCE_IMAGE_SIZE.w()),
        ),
    };

    Ok((
        l.round() as i64,
        t.round() as i64,
        r.round() as i64,
        b.round() as i64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_box_is_clamped_integer_pixels() {
        let (xmin, ymin, xmax, ymax) = decode_box(&[0.278, 0.078125, 0.556, 0.234375]).unwrap();
        assert_eq!(xmin, 100);
        assert_eq!(ymin, 200);
        assert_eq!(xmax, 300);
        assert_eq!(ymax, 400);
    }

    #[test]
    fn inverted_prediction_is_reordered() {
        let (xmin, ymin, xmax, ymax) = decode_box(&[0.556, 0.234375, 0.278, 0.078125]).unwrap();
        assert!(xmin < xmax && ymin < ymax);
        assert_eq!(xmin, 100);
        assert_eq!(ymax, 400);
    }

    #[test]
    fn coordinates_stay_inside_image_bounds() {
        let (xmin, ymin, xmax, ymax) = decode_box(&[0.001, 0.001, 0.999, 0.999]).unwrap();
        assert!(xmin >= 0 && ymin >= 0);
        assert!(xmax <= 1280 && ymax <= 720);
    }
}
