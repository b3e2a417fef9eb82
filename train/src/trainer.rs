//! The epoch-based training/validation loop.

use crate::{
    common::*,
    config::Config,
    utils::{self, BestCheckpoint, RateCounter},
};

/// Run the full training schedule, checkpointing the best model by
/// validation IoU.
pub async fn run(
    config: Arc<Config>,
    checkpoint_dir: &Path,
    train_stream: DataStream,
    val_stream: DataStream,
) -> Result<()> {
    let device = config.training.device;
    info!("use device {:?}", device);

    // init model
    info!("initializing {} model", config.model.backbone.name());
    let mut vs = nn::VarStore::new(device);
    let root = vs.root();
    let model = MultiTaskModelInit {
        backbone: config.model.backbone,
        image_size: config.training.image_size.get(),
        num_classes: classes::NUM_CLASSES,
    }
    .build(&root)?;
    let loss_fn = MultiTaskLossInit {
        class_weight: config.training.class_loss_weight.raw(),
        box_weight: config.training.box_loss_weight.raw(),
    }
    .build()?;
    let mut optimizer =
        nn::Adam::default().build(&vs, config.training.learning_rate.raw())?;

    if let Some(weights_file) = &config.model.pretrained_weights {
        utils::load_pretrained(&mut vs, weights_file)?;
    }

    let epochs = config.training.epochs.get();
    let batch_size = config.training.batch_size.get();
    let mut best = BestCheckpoint::new();

    for epoch in 0..epochs {
        // training pass
        let mut rate_counter = RateCounter::with_second_interval();
        let mut train_loss_sum = 0.0;
        let mut num_batches = 0usize;

        let batches = train_stream.batches(epoch);
        futures::pin_mut!(batches);
        while let Some(batch) = batches.next().await {
            let batch = batch?.to_device(device);
            let output = model.forward_t(&batch.images, true)?;
            let losses = loss_fn.forward(&output, &batch.classes, &batch.bboxes)?;
            optimizer.backward_step(&losses.total);

            train_loss_sum += f64::from(&losses.total);
            num_batches += 1;

            rate_counter.add(1.0);
            if let Some(batch_rate) = rate_counter.rate() {
                let record_rate = batch_rate * batch_size as f64;
                info!(
                    "epoch {}: {:.2} batches/s, {:.2} records/s",
                    epoch, batch_rate, record_rate
                );
            }
        }
        let train_loss = train_loss_sum / num_batches.max(1) as f64;

        // validation pass
        let (accuracy, mean_iou) = validate(&model, &val_stream, device).await?;
        info!(
            "epoch {}: train loss {:.5}, val accuracy {:.4}, val iou {:.4}",
            epoch, train_loss, accuracy, mean_iou
        );

        // checkpoint decision
        if best.observe(mean_iou) {
            let path = utils::save_checkpoint(&vs, checkpoint_dir, config.model.backbone)?;
            info!(
                "new best iou {:.4}, saved checkpoint {}",
                mean_iou,
                path.display()
            );
        }
    }

    info!(
        "training finished after {} epochs, best val iou {:.4}",
        epochs,
        best.best_iou().unwrap_or(0.0)
    );
    Ok(())
}

/// Compute accuracy and mean IoU over the whole validation set, without
/// gradient tracking or augmentation.
async fn validate(
    model: &MultiTaskModel,
    val_stream: &DataStream,
    device: Device,
) -> Result<(f64, f64)> {
    let mut accuracy_sum = 0.0;
    let mut iou_sum = 0.0;
    let mut num_records = 0.0;

    let batches = val_stream.batches(0);
    futures::pin_mut!(batches);
    while let Some(batch) = batches.next().await {
        let batch = batch?.to_device(device);
        let output = tch::no_grad(|| model.forward_t(&batch.images, false))?;

        let count = batch.batch_size() as f64;
        accuracy_sum += metric::batch_accuracy(&output.class_logits, &batch.classes)? * count;
        iou_sum +=
            metric::batch_mean_iou(&output.bboxes, &batch.bboxes, &SOURCE_IMAGE_SIZE)? * count;
        num_records += count;
    }

    ensure!(num_records > 0.0, "validation set is empty");
    Ok((accuracy_sum / num_records, iou_sum / num_records))
}
