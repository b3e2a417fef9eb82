//! The training program for the aircraft multi-task detector.

pub mod common;
pub mod config;
pub mod trainer;
pub mod utils;

use crate::common::*;

/// The entry of the training program.
pub async fn start(config: Arc<config::Config>) -> Result<()> {
    let start_time = Local::now();
    let logging_dir = config
        .logging
        .dir
        .join(format!("{}", start_time.format(utils::FILE_STRFTIME)));
    let checkpoint_dir = logging_dir.join("checkpoints");

    // create dirs and save config
    {
        tokio::fs::create_dir_all(&logging_dir).await?;
        tokio::fs::create_dir_all(&checkpoint_dir).await?;
        let path = logging_dir.join("config.json5");
        let text = serde_json::to_string_pretty(&*config)?;
        tokio::fs::write(&path, text).await?;
    }

    // load dataset and split
    info!("loading dataset");
    let dataset = CsvDataset::load(&config.dataset.image_dir, &config.dataset.label_file)
        .await
        .with_context(|| {
            format!(
                "failed to load dataset from '{}'",
                config.dataset.label_file.display()
            )
        })?;
    let (train_records, val_records) = stratified_split(
        &dataset.records,
        config.dataset.val_fraction.raw(),
        config.dataset.seed,
    )?;

    let train_stream = DataStreamInit {
        batch_size: config.training.batch_size.get(),
        image_size: config.training.image_size.get(),
        augment: config.training.augment.build()?,
        shuffle: true,
        seed: config.dataset.seed,
    }
    .build(train_records)?;
    let val_stream = DataStreamInit {
        batch_size: config.training.batch_size.get(),
        image_size: config.training.image_size.get(),
        augment: None,
        shuffle: false,
        seed: config.dataset.seed,
    }
    .build(val_records)?;

    trainer::run(config, &checkpoint_dir, train_stream, val_stream).await
}
