use super::{Batch, FileRecord, ImageLoader, ImageLoaderInit};
use crate::{common::*, processor::Augment};

/// Configuration for a [`DataStream`].
#[derive(Debug, Clone)]
pub struct DataStreamInit {
    pub batch_size: usize,
    pub image_size: usize,
    /// Augmentation pipeline; `None` for validation and inference.
    pub augment: Option<Augment>,
    /// Reshuffle records every epoch.
    pub shuffle: bool,
    pub seed: u64,
}

impl DataStreamInit {
    pub fn build(self, records: Vec<Arc<FileRecord>>) -> Result<DataStream> {
        let Self {
            batch_size,
            image_size,
            augment,
            shuffle,
            seed,
        } = self;

        ensure!(batch_size > 0, "batch_size must be positive");
        ensure!(!records.is_empty(), "dataset has no records");

        let loader = ImageLoaderInit { image_size }.build()?;

        Ok(DataStream {
            records,
            loader,
            augment,
            batch_size,
            shuffle,
            seed,
        })
    }
}

/// Ordered batch stream over a record set. Sample loading and
/// augmentation run on the worker pool; batches come out in order.
#[derive(Debug)]
pub struct DataStream {
    records: Vec<Arc<FileRecord>>,
    loader: ImageLoader,
    augment: Option<Augment>,
    batch_size: usize,
    shuffle: bool,
    seed: u64,
}

impl DataStream {
    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    pub fn num_batches(&self) -> usize {
        (self.records.len() + self.batch_size - 1) / self.batch_size
    }

    /// Stream the whole record set once as collated batches.
    pub fn batches(&self, epoch: usize) -> impl Stream<Item = Result<Batch>> {
        let mut records = self.records.clone();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(epoch as u64));
            records.shuffle(&mut rng);
        }

        let loader = self.loader.clone();
        let augment = self.augment.clone();

        stream::iter(records)
            .par_map(None, move |record| {
                let loader = loader.clone();
                let augment = augment.clone();
                move || loader.load_record(&record, augment.as_ref())
            })
            .chunks(self.batch_size)
            .map(|results| {
                let records: Vec<_> = results.into_iter().try_collect()?;
                Batch::from_records(records)
            })
    }
}
