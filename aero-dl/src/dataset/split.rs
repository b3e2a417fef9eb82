use super::FileRecord;
use crate::common::*;

/// Stratified train/validation split.
///
/// Records are partitioned per class, each class is shuffled with the
/// seeded generator, and `val_fraction` of every class goes to the
/// validation side, so class proportions carry over to both partitions.
pub fn stratified_split(
    records: &[Arc<FileRecord>],
    val_fraction: f64,
    seed: u64,
) -> Result<(Vec<Arc<FileRecord>>, Vec<Arc<FileRecord>>)> {
    ensure!(
        (0.0..1.0).contains(&val_fraction) && val_fraction > 0.0,
        "val_fraction must lie strictly between 0 and 1, but got {}",
        val_fraction
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let groups: HashMap<usize, Vec<Arc<FileRecord>>> = records
        .iter()
        .map(|record| (record.class_id, record.clone()))
        .into_group_map();

    let mut train = vec![];
    let mut val = vec![];

    // iterate classes in id order so the split is reproducible
    for (_class_id, mut group) in groups.into_iter().sorted_by_key(|(id, _)| *id) {
        group.shuffle(&mut rng);
        let num_val = ((group.len() as f64) * val_fraction).round() as usize;
        val.extend(group.drain(..num_val));
        train.extend(group);
    }

    ensure!(
        !train.is_empty() && !val.is_empty(),
        "split produced an empty partition: {} train, {} val",
        train.len(),
        val.len()
    );

    train.shuffle(&mut rng);
    val.shuffle(&mut rng);

    info!(
        "stratified split: {} train, {} validation",
        train.len(),
        val.len()
    );
    Ok((train, val))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbox::RatioTlbr;

    fn synthetic_records(counts: &[usize]) -> Vec<Arc<FileRecord>> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(class_id, &count)| {
                (0..count).map(move |index| {
                    Arc::new(FileRecord {
                        path: PathBuf::from(format!("class{}_{}.jpg", class_id, index)),
                        filename: format!("class{}_{}.jpg", class_id, index),
                        class_id,
                        bbox: RatioTlbr::try_from_ratio_tlbr(0.1, 0.1, 0.9, 0.9).unwrap(),
                    })
                })
            })
            .collect()
    }

    #[test]
    fn split_preserves_class_proportions() {
        let records = synthetic_records(&[40, 80, 120, 60, 100, 20]);
        let (train, val) = stratified_split(&records, 0.25, 42).unwrap();

        assert_eq!(train.len() + val.len(), records.len());

        for class_id in 0..6 {
            let total = records
                .iter()
                .filter(|r| r.class_id == class_id)
                .count() as f64;
            let in_val = val.iter().filter(|r| r.class_id == class_id).count() as f64;
            let fraction = in_val / total;
            assert!(
                (fraction - 0.25).abs() < 0.05,
                "class {} validation fraction {} drifted",
                class_id,
                fraction
            );
        }
    }

    #[test]
    fn split_is_reproducible() {
        let records = synthetic_records(&[16, 16, 16, 16, 16, 16]);
        let (train_a, val_a) = stratified_split(&records, 0.25, 7).unwrap();
        let (train_b, val_b) = stratified_split(&records, 0.25, 7).unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(val_a, val_b);
    }

    #[test]
    fn partitions_are_disjoint() {
        let records = synthetic_records(&[8, 8, 8, 8, 8, 8]);
        let (train, val) = stratified_split(&records, 0.25, 1).unwrap();
        for record in &val {
            assert!(!train.iter().any(|other| other.path == record.path));
        }
    }

    #[test]
    fn bad_fraction_is_rejected() {
        let records = synthetic_records(&[8; 6]);
        assert!(stratified_split(&records, 0.0, 0).is_err());
        assert!(stratified_split(&records, 1.0, 0).is_err());
    }
}
