use crate::common::*;

/// Save parameters to the per-backbone checkpoint file, overwriting any
/// previous best.
pub fn save_checkpoint(
    vs: &nn::VarStore,
    checkpoint_dir: &Path,
    backbone: BackboneKind,
) -> Result<PathBuf> {
    let path = checkpoint_dir.join(format!("{}.ckpt", backbone.name()));
    vs.save(&path)?;
    Ok(path)
}

/// Load pretrained weights partially into the variable store. Missing
/// entries (the heads) keep their initialization.
pub fn load_pretrained(vs: &mut nn::VarStore, weights_file: &Path) -> Result<()> {
    ensure!(
        weights_file.is_file(),
        "pretrained weights file '{}' does not exist",
        weights_file.display()
    );
    info!("load pretrained weights from {}", weights_file.display());
    vs.load_partial(weights_file)?;
    Ok(())
}

/// Monotonic best-by-IoU checkpoint policy.
#[derive(Debug, Clone, Default)]
pub struct BestCheckpoint {
    best_iou: Option<f64>,
}

impl BestCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_iou(&self) -> Option<f64> {
        self.best_iou
    }

    /// Record a validation IoU; returns whether it strictly improves on
    /// the best seen and the checkpoint should be written.
    pub fn observe(&mut self, iou: f64) -> bool {
        let improved = match self.best_iou {
            Some(best) => iou > best,
            None => true,
        };
        if improved {
            self.best_iou = Some(iou);
        }
        improved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_policy_is_monotonic_best() {
        let mut best = BestCheckpoint::new();
        let decisions: Vec<_> = [0.2, 0.5, 0.3, 0.6]
            .into_iter()
            .map(|iou| best.observe(iou))
            .collect();
        assert_eq!(decisions, [true, true, false, true]);
        assert_eq!(best.best_iou(), Some(0.6));
    }

    #[test]
    fn equal_iou_does_not_resave() {
        let mut best = BestCheckpoint::new();
        assert!(best.observe(0.4));
        assert!(!best.observe(0.4));
    }
}
