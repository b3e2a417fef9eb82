//! Evaluation metrics: mean IoU in pixel scale and classification
//! accuracy.

use crate::common::*;

pub const IOU_EPSILON: f64 = 1e-8;

/// Mean IoU over a batch of ratio-TLBR boxes.
///
/// Both sides are denormalized to pixel scale with `size` before
/// intersecting. A degenerate predicted box counts as IoU 0.
pub fn batch_mean_iou(pred: &Tensor, target: &Tensor, size: &PixelSize) -> Result<f64> {
    ensure!(
        pred.size() == target.size() && pred.size().len() == 2 && pred.size()[1] == 4,
        "expect two [batch, 4] tensors, but got {:?} and {:?}",
        pred.size(),
        target.size()
    );

    let batch_size = pred.size()[0] as usize;
    let pred: Vec<f64> = Vec::from(pred.to_device(Device::Cpu).to_kind(Kind::Double).view([-1]));
    let target: Vec<f64> = Vec::from(
        target
            .to_device(Device::Cpu)
            .to_kind(Kind::Double)
            .view([-1]),
    );

    let total: f64 = (0..batch_size)
        .map(|index| {
            let pred_box = ratio_box(&pred[index * 4..index * 4 + 4]);
            let target_box = ratio_box(&target[index * 4..index * 4 + 4]);
            match (pred_box, target_box) {
                (Ok(pred_box), Ok(target_box)) => pred_box
                    .to_pixel(size)
                    .iou_with(&target_box.to_pixel(size), IOU_EPSILON),
                _ => 0.0,
            }
        })
        .sum();

    Ok(total / batch_size as f64)
}

fn ratio_box(components: &[f64]) -> Result<RatioTlbr> {
    RatioTlbr::try_from_ratio_tlbr(components[0], components[1], components[2], components[3])
}

/// Fraction of samples whose argmax logit matches the target class.
pub fn batch_accuracy(logits: &Tensor, classes: &Tensor) -> Result<f64> {
    ensure!(
        logits.size().len() == 2 && logits.size()[0] == classes.size()[0],
        "expect [batch, classes] logits and [batch] targets, but got {:?} and {:?}",
        logits.size(),
        classes.size()
    );

    let pred: Vec<i64> = Vec::from(logits.argmax(-1, false).to_device(Device::Cpu));
    let target: Vec<i64> = Vec::from(classes.to_device(Device::Cpu));

    let correct = pred
        .iter()
        .zip(target.iter())
        .filter(|(lhs, rhs)| lhs == rhs)
        .count();
    Ok(correct as f64 / target.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identical_boxes_have_unit_iou() {
        let size = PixelSize::from_hw(720.0, 1280.0).unwrap();
        let boxes = Tensor::of_slice(&[0.2f32, 0.1, 0.6, 0.5]).view([1, 4]);
        let iou = batch_mean_iou(&boxes, &boxes, &size).unwrap();
        assert_abs_diff_eq!(iou, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn disjoint_boxes_have_zero_iou() {
        let size = PixelSize::from_hw(720.0, 1280.0).unwrap();
        let pred = Tensor::of_slice(&[0.0f32, 0.0, 0.2, 0.2]).view([1, 4]);
        let target = Tensor::of_slice(&[0.5f32, 0.5, 0.9, 0.9]).view([1, 4]);
        let iou = batch_mean_iou(&pred, &target, &size).unwrap();
        assert_abs_diff_eq!(iou, 0.0);
    }

    #[test]
    fn degenerate_prediction_counts_as_zero() {
        let size = PixelSize::from_hw(720.0, 1280.0).unwrap();
        // first box inverted, second perfect
        let pred = Tensor::of_slice(&[0.6f32, 0.5, 0.2, 0.1, 0.2, 0.1, 0.6, 0.5]).view([2, 4]);
        let target = Tensor::of_slice(&[0.2f32, 0.1, 0.6, 0.5, 0.2, 0.1, 0.6, 0.5]).view([2, 4]);
        let iou = batch_mean_iou(&pred, &target, &size).unwrap();
        assert_abs_diff_eq!(iou, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn accuracy_counts_argmax_matches() {
        let logits = Tensor::of_slice(&[
            1.0f32, 0.0, 0.0, 0.0, 0.0, 0.0, // predicts 0
            0.0, 2.0, 0.0, 0.0, 0.0, 0.0, // predicts 1
            0.0, 0.0, 0.0, 3.0, 0.0, 0.0, // predicts 3
        ])
        .view([3, 6]);
        let classes = Tensor::of_slice(&[0i64, 1, 2]);
        let accuracy = batch_accuracy(&logits, &classes).unwrap();
        assert_abs_diff_eq!(accuracy, 2.0 / 3.0, epsilon = 1e-9);
    }
}
