//! 基于百分位数的亮点截断.

use ndarray::ArrayViewMut2;
use ordered_float::OrderedFloat;

use super::for_each_plane_mut;
use crate::data::Image;

/// 计算已升序排列的样本 `sorted` 的第 `q` 百分位数 (`0 <= q <= 100`).
///
/// 在相邻两个样本之间线性插值. `sorted` 为空时返回 `None`.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 100.0) / 100.0 * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// 对每个 (batch, channel) 平面, 将大于非零像素第 `q` 百分位数的像素截断为该值.
///
/// 全零平面保持不变.
pub fn percentile_threshold(image: &mut Image, q: f64) {
    for_each_plane_mut(image, |plane| threshold_plane(plane, q));
}

fn threshold_plane(mut plane: ArrayViewMut2<f32>, q: f64) {
    let mut non_zero: Vec<f64> = plane
        .iter()
        .filter(|v| **v != 0.0)
        .map(|&v| v as f64)
        .collect();
    non_zero.sort_unstable_by_key(|&v| OrderedFloat(v));

    // 全零平面没有百分位数.
    let Some(bound) = percentile(&non_zero, q) else {
        return;
    };
    let bound = bound as f32;
    plane.iter_mut().filter(|v| **v > bound).for_each(|v| *v = bound);
}

#[cfg(test)]
mod tests {
    use super::{percentile, percentile_threshold};
    use ndarray::Array4;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_percentile_linear() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!(f64_eq(percentile(&v, 0.0).unwrap(), 1.0));
        assert!(f64_eq(percentile(&v, 100.0).unwrap(), 4.0));
        assert!(f64_eq(percentile(&v, 50.0).unwrap(), 2.5));
        assert!(f64_eq(percentile(&v, 90.0).unwrap(), 3.7));
        assert!(f64_eq(percentile(&[7.0], 99.9).unwrap(), 7.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_threshold_ignores_zeros() {
        // 1..=9 和大量的 0: 百分位数只在非零值上计算.
        let mut img = Array4::<f32>::zeros((1, 10, 10, 1));
        for i in 0..9 {
            img[(0, 0, i, 0)] = (i + 1) as f32;
        }
        percentile_threshold(&mut img, 50.0);
        assert_eq!(img[(0, 0, 8, 0)], 5.0);
        assert_eq!(img[(0, 0, 3, 0)], 4.0);
        assert_eq!(img[(0, 5, 5, 0)], 0.0);
    }

    #[test]
    fn test_threshold_per_channel() {
        let mut img = Array4::<f32>::zeros((2, 1, 4, 2));
        for b in 0..2 {
            for w in 0..4 {
                img[(b, 0, w, 0)] = (w + 1) as f32;
                img[(b, 0, w, 1)] = ((w + 1) * 100) as f32;
            }
        }
        percentile_threshold(&mut img, 100.0 * 2.0 / 3.0);
        assert_eq!(img[(1, 0, 3, 0)], 3.0);
        assert_eq!(img[(1, 0, 3, 1)], 300.0);
        assert_eq!(img[(0, 0, 1, 1)], 200.0);

        let mut zeros = Array4::<f32>::zeros((1, 3, 3, 1));
        percentile_threshold(&mut zeros, 99.9);
        assert!(zeros.iter().all(|v| *v == 0.0));
    }
}
