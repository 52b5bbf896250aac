//! 单个前处理组合的统计信息.

use ndarray::{s, ArrayView4};
use std::time::Duration;
use utils::loader::SPOT;

/// 前处理结果的统计信息.
#[derive(Debug)]
pub struct Profile {
    elapsed: Duration,
    min: f32,
    max: f32,
    mean: f64,
    spot_ratio: Option<f64>,
}

impl Profile {
    /// 统计 `output`. `elapsed` 为前处理耗时.
    pub fn new(output: ArrayView4<f32>, elapsed: Duration) -> Self {
        let (min, max) = output
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let mean = output.iter().map(|&v| v as f64).sum::<f64>() / output.len().max(1) as f64;
        Self {
            elapsed,
            min,
            max,
            mean,
            spot_ratio: spot_ratio(output),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[inline]
    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 亮点处的值与所在平面均值之比. 图像不含 [`SPOT`] 或平面均值为 0 时为 `None`.
    #[inline]
    pub fn spot_ratio(&self) -> Option<f64> {
        self.spot_ratio
    }
}

fn spot_ratio(output: ArrayView4<f32>) -> Option<f64> {
    let (b, h, w, c) = SPOT;
    let (ob, oh, ow, oc) = output.dim();
    if b >= ob || h >= oh || w >= ow || c >= oc {
        return None;
    }
    let plane = output.slice(s![b, .., .., c]);
    let mean = plane.iter().map(|&v| v as f64).sum::<f64>() / plane.len() as f64;
    (mean > 0.0).then(|| output[SPOT] as f64 / mean)
}
