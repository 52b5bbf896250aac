//! 基于内部距离极大值的标记分水岭分割.

use binary_heap_plus::BinaryHeap;
use log::trace;
use ndarray::{s, Array2, Array4, ArrayView2, ArrayViewMut2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::filter::gaussian_filter;
use super::label::{
    fill_holes, label_components, relabel_sequential, remove_small_objects, Connectivity,
};
use super::Segmenter;
use crate::consts::watershed::*;
use crate::data::{channels, CompartmentOutput};
use crate::{Idx2d, MultiplexError, MultiplexResult};

/// 分水岭参数. 默认值见 [`crate::consts::watershed`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatershedConfig {
    /// 内部距离必须大于该值才能成为标记.
    pub maxima_threshold: f32,

    /// 内部预测大于该值的像素属于前景.
    pub interior_threshold: f32,

    /// 内部距离图的高斯平滑标准差.
    pub maxima_smooth: f64,

    /// 内部预测图的高斯平滑标准差.
    pub interior_smooth: f64,

    /// 极大值检测窗口半径, 窗口大小为 `2 * radius + 1`.
    pub radius: usize,

    /// 小于该像素数的对象被移除.
    pub small_objects_threshold: usize,

    /// 小于该像素数的空洞被填充.
    pub fill_holes_threshold: usize,
}

impl Default for WatershedConfig {
    fn default() -> Self {
        Self {
            maxima_threshold: MAXIMA_THRESHOLD,
            interior_threshold: INTERIOR_THRESHOLD,
            maxima_smooth: MAXIMA_SMOOTH,
            interior_smooth: INTERIOR_SMOOTH,
            radius: RADIUS,
            small_objects_threshold: SMALL_OBJECTS_THRESHOLD,
            fill_holes_threshold: FILL_HOLES_THRESHOLD,
        }
    }
}

impl WatershedConfig {
    /// 检查参数是否合法.
    pub fn validate(&self) -> MultiplexResult<()> {
        if !self.maxima_threshold.is_finite() || !self.interior_threshold.is_finite() {
            return Err(MultiplexError::InvalidParameter("thresholds must be finite"));
        }
        let sigma_ok = |s: f64| s.is_finite() && s >= 0.0;
        if !sigma_ok(self.maxima_smooth) || !sigma_ok(self.interior_smooth) {
            return Err(MultiplexError::InvalidParameter(
                "smoothing sigma must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// 默认的分割实现.
///
/// 对每个 batch:
///
/// 1. 取内部距离和内部预测的第 0 通道, 按需高斯平滑;
/// 2. 内部预测大于 `interior_threshold` 的像素构成前景掩膜;
/// 3. 前景内, 内部距离大于 `maxima_threshold` 且是 `(2 * radius + 1)^2`
///    窗口内最大值的像素为标记, 按 8-相邻规则分组编号;
/// 4. 从标记出发在前景内按 4-相邻规则漫水, 内部距离大的像素先被访问;
/// 5. 移除小对象, 填充小空洞, 最后按行优先顺序重新编号.
///
/// 输出形状为 (batch, height, width, 1), 背景为 0.
#[derive(Clone, Debug, Default)]
pub struct DeepWatershed {
    config: WatershedConfig,
}

impl DeepWatershed {
    /// 以 `config` 构建. 参数不合法时返回 `Err(MultiplexError::InvalidParameter)`.
    pub fn new(config: WatershedConfig) -> MultiplexResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 当前参数.
    #[inline]
    pub fn config(&self) -> &WatershedConfig {
        &self.config
    }

    /// 分割单个平面. `maxima` 和 `interior` 形状必须一致, 否则程序 panic.
    pub fn segment_plane(&self, maxima: ArrayView2<f32>, interior: ArrayView2<f32>) -> Array2<u32> {
        assert_eq!(maxima.dim(), interior.dim(), "内部距离和内部预测形状不一致");
        let cfg = &self.config;
        let maxima = gaussian_filter(maxima, cfg.maxima_smooth);
        let interior = gaussian_filter(interior, cfg.interior_smooth);

        let mask = interior.mapv(|v| v > cfg.interior_threshold);
        let peaks = self.find_peaks(maxima.view(), mask.view());
        let (mut labels, n) = label_components(peaks.view(), Connectivity::Eight);
        trace!("{n} marker(s) in a {:?} plane", maxima.dim());

        flood(&mut labels, maxima.view(), mask.view());
        remove_small_objects(&mut labels, cfg.small_objects_threshold);
        fill_holes(&mut labels, cfg.fill_holes_threshold);
        relabel_sequential(&mut labels);
        labels
    }

    fn find_peaks(&self, maxima: ArrayView2<f32>, mask: ArrayView2<bool>) -> Array2<bool> {
        let (h, w) = maxima.dim();
        let r = self.config.radius;
        let threshold = self.config.maxima_threshold;
        Array2::from_shape_fn((h, w), |(y, x)| {
            let v = maxima[(y, x)];
            mask[(y, x)]
                && v > threshold
                && maxima
                    .slice(s![
                        y.saturating_sub(r)..(y + r + 1).min(h),
                        x.saturating_sub(r)..(x + r + 1).min(w)
                    ])
                    .iter()
                    .all(|&u| u <= v)
        })
    }
}

/// 漫水队列元素.
struct Flood {
    priority: f32,
    age: u64,
    pos: Idx2d,
}

/// 从已编号的标记出发, 在 `mask` 内漫水. 优先访问 `maxima` 较大的像素, 相同时先进先出.
fn flood(labels: &mut Array2<u32>, maxima: ArrayView2<f32>, mask: ArrayView2<bool>) {
    let shape = labels.dim();
    // 堆顶为 `priority` 最大且最早入队的元素.
    let mut heap: BinaryHeap<Flood, _> = BinaryHeap::new_by(|a: &Flood, b: &Flood| {
        a.priority
            .total_cmp(&b.priority)
            .then_with(|| b.age.cmp(&a.age))
    });

    let mut age = 0u64;
    for (pos, &label) in labels.indexed_iter() {
        if label != 0 {
            heap.push(Flood {
                priority: maxima[pos],
                age,
                pos,
            });
            age += 1;
        }
    }

    while let Some(Flood { pos, .. }) = heap.pop() {
        let label = labels[pos];
        for n in Connectivity::Four.neighbours(pos, shape) {
            if mask[n] && labels[n] == 0 {
                labels[n] = label;
                heap.push(Flood {
                    priority: maxima[n],
                    age,
                    pos: n,
                });
                age += 1;
            }
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon`, 按 batch 并行地对每个输出平面实施 `op` 操作.
        fn for_each_label_plane<F>(out: &mut Array4<u32>, op: F)
        where
            F: Fn(usize, ArrayViewMut2<u32>) + Sync + Send,
        {
            out.axis_iter_mut(Axis(0))
                .into_par_iter()
                .enumerate()
                .for_each(|(i, mut o)| op(i, o.index_axis_mut(Axis(2), 0)));
        }
    } else {
        /// 按 batch 对每个输出平面实施 `op` 操作.
        fn for_each_label_plane<F>(out: &mut Array4<u32>, op: F)
        where
            F: Fn(usize, ArrayViewMut2<u32>) + Sync + Send,
        {
            out.axis_iter_mut(Axis(0))
                .enumerate()
                .for_each(|(i, mut o)| op(i, o.index_axis_mut(Axis(2), 0)));
        }
    }
}

impl Segmenter for DeepWatershed {
    type Output = u32;

    fn segment(&self, prediction: &CompartmentOutput) -> MultiplexResult<Array4<u32>> {
        let maxima = prediction.inner_distance();
        let interior = prediction.pixelwise_interior();
        for t in [maxima, interior] {
            if channels(t) == 0 {
                return Err(MultiplexError::ChannelOutOfRange {
                    channel: 0,
                    channels: 0,
                });
            }
        }

        let (b, h, w) = prediction.spatial_shape();
        let mut out = Array4::<u32>::zeros((b, h, w, 1));
        for_each_label_plane(&mut out, |i, mut dst| {
            dst.assign(&self.segment_plane(
                maxima.slice(s![i, .., .., 0]),
                interior.slice(s![i, .., .., 0]),
            ));
        });
        Ok(out)
    }
}
