//! 对比度受限的自适应直方图均衡化.
//!
//! 每个 (batch, channel) 平面先按最值缩放到 `[0, 1]`, 再划分为约 `kernel_size`
//! 大小的窗口. 每个窗口统计直方图, 截断超过上限的 bin 并把多余的计数平均分配给所有
//! bin, 由累积分布得到映射表. 像素值由周围 4 个窗口中心的映射结果双线性插值得到.

use std::ops::Range;

use itertools::iproduct;
use ndarray::{s, Array2, ArrayView2, ArrayViewMut2};

use super::for_each_plane_mut;
use crate::consts::preprocess::{CLIP_LIMIT, NBINS};
use crate::data::Image;

/// 对每个 (batch, channel) 平面实施直方图归一化. 结果位于 `[0, 1]`.
///
/// 常数平面被置为全零. 缩放时只使用有限值的最值, `+inf` 映射为 1, `-inf` 和 NaN
/// 映射为 0. `kernel_size` 为 0 时按 1 处理.
pub fn histogram_normalization(image: &mut Image, kernel_size: usize) {
    let kernel_size = kernel_size.max(1);
    for_each_plane_mut(image, |plane| normalize_plane(plane, kernel_size));
}

fn normalize_plane(mut plane: ArrayViewMut2<f32>, kernel_size: usize) {
    let Some(&first) = plane.iter().next() else {
        return;
    };
    if plane.iter().all(|v| *v == first) {
        plane.fill(0.0);
        return;
    }

    let Some((lo, hi)) = plane
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f32, f32)>, &v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
    else {
        plane.fill(0.0);
        return;
    };
    let range = hi - lo;
    plane.mapv_inplace(|v| {
        if v.is_nan() {
            0.0
        } else if range > 0.0 {
            ((v - lo) / range).clamp(0.0, 1.0)
        } else if v > hi {
            1.0
        } else {
            0.0
        }
    });

    equalize_adapthist(plane, kernel_size, CLIP_LIMIT, NBINS);
}

/// 沿单个维度的窗口划分.
#[derive(Debug)]
struct AxisTiles {
    ranges: Vec<Range<usize>>,
    centers: Vec<f64>,
}

impl AxisTiles {
    /// 将长度 `len` (> 0) 划分为 `ceil(len / kernel)` 个尽量等长的窗口.
    fn new(len: usize, kernel: usize) -> Self {
        let n = len.div_ceil(kernel).max(1);
        let ranges: Vec<Range<usize>> = (0..n).map(|i| (i * len / n)..((i + 1) * len / n)).collect();
        let centers = ranges
            .iter()
            .map(|r| (r.start + r.end - 1) as f64 / 2.0)
            .collect();
        Self { ranges, centers }
    }

    #[inline]
    fn len(&self) -> usize {
        self.ranges.len()
    }

    /// 返回 `pos` 两侧的窗口索引, 以及靠后窗口的插值权重.
    fn locate(&self, pos: usize) -> (usize, usize, f64) {
        let p = pos as f64;
        let lo = self.centers.iter().rposition(|&c| c <= p).unwrap_or(0);
        let hi = (lo + 1).min(self.len() - 1);
        let weight = if hi == lo {
            0.0
        } else {
            ((p - self.centers[lo]) / (self.centers[hi] - self.centers[lo])).clamp(0.0, 1.0)
        };
        (lo, hi, weight)
    }
}

/// 对已缩放到 `[0, 1]` 的平面实施 CLAHE.
///
/// `clip_limit` 是单个 bin 计数上限相对窗口像素总数的比例, 上限最小为 1.
pub(crate) fn equalize_adapthist(
    mut plane: ArrayViewMut2<f32>,
    kernel_size: usize,
    clip_limit: f64,
    nbins: usize,
) {
    let (h, w) = plane.dim();
    if h == 0 || w == 0 {
        return;
    }
    let rows = AxisTiles::new(h, kernel_size);
    let cols = AxisTiles::new(w, kernel_size);

    let bins: Array2<usize> = plane.map(|&v| to_bin(v, nbins));
    let maps: Vec<Vec<f64>> = iproduct!(rows.ranges.iter(), cols.ranges.iter())
        .map(|(r, c)| tile_mapping(bins.slice(s![r.clone(), c.clone()]), clip_limit, nbins))
        .collect();

    let nc = cols.len();
    for ((y, x), v) in plane.indexed_iter_mut() {
        let (r0, r1, wy) = rows.locate(y);
        let (c0, c1, wx) = cols.locate(x);
        let bin = bins[(y, x)];
        let at = |r: usize, c: usize| maps[r * nc + c][bin];

        let upper = (1.0 - wx) * at(r0, c0) + wx * at(r0, c1);
        let lower = (1.0 - wx) * at(r1, c0) + wx * at(r1, c1);
        *v = ((1.0 - wy) * upper + wy * lower).clamp(0.0, 1.0) as f32;
    }
}

#[inline]
fn to_bin(v: f32, nbins: usize) -> usize {
    let top = nbins - 1;
    // NaN 会被转换为 0.
    ((v as f64 * top as f64).floor() as usize).min(top)
}

/// 由单个窗口的直方图计算映射表. 表中最后一项恒为 1.
fn tile_mapping(tile: ArrayView2<usize>, clip_limit: f64, nbins: usize) -> Vec<f64> {
    let mut hist = vec![0.0f64; nbins];
    for &b in tile.iter() {
        hist[b] += 1.0;
    }

    let clip = (clip_limit * tile.len() as f64).max(1.0);
    let mut excess = 0.0;
    for count in hist.iter_mut().filter(|c| **c > clip) {
        excess += *count - clip;
        *count = clip;
    }
    let bonus = excess / nbins as f64;

    let mut acc = 0.0;
    let cdf: Vec<f64> = hist
        .iter()
        .map(|c| {
            acc += c + bonus;
            acc
        })
        .collect();
    cdf.into_iter().map(|c| c / acc).collect()
}
