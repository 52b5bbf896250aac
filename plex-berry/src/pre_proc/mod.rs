//! 图像前处理: 亮点截断与直方图归一化.

mod equalize;
mod threshold;

use log::debug;
use ndarray::{ArrayView4, ArrayViewMut2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::preprocess::{KERNEL_SIZE, PERCENTILE};
use crate::data::Image;
use crate::{MultiplexError, MultiplexResult};

pub use equalize::histogram_normalization;
pub use threshold::{percentile, percentile_threshold};

/// 前处理参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreprocessConfig {
    /// 是否实施直方图归一化.
    pub normalize: bool,

    /// 是否实施亮点截断.
    pub threshold: bool,

    /// 亮点截断的百分位数, 取值范围 `(0, 100]`.
    pub percentile: f64,

    /// 直方图归一化的窗口大小 (像素), 必须为正.
    pub kernel_size: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            threshold: true,
            percentile: PERCENTILE,
            kernel_size: KERNEL_SIZE,
        }
    }
}

impl PreprocessConfig {
    /// 以默认百分位数和窗口大小构建参数.
    #[inline]
    pub fn new(normalize: bool, threshold: bool) -> Self {
        Self {
            normalize,
            threshold,
            ..Default::default()
        }
    }

    /// 检查参数是否合法.
    pub fn validate(&self) -> MultiplexResult<()> {
        if !(self.percentile > 0.0 && self.percentile <= 100.0) {
            return Err(MultiplexError::InvalidParameter(
                "percentile must be in (0, 100]",
            ));
        }
        if self.kernel_size == 0 {
            return Err(MultiplexError::InvalidParameter(
                "kernel_size must be positive",
            ));
        }
        Ok(())
    }
}

/// 按 `config` 对 4D 图像实施前处理, 返回新图像. 输入不会被修改.
///
/// 先截断亮点, 再做直方图归一化. 两者都关闭时返回输入的拷贝.
/// 参数不合法时返回 `Err(MultiplexError::InvalidParameter)`.
pub fn preprocess(image: ArrayView4<f32>, config: &PreprocessConfig) -> MultiplexResult<Image> {
    config.validate()?;
    Ok(run(image, config))
}

/// 使用默认百分位数 (99.9) 和窗口大小 (128) 的 [`preprocess`].
pub fn multiplex_preprocess(image: ArrayView4<f32>, normalize: bool, threshold: bool) -> Image {
    run(image, &PreprocessConfig::new(normalize, threshold))
}

fn run(image: ArrayView4<f32>, config: &PreprocessConfig) -> Image {
    debug!("preprocess {:?} with {config:?}", image.shape());
    let mut output = image.to_owned();
    if config.threshold {
        percentile_threshold(&mut output, config.percentile);
    }
    if config.normalize {
        histogram_normalization(&mut output, config.kernel_size);
    }
    output
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon`, 按 batch 并行地对每个 (batch, channel) 平面实施 `op` 操作.
        pub(crate) fn for_each_plane_mut<F>(image: &mut Image, op: F)
        where
            F: Fn(ArrayViewMut2<f32>) + Sync + Send,
        {
            image
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .for_each(|mut batch| batch.axis_iter_mut(Axis(2)).for_each(&op));
        }
    } else {
        /// 对每个 (batch, channel) 平面实施 `op` 操作.
        pub(crate) fn for_each_plane_mut<F>(image: &mut Image, op: F)
        where
            F: Fn(ArrayViewMut2<f32>) + Sync + Send,
        {
            image
                .axis_iter_mut(Axis(0))
                .for_each(|mut batch| batch.axis_iter_mut(Axis(2)).for_each(&op));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{multiplex_preprocess, preprocess, PreprocessConfig};
    use crate::data::Image;
    use crate::MultiplexError;
    use ndarray::Array4;

    type Idx4d = (usize, usize, usize, usize);

    const SPOT: Idx4d = (0, 200, 200, 0);

    /// 300 x 300, 取值 0..100 均匀分布, 并在 `SPOT` 处有一个极亮的像素.
    fn outlier_image() -> Image {
        let mut img = Array4::from_shape_fn((1, 300, 300, 1), |(_, h, w, _)| {
            ((h * 31 + w * 17) % 100) as f32
        });
        img[SPOT] = 5000.0;
        img
    }

    fn round1(v: f64) -> f64 {
        (v * 10.0).round() / 10.0
    }

    /// 亮点与其它位置最大值之比, 保留一位小数.
    fn spot_ratio(processed: &Image) -> f64 {
        let next_max = processed
            .indexed_iter()
            .filter(|(i, _)| *i != SPOT)
            .map(|(_, v)| *v)
            .fold(f32::MIN, f32::max);
        round1(processed[SPOT] as f64 / next_max as f64)
    }

    fn within_unit(img: &Image) -> bool {
        img.iter().all(|v| (-1.0..=1.0).contains(v))
    }

    #[test]
    fn test_threshold_and_normalize() {
        let img = outlier_image();
        let processed = multiplex_preprocess(img.view(), true, true);
        assert!(within_unit(&processed));
        assert_eq!(spot_ratio(&processed), 1.0);
    }

    #[test]
    fn test_normalize_only() {
        let img = outlier_image();
        let processed = multiplex_preprocess(img.view(), true, false);
        assert!(within_unit(&processed));
        assert!(spot_ratio(&processed) > 1.0);
    }

    #[test]
    fn test_threshold_only() {
        let img = outlier_image();
        let processed = multiplex_preprocess(img.view(), false, true);
        assert!(!within_unit(&processed));
        assert_eq!(spot_ratio(&processed), 1.0);
    }

    #[test]
    fn test_no_change() {
        let img = outlier_image();
        let processed = multiplex_preprocess(img.view(), false, false);
        assert_eq!(processed, img);
    }

    #[test]
    fn test_input_untouched() {
        let img = outlier_image();
        let backup = img.clone();
        let _ = preprocess(img.view(), &PreprocessConfig::default()).unwrap();
        assert_eq!(img, backup);
    }

    #[test]
    fn test_invalid_config() {
        let img = Array4::<f32>::zeros((1, 4, 4, 1));
        let bad = [
            PreprocessConfig {
                percentile: 0.0,
                ..Default::default()
            },
            PreprocessConfig {
                percentile: 100.5,
                ..Default::default()
            },
            PreprocessConfig {
                percentile: f64::NAN,
                ..Default::default()
            },
            PreprocessConfig {
                kernel_size: 0,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                preprocess(img.view(), &config),
                Err(MultiplexError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_batches_processed_independently() {
        let single = outlier_image();
        let mut double = Array4::<f32>::zeros((2, 300, 300, 1));
        double.slice_mut(ndarray::s![0..1, .., .., ..]).assign(&single);
        double
            .slice_mut(ndarray::s![1..2, .., .., ..])
            .assign(&(&single * 2.0));

        let a = multiplex_preprocess(single.view(), true, true);
        let b = multiplex_preprocess(double.view(), true, true);
        assert_eq!(a.slice(ndarray::s![0, .., .., ..]), b.slice(ndarray::s![0, .., .., ..]));
    }
}
