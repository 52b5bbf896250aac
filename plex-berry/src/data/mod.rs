//! 图像张量与模型输出的基础数据结构.

use ndarray::{Array4, ArrayBase, ArrayView4, Ix4, RawData};
use num::ToPrimitive;

use crate::Idx3d;

mod compartment;
mod prediction;

pub use compartment::{Compartment, CompartmentSelector, PredictionKind};
pub use prediction::{CompartmentOutput, MultiplexOutput};

/// 4D 图像张量. 维度依次为 (batch, height, width, channel).
pub type Image = Array4<f32>;

/// 将任意数值类型的 4D 数组转换为 [`Image`].
///
/// 无法用 `f32` 表示的值会被转换为 NaN.
pub fn to_image<T: ToPrimitive>(arr: ArrayView4<T>) -> Image {
    arr.map(|v| v.to_f32().unwrap_or(f32::NAN))
}

/// 获取 4D 张量的 (batch, height, width) 部分.
#[inline]
pub fn spatial_shape<S: RawData>(arr: &ArrayBase<S, Ix4>) -> Idx3d {
    let (b, h, w, _) = arr.dim();
    (b, h, w)
}

/// 获取 4D 张量的通道数.
#[inline]
pub fn channels<S: RawData>(arr: &ArrayBase<S, Ix4>) -> usize {
    arr.dim().3
}

#[cfg(test)]
mod tests {
    use super::{channels, spatial_shape, to_image};
    use ndarray::Array4;

    #[test]
    fn test_to_image_from_integers() {
        let raw = Array4::<u16>::from_shape_fn((1, 2, 3, 1), |(_, h, w, _)| (h * 3 + w) as u16);
        let img = to_image(raw.view());
        assert_eq!(img.dim(), (1, 2, 3, 1));
        assert_eq!(img[(0, 1, 2, 0)], 5.0);
        assert_eq!(spatial_shape(&img), (1, 2, 3));
        assert_eq!(channels(&img), 1);
    }
}
