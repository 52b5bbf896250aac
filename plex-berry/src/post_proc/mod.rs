//! 后处理: 选择区室, 调用分割算法并拼接结果.

mod filter;
mod label;
mod watershed;

use log::debug;
use ndarray::{concatenate, Array4, ArrayView4, Axis};

use crate::consts::CHANNEL_AXIS;
use crate::data::{spatial_shape, CompartmentOutput, CompartmentSelector, MultiplexOutput};
use crate::{MultiplexError, MultiplexResult};

pub use filter::gaussian_filter;
pub use label::{
    fill_holes, label_components, relabel_sequential, remove_small_objects, Connectivity,
};
pub use watershed::{DeepWatershed, WatershedConfig};

/// 分割算法: 把单个区室的预测转换为 (batch, height, width, channel) 结果.
///
/// 结果的 (batch, height, width) 必须与输入一致.
/// 闭包 `Fn(&CompartmentOutput) -> MultiplexResult<Array4<T>>` 自动实现该 trait,
/// 便于替换为其它实现.
pub trait Segmenter {
    /// 结果元素类型.
    type Output: Clone;

    /// 分割单个区室.
    fn segment(&self, prediction: &CompartmentOutput) -> MultiplexResult<Array4<Self::Output>>;
}

impl<F, T> Segmenter for F
where
    F: Fn(&CompartmentOutput) -> MultiplexResult<Array4<T>>,
    T: Clone,
{
    type Output = T;

    #[inline]
    fn segment(&self, prediction: &CompartmentOutput) -> MultiplexResult<Array4<T>> {
        self(prediction)
    }
}

/// 对 `selector` 选中的区室逐个调用 `segmenter`.
///
/// 单个区室时直接返回其结果; 选择 [`CompartmentSelector::Both`] 时,
/// 两个结果按全细胞在前的顺序在通道维上拼接.
///
/// 分割结果的 (batch, height, width) 与输入不符时返回
/// `Err(MultiplexError::ShapeMismatch)`; `segmenter` 的错误原样返回.
pub fn postprocess<S: Segmenter>(
    output: &MultiplexOutput,
    selector: CompartmentSelector,
    segmenter: &S,
) -> MultiplexResult<Array4<S::Output>> {
    let (b, h, w) = output.spatial_shape();
    let mut results = Vec::with_capacity(2);
    for &compartment in selector.compartments() {
        debug!("segmenting {compartment} of shape {:?}", (b, h, w));
        let result = segmenter.segment(output.get(compartment))?;
        if spatial_shape(&result) != (b, h, w) {
            return Err(MultiplexError::ShapeMismatch {
                expected: vec![b, h, w],
                actual: result.shape()[..CHANNEL_AXIS].to_vec(),
            });
        }
        results.push(result);
    }

    if results.len() == 1 {
        return Ok(results.swap_remove(0));
    }
    let views: Vec<ArrayView4<S::Output>> = results.iter().map(|r| r.view()).collect();
    concatenate(Axis(CHANNEL_AXIS), &views).map_err(|_| MultiplexError::ShapeMismatch {
        expected: results[0].shape().to_vec(),
        actual: results[1].shape().to_vec(),
    })
}

/// 以区室名称 (`whole-cell`, `nuclear` 或 `both`) 调用 [`postprocess`].
///
/// 名称非法时返回 `Err(MultiplexError::InvalidCompartment)`, 且不会调用 `segmenter`.
pub fn multiplex_postprocess<S: Segmenter>(
    output: &MultiplexOutput,
    compartment: &str,
    segmenter: &S,
) -> MultiplexResult<Array4<S::Output>> {
    let selector: CompartmentSelector = compartment.parse()?;
    postprocess(output, selector, segmenter)
}
