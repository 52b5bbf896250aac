//! 模型原始输出列表的整理.
//!
//! 模型按固定位置顺序输出 4 个张量, 见 [`OUTPUT_LAYOUT`]. 该顺序是与推理端的约定,
//! 修改时必须同时修改模型.

use log::trace;
use ndarray::s;

use crate::consts::{INTERIOR_CHANNEL, OUTPUT_LEN};
use crate::data::{channels, Compartment, CompartmentOutput, Image, MultiplexOutput, PredictionKind};
use crate::{MultiplexError, MultiplexResult};

/// 模型原始输出列表中每个位置对应的 (区室, 预测类型).
pub const OUTPUT_LAYOUT: [(Compartment, PredictionKind); OUTPUT_LEN] = [
    (Compartment::WholeCell, PredictionKind::InnerDistance),
    (Compartment::WholeCell, PredictionKind::PixelwiseInterior),
    (Compartment::Nuclear, PredictionKind::InnerDistance),
    (Compartment::Nuclear, PredictionKind::PixelwiseInterior),
];

/// 将模型原始输出列表整理为 [`MultiplexOutput`].
///
/// `raw` 必须恰好包含 4 个张量, 顺序见 [`OUTPUT_LAYOUT`], 否则返回
/// `Err(MultiplexError::OutputCount)`. 内部距离张量原样保留;
/// 逐像素分类张量只保留 "内部" 通道 (第 [`INTERIOR_CHANNEL`] 个通道),
/// 因此整理后的两种预测都是单通道的.
///
/// 不修改任何张量的值.
pub fn format_output(raw: Vec<Image>) -> MultiplexResult<MultiplexOutput> {
    let raw: [Image; OUTPUT_LEN] =
        raw.try_into()
            .map_err(|v: Vec<Image>| MultiplexError::OutputCount {
                expected: OUTPUT_LEN,
                actual: v.len(),
            })?;
    let [wc_inner, wc_pixel, nuc_inner, nuc_pixel] = raw;

    let whole_cell = CompartmentOutput::new(decode(0, wc_inner)?, decode(1, wc_pixel)?)?;
    let nuclear = CompartmentOutput::new(decode(2, nuc_inner)?, decode(3, nuc_pixel)?)?;
    MultiplexOutput::new(whole_cell, nuclear)
}

/// 按 `OUTPUT_LAYOUT[index]` 的语义解码单个张量.
fn decode(index: usize, tensor: Image) -> MultiplexResult<Image> {
    let (compartment, kind) = OUTPUT_LAYOUT[index];
    trace!("output[{index}] -> {compartment}/{kind}, shape {:?}", tensor.shape());
    match kind {
        PredictionKind::InnerDistance => Ok(tensor),
        PredictionKind::PixelwiseInterior => interior_channel(tensor),
    }
}

/// 取出逐像素分类预测的内部通道, 保留通道维.
fn interior_channel(tensor: Image) -> MultiplexResult<Image> {
    let c = channels(&tensor);
    if c <= INTERIOR_CHANNEL {
        return Err(MultiplexError::ChannelOutOfRange {
            channel: INTERIOR_CHANNEL,
            channels: c,
        });
    }
    Ok(tensor
        .slice(s![.., .., .., INTERIOR_CHANNEL..INTERIOR_CHANNEL + 1])
        .to_owned())
}

#[cfg(test)]
mod tests {
    use super::{format_output, OUTPUT_LAYOUT};
    use crate::data::{Compartment, Image, PredictionKind};
    use crate::MultiplexError;
    use ndarray::{concatenate, Array4, Axis};

    /// [全细胞内部距离, 全细胞逐像素分类, 细胞核内部距离, 细胞核逐像素分类],
    /// 每个张量在整张图上取常数.
    fn combined_list() -> (Image, Vec<Image>) {
        let base = Array4::<f32>::ones((1, 20, 20, 1));
        let pixelwise = concatenate(
            Axis(3),
            &[(&base * 2.0).view(), (&base * 3.0).view(), (&base * 4.0).view()],
        )
        .unwrap();
        let whole_cell = vec![base.clone(), pixelwise];
        let nuclear: Vec<Image> = whole_cell.iter().map(|img| img * 2.0).collect();
        let combined = whole_cell.into_iter().chain(nuclear).collect();
        (base, combined)
    }

    #[test]
    fn test_format_output() {
        let (base, combined) = combined_list();
        let output = format_output(combined).unwrap();

        assert_eq!(output.whole_cell().inner_distance(), &base);
        assert_eq!(output.nuclear().inner_distance(), &(&base * 2.0));

        // 只保留内部通道.
        assert_eq!(output.whole_cell().pixelwise_interior(), &(&base * 3.0));
        assert_eq!(output.nuclear().pixelwise_interior(), &(&base * 6.0));
    }

    #[test]
    fn test_format_output_wrong_len() {
        let (_, mut combined) = combined_list();
        combined.truncate(3);
        match format_output(combined) {
            Err(MultiplexError::OutputCount { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }

        let (_, mut combined) = combined_list();
        combined.push(Array4::zeros((1, 20, 20, 1)));
        assert!(matches!(
            format_output(combined),
            Err(MultiplexError::OutputCount { actual: 5, .. })
        ));
    }

    #[test]
    fn test_format_output_missing_interior_channel() {
        let (_, mut combined) = combined_list();
        combined[3] = Array4::zeros((1, 20, 20, 1));
        assert!(matches!(
            format_output(combined),
            Err(MultiplexError::ChannelOutOfRange {
                channel: 1,
                channels: 1
            })
        ));
    }

    #[test]
    fn test_format_output_shape_mismatch() {
        let (_, mut combined) = combined_list();
        combined[2] = Array4::zeros((1, 10, 20, 1));
        assert!(matches!(
            format_output(combined),
            Err(MultiplexError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_layout_alternates_by_compartment() {
        let compartments: Vec<Compartment> = OUTPUT_LAYOUT.iter().map(|p| p.0).collect();
        assert_eq!(
            compartments,
            [
                Compartment::WholeCell,
                Compartment::WholeCell,
                Compartment::Nuclear,
                Compartment::Nuclear
            ]
        );
        assert!(OUTPUT_LAYOUT
            .iter()
            .step_by(2)
            .all(|p| p.1 == PredictionKind::InnerDistance));
    }
}
