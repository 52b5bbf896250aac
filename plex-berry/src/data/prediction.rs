//! 按区室整理好的模型输出.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{spatial_shape, Compartment, Image, PredictionKind};
use crate::{Idx3d, MultiplexError, MultiplexResult};

/// 单个区室的两种预测.
///
/// 两个张量的 (batch, height, width) 必须一致, 该性质在构建时检查.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompartmentOutput {
    inner_distance: Image,
    pixelwise_interior: Image,
}

impl CompartmentOutput {
    /// 构建区室预测.
    ///
    /// 当两个张量的 (batch, height, width) 不一致时返回
    /// `Err(MultiplexError::ShapeMismatch)`.
    pub fn new(inner_distance: Image, pixelwise_interior: Image) -> MultiplexResult<Self> {
        if spatial_shape(&inner_distance) != spatial_shape(&pixelwise_interior) {
            return Err(MultiplexError::ShapeMismatch {
                expected: inner_distance.shape().to_vec(),
                actual: pixelwise_interior.shape().to_vec(),
            });
        }
        Ok(Self {
            inner_distance,
            pixelwise_interior,
        })
    }

    /// 内部距离预测.
    #[inline]
    pub fn inner_distance(&self) -> &Image {
        &self.inner_distance
    }

    /// 逐像素分类预测.
    #[inline]
    pub fn pixelwise_interior(&self) -> &Image {
        &self.pixelwise_interior
    }

    /// 按预测类型获取张量.
    #[inline]
    pub fn get(&self, kind: PredictionKind) -> &Image {
        match kind {
            PredictionKind::InnerDistance => &self.inner_distance,
            PredictionKind::PixelwiseInterior => &self.pixelwise_interior,
        }
    }

    /// (batch, height, width).
    #[inline]
    pub fn spatial_shape(&self) -> Idx3d {
        spatial_shape(&self.inner_distance)
    }

    /// 直接获得内部数据的所有权, 顺序为 (内部距离, 逐像素分类).
    #[inline]
    pub fn into_raw(self) -> (Image, Image) {
        (self.inner_distance, self.pixelwise_interior)
    }
}

/// 全细胞与细胞核两个区室的模型输出.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MultiplexOutput {
    whole_cell: CompartmentOutput,
    nuclear: CompartmentOutput,
}

impl MultiplexOutput {
    /// 构建模型输出.
    ///
    /// 两个区室的 (batch, height, width) 不一致时返回 `Err(MultiplexError::ShapeMismatch)`.
    pub fn new(whole_cell: CompartmentOutput, nuclear: CompartmentOutput) -> MultiplexResult<Self> {
        if whole_cell.spatial_shape() != nuclear.spatial_shape() {
            return Err(MultiplexError::ShapeMismatch {
                expected: whole_cell.inner_distance.shape().to_vec(),
                actual: nuclear.inner_distance.shape().to_vec(),
            });
        }
        Ok(Self {
            whole_cell,
            nuclear,
        })
    }

    /// 全细胞预测.
    #[inline]
    pub fn whole_cell(&self) -> &CompartmentOutput {
        &self.whole_cell
    }

    /// 细胞核预测.
    #[inline]
    pub fn nuclear(&self) -> &CompartmentOutput {
        &self.nuclear
    }

    /// 按区室获取预测.
    #[inline]
    pub fn get(&self, compartment: Compartment) -> &CompartmentOutput {
        match compartment {
            Compartment::WholeCell => &self.whole_cell,
            Compartment::Nuclear => &self.nuclear,
        }
    }

    /// 按 [`Compartment::ALL`] 的顺序迭代所有区室.
    pub fn iter(&self) -> impl Iterator<Item = (Compartment, &CompartmentOutput)> + '_ {
        Compartment::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// (batch, height, width).
    #[inline]
    pub fn spatial_shape(&self) -> Idx3d {
        self.whole_cell.spatial_shape()
    }

    /// 直接获得内部数据的所有权, 顺序为 (全细胞, 细胞核).
    #[inline]
    pub fn into_raw(self) -> (CompartmentOutput, CompartmentOutput) {
        (self.whole_cell, self.nuclear)
    }
}
