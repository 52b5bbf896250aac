//! 区室, 预测类型与区室选择器.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::names;
use crate::{MultiplexError, MultiplexResult};

/// 细胞区室.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Compartment {
    /// 全细胞 (`whole-cell`).
    WholeCell,

    /// 细胞核 (`nuclear`).
    Nuclear,
}

impl Compartment {
    /// 所有区室. 顺序即多区室结果在通道维上的拼接顺序.
    pub const ALL: [Compartment; 2] = [Compartment::WholeCell, Compartment::Nuclear];

    /// 区室名称.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WholeCell => names::WHOLE_CELL,
            Self::Nuclear => names::NUCLEAR,
        }
    }
}

impl Display for Compartment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compartment {
    type Err = MultiplexError;

    fn from_str(s: &str) -> MultiplexResult<Self> {
        match s {
            names::WHOLE_CELL => Ok(Self::WholeCell),
            names::NUCLEAR => Ok(Self::Nuclear),
            _ => Err(MultiplexError::InvalidCompartment(s.to_owned())),
        }
    }
}

/// 模型对每个区室给出的预测类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PredictionKind {
    /// 内部距离 (`inner-distance`), 单通道.
    InnerDistance,

    /// 逐像素分类 (`pixelwise-interior`).
    PixelwiseInterior,
}

impl PredictionKind {
    /// 预测类型名称.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InnerDistance => names::INNER_DISTANCE,
            Self::PixelwiseInterior => names::PIXELWISE_INTERIOR,
        }
    }
}

impl Display for PredictionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionKind {
    type Err = MultiplexError;

    fn from_str(s: &str) -> MultiplexResult<Self> {
        match s {
            names::INNER_DISTANCE => Ok(Self::InnerDistance),
            names::PIXELWISE_INTERIOR => Ok(Self::PixelwiseInterior),
            _ => Err(MultiplexError::UnknownPredictionKind(s.to_owned())),
        }
    }
}

/// 后处理时选择的区室.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CompartmentSelector {
    /// 仅全细胞.
    WholeCell,

    /// 仅细胞核.
    Nuclear,

    /// 全细胞与细胞核. 结果按全细胞在前的顺序在通道维上拼接.
    Both,
}

impl CompartmentSelector {
    /// 被选中的区室, 按拼接顺序排列.
    pub const fn compartments(&self) -> &'static [Compartment] {
        match self {
            Self::WholeCell => &[Compartment::WholeCell],
            Self::Nuclear => &[Compartment::Nuclear],
            Self::Both => &[Compartment::WholeCell, Compartment::Nuclear],
        }
    }

    /// 选择器名称.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WholeCell => names::WHOLE_CELL,
            Self::Nuclear => names::NUCLEAR,
            Self::Both => names::BOTH,
        }
    }
}

impl From<Compartment> for CompartmentSelector {
    #[inline]
    fn from(value: Compartment) -> Self {
        match value {
            Compartment::WholeCell => Self::WholeCell,
            Compartment::Nuclear => Self::Nuclear,
        }
    }
}

impl Display for CompartmentSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompartmentSelector {
    type Err = MultiplexError;

    fn from_str(s: &str) -> MultiplexResult<Self> {
        match s {
            names::BOTH => Ok(Self::Both),
            _ => s.parse::<Compartment>().map(Self::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Compartment, CompartmentSelector, PredictionKind};
    use crate::MultiplexError;

    #[test]
    fn test_selector_parse() {
        assert_eq!(
            "whole-cell".parse::<CompartmentSelector>().unwrap(),
            CompartmentSelector::WholeCell
        );
        assert_eq!(
            "nuclear".parse::<CompartmentSelector>().unwrap(),
            CompartmentSelector::Nuclear
        );
        assert_eq!(
            "both".parse::<CompartmentSelector>().unwrap(),
            CompartmentSelector::Both
        );

        match "invalid".parse::<CompartmentSelector>() {
            Err(MultiplexError::InvalidCompartment(name)) => assert_eq!(name, "invalid"),
            other => panic!("unexpected: {other:?}"),
        }
        // 大小写敏感.
        assert!("Nuclear".parse::<CompartmentSelector>().is_err());
    }

    #[test]
    fn test_selector_order() {
        assert_eq!(
            CompartmentSelector::Both.compartments(),
            &[Compartment::WholeCell, Compartment::Nuclear]
        );
        assert_eq!(
            CompartmentSelector::Nuclear.compartments(),
            &[Compartment::Nuclear]
        );
    }

    #[test]
    fn test_names_round_trip() {
        for c in Compartment::ALL {
            assert_eq!(c.to_string().parse::<Compartment>().unwrap(), c);
        }
        assert_eq!(
            "pixelwise-interior".parse::<PredictionKind>().unwrap(),
            PredictionKind::PixelwiseInterior
        );
        assert!(matches!(
            "outer-distance".parse::<PredictionKind>(),
            Err(MultiplexError::UnknownPredictionKind(_))
        ));
        // `both` 不是单个区室.
        assert!("both".parse::<Compartment>().is_err());
    }
}
