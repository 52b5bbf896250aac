//! 运行时错误.

use std::fmt::{Display, Formatter};

use crate::dataset::ArchiveError;

/// 前处理, 模型输出整理或后处理的运行时错误.
#[derive(Debug)]
pub enum MultiplexError {
    /// 模型原始输出的张量个数不符.
    OutputCount {
        /// 期望的张量个数.
        expected: usize,
        /// 实际得到的张量个数.
        actual: usize,
    },

    /// 未知的细胞区室选择器. 合法值只有 `whole-cell`, `nuclear` 和 `both`.
    InvalidCompartment(String),

    /// 未知的预测类型名称.
    UnknownPredictionKind(String),

    /// 张量形状不一致.
    ShapeMismatch {
        /// 期望的形状.
        expected: Vec<usize>,
        /// 实际的形状.
        actual: Vec<usize>,
    },

    /// 通道索引越界.
    ChannelOutOfRange {
        /// 需要访问的通道.
        channel: usize,
        /// 张量实际的通道数.
        channels: usize,
    },

    /// 参数不合法. 内容为具体描述.
    InvalidParameter(&'static str),

    /// 读取 npz 归档错误.
    Archive(ArchiveError),
}

impl Display for MultiplexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutputCount { expected, actual } => write!(
                f,
                "model output list must contain {expected} tensors, got {actual}"
            ),
            Self::InvalidCompartment(name) => write!(
                f,
                "invalid compartment `{name}`, expected one of `whole-cell`, `nuclear`, `both`"
            ),
            Self::UnknownPredictionKind(name) => write!(
                f,
                "unknown prediction kind `{name}`, expected `inner-distance` or `pixelwise-interior`"
            ),
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected:?}, got {actual:?}")
            }
            Self::ChannelOutOfRange { channel, channels } => write!(
                f,
                "channel {channel} is out of range for a tensor with {channels} channel(s)"
            ),
            Self::InvalidParameter(what) => write!(f, "invalid parameter: {what}"),
            Self::Archive(e) => write!(f, "archive error: {e}"),
        }
    }
}

impl std::error::Error for MultiplexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Archive(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArchiveError> for MultiplexError {
    #[inline]
    fn from(value: ArchiveError) -> Self {
        Self::Archive(value)
    }
}

/// 本 crate 的运行时结果类型.
pub type MultiplexResult<T> = Result<T, MultiplexError>;
