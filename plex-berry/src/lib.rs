#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 为多重免疫荧光 (细胞核 + 膜/胞质双通道) 图像的细胞分割提供
//! 模型前后的数据处理: 前处理, 模型输出整理, 以及可替换分割算法的后处理.
//!
//! 该 crate 只提供 `safe` 接口. 模型推理本身不在本 crate 范围内.
//!
//! # 数据约定
//!
//! 所有图像均为 4D 张量 `(batch, height, width, channel)`, 元素类型 `f32`.
//! 各 batch 与各通道互相独立地处理.
//!
//! # 注意
//!
//! 1. 可恢复的错误 (模型输出个数不对, 区室名称非法, 形状不一致等)
//!   以 [`MultiplexError`] 返回.
//! 2. 违反调用约定 (例如给 [`post_proc::DeepWatershed::segment_plane`]
//!   传入形状不一致的平面) 时程序会直接 panic, 而不会导致内存错误.
//!
//! # 开发计划
//!
//! ### 前处理 ✅
//!
//! 局部直方图均衡化 (CLAHE) 与基于非零像素分位数的上限截断, 两者可独立开关.
//!
//! 实现位于 `plex-berry/src/pre_proc`.
//!
//! ### 模型输出整理 ✅
//!
//! 把模型的 4 个位置输出按固定布局整理为全细胞 / 细胞核两个区室,
//! 逐像素分类预测仅保留 "内部" 通道.
//!
//! 实现位于 `plex-berry/src/format.rs`.
//!
//! ### 后处理 ✅
//!
//! 1. `Segmenter` trait, 闭包也可直接作为分割算法. ✅
//! 2. 默认实现: 内部距离极大值作标记的分水岭. ✅
//! 3. 小对象移除, 小空洞填充, 顺序重编号. ✅
//!
//! 实现位于 `plex-berry/src/post_proc`.
//!
//! ### npz 数据读取 ✅
//!
//! 实现位于 `plex-berry/src/dataset`.
//!
//! ### 前处理消融实验 ✅
//!
//! 对比 normalize / threshold 四种组合的效果.
//!
//! 实现位于 `ablations/preproc4`.
//!
//! ### 分水岭对比实验 ⌛️
//!
//! 与 h-maxima 标记提取方式对比分割效果.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引. 本 crate 中一般为 `(batch, height, width)`.
pub type Idx3d = (usize, usize, usize);

pub mod consts;

/// 多重成像数据结构.
pub mod data;

pub mod dataset;

mod error;

pub use error::{MultiplexError, MultiplexResult};

pub mod format;

pub mod post_proc;

pub mod pre_proc;

pub mod prelude;
