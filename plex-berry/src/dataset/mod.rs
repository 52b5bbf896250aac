//! 数据集操作. 以 npz 归档读取输入图像和模型原始输出.

use std::path::Path;

mod npz_archive;

pub use npz_archive::{ArchiveError, NpzArchive};

use crate::consts::OUTPUT_LEN;
use crate::data::{Image, MultiplexOutput};
use crate::format::format_output;
use crate::MultiplexResult;

/// 默认的模型原始输出文件名, 依次对应 [`crate::format::OUTPUT_LAYOUT`].
pub const DEFAULT_OUTPUT_NAMES: [&str; OUTPUT_LEN] = ["0.npy", "1.npy", "2.npy", "3.npy"];

/// 从路径 `path` 的 npz 文件读取名为 `name` 的 4D 图像.
pub fn read_image<P: AsRef<Path>>(path: P, name: &str) -> MultiplexResult<Image> {
    Ok(NpzArchive::open(path)?.image_by_name(name)?)
}

/// 按 `names` 顺序读取模型的 4 个原始输出.
pub fn read_raw_outputs<P: AsRef<Path>>(
    path: P,
    names: [&str; OUTPUT_LEN],
) -> MultiplexResult<Vec<Image>> {
    let mut archive = NpzArchive::open(path)?;
    let mut ans = Vec::with_capacity(OUTPUT_LEN);
    for name in names {
        ans.push(archive.image_by_name(name)?);
    }
    Ok(ans)
}

/// 以 [`DEFAULT_OUTPUT_NAMES`] 调用 [`read_raw_outputs`].
#[inline]
pub fn read_raw_outputs_default<P: AsRef<Path>>(path: P) -> MultiplexResult<Vec<Image>> {
    read_raw_outputs(path, DEFAULT_OUTPUT_NAMES)
}

/// 读取模型原始输出并整理为 [`MultiplexOutput`].
pub fn load_multiplex_output<P: AsRef<Path>>(
    path: P,
    names: [&str; OUTPUT_LEN],
) -> MultiplexResult<MultiplexOutput> {
    format_output(read_raw_outputs(path, names)?)
}
