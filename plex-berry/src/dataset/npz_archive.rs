use ndarray::{Ix4, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};
use std::fmt::{Display, Formatter};
use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::data::Image;
use crate::MultiplexError;

/// 读取 npz 归档错误.
#[derive(Debug)]
pub enum ArchiveError {
    /// 底层 I/O 错误.
    Io(std::io::Error),

    /// 解析 npz 文件或其中数组错误.
    ReadNpz(ReadNpzError),
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ReadNpz(e) => write!(f, "npz error: {e}"),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ReadNpz(e) => Some(e),
        }
    }
}

impl From<ReadNpzError> for MultiplexError {
    fn from(e: ReadNpzError) -> Self {
        Self::Archive(ArchiveError::ReadNpz(e))
    }
}

/// Npz 文件归档.
///
/// 其中每个数组都应是 `f32` 类型的 4D 张量 (batch, height, width, channel).
pub struct NpzArchive {
    reader: NpzReader<File>,
}

impl NpzArchive {
    /// 以只读方式打开路径 `p` 处的 npz 文件.
    pub fn open<P: AsRef<Path>>(p: P) -> Result<Self, ArchiveError> {
        let file = OpenOptions::new()
            .read(true)
            .open(p.as_ref())
            .map_err(ArchiveError::Io)?;
        let reader = NpzReader::new(file).map_err(ArchiveError::ReadNpz)?;
        Ok(Self { reader })
    }

    /// 通过 npz 索引文件名 `name` 获取 4D 图像.
    pub fn image_by_name(&mut self, name: &str) -> Result<Image, ReadNpzError> {
        self.reader.by_name::<OwnedRepr<f32>, Ix4>(name)
    }

    /// 通过 npz 数值索引获取 4D 图像.
    pub fn image_by_index(&mut self, index: usize) -> Result<Image, ReadNpzError> {
        self.reader.by_index::<OwnedRepr<f32>, Ix4>(index)
    }

    /// 获取底层 npz 文件包含的所有文件名.
    pub fn names(&mut self) -> Result<Vec<String>, ReadNpzError> {
        self.reader.names()
    }

    /// 底层 npz 文件包含的数组个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.reader.len()
    }

    /// 归档是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::NpzArchive;
    use ndarray::Array4;
    use ndarray_npy::NpzWriter;
    use std::fs::File;

    #[test]
    fn test_open_and_index() {
        let path =
            std::env::temp_dir().join(format!("plex-berry-archive-{}.npz", std::process::id()));
        let mut npz = NpzWriter::new(File::create(&path).unwrap());
        npz.add_array("image.npy", &Array4::<f32>::ones((2, 3, 3, 1)))
            .unwrap();
        npz.finish().unwrap();

        let mut archive = NpzArchive::open(&path).unwrap();
        assert_eq!(archive.len(), 1);
        assert!(!archive.is_empty());
        assert_eq!(archive.names().unwrap().len(), 1);
        assert_eq!(archive.image_by_index(0).unwrap().dim(), (2, 3, 3, 1));
        std::fs::remove_file(&path).unwrap();
    }
}
