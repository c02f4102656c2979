//! # 错误类型模块
//!
//! 库内所有操作共用的错误枚举。每个变体对应一种失败类别，
//! 出错时立即返回给调用方，不做重试也不做回滚。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegoError {
    /// 打开或定位 (seek) 文件失败。
    #[error("File error")]
    FileError { source: io::Error },

    /// 读取失败，包括文件提前结束。
    #[error("Failed to read from file")]
    FileReadError { source: io::Error },

    /// 写入失败。
    #[error("Failed to write to file")]
    FileWriteError { source: io::Error },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// 负载文件长度为 0。
    #[error("The payload file is empty")]
    FileEmpty,

    /// 图像目录中没有任何条带 (strip)。
    #[error("The image contains no raster strips")]
    NoImageData,

    #[error("Invalid bit depth {0}, expected one of 1, 2 or 4")]
    InvalidBits(u8),

    #[error("Encode buffer size mismatch: expected {expected} bytes, got {actual}")]
    InvalidEncodeSize { expected: usize, actual: usize },

    #[error("Decode buffer size mismatch: expected {expected} bytes, got {actual}")]
    InvalidDecodeSize { expected: usize, actual: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 载体图像不是未压缩格式 (Compression != 1)。
    #[error("Unsupported compression scheme {0}, only uncompressed images can carry data")]
    InvalidCompression(u32),

    /// 不是可识别的小端序 TIFF 文件。
    #[error("Not a little-endian TIFF file")]
    InvalidFileType,

    #[error("Not enough space in the image: required {required} bytes, available {available}")]
    NotEnoughData { required: u64, available: u64 },

    /// 条带区域超出了载体文件的实际长度。
    #[error("Strip {index} ends at byte {end}, beyond the end of the file ({file_len} bytes)")]
    StripOutOfBounds { index: usize, end: u64, file_len: u64 },
}

pub type Result<T> = std::result::Result<T, StegoError>;

impl StegoError {
    pub(crate) fn read(source: io::Error) -> Self {
        StegoError::FileReadError { source }
    }

    pub(crate) fn write(source: io::Error) -> Self {
        StegoError::FileWriteError { source }
    }

    pub(crate) fn seek(source: io::Error) -> Self {
        StegoError::FileError { source }
    }
}
