//! # tiff_hide 库
//!
//! 本库包含 TIFF 条带隐写工具的核心逻辑：位平面编解码、TIFF 目录解析、容量规划与条带读写引擎。

// 声明库包含的所有模块。

pub mod bitplane;
pub mod capacity;
pub mod cli;
pub mod constants;
pub mod engine;
pub mod error;
pub mod handler;
pub mod steganography;
pub mod tiff;

pub use engine::{EmbedReport, ExtractReport};
pub use error::{Result, StegoError};
pub use steganography::{embed, extract, inspect};
pub use tiff::RasterLayout;
