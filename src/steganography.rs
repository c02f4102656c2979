//! # 隐写操作入口
//!
//! 基于文件路径的 `embed` / `extract` 操作：打开文件，解析载体目录，再交给条带引擎处理。
//! 载体在写入路径中被原地修改，操作不是原子的。

use crate::bitplane::bit_factor;
use crate::engine::{EmbedReport, ExtractReport, embed_stream, extract_stream};
use crate::error::{Result, StegoError};
use crate::tiff::{RasterLayout, parse};
use log::info;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::Path;

fn open_error(path: &Path, source: io::Error) -> StegoError {
    if source.kind() == io::ErrorKind::NotFound {
        StegoError::FileNotFound(path.to_path_buf())
    } else {
        StegoError::FileError { source }
    }
}

/// 两个路径是否指向同一个文件。不存在的路径只按字面比较。
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// 解析载体文件的图像目录。
pub fn inspect(carrier_path: &Path) -> Result<RasterLayout> {
    let mut carrier = File::open(carrier_path).map_err(|e| open_error(carrier_path, e))?;
    parse(&mut carrier)
}

/// 将 `payload_path` 的内容以 `bits` 位替换的方式原地写入 `carrier_path` 指向的 TIFF 图像。
///
/// # Errors
///
/// 参见 [`StegoError`]；在容量检查通过之前不会修改载体。
pub fn embed(payload_path: &Path, carrier_path: &Path, bits: u8) -> Result<EmbedReport> {
    bit_factor(bits)?;
    if same_file(payload_path, carrier_path) {
        return Err(StegoError::InvalidArgument(
            "payload and carrier must be different files".to_string(),
        ));
    }

    let mut payload = File::open(payload_path).map_err(|e| open_error(payload_path, e))?;
    let mut carrier = OpenOptions::new()
        .read(true)
        .write(true)
        .open(carrier_path)
        .map_err(|e| open_error(carrier_path, e))?;

    let layout = parse(&mut carrier)?;
    let report = embed_stream(&mut payload, &mut carrier, &layout, bits)?;
    carrier.sync_all().map_err(StegoError::write)?;

    info!(
        "embedded {} bytes into {} ({} carrier bytes)",
        report.payload_len,
        carrier_path.display(),
        report.carrier_bytes
    );
    Ok(report)
}

/// 从 `carrier_path` 中提取以 `bits` 位替换方式隐藏的负载，写入 `output_path`。
///
/// 输出文件会被创建或截断；提取失败时不会删除已写出的部分。
pub fn extract(carrier_path: &Path, output_path: &Path, bits: u8) -> Result<ExtractReport> {
    bit_factor(bits)?;
    if same_file(carrier_path, output_path) {
        return Err(StegoError::InvalidArgument(
            "carrier and output must be different files".to_string(),
        ));
    }

    let mut carrier = File::open(carrier_path).map_err(|e| open_error(carrier_path, e))?;
    let layout = parse(&mut carrier)?;

    let output = File::create(output_path).map_err(|e| open_error(output_path, e))?;
    let mut output = BufWriter::new(output);
    let report = extract_stream(&mut carrier, &mut output, &layout, bits)?;

    info!(
        "extracted {} bytes from {} into {}",
        report.payload_len,
        carrier_path.display(),
        output_path.display()
    );
    Ok(report)
}
