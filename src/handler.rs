//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责确定输出路径、防止意外覆盖、调用隐写操作以及向用户报告结果。

use crate::capacity::payload_capacity;
use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::steganography::{embed, extract, inspect};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认的隐写结果路径：`doctored_<原文件名>`。
fn default_dest(image: &Path) -> PathBuf {
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.tif".to_string());
    image.with_file_name(format!("doctored_{name}"))
}

/// 默认的恢复结果路径：`recovered_<图像名去掉扩展名>.bin`。
fn default_output(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    image.with_file_name(format!("recovered_{stem}.bin"))
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}\nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 未指定 `--in-place` 时先把图像复制到目标路径，再在副本上原地隐写，原图保持不变。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法复制图像文件。
/// * 隐写过程失败 (文件不是未压缩 TIFF、容量不足、负载为空等)。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let target = if args.in_place {
        args.image.clone()
    } else {
        let dest = args.dest.clone().unwrap_or_else(|| default_dest(&args.image));
        anyhow::ensure!(
            dest != args.image,
            "The destination is the input image itself. Use --in-place to modify it directly."
        );
        ensure_writable(&dest, args.force)?;

        fs::copy(&args.image, &dest).with_context(|| {
            format!(
                "Unable to copy image file {} to {}",
                args.image.to_string_lossy().red().bold(),
                dest.to_string_lossy().red().bold()
            )
        })?;
        dest
    };

    let report = embed(&args.payload, &target, args.bits).with_context(|| {
        format!(
            "Failed to hide {} in {}",
            args.payload.to_string_lossy().red().bold(),
            target.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "{} bytes have been successfully hidden and saved: {}",
        report.payload_len.to_string().green().bold(),
        target.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 图像不是未压缩 TIFF，或读取/写入失败。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.image));
    ensure_writable(&output, args.force)?;

    let report = extract(&args.image, &output, args.bits).with_context(|| {
        format!(
            "Failed to recover hidden data from '{}'. \nThe image may not contain hidden data or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    if report.truncated {
        println!(
            "{} The image ran out of strips, only {} bytes were recovered.",
            "Warning:".yellow().bold(),
            report.payload_len.to_string().yellow().bold()
        );
    }

    println!(
        "{} bytes have been successfully recovered and saved: {}",
        report.payload_len.to_string().green().bold(),
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑：打印条带布局和各低位数下可隐藏的负载字节数。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let layout = inspect(&args.image).with_context(|| {
        format!(
            "Unable to read image directory: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "{}x{} pixels, {} bits per sample, {} strips ({} rows per strip)",
        layout.width,
        layout.length,
        layout.bits_per_sample,
        layout.strip_count(),
        layout.rows_per_strip
    );

    let depths = match args.bits {
        Some(bits) => vec![bits],
        None => vec![1, 2, 4],
    };
    for bits in depths {
        let payload = payload_capacity(&layout, bits)?;
        println!(
            "{} bit(s): {} bytes",
            bits,
            payload.to_string().green().bold()
        );
    }

    Ok(())
}
