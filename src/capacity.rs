//! # 容量规划模块
//!
//! 在修改载体之前计算可用容量，拒绝放不下的负载。

use crate::bitplane::bit_factor;
use crate::constants::LENGTH_PREFIX_SIZE;
use crate::error::{Result, StegoError};
use crate::tiff::RasterLayout;

/// 在 `bits` 位替换下，所有条带一共能容纳的字节数 (含 4 字节长度前缀)。
///
/// 等于各条带 `floor(strip_byte_counts[i] / bit_factor)` 之和。
///
/// # Errors
///
/// * `bits` 非法：[`StegoError::InvalidBits`]。
/// * 没有条带：[`StegoError::NoImageData`]；条带表长度不一致：[`StegoError::InvalidFileType`]。
pub fn usable_size(layout: &RasterLayout, bits: u8) -> Result<u64> {
    let factor = bit_factor(bits)? as u64;
    layout.validate_strips()?;
    Ok(layout.strips().map(|(_, count)| count / factor).sum())
}

/// 扣除长度前缀后，`bits` 位替换下最多能隐藏的负载字节数。
pub fn payload_capacity(layout: &RasterLayout, bits: u8) -> Result<u64> {
    Ok(usable_size(layout, bits)?.saturating_sub(LENGTH_PREFIX_SIZE as u64))
}

/// 检查长度为 `payload_len` 的负载能否完整写入载体。
///
/// # Errors
///
/// * 负载为空：[`StegoError::FileEmpty`]。
/// * 长度前缀加负载超出容量，长度超出 `u32` 范围，或第一个条带放不下长度前缀：
///   [`StegoError::NotEnoughData`]。
pub fn ensure_capacity(layout: &RasterLayout, bits: u8, payload_len: u64) -> Result<()> {
    if payload_len == 0 {
        return Err(StegoError::FileEmpty);
    }

    let factor = bit_factor(bits)? as u64;
    let available = usable_size(layout, bits)?;
    let required = LENGTH_PREFIX_SIZE as u64 + payload_len;

    if required > available || payload_len > u64::from(u32::MAX) {
        return Err(StegoError::NotEnoughData {
            required,
            available,
        });
    }

    // 长度前缀必须完整落在第一个条带内
    let first = layout.strips().next().map_or(0, |(_, count)| count);
    if first < LENGTH_PREFIX_SIZE as u64 * factor {
        return Err(StegoError::NotEnoughData {
            required: LENGTH_PREFIX_SIZE as u64 * factor,
            available: first,
        });
    }

    Ok(())
}
