//! # 位平面编解码模块
//!
//! 把字节流拆分为 `bits` 位宽的片段，写入载体字节的最低位；或者从载体字节的最低位
//! 重新拼出原始字节。纯函数，不做 I/O，也不分配输出缓冲区以外的内存。

use crate::error::{Result, StegoError};

/// 返回每个负载字节需要占用的载体字节数 (`8 / bits`)。
///
/// # Errors
///
/// `bits` 不是 1、2、4 之一时返回 [`StegoError::InvalidBits`]。
pub fn bit_factor(bits: u8) -> Result<usize> {
    match bits {
        1 | 2 | 4 => Ok(8 / bits as usize),
        _ => Err(StegoError::InvalidBits(bits)),
    }
}

/// 载体字节中被替换部分的掩码，例如 `bits = 2` 时为 `0b11`。
pub fn low_bits_mask(bits: u8) -> Result<u8> {
    bit_factor(bits)?;
    Ok(((1u16 << bits) - 1) as u8)
}

/// 将 `source` 编码进 `packed` 的低位。
///
/// 每个源字节拆成 `bit_factor` 个片段，高位片段在前；每个片段只覆盖对应载体字节的
/// 低 `bits` 位，其余高位保持不变。
///
/// # Errors
///
/// * `bits` 非法时返回 [`StegoError::InvalidBits`]。
/// * `packed.len() != source.len() * bit_factor` 时返回 [`StegoError::InvalidEncodeSize`]。
pub fn encode(packed: &mut [u8], source: &[u8], bits: u8) -> Result<()> {
    let factor = bit_factor(bits)?;
    let mask = low_bits_mask(bits)?;

    let expected = source.len() * factor;
    if packed.len() != expected {
        return Err(StegoError::InvalidEncodeSize {
            expected,
            actual: packed.len(),
        });
    }

    for (&byte, group) in source.iter().zip(packed.chunks_exact_mut(factor)) {
        for (b, carrier) in group.iter_mut().enumerate() {
            let shift = (factor - 1 - b) * bits as usize;
            let slice = (byte >> shift) & mask;
            *carrier = (*carrier & !mask) | slice;
        }
    }

    Ok(())
}

/// 从 `packed` 的低位还原字节，写入 `decoded`。`encode` 的逆运算。
///
/// # Errors
///
/// * `bits` 非法时返回 [`StegoError::InvalidBits`]。
/// * `packed.len() != decoded.len() * bit_factor` 时返回 [`StegoError::InvalidDecodeSize`]。
pub fn decode(decoded: &mut [u8], packed: &[u8], bits: u8) -> Result<()> {
    let factor = bit_factor(bits)?;
    let mask = low_bits_mask(bits)?;

    let expected = decoded.len() * factor;
    if packed.len() != expected {
        return Err(StegoError::InvalidDecodeSize {
            expected,
            actual: packed.len(),
        });
    }

    for (out, group) in decoded.iter_mut().zip(packed.chunks_exact(factor)) {
        *out = group
            .iter()
            .fold(0u8, |acc, &carrier| (acc << bits) | (carrier & mask));
    }

    Ok(())
}
