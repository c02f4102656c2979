//! # 条带读写引擎
//!
//! 按条带顺序遍历载体的栅格数据，把带长度前缀的负载写入载体字节的低位，或者从中恢复出来。
//! 长度前缀与负载在逻辑上是一条连续的载体字节流，条带边界只影响 I/O 的分块。
//!
//! 写入路径对同一个文件句柄做原地替换：先读出载体字节，编码后回退同样的字节数再写回。

use crate::bitplane::{self, bit_factor};
use crate::capacity::ensure_capacity;
use crate::constants::{CHUNK_PAYLOAD_BYTES, LENGTH_PREFIX_SIZE};
use crate::error::{Result, StegoError};
use crate::tiff::RasterLayout;
use log::{debug, trace, warn};
use std::io::{Read, Seek, SeekFrom, Write};

/// 一次写入操作的统计信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedReport {
    /// 写入的负载字节数。
    pub payload_len: u64,
    /// 被替换的载体字节数，包括长度前缀。
    pub carrier_bytes: u64,
}

/// 一次提取操作的统计信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractReport {
    /// 实际写出的负载字节数。
    pub payload_len: u64,
    /// 读取的载体字节数，包括长度前缀。
    pub carrier_bytes: u64,
    /// 条带在达到长度前缀声明的大小之前就用完了。
    pub truncated: bool,
}

/// 条带内一段连续的载体区域，可容纳 `units` 个负载字节。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    index: usize,
    offset: u64,
    units: usize,
}

/// 按条带顺序推进的载体游标，记录每个条带剩余的起始偏移与字节预算。
#[derive(Debug, Clone)]
struct StripCursor {
    strips: Vec<(u64, u64)>,
    index: usize,
    factor: u64,
}

impl StripCursor {
    fn new(layout: &RasterLayout, factor: usize) -> Self {
        StripCursor {
            strips: layout.strips().collect(),
            index: 0,
            factor: factor as u64,
        }
    }

    /// 占用第一个条带开头的 `LENGTH_PREFIX_SIZE * factor` 个字节，并将其起点与预算前移。
    fn take_prefix(&mut self) -> Result<Run> {
        let span = LENGTH_PREFIX_SIZE as u64 * self.factor;
        let Some((offset, budget)) = self.strips.first_mut() else {
            return Err(StegoError::NoImageData);
        };
        if *budget < span {
            return Err(StegoError::NotEnoughData {
                required: span,
                available: *budget,
            });
        }

        let run = Run {
            index: 0,
            offset: *offset,
            units: LENGTH_PREFIX_SIZE,
        };
        *offset += span;
        *budget -= span;
        Ok(run)
    }

    /// 返回当前条带中最多 `max_units` 个单元的下一段区域；所有条带用完时返回 `None`。
    fn next_run(&mut self, max_units: u64) -> Option<Run> {
        while let Some((offset, budget)) = self.strips.get_mut(self.index) {
            let units = (*budget / self.factor).min(max_units);
            if units == 0 {
                self.index += 1;
                continue;
            }

            let run = Run {
                index: self.index,
                offset: *offset,
                units: units as usize,
            };
            *offset += units * self.factor;
            *budget -= units * self.factor;
            return Some(run);
        }
        None
    }

    /// 确认接下来 `units` 个单元会触及的区域都落在长度为 `file_len` 的文件之内。
    fn ensure_within(mut self, mut units: u64, file_len: u64) -> Result<()> {
        while units > 0 {
            let Some(run) = self.next_run(units) else {
                break;
            };
            check_run(&run, self.factor, file_len)?;
            units -= run.units as u64;
        }
        Ok(())
    }
}

fn check_run(run: &Run, factor: u64, file_len: u64) -> Result<()> {
    let end = run.offset + run.units as u64 * factor;
    if end > file_len {
        return Err(StegoError::StripOutOfBounds {
            index: run.index,
            end,
            file_len,
        });
    }
    Ok(())
}

fn stream_len<S: Seek>(stream: &mut S) -> Result<u64> {
    let len = stream.seek(SeekFrom::End(0)).map_err(StegoError::seek)?;
    stream.seek(SeekFrom::Start(0)).map_err(StegoError::seek)?;
    Ok(len)
}

/// 在 `offset` 处读出 `source.len() * bit_factor` 个载体字节，把 `source` 编码进其低位，
/// 然后回退同样的字节数原地写回。
fn substitute<C: Read + Write + Seek>(
    carrier: &mut C,
    offset: u64,
    source: &[u8],
    bits: u8,
    buf: &mut Vec<u8>,
) -> Result<()> {
    let span = source.len() * bit_factor(bits)?;
    buf.resize(span, 0);

    carrier
        .seek(SeekFrom::Start(offset))
        .map_err(StegoError::seek)?;
    carrier.read_exact(buf).map_err(StegoError::read)?;

    bitplane::encode(buf, source, bits)?;

    carrier
        .seek(SeekFrom::Current(-(span as i64)))
        .map_err(StegoError::seek)?;
    carrier.write_all(buf).map_err(StegoError::write)
}

/// 在 `offset` 处读出 `decoded.len() * bit_factor` 个载体字节并解码到 `decoded`。
fn gather<C: Read + Seek>(
    carrier: &mut C,
    offset: u64,
    decoded: &mut [u8],
    bits: u8,
    buf: &mut Vec<u8>,
) -> Result<()> {
    let span = decoded.len() * bit_factor(bits)?;
    buf.resize(span, 0);

    carrier
        .seek(SeekFrom::Start(offset))
        .map_err(StegoError::seek)?;
    carrier.read_exact(buf).map_err(StegoError::read)?;

    bitplane::decode(decoded, buf, bits)
}

/// 将 `payload` 的全部内容连同 4 字节长度前缀写入 `carrier` 的条带。
///
/// 修改载体之前会先完成容量检查和越界检查；检查失败时载体保持原样。
/// 写入过程中出错则不会回滚，已替换的字节保留在载体中。
///
/// # Errors
///
/// * 负载为空：[`StegoError::FileEmpty`]；放不下：[`StegoError::NotEnoughData`]。
/// * 没有条带：[`StegoError::NoImageData`]；条带表长度不一致：[`StegoError::InvalidFileType`]。
/// * 条带超出载体文件末尾：[`StegoError::StripOutOfBounds`]。
/// * 读、写、定位失败时返回相应的文件错误。
pub fn embed_stream<P, C>(
    payload: &mut P,
    carrier: &mut C,
    layout: &RasterLayout,
    bits: u8,
) -> Result<EmbedReport>
where
    P: Read + Seek,
    C: Read + Write + Seek,
{
    let factor = bit_factor(bits)?;
    let payload_len = stream_len(payload)?;
    ensure_capacity(layout, bits, payload_len)?;

    let file_len = stream_len(carrier)?;
    let mut cursor = StripCursor::new(layout, factor);
    let prefix = cursor.take_prefix()?;
    check_run(&prefix, factor as u64, file_len)?;
    cursor.clone().ensure_within(payload_len, file_len)?;

    debug!("embedding {payload_len} bytes at {bits} bits per carrier byte");

    let mut buf = Vec::new();
    let size = (payload_len as u32).to_le_bytes();
    substitute(carrier, prefix.offset, &size, bits, &mut buf)?;
    let mut carrier_bytes = (LENGTH_PREFIX_SIZE * factor) as u64;

    let mut chunk = vec![0u8; CHUNK_PAYLOAD_BYTES.min(payload_len as usize)];
    let mut written = 0u64;
    while written < payload_len {
        let wanted = (payload_len - written).min(chunk.len() as u64);
        let Some(run) = cursor.next_run(wanted) else {
            warn!("strips exhausted after {written} of {payload_len} payload bytes");
            break;
        };
        trace!("strip {}: {} bytes at offset {}", run.index, run.units, run.offset);

        let source = &mut chunk[..run.units];
        payload.read_exact(source).map_err(StegoError::read)?;
        substitute(carrier, run.offset, source, bits, &mut buf)?;

        written += run.units as u64;
        carrier_bytes += (run.units * factor) as u64;
    }

    carrier.flush().map_err(StegoError::write)?;

    Ok(EmbedReport {
        payload_len: written,
        carrier_bytes,
    })
}

/// 从 `carrier` 的条带中读出长度前缀和负载，把负载写入 `output`。
///
/// 条带在达到声明长度之前用完时正常结束，并在 [`ExtractReport::truncated`] 中标记。
///
/// # Errors
///
/// * 没有条带：[`StegoError::NoImageData`]；条带表长度不一致：[`StegoError::InvalidFileType`]。
/// * 第一个条带放不下长度前缀：[`StegoError::NotEnoughData`]。
/// * 条带超出载体文件末尾：[`StegoError::StripOutOfBounds`]。
/// * 读、写、定位失败时返回相应的文件错误。
pub fn extract_stream<C, W>(
    carrier: &mut C,
    output: &mut W,
    layout: &RasterLayout,
    bits: u8,
) -> Result<ExtractReport>
where
    C: Read + Seek,
    W: Write,
{
    let factor = bit_factor(bits)?;
    layout.validate_strips()?;
    let file_len = stream_len(carrier)?;
    let mut cursor = StripCursor::new(layout, factor);
    let prefix = cursor.take_prefix()?;
    check_run(&prefix, factor as u64, file_len)?;

    let mut buf = Vec::new();
    let mut size = [0u8; LENGTH_PREFIX_SIZE];
    gather(carrier, prefix.offset, &mut size, bits, &mut buf)?;
    let payload_len = u64::from(u32::from_le_bytes(size));
    let mut carrier_bytes = (LENGTH_PREFIX_SIZE * factor) as u64;

    debug!("extracting {payload_len} bytes at {bits} bits per carrier byte");
    cursor.clone().ensure_within(payload_len, file_len)?;

    let mut chunk = vec![0u8; CHUNK_PAYLOAD_BYTES.min(payload_len as usize)];
    let mut recovered = 0u64;
    let mut truncated = false;
    while recovered < payload_len {
        let wanted = (payload_len - recovered).min(chunk.len() as u64);
        let Some(run) = cursor.next_run(wanted) else {
            warn!("strips exhausted after {recovered} of {payload_len} payload bytes");
            truncated = true;
            break;
        };
        trace!("strip {}: {} bytes at offset {}", run.index, run.units, run.offset);

        let decoded = &mut chunk[..run.units];
        gather(carrier, run.offset, decoded, bits, &mut buf)?;
        output.write_all(decoded).map_err(StegoError::write)?;

        recovered += run.units as u64;
        carrier_bytes += (run.units * factor) as u64;
    }

    output.flush().map_err(StegoError::write)?;

    Ok(ExtractReport {
        payload_len: recovered,
        carrier_bytes,
        truncated,
    })
}
