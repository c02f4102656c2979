//! # TIFF 图像目录解析模块
//!
//! 解析小端序 TIFF 文件头与第一个 IFD，得到描述条带 (strip) 几何信息的 [`RasterLayout`]。
//! 只支持未压缩图像；大端序 (`MM`) 文件会被识别并拒绝。

use crate::constants::{
    BIG_ENDIAN_MARKER, COMPRESSION_NONE, FIELD_TYPE_SHORT, LITTLE_ENDIAN_MARKER,
    TAG_BITS_PER_SAMPLE, TAG_COMPRESSION, TAG_IMAGE_LENGTH, TAG_IMAGE_WIDTH, TAG_ROWS_PER_STRIP,
    TAG_STRIP_BYTE_COUNTS, TAG_STRIP_OFFSETS, TIFF_VERSION,
};
use crate::error::{Result, StegoError};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};
use std::io::{Read, Seek, SeekFrom};

/// 载体图像的栅格布局。
///
/// `strip_offsets` 与 `strip_byte_counts` 一一对应：第 `i` 个条带的载体字节位于
/// `[strip_offsets[i], strip_offsets[i] + strip_byte_counts[i])`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterLayout {
    pub width: u32,
    pub length: u32,
    pub rows_per_strip: u32,
    pub bits_per_sample: u16,
    pub compression: u32,
    pub strip_offsets: Vec<u32>,
    pub strip_byte_counts: Vec<u32>,
}

impl RasterLayout {
    pub fn strip_count(&self) -> usize {
        self.strip_offsets.len()
    }

    /// 检查两张条带表长度一致且至少有一个条带。
    ///
    /// # Errors
    ///
    /// * 长度不一致：[`StegoError::InvalidFileType`]。
    /// * 没有条带：[`StegoError::NoImageData`]。
    pub fn validate_strips(&self) -> Result<()> {
        if self.strip_offsets.len() != self.strip_byte_counts.len() {
            debug!(
                "strip tables disagree: {} offsets, {} byte counts",
                self.strip_offsets.len(),
                self.strip_byte_counts.len()
            );
            return Err(StegoError::InvalidFileType);
        }
        if self.strip_count() == 0 {
            return Err(StegoError::NoImageData);
        }
        Ok(())
    }

    /// 按顺序返回 `(offset, byte_count)` 条带区域。
    pub fn strips(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.strip_offsets
            .iter()
            .zip(&self.strip_byte_counts)
            .map(|(&offset, &count)| (u64::from(offset), u64::from(count)))
    }
}

/// 一条 12 字节的 IFD 标签记录。
#[derive(Debug, Clone, Copy)]
struct TagRecord {
    tag_id: u16,
    field_type: u16,
    count: u32,
    value_or_offset: u32,
}

impl TagRecord {
    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(TagRecord {
            tag_id: reader.read_u16::<LittleEndian>().map_err(StegoError::read)?,
            field_type: reader.read_u16::<LittleEndian>().map_err(StegoError::read)?,
            count: reader.read_u32::<LittleEndian>().map_err(StegoError::read)?,
            value_or_offset: reader.read_u32::<LittleEndian>().map_err(StegoError::read)?,
        })
    }

    fn element_width(&self) -> usize {
        if self.field_type == FIELD_TYPE_SHORT { 2 } else { 4 }
    }

    /// 读取标签的全部取值。
    ///
    /// 只有一个元素时取值直接存放在 `value_or_offset` 字段中；
    /// 否则该字段是数组在文件中的偏移。
    fn values<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<u32>> {
        if self.count == 1 {
            return Ok(vec![self.value_or_offset]);
        }
        read_array(
            reader,
            u64::from(self.value_or_offset),
            self.count as usize,
            self.element_width(),
        )
    }
}

/// 从文件偏移 `offset` 处连续读取 `count` 个宽度为 `width` (2 或 4) 字节的小端序整数。
pub fn read_array<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    count: usize,
    width: usize,
) -> Result<Vec<u32>> {
    if width != 2 && width != 4 {
        return Err(StegoError::InvalidArgument(format!(
            "unsupported array element width {width}"
        )));
    }

    reader
        .seek(SeekFrom::Start(offset))
        .map_err(StegoError::seek)?;

    (0..count)
        .map(|_| {
            let value = if width == 2 {
                reader.read_u16::<LittleEndian>().map(u32::from)
            } else {
                reader.read_u32::<LittleEndian>()
            };
            value.map_err(StegoError::read)
        })
        .collect()
}

/// 校验文件头，返回第一个 IFD 的偏移。
fn read_header<R: Read>(reader: &mut R) -> Result<u32> {
    let mut marker = [0u8; 2];
    reader.read_exact(&mut marker).map_err(StegoError::read)?;
    let version = reader.read_u16::<LittleEndian>().map_err(StegoError::read)?;
    let ifd_offset = reader.read_u32::<LittleEndian>().map_err(StegoError::read)?;

    if marker == BIG_ENDIAN_MARKER {
        debug!("big-endian TIFF is not supported");
        return Err(StegoError::InvalidFileType);
    }
    if marker != LITTLE_ENDIAN_MARKER || version != TIFF_VERSION {
        return Err(StegoError::InvalidFileType);
    }

    Ok(ifd_offset)
}

/// 解析载体文件头与 IFD，生成 [`RasterLayout`]。
///
/// # Errors
///
/// * 不是小端序 TIFF：[`StegoError::InvalidFileType`]。
/// * 压缩方式不是 1：[`StegoError::InvalidCompression`]。
/// * 没有条带：[`StegoError::NoImageData`]；条带表长度不一致：[`StegoError::InvalidFileType`]。
/// * 文件提前结束：[`StegoError::FileReadError`]；定位失败：[`StegoError::FileError`]。
pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<RasterLayout> {
    reader.seek(SeekFrom::Start(0)).map_err(StegoError::seek)?;
    let ifd_offset = read_header(reader)?;

    reader
        .seek(SeekFrom::Start(u64::from(ifd_offset)))
        .map_err(StegoError::seek)?;
    let entries = reader.read_u16::<LittleEndian>().map_err(StegoError::read)?;
    debug!("IFD at offset {ifd_offset} with {entries} entries");

    let mut layout = RasterLayout::default();

    for _ in 0..entries {
        let tag = TagRecord::read_from(reader)?;
        let next = reader.stream_position().map_err(StegoError::seek)?;
        trace!("{tag:?}");

        match tag.tag_id {
            TAG_IMAGE_WIDTH => layout.width = tag.value_or_offset,
            TAG_IMAGE_LENGTH => layout.length = tag.value_or_offset,
            // 取值字段总是按文件偏移解释，读取该处的第一个 SHORT
            TAG_BITS_PER_SAMPLE => {
                reader
                    .seek(SeekFrom::Start(u64::from(tag.value_or_offset)))
                    .map_err(StegoError::seek)?;
                layout.bits_per_sample =
                    reader.read_u16::<LittleEndian>().map_err(StegoError::read)?;
            }
            TAG_COMPRESSION => layout.compression = tag.value_or_offset,
            TAG_STRIP_OFFSETS => layout.strip_offsets = tag.values(reader)?,
            TAG_ROWS_PER_STRIP => layout.rows_per_strip = tag.value_or_offset,
            TAG_STRIP_BYTE_COUNTS => layout.strip_byte_counts = tag.values(reader)?,
            _ => {}
        }

        reader.seek(SeekFrom::Start(next)).map_err(StegoError::seek)?;
    }

    if layout.compression != COMPRESSION_NONE {
        return Err(StegoError::InvalidCompression(layout.compression));
    }
    layout.validate_strips()?;

    debug!(
        "{}x{} raster, {} strips, {} bits per sample",
        layout.width,
        layout.length,
        layout.strip_count(),
        layout.bits_per_sample
    );
    Ok(layout)
}
