#![allow(dead_code)]

use rand::RngCore;
use std::fs;
use std::path::Path;

const SHORT: u16 = 3;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;

/// 构造一个最小的小端序 TIFF 文件，用于测试
#[derive(Debug, Clone)]
pub struct TiffFixture {
    pub width: u32,
    pub length: u32,
    pub rows_per_strip: u32,
    pub compression: u32,
    pub bits_per_sample: u16,
    pub samples_per_pixel: u16,
    pub strip_offsets: Vec<u32>,
    pub strip_byte_counts: Vec<u32>,
    /// 以 SHORT 而不是 LONG 保存条带数组
    pub short_arrays: bool,
    /// 强制指定文件总长度 (可用于截断文件)
    pub file_len: Option<usize>,
}

impl TiffFixture {
    pub fn with_strips(strips: &[(u32, u32)]) -> Self {
        TiffFixture {
            width: 8,
            length: 8,
            rows_per_strip: 8,
            compression: 1,
            bits_per_sample: 8,
            samples_per_pixel: 1,
            strip_offsets: strips.iter().map(|s| s.0).collect(),
            strip_byte_counts: strips.iter().map(|s| s.1).collect(),
            short_arrays: false,
            file_len: None,
        }
    }

    /// 单条带：`stripOffsets=[1000]`、`stripByteCounts=[64]`
    pub fn single_strip() -> Self {
        Self::with_strips(&[(1000, 64)])
    }

    pub fn build(&self) -> Vec<u8> {
        const TAGS: u32 = 9;
        let ifd_end = 8 + 2 + 12 * TAGS + 4;
        let mut extra: Vec<u8> = Vec::new();

        let array_type = if self.short_arrays { SHORT } else { LONG };
        let mut append = |values: &[u32], field_type: u16| -> u32 {
            let offset = ifd_end + extra.len() as u32;
            for &v in values {
                if field_type == SHORT {
                    extra.extend_from_slice(&(v as u16).to_le_bytes());
                } else {
                    extra.extend_from_slice(&v.to_le_bytes());
                }
            }
            offset
        };

        // BitsPerSample 总是写在 IFD 之后，单通道也一样
        let values = vec![u32::from(self.bits_per_sample); self.samples_per_pixel as usize];
        let bps = (values.len() as u32, append(&values, SHORT));
        let strip_tag = |values: &[u32], append: &mut dyn FnMut(&[u32], u16) -> u32| {
            if values.len() == 1 {
                (1, values[0])
            } else if values.is_empty() {
                (0, 0)
            } else {
                (values.len() as u32, append(values, array_type))
            }
        };
        let offsets = strip_tag(&self.strip_offsets, &mut append);
        let counts = strip_tag(&self.strip_byte_counts, &mut append);
        let resolution = append(&[72, 1], LONG);

        let tags: [(u16, u16, u32, u32); TAGS as usize] = [
            (256, SHORT, 1, self.width),
            (257, SHORT, 1, self.length),
            (258, SHORT, bps.0, bps.1),
            (259, SHORT, 1, self.compression),
            (262, SHORT, 1, 1),
            (273, array_type, offsets.0, offsets.1),
            (278, LONG, 1, self.rows_per_strip),
            (279, array_type, counts.0, counts.1),
            (282, RATIONAL, 1, resolution),
        ];

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"II");
        bytes.extend_from_slice(&42u16.to_le_bytes());
        bytes.extend_from_slice(&8u32.to_le_bytes());
        bytes.extend_from_slice(&(TAGS as u16).to_le_bytes());
        for (id, field_type, count, value) in tags {
            bytes.extend_from_slice(&id.to_le_bytes());
            bytes.extend_from_slice(&field_type.to_le_bytes());
            bytes.extend_from_slice(&count.to_le_bytes());
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&extra);

        let data_start = bytes.len();
        let data_end = self
            .strip_offsets
            .iter()
            .zip(&self.strip_byte_counts)
            .map(|(&o, &c)| {
                assert!(o as usize >= data_start, "strip overlaps the directory");
                (o + c) as usize
            })
            .max()
            .unwrap_or(data_start);

        let total = self.file_len.unwrap_or(data_end);
        bytes.extend((data_start..total.max(data_start)).map(carrier_byte));
        bytes.truncate(total);
        bytes
    }

    pub fn write_to(&self, path: &Path) -> Vec<u8> {
        let bytes = self.build();
        fs::write(path, &bytes).expect("Failed to write TIFF fixture.");
        bytes
    }
}

/// 测试载体在文件位置 `i` 处的原始字节，高位各不相同
pub fn carrier_byte(i: usize) -> u8 {
    (i.wrapping_mul(31) + 7) as u8
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}
