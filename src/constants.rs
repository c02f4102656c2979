/// 小端序字节序标记 `II`。
pub const LITTLE_ENDIAN_MARKER: [u8; 2] = *b"II";

/// 大端序字节序标记 `MM`，可以识别但不支持。
pub const BIG_ENDIAN_MARKER: [u8; 2] = *b"MM";

/// TIFF 版本号 (42)。
pub const TIFF_VERSION: u16 = 0x2A;

pub const TAG_IMAGE_WIDTH: u16 = 256;
pub const TAG_IMAGE_LENGTH: u16 = 257;
pub const TAG_BITS_PER_SAMPLE: u16 = 258;
pub const TAG_COMPRESSION: u16 = 259;
pub const TAG_STRIP_OFFSETS: u16 = 273;
pub const TAG_ROWS_PER_STRIP: u16 = 278;
pub const TAG_STRIP_BYTE_COUNTS: u16 = 279;

/// TIFF 标量类型 SHORT (u16)，数组元素按 2 字节读取；其余类型按 4 字节读取。
pub const FIELD_TYPE_SHORT: u16 = 3;

/// Compression 标签的取值 1 表示未压缩。
pub const COMPRESSION_NONE: u32 = 1;

/// 隐写负载长度前缀的字节数。
/// 长度以 `u32` 保存，编码后占用 `4 * bit_factor` 个载体字节。
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// 默认的替换位数。
pub const DEFAULT_BITS: u8 = 4;

/// 逐条带读写时单次处理的最大负载字节数。
pub const CHUNK_PAYLOAD_BYTES: usize = 4096;
