mod common;

use common::{TiffFixture, carrier_byte, random_bytes};
use std::io::Cursor;
use tiff_hide::StegoError;
use tiff_hide::capacity::{ensure_capacity, payload_capacity, usable_size};
use tiff_hide::engine::{embed_stream, extract_stream};
use tiff_hide::tiff::{RasterLayout, parse};

fn carrier_and_layout(fixture: &TiffFixture) -> (Cursor<Vec<u8>>, RasterLayout) {
    let mut carrier = Cursor::new(fixture.build());
    let layout = parse(&mut carrier).expect("Fixture should parse.");
    (carrier, layout)
}

/// 64 字节单条带载体，4 位替换隐藏 3 字节负载
#[test]
fn test_single_strip_embed_and_extract() {
    let (mut carrier, layout) = carrier_and_layout(&TiffFixture::single_strip());
    let original = carrier.get_ref().clone();

    let report = embed_stream(&mut Cursor::new(vec![0x41u8, 0x42, 0x43]), &mut carrier, &layout, 4)
        .unwrap();
    assert_eq!(report.payload_len, 3);
    assert_eq!(report.carrier_bytes, 14);

    let modified = carrier.get_ref().clone();
    // 只有条带开头的 14 个字节的低 4 位可能改变
    assert_eq!(&modified[..1000], &original[..1000]);
    assert_eq!(&modified[1014..], &original[1014..]);
    for i in 1000..1014 {
        assert_eq!(modified[i] & 0xF0, original[i] & 0xF0, "high bits changed at {i}");
    }
    // 长度前缀 (小端序 3) 紧随其后的是 'A'
    assert_eq!(
        modified[1000..1010].iter().map(|b| b & 0x0F).collect::<Vec<_>>(),
        vec![0x0, 0x3, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x4, 0x1]
    );

    let mut output = Vec::new();
    let report = extract_stream(&mut carrier, &mut output, &layout, 4).unwrap();
    assert_eq!(output, vec![0x41, 0x42, 0x43]);
    assert_eq!(report.payload_len, 3);
    assert_eq!(report.carrier_bytes, 14);
    assert!(!report.truncated);
}

/// 负载跨越多个条带，并且恰好填满全部容量
#[test]
fn test_round_trip_across_strips_at_full_capacity() {
    let fixture = TiffFixture::with_strips(&[(200, 37), (300, 1), (400, 50), (500, 23)]);

    for bits in [1u8, 2, 4] {
        let (mut carrier, layout) = carrier_and_layout(&fixture);
        let capacity = usable_size(&layout, bits).unwrap();
        let payload = random_bytes(capacity as usize - 4);

        let report = embed_stream(&mut Cursor::new(payload.clone()), &mut carrier, &layout, bits)
            .unwrap();
        assert_eq!(report.payload_len, payload.len() as u64);

        let mut output = Vec::new();
        let report = extract_stream(&mut carrier, &mut output, &layout, bits).unwrap();
        assert_eq!(output, payload, "round trip failed for {bits} bits");
        assert!(!report.truncated);

        // 条带之间的字节保持不变
        let data = carrier.get_ref();
        for i in (237..300).chain(301..400).chain(450..500) {
            assert_eq!(data[i], carrier_byte(i), "byte {i} outside strips changed");
        }
    }
}

#[test]
fn test_usable_size() {
    let layout = RasterLayout {
        compression: 1,
        strip_offsets: vec![100, 200, 300],
        strip_byte_counts: vec![13, 1, 6],
        ..Default::default()
    };

    assert_eq!(usable_size(&layout, 4).unwrap(), 9);
    assert_eq!(usable_size(&layout, 2).unwrap(), 4);
    assert_eq!(usable_size(&layout, 1).unwrap(), 1);
    assert!(matches!(usable_size(&layout, 3), Err(StegoError::InvalidBits(3))));

    assert_eq!(payload_capacity(&layout, 4).unwrap(), 5);
    assert_eq!(payload_capacity(&layout, 2).unwrap(), 0);
    assert_eq!(payload_capacity(&layout, 1).unwrap(), 0);
}

/// 手工构造的布局没有条带或两张表长度不一致时，容量计算和读写流程都拒绝它
#[test]
fn test_unvalidated_layouts_rejected() {
    let empty = RasterLayout {
        compression: 1,
        ..Default::default()
    };
    let mismatched = RasterLayout {
        compression: 1,
        strip_offsets: vec![100, 200],
        strip_byte_counts: vec![64],
        ..Default::default()
    };

    assert!(matches!(usable_size(&empty, 4), Err(StegoError::NoImageData)));
    assert!(matches!(payload_capacity(&empty, 4), Err(StegoError::NoImageData)));
    assert!(matches!(usable_size(&mismatched, 4), Err(StegoError::InvalidFileType)));
    assert!(matches!(
        ensure_capacity(&mismatched, 4, 1),
        Err(StegoError::InvalidFileType)
    ));

    let original = vec![0x55u8; 400];
    for (layout, mismatch) in [(&empty, false), (&mismatched, true)] {
        let mut carrier = Cursor::new(original.clone());
        let result = embed_stream(&mut Cursor::new(b"abc".to_vec()), &mut carrier, layout, 4);
        if mismatch {
            assert!(matches!(result, Err(StegoError::InvalidFileType)));
        } else {
            assert!(matches!(result, Err(StegoError::NoImageData)));
        }
        assert_eq!(carrier.into_inner(), original);

        let mut output = Vec::new();
        let result = extract_stream(&mut Cursor::new(original.clone()), &mut output, layout, 4);
        if mismatch {
            assert!(matches!(result, Err(StegoError::InvalidFileType)));
        } else {
            assert!(matches!(result, Err(StegoError::NoImageData)));
        }
        assert!(output.is_empty());
    }
}

#[test]
fn test_ensure_capacity() {
    let layout = RasterLayout {
        compression: 1,
        strip_offsets: vec![100, 200],
        strip_byte_counts: vec![7, 100],
        ..Default::default()
    };

    // 总容量足够，但第一个条带放不下 8 字节的长度前缀
    assert!(matches!(
        ensure_capacity(&layout, 4, 1),
        Err(StegoError::NotEnoughData { required: 8, available: 7 })
    ));

    let layout = RasterLayout {
        compression: 1,
        strip_offsets: vec![100, 200],
        strip_byte_counts: vec![16, 10],
        ..Default::default()
    };
    assert!(ensure_capacity(&layout, 2, 2).is_ok());
    assert!(matches!(
        ensure_capacity(&layout, 2, 3),
        Err(StegoError::NotEnoughData { required: 7, available: 6 })
    ));
    assert!(matches!(ensure_capacity(&layout, 2, 0), Err(StegoError::FileEmpty)));
}

/// 超出容量时报错，载体不被修改
#[test]
fn test_oversized_payload_leaves_carrier_untouched() {
    let (mut carrier, layout) = carrier_and_layout(&TiffFixture::single_strip());
    let original = carrier.get_ref().clone();

    // 64 / 2 = 32 个单元，长度前缀占 4 个，最多 28 字节
    let result = embed_stream(&mut Cursor::new(vec![7u8; 29]), &mut carrier, &layout, 4);
    assert!(matches!(
        result,
        Err(StegoError::NotEnoughData { required: 33, available: 32 })
    ));
    assert_eq!(carrier.get_ref(), &original);

    assert!(embed_stream(&mut Cursor::new(vec![7u8; 28]), &mut carrier, &layout, 4).is_ok());
}

#[test]
fn test_empty_payload_leaves_carrier_untouched() {
    let (mut carrier, layout) = carrier_and_layout(&TiffFixture::single_strip());
    let original = carrier.get_ref().clone();

    let result = embed_stream(&mut Cursor::new(Vec::<u8>::new()), &mut carrier, &layout, 4);
    assert!(matches!(result, Err(StegoError::FileEmpty)));
    assert_eq!(carrier.get_ref(), &original);
}

/// 条带超出文件末尾时在写入前报错
#[test]
fn test_strip_beyond_end_of_file() {
    let mut fixture = TiffFixture::with_strips(&[(200, 32), (300, 32)]);
    fixture.file_len = Some(310);
    let (mut carrier, layout) = carrier_and_layout(&fixture);
    let original = carrier.get_ref().clone();

    // 第一个条带容纳 12 字节负载，剩余的 8 字节落在第二个条带的 300..316
    let result = embed_stream(&mut Cursor::new(vec![1u8; 20]), &mut carrier, &layout, 4);
    assert!(matches!(
        result,
        Err(StegoError::StripOutOfBounds { index: 1, end: 316, file_len: 310 })
    ));
    assert_eq!(carrier.get_ref(), &original);

    // 只用到文件内的部分时可以正常写入
    let report = embed_stream(&mut Cursor::new(vec![1u8; 17]), &mut carrier, &layout, 4).unwrap();
    assert_eq!(report.carrier_bytes, 8 + 34);
}

/// 条带在声明长度之前用完时，提取正常结束并标记为截断
#[test]
fn test_extract_stops_when_strips_run_out() {
    let fixture = TiffFixture::with_strips(&[(200, 32), (300, 32)]);
    let (mut carrier, layout) = carrier_and_layout(&fixture);
    let payload = random_bytes(20);
    embed_stream(&mut Cursor::new(payload.clone()), &mut carrier, &layout, 4).unwrap();

    let first_strip_only = RasterLayout {
        strip_offsets: vec![200],
        strip_byte_counts: vec![32],
        ..layout
    };
    let mut output = Vec::new();
    let report = extract_stream(&mut carrier, &mut output, &first_strip_only, 4).unwrap();

    assert!(report.truncated);
    assert_eq!(report.payload_len, 12);
    assert_eq!(output, payload[..12]);
}

#[test]
fn test_invalid_bits_before_any_io() {
    let (mut carrier, layout) = carrier_and_layout(&TiffFixture::single_strip());
    let original = carrier.get_ref().clone();

    assert!(matches!(
        embed_stream(&mut Cursor::new(vec![1u8]), &mut carrier, &layout, 3),
        Err(StegoError::InvalidBits(3))
    ));
    assert!(matches!(
        extract_stream(&mut carrier, &mut Vec::<u8>::new(), &layout, 8),
        Err(StegoError::InvalidBits(8))
    ));
    assert_eq!(carrier.get_ref(), &original);
}
