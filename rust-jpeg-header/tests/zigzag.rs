use proptest::prelude::*;
use rust_jpeg_header::jpeg::{decode_segments, DecodeOptions, Precision, ZIGZAG_MAP};

/// Serializes a natural-order table into a DQT segment in zigzag order.
fn encode_dqt(table: &[u16], table_id: u8, precision: Precision) -> Vec<u8> {
    let mut body = Vec::new();
    for &natural in ZIGZAG_MAP.iter() {
        match precision {
            Precision::Bits8 => body.push(table[natural] as u8),
            Precision::Bits16 => body.extend_from_slice(&table[natural].to_be_bytes()),
        }
    }

    let control = match precision {
        Precision::Bits8 => table_id,
        Precision::Bits16 => 0x10 | table_id,
    };
    let length = (body.len() + 3) as u16;
    let mut segment = vec![0xFF, 0xDB];
    segment.extend_from_slice(&length.to_be_bytes());
    segment.push(control);
    segment.extend_from_slice(&body);
    segment
}

#[test]
fn linear_sequence_lands_on_zigzag_positions() {
    let mut data = vec![0xFF, 0xDB, 0x00, 0x43, 0x00];
    data.extend(0..64u8);

    let header = decode_segments(&data[..], DecodeOptions::default()).unwrap();
    let table = &header.quantization_tables[0];
    for (i, &natural) in ZIGZAG_MAP.iter().enumerate() {
        assert_eq!(table.values[natural], i as u16);
    }
}

proptest! {
    #[test]
    fn round_trip_8_bit(values in prop::collection::vec(any::<u8>(), 64), table_id in 0u8..4) {
        let table: Vec<u16> = values.into_iter().map(u16::from).collect();
        let data = encode_dqt(&table, table_id, Precision::Bits8);

        let header = decode_segments(&data[..], DecodeOptions::default()).unwrap();
        let decoded = &header.quantization_tables[table_id as usize];
        prop_assert!(decoded.populated);
        prop_assert_eq!(decoded.precision, Precision::Bits8);
        prop_assert_eq!(&decoded.values[..], &table[..]);
    }

    #[test]
    fn round_trip_16_bit(table in prop::collection::vec(any::<u16>(), 64), table_id in 0u8..4) {
        let data = encode_dqt(&table, table_id, Precision::Bits16);

        let header = decode_segments(&data[..], DecodeOptions::default()).unwrap();
        let decoded = &header.quantization_tables[table_id as usize];
        prop_assert!(decoded.populated);
        prop_assert_eq!(decoded.precision, Precision::Bits16);
        prop_assert_eq!(&decoded.values[..], &table[..]);
    }
}
