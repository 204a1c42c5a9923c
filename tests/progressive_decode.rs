//! Decoding of hand-assembled progressive streams: successive-approximation
//! refinement and end-of-band runs, which the encoder never produces.

use progjpeg::jpeg_marker_code::JpegMarkerCode;
use progjpeg::jpeg_stream_writer::JpegStreamWriter;
use progjpeg::jpeg1::block::to_zigzag;
use progjpeg::jpeg1::huffman::HuffmanIndex;
use progjpeg::{Image, Jpeg1Decoder};

type Writer = JpegStreamWriter<Vec<u8>>;

fn gray_header(width: u16, height: u16) -> Writer {
    let mut w = JpegStreamWriter::new(Vec::new());
    w.write_start_of_image().unwrap();
    w.write_dqt(&[[1u8; 64]]).unwrap();
    w.write_start_of_frame(JpegMarkerCode::StartOfFrameProgressive, width, height, 1).unwrap();
    w
}

fn scan(w: &mut Writer, ss: u8, se: u8, ah: u8, al: u8, body: impl FnOnce(&mut Writer)) {
    w.write_start_of_scan(&[0], ss, se, ah, al).unwrap();
    body(w);
    w.finish_scan(true).unwrap();
}

#[test]
fn successive_approximation_refines_dc_and_ac() {
    // Target zig-zag coefficients: 5, 3, -2, 0, 0, 1, then zeros.
    let mut w = gray_header(8, 8);
    w.write_dht(&HuffmanIndex::ALL[..2]).unwrap();

    // First passes with Al = 1: DC 5 >> 1 = 2; AC 3 -> 1, -2 -> -1, 1 -> 0.
    scan(&mut w, 0, 0, 0, 1, |w| w.emit_huff_rle(HuffmanIndex::LuminanceDc, 0, 2).unwrap());
    scan(&mut w, 1, 63, 0, 1, |w| {
        w.emit_huff_rle(HuffmanIndex::LuminanceAc, 0, 1).unwrap();
        w.emit_huff_rle(HuffmanIndex::LuminanceAc, 0, -1).unwrap();
        w.emit_huff(HuffmanIndex::LuminanceAc, 0x00).unwrap();
    });

    // DC refinement: the low bit of 5.
    scan(&mut w, 0, 0, 1, 0, |w| w.emit(1, 1).unwrap());
    // AC refinement: a new +1 after two zeros, with correction bits 1 (for 3)
    // and 0 (for -2) for the coefficients passed on the way.
    scan(&mut w, 1, 63, 1, 0, |w| {
        w.emit_huff(HuffmanIndex::LuminanceAc, 0x21).unwrap();
        w.emit(1, 1).unwrap();
        w.emit(1, 1).unwrap();
        w.emit(0, 1).unwrap();
        w.emit_huff(HuffmanIndex::LuminanceAc, 0x00).unwrap();
    });
    w.write_end_of_image().unwrap();
    let data = w.finish().unwrap();

    let mut decoder = Jpeg1Decoder::new(&data);
    let image = decoder.decode().unwrap();
    assert_eq!(decoder.scans().len(), 4);
    assert!(decoder.scans()[3].is_refinement());
    assert_eq!((image.width(), image.height()), (8, 8));

    let zigzag = to_zigzag(&decoder.coefficient_blocks(0).unwrap()[0]);
    let mut expected = [0i32; 64];
    expected[..6].copy_from_slice(&[5, 3, -2, 0, 0, 1]);
    assert_eq!(zigzag, expected);
}

#[test]
fn partial_refinement_keeps_first_pass_values() {
    let mut w = gray_header(8, 8);
    w.write_dht(&HuffmanIndex::ALL[..2]).unwrap();
    scan(&mut w, 0, 0, 0, 2, |w| w.emit_huff_rle(HuffmanIndex::LuminanceDc, 0, -3).unwrap());
    scan(&mut w, 0, 0, 2, 1, |w| w.emit(1, 1).unwrap());
    w.write_end_of_image().unwrap();
    let data = w.finish().unwrap();

    let mut decoder = Jpeg1Decoder::new(&data);
    decoder.decode_coefficients().unwrap();
    // -3 << 2 = -12 (two's complement ...10100); OR-ing bit 1 gives -10.
    assert_eq!(decoder.coefficient_blocks(0).unwrap()[0][0], -10);
}

#[test]
fn eob_run_spans_several_blocks() {
    let mut w = gray_header(32, 8);
    w.write_dht(&[HuffmanIndex::LuminanceDc]).unwrap();
    // AC table 0 with three 2-bit codes: 00 = EOB, 01 = EOB run class 2, 10 = size 1.
    let mut counts = [0u8; 16];
    counts[1] = 3;
    w.write_marker(JpegMarkerCode::DefineHuffmanTable).unwrap();
    w.write_u16(2 + 1 + 16 + 3).unwrap();
    w.write_byte(0x10).unwrap();
    w.write_bytes(&counts).unwrap();
    w.write_bytes(&[0x00, 0x20, 0x01]).unwrap();

    scan(&mut w, 0, 0, 0, 0, |w| {
        for _ in 0..4 {
            w.emit_huff_rle(HuffmanIndex::LuminanceDc, 0, 0).unwrap();
        }
    });
    // One EOB run of 4 (class 2, extra bits 00) covers all four blocks.
    scan(&mut w, 1, 63, 0, 0, |w| {
        w.emit(0b01, 2).unwrap();
        w.emit(0b00, 2).unwrap();
    });
    w.write_end_of_image().unwrap();
    let data = w.finish().unwrap();

    let mut decoder = Jpeg1Decoder::new(&data);
    let image = decoder.decode().unwrap();
    assert_eq!(decoder.scans().len(), 2);
    let Image::Gray(gray) = image else {
        panic!("expected grayscale output");
    };
    assert_eq!(gray.width(), 32);
    assert!(gray.pixels().iter().all(|&p| p == 128));
}

#[test]
fn ac_scan_before_dc_is_accepted() {
    // Bands may arrive in any order; the planes just accumulate.
    let mut w = gray_header(8, 8);
    w.write_dht(&HuffmanIndex::ALL[..2]).unwrap();
    scan(&mut w, 1, 5, 0, 0, |w| {
        w.emit_huff_rle(HuffmanIndex::LuminanceAc, 1, 4).unwrap();
        w.emit_huff(HuffmanIndex::LuminanceAc, 0x00).unwrap();
    });
    scan(&mut w, 0, 0, 0, 0, |w| w.emit_huff_rle(HuffmanIndex::LuminanceDc, 0, 7).unwrap());
    w.write_end_of_image().unwrap();
    let data = w.finish().unwrap();

    let mut decoder = Jpeg1Decoder::new(&data);
    decoder.decode_coefficients().unwrap();
    let zigzag = to_zigzag(&decoder.coefficient_blocks(0).unwrap()[0]);
    assert_eq!(&zigzag[..4], &[7, 0, 4, 0]);
}

#[test]
fn refinement_with_too_many_coefficients_is_rejected() {
    let mut w = gray_header(8, 8);
    w.write_dht(&HuffmanIndex::ALL[..2]).unwrap();
    scan(&mut w, 0, 0, 0, 0, |w| w.emit_huff_rle(HuffmanIndex::LuminanceDc, 0, 0).unwrap());
    // Band 1..=2, but the code asks for a new coefficient after five zeros.
    scan(&mut w, 1, 2, 1, 0, |w| {
        w.emit_huff(HuffmanIndex::LuminanceAc, 0x51).unwrap();
        w.emit(1, 1).unwrap();
    });
    w.write_end_of_image().unwrap();
    let data = w.finish().unwrap();

    let err = Jpeg1Decoder::new(&data).decode().unwrap_err();
    assert!(err.is_format_error(), "{err}");
}

#[test]
fn refinement_eob_run_still_corrects_later_blocks() {
    let mut w = gray_header(24, 8);
    w.write_dht(&[HuffmanIndex::LuminanceDc]).unwrap();
    // AC table 0 with three 2-bit codes: 00 = EOB, 01 = size 1, 10 = EOB run class 1.
    let mut counts = [0u8; 16];
    counts[1] = 3;
    w.write_marker(JpegMarkerCode::DefineHuffmanTable).unwrap();
    w.write_u16(2 + 1 + 16 + 3).unwrap();
    w.write_byte(0x10).unwrap();
    w.write_bytes(&counts).unwrap();
    w.write_bytes(&[0x00, 0x01, 0x10]).unwrap();

    scan(&mut w, 0, 0, 0, 0, |w| {
        for _ in 0..3 {
            w.emit_huff_rle(HuffmanIndex::LuminanceDc, 0, 0).unwrap();
        }
    });
    // First pass over band 1..=2 with Al = 1: blocks get [1], [-1] and [1, 1].
    scan(&mut w, 1, 2, 0, 1, |w| {
        w.emit(0b01_1_00, 5).unwrap();
        w.emit(0b01_0_00, 5).unwrap();
        w.emit(0b01_1_01_1, 6).unwrap();
    });
    // The refinement opens with an EOB run of 3 (class 1, extra bit 1), so
    // every block only reads correction bits: 1 | 1 | 0 1.
    scan(&mut w, 1, 2, 1, 0, |w| {
        w.emit(0b10_1, 3).unwrap();
        w.emit(0b1_1_01, 4).unwrap();
    });
    w.write_end_of_image().unwrap();
    let data = w.finish().unwrap();

    let mut decoder = Jpeg1Decoder::new(&data);
    decoder.decode_coefficients().unwrap();
    let blocks = decoder.coefficient_blocks(0).unwrap();
    let bands: Vec<[i32; 3]> = blocks
        .iter()
        .map(|b| {
            let zz = to_zigzag(b);
            [zz[0], zz[1], zz[2]]
        })
        .collect();
    assert_eq!(bands, vec![[0, 3, 0], [0, -3, 0], [0, 2, 3]]);
}

#[test]
fn extreme_point_transformed_dc_saturates() {
    let mut w = JpegStreamWriter::new(Vec::new());
    w.write_start_of_image().unwrap();
    w.write_dqt(&[[255u8; 64]]).unwrap();
    w.write_start_of_frame(JpegMarkerCode::StartOfFrameProgressive, 8, 8, 1).unwrap();
    w.write_dht(&HuffmanIndex::ALL[..2]).unwrap();
    // 2047 << 13 times a quantizer of 255 does not fit in an i32.
    scan(&mut w, 0, 0, 0, 13, |w| w.emit_huff_rle(HuffmanIndex::LuminanceDc, 0, 2047).unwrap());
    w.write_end_of_image().unwrap();
    let data = w.finish().unwrap();

    let Image::Gray(gray) = progjpeg::decode(&data).unwrap() else {
        panic!("expected grayscale output");
    };
    assert!(gray.pixels().iter().all(|&p| p == 255));
}
