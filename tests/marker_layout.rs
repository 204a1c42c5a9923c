use std::fmt::Write;

use expect_test::{Expect, expect};
use progjpeg::jpeg_marker_code::JpegMarkerCode;
use progjpeg::{EncodeOptions, GrayImage, RgbImage, ScanScript};

/// One line per marker segment, with the entropy-coded bytes after each SOS
/// and RST.
fn dump(data: &[u8]) -> String {
    let mut out = String::new();
    let mut pos = 0;
    while pos + 1 < data.len() {
        assert_eq!(data[pos], 0xFF, "expected a marker at {pos:#x}");
        let code = data[pos + 1];
        let marker = JpegMarkerCode::try_from(code).expect("known marker");
        if marker.is_standalone() {
            writeln!(out, "{pos:04X} [FF {code:02X}] {marker:?}").unwrap();
            pos += 2;
        } else {
            let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            writeln!(out, "{pos:04X} [FF {code:02X}] {marker:?} len={len}").unwrap();
            pos += 2 + len;
        }
        if marker == JpegMarkerCode::StartOfScan || marker.is_restart() {
            let start = pos;
            loop {
                if data[pos] == 0xFF {
                    if data[pos + 1] == 0x00 {
                        pos += 2;
                        continue;
                    }
                    break;
                }
                pos += 1;
            }
            writeln!(out, "     entropy {:02x?}", &data[start..pos]).unwrap();
        }
    }
    out
}

fn check(data: &[u8], expect: Expect) {
    expect.assert_eq(&dump(data));
}

fn encode_gray(image: &GrayImage, options: &EncodeOptions) -> Vec<u8> {
    let mut out = Vec::new();
    progjpeg::encode(&mut out, image, options).unwrap();
    out
}

#[test]
fn baseline_gray_8x8() {
    let image = GrayImage::from_fn(8, 8, |_, _| 128);
    let options = EncodeOptions { quality: 50, ..Default::default() };
    check(
        &encode_gray(&image, &options),
        expect![[r#"
            0000 [FF D8] StartOfImage
            0002 [FF DB] DefineQuantizationTable len=132
            0088 [FF C0] StartOfFrameBaseline len=11
            0095 [FF C4] DefineHuffmanTable len=210
            0169 [FF DA] StartOfScan len=8
                 entropy [2b]
            0174 [FF D9] EndOfImage
        "#]],
    );
}

#[test]
fn progressive_gray_default_script() {
    let image = GrayImage::from_fn(16, 16, |_, _| 128);
    let options = EncodeOptions { progressive: true, ..Default::default() };
    check(
        &encode_gray(&image, &options),
        expect![[r#"
            0000 [FF D8] StartOfImage
            0002 [FF DB] DefineQuantizationTable len=132
            0088 [FF C2] StartOfFrameProgressive len=11
            0095 [FF C4] DefineHuffmanTable len=210
            0169 [FF DA] StartOfScan len=8
                 entropy [00, ff, 00]
            0176 [FF DA] StartOfScan len=8
                 entropy [aa, aa, ff, 00]
            0184 [FF DA] StartOfScan len=8
                 entropy [aa, aa, ff, 00]
            0192 [FF D9] EndOfImage
        "#]],
    );
}

#[test]
fn progressive_color_writes_one_scan_per_descriptor() {
    let image = RgbImage::from_fn(24, 16, |x, y| [(x * 10) as u8, (y * 15) as u8, 90]);
    let mut out = Vec::new();
    let options = EncodeOptions { progressive: true, ..Default::default() };
    progjpeg::encode(&mut out, &image, &options).unwrap();

    let layout = dump(&out);
    let scans = layout.lines().filter(|l| l.contains("StartOfScan")).count();
    assert_eq!(scans, ScanScript::default_color().len());
    assert!(layout.contains("StartOfFrameProgressive len=17"));
    assert!(layout.contains("DefineHuffmanTable len=418"));
    assert!(!layout.contains("Restart"));
}

#[test]
fn restart_interval_writes_dri_and_cycling_markers() {
    let image = GrayImage::from_fn(80, 8, |x, _| (x * 3) as u8);
    let options = EncodeOptions { restart_interval: 1, ..Default::default() };
    let layout = dump(&encode_gray(&image, &options));
    assert!(layout.contains("DefineRestartInterval len=4"));
    let restarts: Vec<&str> = layout
        .lines()
        .filter(|l| l.contains("] Restart"))
        .map(|l| l.rsplit(' ').next().unwrap())
        .collect();
    assert_eq!(
        restarts,
        ["Restart0", "Restart1", "Restart2", "Restart3", "Restart4", "Restart5", "Restart6", "Restart7", "Restart0"]
    );
}
