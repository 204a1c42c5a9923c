//! Pixel containers consumed by the encoder and produced by the decoder.

use std::fmt;

use crate::error::JpegError;

fn clamp_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Converts one RGB pixel to full-range YCbCr (JFIF).
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let luma = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = -0.1687 * r - 0.3313 * g + 0.5 * b + 128.0;
    let cr = 0.5 * r - 0.4187 * g - 0.0813 * b + 128.0;
    [clamp_to_u8(luma), clamp_to_u8(cb), clamp_to_u8(cr)]
}

/// Converts one full-range YCbCr pixel back to RGB.
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y_val = y as f32;
    let cb_val = cb as f32 - 128.0;
    let cr_val = cr as f32 - 128.0;
    let r = y_val + 1.402 * cr_val;
    let g = y_val - 0.344136 * cb_val - 0.714136 * cr_val;
    let b = y_val + 1.772 * cb_val;
    [clamp_to_u8(r), clamp_to_u8(g), clamp_to_u8(b)]
}

fn check_dimensions(width: usize, height: usize) -> Result<(), JpegError> {
    if width == 0 || height == 0 {
        return Err(JpegError::InvalidDimensions);
    }
    Ok(())
}

/// 8-bit single-channel image, row-major with stride equal to the width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, JpegError> {
        check_dimensions(width, height)?;
        if pixels.len() != width * height {
            return Err(JpegError::InvalidArgument("pixel buffer does not match the image dimensions"));
        }
        Ok(Self { width, height, pixels })
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }
}

/// 8-bit interleaved RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RgbImage {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, JpegError> {
        check_dimensions(width, height)?;
        if pixels.len() != width * height * 3 {
            return Err(JpegError::InvalidArgument("pixel buffer does not match the image dimensions"));
        }
        Ok(Self { width, height, pixels })
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width + x) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }
}

/// Chroma subsampling ratio of a YCbCr image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsampling {
    Ratio444,
    Ratio440,
    Ratio422,
    Ratio420,
    Ratio411,
    Ratio410,
}

impl Subsampling {
    /// Horizontal and vertical chroma divisors.
    pub fn divisors(self) -> (usize, usize) {
        match self {
            Self::Ratio444 => (1, 1),
            Self::Ratio440 => (1, 2),
            Self::Ratio422 => (2, 1),
            Self::Ratio420 => (2, 2),
            Self::Ratio411 => (4, 1),
            Self::Ratio410 => (4, 2),
        }
    }

    /// Maps the luma/chroma sampling factor ratio of a frame header.
    pub fn from_divisors(h: usize, v: usize) -> Option<Self> {
        match (h, v) {
            (1, 1) => Some(Self::Ratio444),
            (1, 2) => Some(Self::Ratio440),
            (2, 1) => Some(Self::Ratio422),
            (2, 2) => Some(Self::Ratio420),
            (4, 1) => Some(Self::Ratio411),
            (4, 2) => Some(Self::Ratio410),
            _ => None,
        }
    }

    /// Size of a chroma plane for a `width` x `height` image.
    pub fn chroma_dimensions(self, width: usize, height: usize) -> (usize, usize) {
        let (h, v) = self.divisors();
        (width.div_ceil(h), height.div_ceil(v))
    }
}

impl fmt::Display for Subsampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ratio444 => "4:4:4",
            Self::Ratio440 => "4:4:0",
            Self::Ratio422 => "4:2:2",
            Self::Ratio420 => "4:2:0",
            Self::Ratio411 => "4:1:1",
            Self::Ratio410 => "4:1:0",
        };
        f.write_str(name)
    }
}

/// Planar YCbCr image. Chroma planes are `ceil(width / h) x ceil(height / v)`
/// for the subsampling divisors `(h, v)`; every stride equals its plane width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YCbCrImage {
    width: usize,
    height: usize,
    subsampling: Subsampling,
    planes: [Vec<u8>; 3],
}

impl YCbCrImage {
    /// Creates an image with all planes set to zero.
    pub fn new(width: usize, height: usize, subsampling: Subsampling) -> Self {
        let (cw, ch) = subsampling.chroma_dimensions(width, height);
        Self {
            width,
            height,
            subsampling,
            planes: [vec![0; width * height], vec![0; cw * ch], vec![0; cw * ch]],
        }
    }

    pub fn from_planes(
        width: usize,
        height: usize,
        subsampling: Subsampling,
        y: Vec<u8>,
        cb: Vec<u8>,
        cr: Vec<u8>,
    ) -> Result<Self, JpegError> {
        check_dimensions(width, height)?;
        let (cw, ch) = subsampling.chroma_dimensions(width, height);
        if y.len() != width * height || cb.len() != cw * ch || cr.len() != cw * ch {
            return Err(JpegError::InvalidArgument("plane size does not match the image dimensions"));
        }
        Ok(Self { width, height, subsampling, planes: [y, cb, cr] })
    }

    /// Full-resolution (4:4:4) conversion of an RGB image.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let mut out = Self::new(image.width(), image.height(), Subsampling::Ratio444);
        for (i, rgb) in image.pixels().chunks_exact(3).enumerate() {
            let [y, cb, cr] = rgb_to_ycbcr(rgb[0], rgb[1], rgb[2]);
            out.planes[0][i] = y;
            out.planes[1][i] = cb;
            out.planes[2][i] = cr;
        }
        out
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn subsampling(&self) -> Subsampling {
        self.subsampling
    }

    pub fn chroma_dimensions(&self) -> (usize, usize) {
        self.subsampling.chroma_dimensions(self.width, self.height)
    }

    pub fn y(&self) -> &[u8] {
        &self.planes[0]
    }

    pub fn cb(&self) -> &[u8] {
        &self.planes[1]
    }

    pub fn cr(&self) -> &[u8] {
        &self.planes[2]
    }

    /// Plane `index` (0 = Y, 1 = Cb, 2 = Cr) with its width and height.
    pub fn plane_mut(&mut self, index: usize) -> (&mut [u8], usize, usize) {
        let (w, h) = if index == 0 { (self.width, self.height) } else { self.chroma_dimensions() };
        (&mut self.planes[index], w, h)
    }

    /// Samples `(Y, Cb, Cr)` at luma position `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let (h, v) = self.subsampling.divisors();
        let (cw, _) = self.chroma_dimensions();
        let ci = (y / v) * cw + x / h;
        [self.planes[0][y * self.width + x], self.planes[1][ci], self.planes[2][ci]]
    }

    pub fn to_rgb(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let [luma, cb, cr] = self.pixel(x, y);
            ycbcr_to_rgb(luma, cb, cr)
        })
    }
}

/// A decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Image {
    Gray(GrayImage),
    YCbCr(YCbCrImage),
}

impl Image {
    pub fn width(&self) -> usize {
        match self {
            Self::Gray(image) => image.width(),
            Self::YCbCr(image) => image.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Gray(image) => image.height(),
            Self::YCbCr(image) => image.height(),
        }
    }

    pub fn component_count(&self) -> usize {
        match self {
            Self::Gray(_) => 1,
            Self::YCbCr(_) => 3,
        }
    }

    pub fn as_gray(&self) -> Option<&GrayImage> {
        match self {
            Self::Gray(image) => Some(image),
            Self::YCbCr(_) => None,
        }
    }

    pub fn as_ycbcr(&self) -> Option<&YCbCrImage> {
        match self {
            Self::Gray(_) => None,
            Self::YCbCr(image) => Some(image),
        }
    }

    /// Gray images are replicated into all three channels.
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            Self::Gray(image) => RgbImage::from_fn(image.width(), image.height(), |x, y| {
                let v = image.pixel(x, y);
                [v, v, v]
            }),
            Self::YCbCr(image) => image.to_rgb(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_size_is_checked() {
        assert!(matches!(GrayImage::new(4, 4, vec![0; 15]), Err(JpegError::InvalidArgument(_))));
        assert!(matches!(RgbImage::new(0, 4, vec![]), Err(JpegError::InvalidDimensions)));
        assert!(GrayImage::new(4, 4, vec![0; 16]).is_ok());
    }

    #[test]
    fn chroma_planes_round_up() {
        let image = YCbCrImage::new(23, 9, Subsampling::Ratio420);
        assert_eq!(image.chroma_dimensions(), (12, 5));
        assert_eq!(image.cb().len(), 60);
        assert_eq!(Subsampling::Ratio410.chroma_dimensions(9, 3), (3, 2));
        assert_eq!(Subsampling::from_divisors(4, 2), Some(Subsampling::Ratio410));
        assert_eq!(Subsampling::from_divisors(3, 1), None);
    }

    #[test]
    fn colour_conversion_round_trips_primaries() {
        for rgb in [[0, 0, 0], [255, 255, 255], [255, 0, 0], [0, 255, 0], [0, 0, 255], [12, 200, 99]] {
            let [y, cb, cr] = rgb_to_ycbcr(rgb[0], rgb[1], rgb[2]);
            let back = ycbcr_to_rgb(y, cb, cr);
            for c in 0..3 {
                assert!((back[c] as i32 - rgb[c] as i32).abs() <= 2, "{rgb:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn gray_to_rgb_replicates() {
        let image = Image::Gray(GrayImage::from_fn(2, 1, |x, _| x as u8 * 10));
        assert_eq!(image.to_rgb().pixels(), &[0, 0, 0, 10, 10, 10]);
    }
}
