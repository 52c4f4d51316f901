//! Row-major pixel grid generic over element type and channel count
use crate::error::{Result, ScanError};

/// A width x height grid of `C`-channel pixels with element type `T`
///
/// Indexing follows `(row, col, channel)`. Every accessor is bounds-checked:
/// `get`/`pixel` return the default value outside the grid, `try_get` returns
/// `None`, and `set` ignores out-of-range writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T, const C: usize> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// 8-bit image in blue, green, red channel order
pub type BgrImage = Image<u8, 3>;
/// 8-bit image holding hue (0-180), saturation and value (0-255)
pub type HsvImage = Image<u8, 3>;
/// 8-bit single channel image
pub type GrayImage = Image<u8, 1>;
/// Floating point single channel image (gradients, Harris products)
pub type FloatImage = Image<f32, 1>;
/// Binary single channel image where set pixels are 255
pub type Mask = Image<u8, 1>;

impl<T: Copy + Default, const C: usize> Image<T, C> {
    /// Create a zero-filled image
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height * C],
        }
    }

    /// Wrap an interleaved buffer, checking its length
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height * C {
            return Err(ScanError::BufferSize {
                len: data.len(),
                width,
                height,
                channels: C,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build an image by evaluating `f(row, col)` for every pixel
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> [T; C]) -> Self {
        let mut image = Self::new(width, height);
        for row in 0..height {
            for col in 0..width {
                image.set_pixel(row, col, f(row, col));
            }
        }
        image
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of channels per pixel
    pub fn channels(&self) -> usize {
        C
    }

    /// True when the grid has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when `(row, col)` lies inside the grid
    #[inline]
    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    #[inline]
    fn offset(&self, row: usize, col: usize, channel: usize) -> usize {
        (row * self.width + col) * C + channel
    }

    /// Channel value at `(row, col, channel)`, default outside the grid
    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> T {
        self.try_get(row, col, channel).unwrap_or_default()
    }

    /// Channel value at `(row, col, channel)` if it exists
    #[inline]
    pub fn try_get(&self, row: usize, col: usize, channel: usize) -> Option<T> {
        if row >= self.height || col >= self.width || channel >= C {
            return None;
        }
        Some(self.data[self.offset(row, col, channel)])
    }

    /// Write one channel value, ignoring out-of-range positions
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: T) {
        if row >= self.height || col >= self.width || channel >= C {
            return;
        }
        let idx = self.offset(row, col, channel);
        self.data[idx] = value;
    }

    /// All channels of the pixel at `(row, col)`
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> [T; C] {
        let mut out = [T::default(); C];
        if row < self.height && col < self.width {
            let start = self.offset(row, col, 0);
            out.copy_from_slice(&self.data[start..start + C]);
        }
        out
    }

    /// Overwrite all channels of the pixel at `(row, col)`
    #[inline]
    pub fn set_pixel(&mut self, row: usize, col: usize, value: [T; C]) {
        if row >= self.height || col >= self.width {
            return;
        }
        let start = self.offset(row, col, 0);
        self.data[start..start + C].copy_from_slice(&value);
    }

    /// Interleaved samples of one row
    pub fn row(&self, row: usize) -> &[T] {
        let stride = self.width * C;
        &self.data[row * stride..(row + 1) * stride]
    }

    /// Raw interleaved buffer
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable raw interleaved buffer
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its buffer
    pub fn into_raw(self) -> Vec<T> {
        self.data
    }

    /// Extract one channel as a single channel image
    pub fn channel(&self, channel: usize) -> Image<T, 1> {
        let mut out = Image::<T, 1>::new(self.width, self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                out.set(row, col, 0, self.get(row, col, channel));
            }
        }
        out
    }

    /// Apply `f` to every pixel, producing a new image
    pub fn map<U: Copy + Default, const D: usize>(&self, mut f: impl FnMut([T; C]) -> [U; D]) -> Image<U, D> {
        let mut out = Image::<U, D>::new(self.width, self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                out.set_pixel(row, col, f(self.pixel(row, col)));
            }
        }
        out
    }
}

impl BgrImage {
    /// Build from interleaved RGB bytes as produced by the `image` crate
    pub fn from_rgb_bytes(rgb: &[u8], width: usize, height: usize) -> Result<Self> {
        if rgb.len() != width * height * 3 {
            return Err(ScanError::BufferSize {
                len: rgb.len(),
                width,
                height,
                channels: 3,
            });
        }
        let mut data = Vec::with_capacity(rgb.len());
        for px in rgb.chunks_exact(3) {
            data.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        Self::from_vec(width, height, data)
    }

    /// Interleaved RGB bytes for encoders that expect RGB order
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(3) {
            out.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        out
    }
}

impl Mask {
    /// Count of pixels equal to 255
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v == 255).count()
    }
}
