use thiserror::Error;

/// One RGBA float texel.
pub type Texel = [f32; 4];

/// Scalar channels per texel.
pub const CHANNELS: u32 = 4;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("expected {expected} texels for a {width}x{height} buffer, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("expected records of {expected} texels, got {actual}")]
    Height { expected: u32, actual: u32 },
    #[error("expected {expected} bytes of texel data, got {actual}")]
    ByteLength { expected: usize, actual: usize },
    #[error("buffer dimensions must be non-zero, got {width}x{height}")]
    Empty { width: u32, height: u32 },
}

/// A 2D grid of RGBA float texels used as a flat buffer of fixed-size records.
///
/// Record `i` is texel column `i`; its scalar components run down the column,
/// four per texel, so component `c` lives in row `c / 4`, channel `c % 4`.
/// Reads go through the same normalized-coordinate fetch a fragment shader
/// would use, which is why the decoding side never indexes rows directly.
#[derive(Clone, Debug)]
pub struct TexelBuffer {
    width: u32,
    height: u32,
    texels: Vec<Texel>, // row-major
}

impl TexelBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self, TextureError> {
        Self::check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            texels: vec![[0.0; 4]; width as usize * height as usize],
        })
    }

    pub fn from_texels(width: u32, height: u32, texels: Vec<Texel>) -> Result<Self, TextureError> {
        Self::check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Builds a buffer from raw native-endian RGBA32F bytes (e.g. a GPU readback).
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, TextureError> {
        let mut buffer = Self::new(width, height)?;
        let target: &mut [u8] = bytemuck::cast_slice_mut(&mut buffer.texels);
        if target.len() != bytes.len() {
            return Err(TextureError::ByteLength {
                expected: target.len(),
                actual: bytes.len(),
            });
        }
        target.copy_from_slice(bytes);
        Ok(buffer)
    }

    fn check_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Direct texel read, clamped to the edge like a CLAMP_TO_EDGE sampler.
    #[inline]
    pub fn texel(&self, x: i64, y: i64) -> Texel {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.texels[y * self.width as usize + x]
    }

    /// Nearest-neighbour fetch at normalized coordinates `(u, v)` in `[0, 1]`.
    ///
    /// f64 because f32 coordinates stop telling neighbouring columns apart
    /// a few million texels in.
    #[inline]
    pub fn sample(&self, u: f64, v: f64) -> Texel {
        let x = (u * self.width as f64).floor() as i64;
        let y = (v * self.height as f64).floor() as i64;
        self.texel(x, y)
    }

    /// Reads scalar `component` of record `index`.
    ///
    /// The `+ 1` offsets keep both coordinates strictly inside the texel they
    /// address, away from the edges where filtering or clamping would kick in.
    #[inline]
    pub fn extract_float(&self, index: u32, component: u32) -> f32 {
        debug_assert!(index < self.width, "record {index} outside buffer of width {}", self.width);
        debug_assert!(
            component < CHANNELS * self.height,
            "component {component} outside record of {} texels",
            self.height
        );

        let u = (index as f64 + 1.0) / (self.width as f64 + 1.0);
        let pixel = component / CHANNELS;
        let v = (pixel as f64 + 1.0) / (self.height as f64 + 1.0);
        let texel = self.sample(u, v);

        let channel = component - pixel * CHANNELS;
        texel[channel as usize]
    }

    /// Flat offset into `as_floats()` of scalar `component` of record `index`.
    pub fn component_offset(&self, index: u32, component: u32) -> usize {
        let row = (component / CHANNELS) as usize;
        let channel = (component % CHANNELS) as usize;
        (row * self.width as usize + index as usize) * CHANNELS as usize + channel
    }

    /// Writes scalar `component` of record `index`. Panics when out of range.
    pub fn write_float(&mut self, index: u32, component: u32, value: f32) {
        assert!(index < self.width && component < CHANNELS * self.height);
        let offset = self.component_offset(index, component);
        let floats: &mut [f32] = bytemuck::cast_slice_mut(&mut self.texels);
        floats[offset] = value;
    }
}
