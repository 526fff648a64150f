use crate::foundation::error::{ReelError, ReelResult};
use resvg::tiny_skia;

/// A rendered frame.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    pub(crate) fn from_pixmap(pixmap: tiny_skia::Pixmap) -> Self {
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            data: pixmap.take(),
        }
    }

    /// Premultiplied RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> ReelResult<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return Err(ReelError::render(format!(
                "pixel ({x}, {y}) outside {}x{} frame",
                self.width, self.height
            )));
        }
        let i = ((y * self.width + x) * 4) as usize;
        Ok([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}
