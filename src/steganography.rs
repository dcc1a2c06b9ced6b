//! # 隐写接口
//!
//! 以字节为单位的 Conceal / Reveal 契约：输入任意可解码的栅格图像 (PNG、JPEG 等)，
//! 输出始终为无损 PNG，以保证每个通道的数值被原样保存。

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::decoder::extract;
use crate::encoder::{Encoder, GapPolicy};
use crate::error::StegoError;

/// PNG 隐写器。分类表是共享的只读数据，因此实例可以自由复制并在线程间共享。
#[derive(Debug, Clone, Copy, Default)]
pub struct Stegano {
    gap_policy: GapPolicy,
}

impl Stegano {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    /// 将 `payload` 隐藏到 `carrier` 图像中，返回 PNG 编码的隐写结果。
    ///
    /// 每次调用都使用独立的随机源。
    pub fn conceal(&self, payload: &[u8], carrier: &[u8]) -> Result<Vec<u8>, StegoError> {
        self.conceal_with_rng(payload, carrier, StdRng::from_os_rng())
    }

    /// 与 [`Stegano::conceal`] 相同，但由调用方提供随机源。
    ///
    /// # Errors
    ///
    /// * [`StegoError::ImageDecodeFailure`]：无法解析载体图像。
    /// * [`StegoError::CapacityMaxExceeded`] / [`StegoError::CapacityOverflow`]：载荷过大。
    /// * [`StegoError::ImageEncodeFailure`]：无法写出 PNG。
    pub fn conceal_with_rng<R: Rng>(
        &self,
        payload: &[u8],
        carrier: &[u8],
        rng: R,
    ) -> Result<Vec<u8>, StegoError> {
        let mut grid = decode_carrier(carrier)?;
        Encoder::new(rng)
            .with_gap_policy(self.gap_policy)
            .embed(payload, &mut grid)?;
        encode_png(&grid)
    }

    /// 从隐写结果图像中恢复载荷。
    pub fn reveal(&self, steganogram: &[u8]) -> Result<Vec<u8>, StegoError> {
        let grid = decode_carrier(steganogram)?;
        extract(&grid)
    }
}

/// 解码图像并把每个通道归一化为 8 bits。
pub fn decode_carrier(bytes: &[u8]) -> Result<RgbaImage, StegoError> {
    let source = image::load_from_memory(bytes).map_err(StegoError::ImageDecodeFailure)?;
    Ok(normalize(&source))
}

/// 先展开为 16-bit RGBA，再整除 256 得到 8-bit 值 (Alpha 同样处理)。
pub fn normalize(source: &DynamicImage) -> RgbaImage {
    let wide = source.to_rgba16();
    RgbaImage::from_fn(wide.width(), wide.height(), |x, y| {
        Rgba(wide.get_pixel(x, y).0.map(|v| (v / 256) as u8))
    })
}

/// 将像素网格编码为 PNG。
pub fn encode_png(grid: &RgbaImage) -> Result<Vec<u8>, StegoError> {
    let mut out = Cursor::new(Vec::new());
    grid.write_to(&mut out, ImageFormat::Png)
        .map_err(StegoError::ImageEncodeFailure)?;
    Ok(out.into_inner())
}
