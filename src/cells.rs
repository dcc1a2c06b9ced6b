//! # 编码单元流
//!
//! 每个像素的 R、G、B 通道各是一个编码单元，按光栅顺序编号：
//! `cell = pixel * 3 + channel`。Alpha 通道不计入。
//!
//! [`CellLayout`] 把线性单元编号映射到头部或载荷中的某个 2-bit 块。

use image::RgbaImage;

use crate::constants::{BITS_PER_CELL, CELLS_PER_BYTE, CELL_MASK, CHANNELS};

const PIXEL_STRIDE: usize = 4;

/// 单元在布局中的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// 头部第 `byte` 个字节，从第 `shift` 位开始的 2 bits。
    Header { byte: usize, shift: u8 },
    /// 载荷第 `byte` 个字节，从第 `shift` 位开始的 2 bits。
    Content { byte: usize, shift: u8 },
    /// 不承载任何数据的单元。
    Gap,
}

/// 头部区域与内容区域的单元布局。
///
/// 头部固定占用 `header_len * 4` 个连续单元；之后每个载荷字节分得 `stride` 个单元，
/// 只有前 4 个被写入。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLayout {
    header_cells: u64,
    stride: Option<u64>,
}

impl CellLayout {
    pub fn new(header_len: usize, stride: Option<u64>) -> Self {
        Self {
            header_cells: header_len as u64 * CELLS_PER_BYTE,
            stride,
        }
    }

    /// 只有头部、尚未确定步长的布局。提取端在读出完整头部前使用。
    pub fn header_only(header_len: usize) -> Self {
        Self::new(header_len, None)
    }

    pub fn locate(&self, cell: u64) -> Slot {
        if cell < self.header_cells {
            return Slot::Header {
                byte: (cell / CELLS_PER_BYTE) as usize,
                shift: chunk_shift(cell % CELLS_PER_BYTE),
            };
        }

        let Some(stride) = self.stride else {
            return Slot::Gap;
        };

        let offset = cell - self.header_cells;
        let chunk = offset % stride;
        if chunk >= CELLS_PER_BYTE {
            return Slot::Gap;
        }

        Slot::Content {
            byte: (offset / stride) as usize,
            shift: chunk_shift(chunk),
        }
    }
}

fn chunk_shift(chunk: u64) -> u8 {
    (chunk * BITS_PER_CELL) as u8
}

/// 按光栅顺序遍历所有编码单元。
pub fn cells(grid: &RgbaImage) -> impl Iterator<Item = u8> {
    grid.chunks_exact(PIXEL_STRIDE)
        .flat_map(|px| px[..CHANNELS as usize].iter().copied())
}

/// 按光栅顺序可变地遍历所有编码单元。
pub fn cells_mut(grid: &mut RgbaImage) -> impl Iterator<Item = &mut u8> {
    grid.chunks_exact_mut(PIXEL_STRIDE)
        .flat_map(|px| px[..CHANNELS as usize].iter_mut())
}

/// 编码单元总数。
pub fn cell_count(grid: &RgbaImage) -> u64 {
    u64::from(grid.width()) * u64::from(grid.height()) * CHANNELS
}

/// 把 `byte` 中从 `shift` 开始的 2 bits 写入单元的最低两位，高 6 位保持不变。
pub fn write_chunk(cell: &mut u8, byte: u8, shift: u8) {
    *cell = (*cell & !CELL_MASK) | ((byte >> shift) & CELL_MASK);
}

/// 逐块拼装字节：写入最高位 (bit 7) 所在的块后，字节完成并清零累加器。
#[derive(Debug, Default)]
pub struct ChunkAccumulator {
    value: u8,
}

impl ChunkAccumulator {
    pub fn push(&mut self, cell: u8, shift: u8) -> Option<u8> {
        self.value |= (cell & CELL_MASK) << shift;
        if shift + BITS_PER_CELL as u8 > 7 {
            Some(std::mem::take(&mut self.value))
        } else {
            None
        }
    }
}
