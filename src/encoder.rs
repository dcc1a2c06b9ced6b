//! # 嵌入端
//!
//! 把头部与载荷逐 2 bits 写入像素网格的编码单元。头部连续写入，
//! 载荷字节按步长分散在剩余的载体上。

use clap::ValueEnum;
use image::RgbaImage;
use rand::Rng;
use tracing::debug;

use crate::capacity::Placement;
use crate::cells::{CellLayout, Slot, cells_mut, write_chunk};
use crate::constants::CELL_MASK;
use crate::error::StegoError;
use crate::header::HeaderCodec;

/// 对不承载数据的单元 (步长间隙以及载荷之后的区域) 的处理方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GapPolicy {
    /// 保持原值不变。
    #[default]
    Untouched,
    /// 用随机值扰动最低两位。
    Perturb,
}

impl GapPolicy {
    fn apply<R: Rng>(self, cell: &mut u8, rng: &mut R) {
        if self == GapPolicy::Perturb {
            *cell ^= rng.random_range(0..=CELL_MASK);
        }
    }
}

/// 隐写嵌入器。
///
/// 随机源由调用方注入，用于选取头部索引字节以及 [`GapPolicy::Perturb`] 的扰动值。
#[derive(Debug)]
pub struct Encoder<R> {
    rng: R,
    gap_policy: GapPolicy,
}

impl<R: Rng> Encoder<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            gap_policy: GapPolicy::default(),
        }
    }

    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    /// 将 `payload` 嵌入 `grid`，返回本次使用的布局参数。
    ///
    /// 失败时 `grid` 保持原样。
    ///
    /// # Errors
    ///
    /// * 载荷超过 2^32 - 1 字节：[`StegoError::CapacityMaxExceeded`]。
    /// * 载体容纳不下头部与载荷：[`StegoError::CapacityOverflow`]。
    pub fn embed(&mut self, payload: &[u8], grid: &mut RgbaImage) -> Result<Placement, StegoError> {
        let header = HeaderCodec::shared().encode(payload.len() as u64, &mut self.rng)?;
        let placement = Placement::plan(
            grid.width(),
            grid.height(),
            header.len(),
            payload.len() as u64,
        )?;

        debug!(
            index_byte = header[0],
            header = header.len(),
            data = payload.len(),
            capacity = placement.capacity,
            step = ?placement.stride,
            "concealing payload"
        );

        let layout = CellLayout::new(header.len(), placement.stride);
        for (index, cell) in cells_mut(grid).enumerate() {
            let chunk = match layout.locate(index as u64) {
                Slot::Header { byte, shift } => header.get(byte).map(|&b| (b, shift)),
                Slot::Content { byte, shift } => payload.get(byte).map(|&b| (b, shift)),
                Slot::Gap => None,
            };

            match chunk {
                Some((byte, shift)) => write_chunk(cell, byte, shift),
                None => self.gap_policy.apply(cell, &mut self.rng),
            }
        }

        debug!("{} bytes of data concealed", payload.len());
        Ok(placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::cells;
    use image::Rgba;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn carrier(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = (x * 31 + y * 17) as u8;
            Rgba([v, v.wrapping_add(85), v.wrapping_add(170), 255 - v])
        })
    }

    #[test]
    fn minimum_carrier_holds_one_byte() {
        let mut grid = carrier(2, 2);
        let mut encoder = Encoder::new(StdRng::seed_from_u64(3));
        let placement = encoder.embed(&[65], &mut grid).unwrap();
        assert_eq!(placement.capacity, 3);
        assert_eq!(placement.header_len, 2);
        assert_eq!(placement.stride, Some(4));

        // 65 = 01 00 00 01，写在第 8..12 个单元
        let chunks: Vec<u8> = cells(&grid).skip(8).map(|c| c & CELL_MASK).collect();
        assert_eq!(chunks, vec![0b01, 0b00, 0b00, 0b01]);
    }

    #[test]
    fn header_encodes_length_in_first_cells() {
        let mut grid = carrier(30, 30);
        Encoder::new(StdRng::seed_from_u64(9))
            .embed(&[1; 200], &mut grid)
            .unwrap();

        let low: Vec<u8> = cells(&grid).map(|c| c & CELL_MASK).collect();
        let byte = |i: usize| {
            low[i * 4..i * 4 + 4]
                .iter()
                .enumerate()
                .fold(0u8, |acc, (n, &c)| acc | (c << (n * 2)))
        };
        let header = [byte(0), byte(1)];
        assert_eq!(HeaderCodec::shared().decode(&header).unwrap(), 200);
    }

    #[test]
    fn only_low_bits_change_and_alpha_is_untouched() {
        let original = carrier(16, 16);
        let mut grid = original.clone();
        Encoder::new(StdRng::seed_from_u64(11))
            .with_gap_policy(GapPolicy::Perturb)
            .embed(b"spread me", &mut grid)
            .unwrap();

        for (before, after) in original.pixels().zip(grid.pixels()) {
            for channel in 0..3 {
                assert_eq!(before[channel] & !CELL_MASK, after[channel] & !CELL_MASK);
            }
            assert_eq!(before[3], after[3]);
        }
    }

    #[test]
    fn gap_cells_are_untouched_by_default() {
        let original = carrier(16, 16);
        let mut grid = original.clone();
        let placement = Encoder::new(StdRng::seed_from_u64(5))
            .embed(b"abc", &mut grid)
            .unwrap();
        let layout = CellLayout::new(placement.header_len, placement.stride);

        for (index, (before, after)) in cells(&original).zip(cells(&grid)).enumerate() {
            if layout.locate(index as u64) == Slot::Gap {
                assert_eq!(before, after, "gap cell {index} changed");
            }
        }
    }

    #[test]
    fn stride_depends_only_on_dimensions_and_length() {
        let a = Encoder::new(StdRng::seed_from_u64(1))
            .embed(&[7; 40], &mut carrier(20, 20))
            .unwrap();
        let b = Encoder::new(StdRng::seed_from_u64(2))
            .embed(&[9; 40], &mut carrier(20, 20))
            .unwrap();
        assert_eq!(a.stride, b.stride);
        assert_eq!(a.stride, Some((300 - 2) * 4 / 40));
    }

    #[test]
    fn overflow_leaves_grid_unchanged() {
        let original = carrier(2, 2);
        let mut grid = original.clone();
        let err = Encoder::new(StdRng::seed_from_u64(0))
            .embed(&[1, 2], &mut grid)
            .unwrap_err();
        assert!(matches!(
            err,
            StegoError::CapacityOverflow {
                length: 2,
                capacity: 3
            }
        ));
        assert_eq!(grid, original);
    }

    #[test]
    fn caller_payload_is_not_modified() {
        let payload = b"immutable".to_vec();
        let copy = payload.clone();
        Encoder::new(StdRng::seed_from_u64(4))
            .embed(&payload, &mut carrier(8, 8))
            .unwrap();
        assert_eq!(payload, copy);
    }
}
