//! # 提取端
//!
//! 与嵌入端走相同的单元序列：先读出自描述的头部得到载荷长度与步长，
//! 再按步长拼装载荷。载荷读满后立即停止，其余单元不再检查。

use image::RgbaImage;
use tracing::debug;

use crate::capacity::{Placement, capacity};
use crate::cells::{CellLayout, ChunkAccumulator, Slot, cells};
use crate::constants::MAX_LENGTH_BYTES;
use crate::error::{Malformed, StegoError};
use crate::header::HeaderCodec;

/// 从像素网格中提取隐藏的载荷。
///
/// # Errors
///
/// 图像不是有效的隐写结果时返回 [`StegoError::InvalidSteganogram`]：
/// 索引字节为 0、声明的长度超出载体容量，或单元在读完之前用尽。
pub fn extract(grid: &RgbaImage) -> Result<Vec<u8>, StegoError> {
    let codec = HeaderCodec::shared();
    let (width, height) = grid.dimensions();

    // 头部长度在读出索引字节之前未知，先只按 1 个字节布局
    let mut layout = CellLayout::header_only(1);
    let mut header_len = 1usize;
    let mut header = Vec::with_capacity(1 + MAX_LENGTH_BYTES);

    let mut payload: Vec<u8> = Vec::new();
    let mut payload_len: Option<u64> = None;
    let mut acc = ChunkAccumulator::default();

    for (index, cell) in cells(grid).enumerate() {
        match layout.locate(index as u64) {
            Slot::Header { shift, .. } => {
                let Some(byte) = acc.push(cell, shift) else {
                    continue;
                };
                header.push(byte);

                if header.len() == 1 {
                    header_len = 1 + codec.decode_prefix(byte)?;
                    layout = CellLayout::header_only(header_len);
                }

                if header.len() == header_len {
                    let length = codec.decode(&header)?;
                    let placement = Placement::plan(width, height, header_len, length)
                        .map_err(|_| Malformed::LengthExceedsCapacity {
                            length,
                            capacity: capacity(width, height),
                        })?;

                    debug!(
                        index_byte = header[0],
                        header = header_len,
                        data = length,
                        capacity = placement.capacity,
                        step = ?placement.stride,
                        "revealing payload"
                    );

                    if length == 0 {
                        return Ok(payload);
                    }

                    // 长度已受容量约束，预分配是安全的
                    payload.reserve_exact(length as usize);
                    payload_len = Some(length);
                    layout = CellLayout::new(header_len, placement.stride);
                }
            }
            Slot::Content { shift, .. } => {
                let Some(byte) = acc.push(cell, shift) else {
                    continue;
                };
                payload.push(byte);

                if Some(payload.len() as u64) == payload_len {
                    debug!("{} bytes of data revealed", payload.len());
                    return Ok(payload);
                }
            }
            Slot::Gap => {}
        }
    }

    let exhausted = match payload_len {
        Some(expected) => Malformed::CarrierExhausted {
            region: "payload",
            read: payload.len(),
            expected,
        },
        None => Malformed::CarrierExhausted {
            region: "header",
            read: header.len(),
            expected: header_len as u64,
        },
    };
    Err(exhausted.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::{cells_mut, write_chunk};
    use crate::encoder::{Encoder, GapPolicy};
    use image::Rgba;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn carrier(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7) as u8, (y * 13) as u8, (x ^ y) as u8, 255])
        })
    }

    /// 直接把字节按 4 单元/字节写入网格开头，用来伪造头部。
    fn forge(grid: &mut RgbaImage, bytes: &[u8]) {
        for (index, cell) in cells_mut(grid).take(bytes.len() * 4).enumerate() {
            write_chunk(cell, bytes[index / 4], ((index % 4) * 2) as u8);
        }
    }

    #[test]
    fn minimum_carrier_round_trip() {
        let mut grid = carrier(2, 2);
        Encoder::new(StdRng::seed_from_u64(0))
            .embed(&[65], &mut grid)
            .unwrap();
        assert_eq!(extract(&grid).unwrap(), vec![65]);
    }

    #[test]
    fn spread_payload_round_trip() {
        let payload: Vec<u8> = (0..=255).collect();
        let mut grid = carrier(64, 48);
        Encoder::new(StdRng::seed_from_u64(21))
            .embed(&payload, &mut grid)
            .unwrap();
        assert_eq!(extract(&grid).unwrap(), payload);
    }

    #[test]
    fn perturbed_gaps_do_not_affect_extraction() {
        let payload = b"noise between the chunks".to_vec();
        let mut grid = carrier(40, 40);
        Encoder::new(StdRng::seed_from_u64(8))
            .with_gap_policy(GapPolicy::Perturb)
            .embed(&payload, &mut grid)
            .unwrap();
        assert_eq!(extract(&grid).unwrap(), payload);
    }

    #[test]
    fn full_density_round_trip() {
        // 8x8 => 48 字节容量；2 字节头部后恰好放满 46 字节
        let payload: Vec<u8> = (0..46).map(|i| i * 5).collect();
        let mut grid = carrier(8, 8);
        let placement = Encoder::new(StdRng::seed_from_u64(2))
            .embed(&payload, &mut grid)
            .unwrap();
        assert_eq!(placement.stride, Some(4));
        assert_eq!(extract(&grid).unwrap(), payload);
    }

    #[test]
    fn empty_payload_round_trip() {
        let mut grid = carrier(4, 4);
        Encoder::new(StdRng::seed_from_u64(6))
            .embed(&[], &mut grid)
            .unwrap();
        assert!(extract(&grid).unwrap().is_empty());
    }

    #[test]
    fn zero_index_byte_is_invalid() {
        let mut grid = carrier(8, 8);
        forge(&mut grid, &[0, 5]);
        assert!(matches!(
            extract(&grid).unwrap_err(),
            StegoError::InvalidSteganogram(Malformed::UnrecognizedIndexByte(0))
        ));
    }

    #[test]
    fn implausible_length_is_invalid() {
        // 索引字节 1 => 1 个长度字节；声明 200 字节，但 8x8 只有 48 字节容量
        let mut grid = carrier(8, 8);
        forge(&mut grid, &[1, 200]);
        assert!(matches!(
            extract(&grid).unwrap_err(),
            StegoError::InvalidSteganogram(Malformed::LengthExceedsCapacity {
                length: 200,
                capacity: 48
            })
        ));
    }

    #[test]
    fn header_that_outgrows_the_carrier_is_invalid() {
        // 1x2 只有 6 个单元，索引字节 4 声明 4 个长度字节 (需要 20 个单元)
        let mut grid = carrier(1, 2);
        forge(&mut grid, &[4]);
        assert!(matches!(
            extract(&grid).unwrap_err(),
            StegoError::InvalidSteganogram(Malformed::CarrierExhausted {
                region: "header",
                ..
            })
        ));
    }
}
