//! # 容量模型
//!
//! 计算载体在固定密度 (3 个通道、每通道 2 bits) 下能隐藏的字节数，
//! 以及载荷字节在内容区中的分布步长。

use crate::constants::{BITS_PER_CELL, CELLS_PER_BYTE, CHANNELS};
use crate::error::StegoError;

/// 以默认密度计算 `width` x `height` 载体的容量 (字节)。
pub fn capacity(width: u32, height: u32) -> u64 {
    capacity_with(width, height, CHANNELS, BITS_PER_CELL)
}

/// 以任意通道数与每单元比特数计算容量：`floor(w * h * channels * bits / 8)`。
pub fn capacity_with(width: u32, height: u32, channels: u64, bits_per_cell: u64) -> u64 {
    u64::from(width) * u64::from(height) * channels * bits_per_cell / 8
}

/// 一次隐写调用的布局参数。
///
/// 对于相同的 (宽, 高, 头部长度, 载荷长度)，结果完全确定，
/// 嵌入端与提取端各自计算并得到同一个步长。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// 载体容量 (字节)。
    pub capacity: u64,
    /// 头部字节数 (1 + k)。
    pub header_len: usize,
    /// 载荷字节数。
    pub payload_len: u64,
    /// 每个载荷字节分配到的编码单元数；载荷为空时不存在步长。
    pub stride: Option<u64>,
}

impl Placement {
    /// 校验容量并计算步长 `floor((capacity - header_len) * 4 / payload_len)`。
    ///
    /// # Errors
    ///
    /// 当 `payload_len > capacity - header_len` (包括头部本身放不下的情况)
    /// 时返回 [`StegoError::CapacityOverflow`]。
    pub fn plan(
        width: u32,
        height: u32,
        header_len: usize,
        payload_len: u64,
    ) -> Result<Self, StegoError> {
        let capacity = capacity(width, height);
        let header = header_len as u64;

        if header > capacity || payload_len > capacity - header {
            return Err(StegoError::CapacityOverflow {
                length: payload_len,
                capacity,
            });
        }

        let room = capacity - header;
        let stride = (payload_len > 0).then(|| room * CELLS_PER_BYTE / payload_len);

        Ok(Self {
            capacity,
            header_len,
            payload_len,
            stride,
        })
    }
}
