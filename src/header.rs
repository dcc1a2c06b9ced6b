//! # 长度头部编解码
//!
//! 头部由一个"索引字节"和 k (1..=4) 个小端长度字节组成。
//! 1..=255 被划分为四个互不相交的取值类别，索引字节从第 k-1 类中随机选取，
//! 因此头部不会出现固定的特征值，而解码端只需查表即可得到 k。

use std::sync::LazyLock;

use rand::Rng;

use crate::constants::{MAX_LENGTH_BYTES, MAX_PAYLOAD_LEN};
use crate::error::{Malformed, StegoError};

static SHARED: LazyLock<HeaderCodec> = LazyLock::new(HeaderCodec::build);

/// 头部编解码器，内部只有只读的分类表，可在多个调用之间共享。
#[derive(Debug)]
pub struct HeaderCodec {
    classes: [Vec<u8>; MAX_LENGTH_BYTES],
    class_of: [Option<u8>; 256],
}

impl HeaderCodec {
    /// 进程内共享的编解码器实例。
    pub fn shared() -> &'static HeaderCodec {
        &SHARED
    }

    fn build() -> Self {
        let mut classes: [Vec<u8>; MAX_LENGTH_BYTES] = Default::default();
        let mut class_of = [None; 256];

        // 按优先级匹配：4 的倍数 > 3 的倍数 > 2 的倍数 > 其余。0 不属于任何类别。
        for value in 1..=u8::MAX {
            let class = match value {
                v if v % 4 == 0 => 3,
                v if v % 3 == 0 => 2,
                v if v % 2 == 0 => 1,
                _ => 0,
            };
            classes[class].push(value);
            class_of[usize::from(value)] = Some(class as u8);
        }

        Self { classes, class_of }
    }

    /// 描述长度需要 `length_bytes` 个字节时，可用作索引字节的取值。
    pub fn members(&self, length_bytes: usize) -> &[u8] {
        &self.classes[length_bytes - 1]
    }

    /// 将载荷长度编码为头部。
    ///
    /// # Errors
    ///
    /// 长度超过 `u32::MAX` 时返回 [`StegoError::CapacityMaxExceeded`]。
    pub fn encode<R: Rng>(&self, length: u64, rng: &mut R) -> Result<Vec<u8>, StegoError> {
        if length > MAX_PAYLOAD_LEN {
            return Err(StegoError::CapacityMaxExceeded {
                length,
                max: MAX_PAYLOAD_LEN,
            });
        }

        let k = length_bytes(length);
        let members = self.members(k);
        let index_byte = members[rng.random_range(0..members.len())];

        let mut header = Vec::with_capacity(1 + k);
        header.push(index_byte);
        header.extend_from_slice(&length.to_le_bytes()[..k]);
        Ok(header)
    }

    /// 根据索引字节得到长度字段的字节数 k。
    ///
    /// # Errors
    ///
    /// 索引字节为 0 时返回 [`Malformed::UnrecognizedIndexByte`]。
    pub fn decode_prefix(&self, index_byte: u8) -> Result<usize, StegoError> {
        self.class_of[usize::from(index_byte)]
            .map(|class| usize::from(class) + 1)
            .ok_or_else(|| Malformed::UnrecognizedIndexByte(index_byte).into())
    }

    /// 解码完整的头部 (索引字节 + k 个长度字节)，返回载荷长度。
    pub fn decode(&self, header: &[u8]) -> Result<u64, StegoError> {
        let Some((&index_byte, length)) = header.split_first() else {
            return Err(Malformed::HeaderLength {
                expected: 2,
                actual: 0,
            }
            .into());
        };

        let k = self.decode_prefix(index_byte)?;
        if length.len() != k {
            return Err(Malformed::HeaderLength {
                expected: 1 + k,
                actual: header.len(),
            }
            .into());
        }

        Ok(length
            .iter()
            .rev()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)))
    }
}

/// 以小端形式表示 `length` 所需的最少字节数 (至少为 1)。
pub fn length_bytes(length: u64) -> usize {
    let bits = u64::BITS - length.leading_zeros();
    (bits.div_ceil(8) as usize).max(1)
}
