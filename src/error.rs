//! # 错误类型模块
//!
//! 隐写核心 (容量计算、头部编解码、嵌入与提取) 的所有失败情形都由
//! [`StegoError`] 表示。命令行层再用 `anyhow` 为其附加上下文。

use thiserror::Error;

/// 隐写核心可能返回的错误。
#[derive(Debug, Error)]
pub enum StegoError {
    /// 载荷长度超过头部能够描述的上限 (2^32 - 1)。
    #[error("maximum capacity exceeded: length ({length}) max ({max})")]
    CapacityMaxExceeded { length: u64, max: u64 },

    /// 载体图像无法容纳头部与载荷。
    #[error("concealment capacity exceeded: length ({length}) capacity ({capacity})")]
    CapacityOverflow { length: u64, capacity: u64 },

    /// 无法解析载体图像。
    #[error("image decode failed: {0}")]
    ImageDecodeFailure(#[source] image::ImageError),

    /// 无法将结果像素网格编码为 PNG。
    #[error("image encode failed: {0}")]
    ImageEncodeFailure(#[source] image::ImageError),

    /// 图像中没有可信的隐写数据。
    #[error("invalid steganogram: {0}")]
    InvalidSteganogram(#[from] Malformed),
}

/// 提取时发现的具体格式问题。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Malformed {
    /// 索引字节不属于任何取值类别 (只有 0 会出现这种情况)。
    #[error("unrecognized index byte {0}")]
    UnrecognizedIndexByte(u8),

    /// 头部字节数与索引字节声明的长度不一致。
    #[error("header is {actual} bytes but its index byte declares {expected}")]
    HeaderLength { expected: usize, actual: usize },

    /// 头部声明的载荷长度超出了载体的容量。
    #[error("declared length ({length}) exceeds carrier capacity ({capacity})")]
    LengthExceedsCapacity { length: u64, capacity: u64 },

    /// 在头部或载荷读取完整之前，编码单元已经用尽。
    #[error("carrier exhausted after {read} of {expected} {region} bytes")]
    CarrierExhausted {
        region: &'static str,
        read: usize,
        expected: u64,
    },
}
