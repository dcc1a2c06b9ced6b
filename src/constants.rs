/// 参与隐写的颜色通道数 (R, G, B)。
/// Alpha 通道只会原样复制，从不承载数据。
pub const CHANNELS: u64 = 3;

/// 每个编码单元 (像素的一个颜色通道) 承载的比特数。
pub const BITS_PER_CELL: u64 = 2;

/// 隐藏一个字节需要的编码单元数。
/// 每个单元存储 2 bits，因此 8 / 2 = 4 个单元。
pub const CELLS_PER_BYTE: u64 = 8 / BITS_PER_CELL;

/// 单元中承载数据的最低两位掩码。
pub const CELL_MASK: u8 = 0b0000_0011;

/// 头部中长度字段最多占用的字节数 (小端 `u32`)。
pub const MAX_LENGTH_BYTES: usize = 4;

/// 可隐藏的最大载荷长度 (2^32 - 1 字节)。
pub const MAX_PAYLOAD_LEN: u64 = u32::MAX as u64;

/// 未指定输出路径时，隐写结果图像文件名的前缀。
pub const DOCTORED_PREFIX: &str = "doctored_";

/// 未指定输出路径时，恢复出的数据文件名的前缀。
pub const RECOVERED_PREFIX: &str = "recovered_";

/// 恢复数据的默认扩展名。载荷是任意字节，因此不假设为文本。
pub const RECOVERED_EXTENSION: &str = "bin";
