//! # lsb_spread 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：容量模型、自描述长度头部、编码单元布局、
//! 嵌入与提取，以及命令行层使用的前后处理和命令处理。

// 声明库包含的所有模块。

pub mod capacity;
pub mod cells;
pub mod cli;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod header;
pub mod pipeline;
pub mod steganography;

pub use encoder::{Encoder, GapPolicy};
pub use error::{Malformed, StegoError};
pub use steganography::Stegano;
