//! # hnm-core
//!
//! HNM 解码库核心库, 提供基础类型定义、错误处理和码流打包工具.
//!
//! 本 crate 为 `hnm-codec` 提供底层基础设施: 统一错误类型、输出像素格式,
//! 以及与 HNM6 各数据区读取器一一对应的打包器.

pub mod bitwriter;
pub mod error;
pub mod pixel_format;

// 重导出常用类型
pub use error::{HnmError, HnmResult};
pub use pixel_format::PixelFormat;
