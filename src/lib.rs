//! # hnm
//!
//! 纯 Rust 实现的 HNM6 视频解码库.
//!
//! HNM6 是 Cryo 引擎全动态影像 (FMV) 使用的视频格式: 四叉树块划分,
//! 带几何变换的运动补偿, 以及类 JPEG 的 DCT 残差关键块.
//! 本库只负责单帧解码, 容器解析由调用方完成.
//!
//! # 快速开始
//!
//! ```rust
//! use hnm::codec::{CodecParameters, Hnm6Decoder};
//! use hnm::core::PixelFormat;
//!
//! let params = CodecParameters::hnm6(320, 200, PixelFormat::Bgra);
//! let mut decoder = Hnm6Decoder::new(&params).unwrap();
//! // 空数据不是合法帧
//! assert!(decoder.decode_frame(&[]).is_err());
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `hnm-core` | 错误类型, 像素格式, 数据区打包器 |
//! | `hnm-codec` | 解码器框架与 HNM6 解码器 |

/// 核心类型与工具
pub use hnm_core as core;

/// 解码器框架与 HNM6 解码器
pub use hnm_codec as codec;

pub mod logging;

/// 获取版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
