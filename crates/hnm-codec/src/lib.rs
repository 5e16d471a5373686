//! # hnm-codec
//!
//! HNM 解码库编解码器框架, 提供 Packet/VideoFrame 抽象与 HNM6 视频解码器.
//!
//! 容器解析 (HNM 文件头、分块) 不在本 crate 范围内: 容器层负责为每帧提供
//! 完整的帧数据, 解码器输出打包 RGB 像素帧.
//!
//! ## 使用示例
//!
//! ```rust
//! use hnm_codec::{CodecParameters, Hnm6Decoder};
//! use hnm_core::PixelFormat;
//!
//! let params = CodecParameters::hnm6(320, 200, PixelFormat::Rgb565le);
//! let decoder = Hnm6Decoder::new(&params).unwrap();
//! assert_eq!(decoder.surface().width(), 320);
//! ```

pub mod codec_id;
pub mod codec_parameters;
pub mod decoder;
pub mod decoders;
pub mod frame;
pub mod packet;

// 重导出常用类型
pub use codec_id::CodecId;
pub use codec_parameters::{CodecParameters, Hnm6Options};
pub use decoder::Decoder;
pub use decoders::hnm6::Hnm6Decoder;
pub use frame::{PictureType, VideoFrame};
pub use packet::Packet;
