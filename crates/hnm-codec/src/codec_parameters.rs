//! 编解码器参数.
//!
//! 描述解码器的构造期配置, 通常由容器层根据文件头填写.

use hnm_core::PixelFormat;

use crate::codec_id::CodecId;

/// 编解码器参数
#[derive(Debug, Clone)]
pub struct CodecParameters {
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 宽度 (像素, 必须为 8 的倍数)
    pub width: u32,
    /// 高度 (像素, 必须为 8 的倍数)
    pub height: u32,
    /// 输出像素格式 (16 位或 32 位)
    pub pixel_format: PixelFormat,
    /// HNM6 特定选项
    pub options: Hnm6Options,
}

/// HNM6 解码选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hnm6Options {
    /// 视频模式: 分配前一帧缓冲, 允许帧间解码
    pub video_mode: bool,
    /// 关键帧使用 IW (warp) 遍历
    pub warp_mode: bool,
    /// 单帧数据最大字节数 (0 表示不限制)
    pub max_frame_size: usize,
}

impl Default for Hnm6Options {
    fn default() -> Self {
        Self {
            video_mode: true,
            warp_mode: false,
            max_frame_size: 0,
        }
    }
}

impl CodecParameters {
    /// 以默认选项创建 HNM6 参数
    pub fn hnm6(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            codec_id: CodecId::Hnm6,
            width,
            height,
            pixel_format,
            options: Hnm6Options::default(),
        }
    }

    /// 替换 HNM6 选项
    pub fn with_options(mut self, options: Hnm6Options) -> Self {
        self.options = options;
        self
    }
}
