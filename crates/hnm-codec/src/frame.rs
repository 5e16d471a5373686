//! 解码后的帧数据.

use hnm_core::PixelFormat;

/// 视频帧
///
/// 单平面打包 RGB 像素数据.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// 像素数据
    pub data: Vec<u8>,
    /// 每行字节数 (linesize / stride)
    pub linesize: usize,
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 显示时间戳 (-1 表示未知)
    pub pts: i64,
    /// 帧时长 (容器时间单位)
    pub duration: i64,
    /// 是否为关键帧
    pub is_keyframe: bool,
    /// 图片类型
    pub picture_type: PictureType,
}

impl VideoFrame {
    /// 创建空的视频帧
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            data: Vec::new(),
            linesize: pixel_format.linesize(width),
            width,
            height,
            pixel_format,
            pts: -1,
            duration: 0,
            is_keyframe: false,
            picture_type: PictureType::None,
        }
    }
}

/// 图片类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PictureType {
    /// 未指定
    #[default]
    None,
    /// 关键帧 (帧内编码, 可含帧内运动补偿)
    I,
    /// 帧间帧 (参考前一帧)
    P,
}
