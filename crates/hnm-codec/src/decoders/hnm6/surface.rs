//! HNM6 帧缓冲区
//!
//! 解码器持有两个同尺寸的 [`Surface`] (当前帧与参考帧), 每帧成功解码后互换角色.

use hnm_core::{HnmError, HnmResult, PixelFormat};

/// 打包 RGB 帧缓冲区
///
/// 行与行之间没有填充, `pitch = width * bytes_per_pixel`,
/// 因此整个缓冲区也可以按像素平铺寻址 (运动补偿的水平回绕依赖这一点).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Surface {
    /// 创建全零缓冲区
    ///
    /// 宽高必须为 8 的正整数倍, 像素格式必须为 16 位或 32 位 RGB.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> HnmResult<Self> {
        if width == 0 || height == 0 || width % 8 != 0 || height % 8 != 0 {
            return Err(HnmError::InvalidArgument(format!(
                "帧尺寸 {width}x{height} 必须为 8 的正整数倍"
            )));
        }
        let size = format
            .frame_size(width, height)
            .ok_or_else(|| HnmError::InvalidArgument(format!("不支持的像素格式: {format}")))?;
        Ok(Self {
            width,
            height,
            format,
            data: vec![0; size],
        })
    }

    /// 0x0 占位缓冲区 (解码器打开前使用)
    pub(super) fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            format: PixelFormat::None,
            data: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// 每行字节数
    pub fn pitch(&self) -> usize {
        self.format.linesize(self.width)
    }

    /// 每像素字节数 (2 或 4)
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// 原始像素数据
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(super) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// 像素总数
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 读取 (x, y) 处的打包像素值
    ///
    /// # Panics
    /// 坐标越界时 panic.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height, "像素坐标 ({x}, {y}) 越界");
        let bpp = self.bytes_per_pixel();
        let off = (y as usize * self.width as usize + x as usize) * bpp;
        let mut bytes = [0u8; 4];
        bytes[..bpp].copy_from_slice(&self.data[off..off + bpp]);
        u32::from_le_bytes(bytes)
    }

    /// 读取 (x, y) 处的 8 位 RGB 分量
    pub fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        self.format.unpack_rgb(self.pixel(x, y))
    }

    /// 以 RGB 分量写入 (x, y)
    pub(super) fn put_rgb(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        let bpp = self.bytes_per_pixel();
        let off = (y * self.width as usize + x) * bpp;
        let value = self.format.pack_rgb(r, g, b).to_le_bytes();
        self.data[off..off + bpp].copy_from_slice(&value[..bpp]);
    }
}
