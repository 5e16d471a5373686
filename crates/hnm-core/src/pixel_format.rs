//! 像素格式定义.
//!
//! HNM6 解码器直接输出打包 RGB 像素, 只支持 16 位与 32 位两类格式.
//! 格式在解码器构造时选定, 整个视频期间不变.

use std::fmt;

/// 像素格式
///
/// 所有格式均为单平面打包格式, 多字节像素按小端序存储.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 未指定
    None,

    // ========================
    // 16 位格式
    // ========================
    /// RGB 5-5-5, 最高位保留, 小端
    Rgb555le,
    /// RGB 5-6-5, 小端
    Rgb565le,

    // ========================
    // 32 位格式
    // ========================
    /// 内存字节序 B, G, R, A
    Bgra,
    /// 内存字节序 R, G, B, A
    Rgba,
}

impl PixelFormat {
    /// 每个像素占用的字节数, None 返回 0
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Rgb555le | Self::Rgb565le => 2,
            Self::Bgra | Self::Rgba => 4,
        }
    }

    /// 计算每行字节数 (pitch)
    pub const fn linesize(&self, width: u32) -> usize {
        width as usize * self.bytes_per_pixel()
    }

    /// 计算整帧的字节数
    ///
    /// # 返回
    /// - `Some(bytes)`: 整帧字节数
    /// - `None`: 格式为 None
    pub fn frame_size(&self, width: u32, height: u32) -> Option<usize> {
        if *self == Self::None {
            return None;
        }
        Some(self.linesize(width) * height as usize)
    }

    /// 将 8 位 RGB 分量打包为像素值
    ///
    /// 返回值的低 `bytes_per_pixel()` 个字节按小端序写入即为内存布局.
    pub const fn pack_rgb(&self, r: u8, g: u8, b: u8) -> u32 {
        let (r, g, b) = (r as u32, g as u32, b as u32);
        match self {
            Self::None => 0,
            Self::Rgb555le => ((r >> 3) << 10) | ((g >> 3) << 5) | (b >> 3),
            Self::Rgb565le => ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3),
            Self::Bgra => 0xFF00_0000 | (r << 16) | (g << 8) | b,
            Self::Rgba => 0xFF00_0000 | (b << 16) | (g << 8) | r,
        }
    }

    /// 将像素值还原为 8 位 RGB 分量
    ///
    /// 16 位格式的低位通过复制高位补齐.
    pub const fn unpack_rgb(&self, value: u32) -> (u8, u8, u8) {
        match self {
            Self::None => (0, 0, 0),
            Self::Rgb555le => (
                expand5((value >> 10) & 0x1F),
                expand5((value >> 5) & 0x1F),
                expand5(value & 0x1F),
            ),
            Self::Rgb565le => (
                expand5((value >> 11) & 0x1F),
                expand6((value >> 5) & 0x3F),
                expand5(value & 0x1F),
            ),
            Self::Bgra => (
                ((value >> 16) & 0xFF) as u8,
                ((value >> 8) & 0xFF) as u8,
                (value & 0xFF) as u8,
            ),
            Self::Rgba => (
                (value & 0xFF) as u8,
                ((value >> 8) & 0xFF) as u8,
                ((value >> 16) & 0xFF) as u8,
            ),
        }
    }
}

const fn expand5(v: u32) -> u8 {
    ((v << 3) | (v >> 2)) as u8
}

const fn expand6(v: u32) -> u8 {
    ((v << 2) | (v >> 4)) as u8
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Rgb555le => "rgb555le",
            Self::Rgb565le => "rgb565le",
            Self::Bgra => "bgra",
            Self::Rgba => "rgba",
        };
        write!(f, "{name}")
    }
}
