//! HNM6 运动补偿
//!
//! 运动块从参考帧或当前帧已解码部分复制, 复制时可附加 8 种几何变换之一.
//! 源坐标只做一次水平回绕, 之后按平铺像素数组寻址, 整个平铺跨度必须落在缓冲区内.

use hnm_core::{HnmError, HnmResult};

use super::surface::Surface;
use super::tables::SHORT_MOTION_NEAR_LIMIT;

/// 运动块几何变换
///
/// 变换 0-3 的源块为 w x h, 4-7 的源块为 h x w.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// 原样复制
    Identity,
    /// 水平翻转
    FlipH,
    /// 垂直翻转
    FlipV,
    /// 旋转 180 度
    Rotate180,
    /// 主对角线转置
    Transpose,
    /// 顺时针旋转 90 度
    RotateCw,
    /// 逆时针旋转 90 度
    RotateCcw,
    /// 副对角线转置
    AntiTranspose,
}

impl Transform {
    /// 由 3 位变换码构造 (高位被忽略)
    pub fn from_bits(code: u32) -> Self {
        match code & 7 {
            0 => Self::Identity,
            1 => Self::FlipH,
            2 => Self::FlipV,
            3 => Self::Rotate180,
            4 => Self::Transpose,
            5 => Self::RotateCw,
            6 => Self::RotateCcw,
            _ => Self::AntiTranspose,
        }
    }

    /// 源块尺寸 (宽, 高)
    pub fn source_dims(self, w: usize, h: usize) -> (usize, usize) {
        match self {
            Self::Identity | Self::FlipH | Self::FlipV | Self::Rotate180 => (w, h),
            _ => (h, w),
        }
    }

    /// 目标块内 (dx, dy) 对应的源块坐标
    #[inline]
    pub fn map(self, dx: usize, dy: usize, w: usize, h: usize) -> (usize, usize) {
        match self {
            Self::Identity => (dx, dy),
            Self::FlipH => (w - 1 - dx, dy),
            Self::FlipV => (dx, h - 1 - dy),
            Self::Rotate180 => (w - 1 - dx, h - 1 - dy),
            Self::Transpose => (dy, dx),
            Self::RotateCw => (dy, w - 1 - dx),
            Self::RotateCcw => (h - 1 - dy, dx),
            Self::AntiTranspose => (h - 1 - dy, w - 1 - dx),
        }
    }
}

/// IX 长运动字解出的源坐标
///
/// 低字节为有符号水平位移, 位 8-14 为垂直参数 f. 源为当前帧时向上 f 行,
/// 源为参考帧时垂直位移为 `f - 64`.
pub(super) fn long_motion_source(word: u16, x: i32, y: i32, from_current: bool) -> (i32, i32) {
    let dx = i32::from((word & 0xFF) as u8 as i8);
    let f = i32::from((word >> 8) & 0x7F);
    if from_current {
        (x + dx, y - f)
    } else {
        (x + dx, y + f - 64)
    }
}

/// warp 关键帧长运动的源坐标
///
/// 垂直参数 f 从块的下边缘向上计数, 因此同一个运动字在 8x8 与 4x4 块上
/// 得到不同的源行: `src_y = y + h - f`.
pub(super) fn warp_motion_source(word: u16, x: i32, y: i32, h: i32) -> (i32, i32) {
    let dx = i32::from((word & 0xFF) as u8 as i8);
    let f = i32::from((word >> 8) & 0x7F);
    (x + dx, y + h - f)
}

/// 长运动字的 "源为当前帧" 标志 (仅帧间模式使用)
pub(super) fn long_motion_uses_current(word: u16) -> bool {
    word & 0x8000 != 0
}

/// 12 位短运动值解出变换与位移
///
/// 索引小于 96 时为 16 x 6 的近距离窗口, 否则为 32 列宽的远距离窗口.
pub(super) fn short_motion(value: u16) -> (Transform, i32, i32) {
    let xform = Transform::from_bits(u32::from(value & 7));
    let index = value >> 3;
    let (dx, dy) = if index < SHORT_MOTION_NEAR_LIMIT {
        (i32::from(index & 15) - 8, i32::from(index >> 4) - 6)
    } else {
        let i = index - SHORT_MOTION_NEAR_LIMIT;
        (i32::from(i & 31) - 16, i32::from(i >> 5) - 6)
    };
    (xform, dx, dy)
}

/// 单次水平回绕
fn wrap_line(sx: i32, sy: i32, width: i32) -> (i32, i32) {
    if sx < 0 {
        (sx + width, sy - 1)
    } else if sx >= width {
        (sx - width, sy + 1)
    } else {
        (sx, sy)
    }
}

/// 一次运动复制的几何参数
#[derive(Debug, Clone, Copy)]
pub(super) struct MotionBlock {
    pub xform: Transform,
    pub src_x: i32,
    pub src_y: i32,
    pub dst_x: usize,
    pub dst_y: usize,
    pub w: usize,
    pub h: usize,
}

/// 执行运动复制
///
/// `src` 为 `None` 表示从 `dst` 自身复制; 此时按目标行优先顺序逐像素读取,
/// 源与目标重叠时能看到本次复制已写入的像素.
pub(super) fn copy_transformed(
    dst: &mut Surface,
    src: Option<&Surface>,
    block: &MotionBlock,
) -> HnmResult<()> {
    let width = dst.width() as usize;
    let (sx, sy) = wrap_line(block.src_x, block.src_y, width as i32);
    let (sw, sh) = block.xform.source_dims(block.w, block.h);

    let start = i64::from(sy) * width as i64 + i64::from(sx);
    let last = start + (sh as i64 - 1) * width as i64 + sw as i64 - 1;
    if start < 0 || last >= dst.pixel_count() as i64 {
        return Err(HnmError::InvalidData(format!(
            "运动源 ({}, {}) {}x{} 超出帧缓冲区",
            block.src_x, block.src_y, sw, sh
        )));
    }
    let start = start as usize;
    let dst_start = block.dst_y * width + block.dst_x;

    match dst.bytes_per_pixel() {
        2 => blit::<2>(dst, src, block, start, dst_start, width),
        _ => blit::<4>(dst, src, block, start, dst_start, width),
    }
    Ok(())
}

fn blit<const BPP: usize>(
    dst: &mut Surface,
    src: Option<&Surface>,
    block: &MotionBlock,
    src_start: usize,
    dst_start: usize,
    width: usize,
) {
    let (w, h, xform) = (block.w, block.h, block.xform);
    let dst_data = dst.data_mut();
    for dy in 0..h {
        for dx in 0..w {
            let (mx, my) = xform.map(dx, dy, w, h);
            let s = (src_start + my * width + mx) * BPP;
            let d = (dst_start + dy * width + dx) * BPP;
            match src {
                Some(other) => {
                    dst_data[d..d + BPP].copy_from_slice(&other.data()[s..s + BPP]);
                }
                None => dst_data.copy_within(s..s + BPP, d),
            }
        }
    }
}
