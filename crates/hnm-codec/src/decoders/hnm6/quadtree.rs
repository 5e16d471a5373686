//! HNM6 四叉树块解码
//!
//! 每帧按 8x8 根块从左到右、从上到下扫描. 每个节点从决策位区读取一个前缀码,
//! 决定渲染关键块、运动补偿、跳过, 或者继续切分为更小的块.
//! 树形不显式存储, 在深度优先遍历中边读边执行.
//!
//! 前缀码表按 (模式, 块尺寸) 查表, 每张表都是完备的无前缀码.

use hnm_core::{HnmError, HnmResult};

use super::bitreader::{BitReader, MotionWordReader, NibbleReader, ShortMotionReader};
use super::block::decode_block;
use super::coverage::CoverageMap;
use super::idct::idct_masked;
use super::motion::{
    MotionBlock, Transform, copy_transformed, long_motion_source, long_motion_uses_current,
    short_motion, warp_motion_source,
};
use super::quant::QuantTables;
use super::surface::Surface;
use super::yuv::block_to_rgb;

/// 遍历模式, 每帧按帧头与解码器设置选定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeMode {
    /// IW: warp 关键帧, 运动只引用当前帧
    Warp,
    /// IX 关键帧
    Keyframe,
    /// IX 帧间帧, 可跳过或引用前一帧
    Inter,
}

/// 合法块尺寸 (宽 x 高)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSize {
    S8x8,
    S4x8,
    S8x4,
    S4x4,
    S2x4,
    S4x2,
    S2x2,
}

impl BlockSize {
    /// 所有块尺寸
    pub const ALL: [BlockSize; 7] = [
        Self::S8x8,
        Self::S4x8,
        Self::S8x4,
        Self::S4x4,
        Self::S2x4,
        Self::S4x2,
        Self::S2x2,
    ];

    /// (宽, 高)
    pub const fn dims(self) -> (usize, usize) {
        match self {
            Self::S8x8 => (8, 8),
            Self::S4x8 => (4, 8),
            Self::S8x4 => (8, 4),
            Self::S4x4 => (4, 4),
            Self::S2x4 => (2, 4),
            Self::S4x2 => (4, 2),
            Self::S2x2 => (2, 2),
        }
    }

    /// 由宽高查找块尺寸
    pub fn from_dims(w: usize, h: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.dims() == (w, h))
    }

    /// 指定切分方式产生的子块尺寸
    pub fn split(self, cut: BlockAction) -> Option<Self> {
        let (w, h) = self.dims();
        match cut {
            BlockAction::CrossCut => Self::from_dims(w / 2, h / 2),
            BlockAction::VCut => Self::from_dims(w / 2, h),
            BlockAction::HCut => Self::from_dims(w, h / 2),
            _ => None,
        }
    }
}

/// 节点动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockAction {
    /// 解码 DCT 残差渲染 8x8 关键块
    KeyBlock,
    /// 3 位变换码 + 16 位运动字
    LongMotion,
    /// 短运动区的 12 位值 (warp: 当前帧, 帧间: 前一帧)
    ShortMotion,
    /// 运动字低 12 位, 按短运动解释, 源为当前帧 (IX 关键帧)
    SmallMotion,
    /// 从前一帧原位复制
    Skip,
    /// 十字切分为四块: 左上, 右上, 左下, 右下
    CrossCut,
    /// 竖切为左右两块
    VCut,
    /// 横切为上下两块
    HCut,
}

/// 前缀码表项: `len` 位的码值 `code` (高位先读)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixCode {
    pub code: u8,
    pub len: u8,
    pub action: BlockAction,
}

const fn pc(code: u8, len: u8, action: BlockAction) -> PrefixCode {
    PrefixCode { code, len, action }
}

use BlockAction::{
    CrossCut, HCut, KeyBlock, LongMotion, ShortMotion, Skip, SmallMotion, VCut,
};

// ========================
// IW (warp) 前缀码
// ========================
const WARP_8X8: &[PrefixCode] = &[
    pc(0b11, 2, KeyBlock),
    pc(0b10, 2, LongMotion),
    pc(0b0, 1, CrossCut),
];
const WARP_4X4: &[PrefixCode] = &[pc(0b1, 1, CrossCut), pc(0b0, 1, LongMotion)];
const WARP_2X2: &[PrefixCode] = &[pc(0, 0, ShortMotion)];

// ========================
// IX 关键帧前缀码
// ========================
const KEY_8X8: &[PrefixCode] = &[
    pc(0b11, 2, KeyBlock),
    pc(0b10, 2, LongMotion),
    pc(0b01, 2, CrossCut),
    pc(0b001, 3, VCut),
    pc(0b000, 3, HCut),
];
const KEY_4X8: &[PrefixCode] = &[pc(0b1, 1, LongMotion), pc(0b0, 1, HCut)];
const KEY_8X4: &[PrefixCode] = &[pc(0b1, 1, LongMotion), pc(0b0, 1, VCut)];
const KEY_4X4: &[PrefixCode] = &[
    pc(0b11, 2, CrossCut),
    pc(0b10, 2, VCut),
    pc(0b01, 2, HCut),
    pc(0b00, 2, LongMotion),
];
const KEY_2X4: &[PrefixCode] = &[pc(0b1, 1, SmallMotion), pc(0b0, 1, HCut)];
const KEY_4X2: &[PrefixCode] = &[pc(0b1, 1, SmallMotion), pc(0b0, 1, VCut)];
const KEY_2X2: &[PrefixCode] = &[pc(0, 0, SmallMotion)];

// ========================
// IX 帧间前缀码
// ========================
const INTER_8X8: &[PrefixCode] = &[
    pc(0b1, 1, Skip),
    pc(0b01, 2, LongMotion),
    pc(0b001, 3, KeyBlock),
    pc(0b0001, 4, CrossCut),
    pc(0b00001, 5, VCut),
    pc(0b00000, 5, HCut),
];
const INTER_4X8: &[PrefixCode] = &[pc(0b1, 1, Skip), pc(0b01, 2, LongMotion), pc(0b00, 2, HCut)];
const INTER_8X4: &[PrefixCode] = &[pc(0b1, 1, Skip), pc(0b01, 2, LongMotion), pc(0b00, 2, VCut)];
const INTER_4X4: &[PrefixCode] = &[
    pc(0b1, 1, Skip),
    pc(0b011, 3, LongMotion),
    pc(0b010, 3, CrossCut),
    pc(0b001, 3, VCut),
    pc(0b000, 3, HCut),
];
const INTER_2X4: &[PrefixCode] = &[pc(0b1, 1, Skip), pc(0b01, 2, ShortMotion), pc(0b00, 2, HCut)];
const INTER_4X2: &[PrefixCode] = &[pc(0b1, 1, Skip), pc(0b01, 2, ShortMotion), pc(0b00, 2, VCut)];
const INTER_2X2: &[PrefixCode] = &[pc(0b1, 1, Skip), pc(0b0, 1, ShortMotion)];

/// 最长前缀码位数
const MAX_CODE_LEN: u8 = 5;

/// 查询 (模式, 块尺寸) 的前缀码表
///
/// 该模式下不会出现的块尺寸返回空表.
pub fn prefix_codes(mode: DecodeMode, size: BlockSize) -> &'static [PrefixCode] {
    use BlockSize::*;
    match (mode, size) {
        (DecodeMode::Warp, S8x8) => WARP_8X8,
        (DecodeMode::Warp, S4x4) => WARP_4X4,
        (DecodeMode::Warp, S2x2) => WARP_2X2,
        (DecodeMode::Warp, _) => &[],
        (DecodeMode::Keyframe, S8x8) => KEY_8X8,
        (DecodeMode::Keyframe, S4x8) => KEY_4X8,
        (DecodeMode::Keyframe, S8x4) => KEY_8X4,
        (DecodeMode::Keyframe, S4x4) => KEY_4X4,
        (DecodeMode::Keyframe, S2x4) => KEY_2X4,
        (DecodeMode::Keyframe, S4x2) => KEY_4X2,
        (DecodeMode::Keyframe, S2x2) => KEY_2X2,
        (DecodeMode::Inter, S8x8) => INTER_8X8,
        (DecodeMode::Inter, S4x8) => INTER_4X8,
        (DecodeMode::Inter, S8x4) => INTER_8X4,
        (DecodeMode::Inter, S4x4) => INTER_4X4,
        (DecodeMode::Inter, S2x4) => INTER_2X4,
        (DecodeMode::Inter, S4x2) => INTER_4X2,
        (DecodeMode::Inter, S2x2) => INTER_2X2,
    }
}

/// 逐位读取直到匹配一个前缀码
fn read_action(
    bits: &mut BitReader<'_>,
    mode: DecodeMode,
    size: BlockSize,
) -> HnmResult<BlockAction> {
    let codes = prefix_codes(mode, size);
    let mut code = 0u8;
    let mut len = 0u8;
    loop {
        if let Some(entry) = codes.iter().find(|e| e.len == len && e.code == code) {
            return Ok(entry.action);
        }
        if len >= MAX_CODE_LEN || codes.is_empty() {
            return Err(HnmError::Internal(format!(
                "{mode:?} 模式 {size:?} 块没有匹配的前缀码 (已读 {len} 位: {code:#b})"
            )));
        }
        code = (code << 1) | bits.read_bit()? as u8;
        len += 1;
    }
}

/// 单帧块统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStats {
    /// 关键块数
    pub keyblocks: u32,
    /// 长运动块数
    pub long_motions: u32,
    /// 短运动块数 (含 IX 关键帧的小运动)
    pub short_motions: u32,
    /// 跳过块数
    pub skips: u32,
    /// 切分次数
    pub cuts: u32,
}

/// 一帧的遍历上下文
pub(super) struct BlockDecoder<'a> {
    pub mode: DecodeMode,
    pub bits: BitReader<'a>,
    pub motion: MotionWordReader<'a>,
    pub short: ShortMotionReader<'a>,
    pub residual: NibbleReader<'a>,
    pub quant: &'a QuantTables,
    pub current: &'a mut Surface,
    /// 前一帧, 仅帧间模式提供
    pub previous: Option<&'a Surface>,
    pub coverage: Option<&'a mut CoverageMap>,
    pub stats: BlockStats,
}

impl BlockDecoder<'_> {
    /// 遍历整帧
    pub fn decode_frame(&mut self) -> HnmResult<()> {
        let width = self.current.width() as usize;
        let height = self.current.height() as usize;
        for y in (0..height).step_by(8) {
            for x in (0..width).step_by(8) {
                self.decode_node(x, y, BlockSize::S8x8)?;
            }
        }
        Ok(())
    }

    fn decode_node(&mut self, x: usize, y: usize, size: BlockSize) -> HnmResult<()> {
        let action = read_action(&mut self.bits, self.mode, size)?;
        let (w, h) = size.dims();
        match action {
            KeyBlock => self.key_block(x, y, size)?,
            LongMotion => self.long_motion(x, y, w, h)?,
            ShortMotion => {
                let value = self.short.read_value()?;
                let from_current = self.mode == DecodeMode::Warp;
                self.short_motion(value, from_current, x, y, w, h)?;
            }
            SmallMotion => {
                let value = self.motion.read_word()? & 0x0FFF;
                self.short_motion(value, true, x, y, w, h)?;
            }
            Skip => self.skip(x, y, w, h)?,
            CrossCut | VCut | HCut => return self.cut(action, x, y, size),
        }
        if let Some(coverage) = self.coverage.as_deref_mut() {
            coverage.mark(x, y, w, h);
        }
        Ok(())
    }

    fn cut(&mut self, cut: BlockAction, x: usize, y: usize, size: BlockSize) -> HnmResult<()> {
        let child = size.split(cut).ok_or_else(|| {
            HnmError::Internal(format!("{size:?} 块不能执行 {cut:?}"))
        })?;
        self.stats.cuts += 1;
        let (cw, ch) = child.dims();
        match cut {
            CrossCut => {
                self.decode_node(x, y, child)?;
                self.decode_node(x + cw, y, child)?;
                self.decode_node(x, y + ch, child)?;
                self.decode_node(x + cw, y + ch, child)
            }
            VCut => {
                self.decode_node(x, y, child)?;
                self.decode_node(x + cw, y, child)
            }
            _ => {
                self.decode_node(x, y, child)?;
                self.decode_node(x, y + ch, child)
            }
        }
    }

    fn key_block(&mut self, x: usize, y: usize, size: BlockSize) -> HnmResult<()> {
        if size != BlockSize::S8x8 {
            return Err(HnmError::Internal(format!("关键块尺寸必须为 8x8, 实际 {size:?}")));
        }
        let mut planes = [[0i32; 64]; 3];
        for (plane, out) in planes.iter_mut().enumerate() {
            let quant = if plane == 0 {
                &self.quant.luma
            } else {
                &self.quant.chroma
            };
            let mut block = decode_block(&mut self.residual, quant)?;
            idct_masked(&mut block.coeffs, block.mask);
            *out = block.coeffs;
        }
        block_to_rgb(self.current, x, y, &planes);
        self.stats.keyblocks += 1;
        Ok(())
    }

    fn long_motion(&mut self, x: usize, y: usize, w: usize, h: usize) -> HnmResult<()> {
        let xform = Transform::from_bits(self.bits.read_bits(3)?);
        let word = self.motion.read_word()?;
        let (x0, y0) = (x as i32, y as i32);
        let (from_current, (src_x, src_y)) = match self.mode {
            DecodeMode::Warp => (true, warp_motion_source(word, x0, y0, h as i32)),
            DecodeMode::Keyframe => (true, long_motion_source(word, x0, y0, true)),
            DecodeMode::Inter => {
                let from_current = long_motion_uses_current(word);
                (from_current, long_motion_source(word, x0, y0, from_current))
            }
        };
        self.stats.long_motions += 1;
        self.copy(
            from_current,
            MotionBlock {
                xform,
                src_x,
                src_y,
                dst_x: x,
                dst_y: y,
                w,
                h,
            },
        )
    }

    fn short_motion(
        &mut self,
        value: u16,
        from_current: bool,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> HnmResult<()> {
        let (xform, dx, dy) = short_motion(value);
        self.stats.short_motions += 1;
        self.copy(
            from_current,
            MotionBlock {
                xform,
                src_x: x as i32 + dx,
                src_y: y as i32 + dy,
                dst_x: x,
                dst_y: y,
                w,
                h,
            },
        )
    }

    fn skip(&mut self, x: usize, y: usize, w: usize, h: usize) -> HnmResult<()> {
        self.stats.skips += 1;
        self.copy(
            false,
            MotionBlock {
                xform: Transform::Identity,
                src_x: x as i32,
                src_y: y as i32,
                dst_x: x,
                dst_y: y,
                w,
                h,
            },
        )
    }

    fn copy(&mut self, from_current: bool, block: MotionBlock) -> HnmResult<()> {
        if from_current {
            return copy_transformed(self.current, None, &block);
        }
        let previous = self
            .previous
            .ok_or_else(|| HnmError::InvalidData("引用前一帧, 但没有可用的参考帧".into()))?;
        copy_transformed(self.current, Some(previous), &block)
    }
}
