//! HNM6 帧头解析
//!
//! 每帧以 24 字节头开始 (6 个小端 32 位字):
//!
//! | 偏移 | 类型 | 含义 |
//! |------|------|------|
//! | 0    | i32  | 质量 (负数表示关键帧) |
//! | 4    | u32  | 决策位区起始 |
//! | 8    | u32  | 运动字区起始 |
//! | 12   | u32  | 短运动区起始 |
//! | 16   | u32  | 残差区起始 |
//! | 20   | u32  | 帧结束 |
//!
//! 相邻偏移之间即为各读取器的数据区.

use hnm_core::{HnmError, HnmResult};

/// 帧头长度 (字节)
pub const HEADER_SIZE: usize = 24;

/// 帧头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// 原始质量值
    pub quality: i32,
    /// 五个区域边界: 决策位, 运动字, 短运动, 残差起始, 帧结束
    pub offsets: [usize; 5],
}

impl FrameHeader {
    /// 解析并校验帧头
    ///
    /// 偏移必须单调不减, 第一个区域不得与头部重叠, 且都不超过 `data.len()`.
    pub fn parse(data: &[u8]) -> HnmResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(HnmError::MalformedHeader(format!(
                "帧数据不足 {} 字节, 实际 {} 字节",
                HEADER_SIZE,
                data.len()
            )));
        }

        let word = |i: usize| {
            let b = &data[i * 4..i * 4 + 4];
            [b[0], b[1], b[2], b[3]]
        };
        let quality = i32::from_le_bytes(word(0));
        let mut offsets = [0usize; 5];
        for (i, off) in offsets.iter_mut().enumerate() {
            *off = u32::from_le_bytes(word(i + 1)) as usize;
        }

        if offsets[0] < HEADER_SIZE {
            return Err(HnmError::MalformedHeader(format!(
                "决策位区起始 {} 与帧头重叠",
                offsets[0]
            )));
        }
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(HnmError::MalformedHeader(format!(
                "区域偏移未按升序排列: {offsets:?}"
            )));
        }
        if offsets[4] > data.len() {
            return Err(HnmError::MalformedHeader(format!(
                "帧结束偏移 {} 超出帧数据长度 {}",
                offsets[4],
                data.len()
            )));
        }

        Ok(Self { quality, offsets })
    }

    /// 是否为关键帧
    pub fn is_keyframe(&self) -> bool {
        self.quality < 0
    }

    /// 质量绝对值, 限制在 [1, 100]
    pub fn quality_level(&self) -> u32 {
        self.quality.unsigned_abs().clamp(1, 100)
    }

    /// 按偏移切分出四个数据区
    ///
    /// `data` 必须是解析出本帧头的同一缓冲区.
    pub fn regions<'a>(&self, data: &'a [u8]) -> [&'a [u8]; 4] {
        let o = &self.offsets;
        [
            &data[o[0]..o[1]],
            &data[o[1]..o[2]],
            &data[o[2]..o[3]],
            &data[o[3]..o[4]],
        ]
    }
}

/// 拼装一帧: 24 字节头 + 四个数据区
///
/// 数据区顺序为决策位, 运动字, 短运动, 残差. 用于构造合成测试流.
pub fn assemble_frame(quality: i32, regions: [&[u8]; 4]) -> Vec<u8> {
    let total = HEADER_SIZE + regions.iter().map(|r| r.len()).sum::<usize>();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&quality.to_le_bytes());

    let mut offset = HEADER_SIZE;
    out.extend_from_slice(&(offset as u32).to_le_bytes());
    for region in &regions {
        offset += region.len();
        out.extend_from_slice(&(offset as u32).to_le_bytes());
    }
    for region in &regions {
        out.extend_from_slice(region);
    }
    out
}
