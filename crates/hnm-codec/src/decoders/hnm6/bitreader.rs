//! HNM6 数据区读取器
//!
//! 每帧数据被划分为四个独立的数据区, 各由一个读取器顺序消费:
//! - [`BitReader`]: 四叉树拓扑决策位与变换选择位
//! - [`MotionWordReader`]: 16 位运动字
//! - [`ShortMotionReader`]: 12 位短运动值, 每 3 字节两个
//! - [`NibbleReader`]: DCT 残差半字节, 每字节两个
//!
//! 任一读取器越过其数据区末尾都是致命错误, 整帧解码失败.

use hnm_core::{HnmError, HnmResult};

fn underrun(reader: &str, needed: usize, remaining: usize) -> HnmError {
    HnmError::Underrun(format!(
        "{reader}: 需要 {needed} 字节, 剩余 {remaining} 字节"
    ))
}

/// 决策位读取器
///
/// 每次补充一个 32 位小端字, 从最高位开始逐位输出.
pub(super) struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// 当前字中尚未输出的位 (已左对齐)
    bits: u32,
    /// 当前字中剩余位数
    count: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bits: 0,
            count: 0,
        }
    }

    /// 读取 1 个位
    pub fn read_bit(&mut self) -> HnmResult<u32> {
        if self.count == 0 {
            let remaining = self.data.len() - self.pos;
            let word = self
                .data
                .get(self.pos..self.pos + 4)
                .ok_or_else(|| underrun("决策位区", 4, remaining))?;
            self.bits = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            self.count = 32;
            self.pos += 4;
        }
        let bit = self.bits >> 31;
        self.bits <<= 1;
        self.count -= 1;
        Ok(bit)
    }

    /// 读取 N 个位 (N <= 32), 高位在前
    pub fn read_bits(&mut self, n: u32) -> HnmResult<u32> {
        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()?;
        }
        Ok(value)
    }
}

/// 16 位运动字读取器
pub(super) struct MotionWordReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MotionWordReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// 读取一个 16 位小端字
    pub fn read_word(&mut self) -> HnmResult<u16> {
        let remaining = self.data.len() - self.pos;
        let bytes = self
            .data
            .get(self.pos..self.pos + 2)
            .ok_or_else(|| underrun("运动字区", 2, remaining))?;
        self.pos += 2;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

/// 12 位短运动值读取器
///
/// 3 字节组成 24 位小端值, 低 12 位立即返回, 高 12 位暂存到下一次调用.
/// 数据区末尾只剩 2 字节时按单个值读取, 不暂存.
pub(super) struct ShortMotionReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// 暂存的高 12 位
    pending: Option<u16>,
}

impl<'a> ShortMotionReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            pending: None,
        }
    }

    /// 读取一个 12 位值
    pub fn read_value(&mut self) -> HnmResult<u16> {
        if let Some(value) = self.pending.take() {
            return Ok(value);
        }
        let rest = &self.data[self.pos..];
        match rest {
            [b0, b1, b2, ..] => {
                let packed = u32::from(*b0) | (u32::from(*b1) << 8) | (u32::from(*b2) << 16);
                self.pos += 3;
                self.pending = Some((packed >> 12) as u16);
                Ok((packed & 0x0FFF) as u16)
            }
            [b0, b1] => {
                self.pos += 2;
                Ok(u16::from_le_bytes([*b0, *b1]) & 0x0FFF)
            }
            _ => Err(underrun("短运动区", 2, rest.len())),
        }
    }
}

/// 残差半字节读取器
///
/// 每字节先返回低半字节, 高半字节暂存到下一次调用.
pub(super) struct NibbleReader<'a> {
    data: &'a [u8],
    pos: usize,
    pending: Option<u8>,
}

impl<'a> NibbleReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            pending: None,
        }
    }

    /// 读取一个 4 位值
    pub fn read_nibble(&mut self) -> HnmResult<u8> {
        if let Some(nibble) = self.pending.take() {
            return Ok(nibble);
        }
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| underrun("残差区", 1, 0))?;
        self.pos += 1;
        self.pending = Some(byte >> 4);
        Ok(byte & 0x0F)
    }

    /// 读取两个半字节组成的有符号 8 位值, 先读出的为高半字节
    pub fn read_i8(&mut self) -> HnmResult<i8> {
        let high = self.read_nibble()?;
        let low = self.read_nibble()?;
        Ok(((high << 4) | low) as i8)
    }
}
