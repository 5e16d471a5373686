//! HNM6 数据区打包器.
//!
//! 每个打包器与解码端的一个读取器一一对应, 生成读取器可直接消费的字节序列.
//! 用于构造合成测试流和基准测试数据, 不包含任何编码决策.
//!
//! - [`BitWriter`]: 32 位小端字, 字内高位在前
//! - [`WordWriter`]: 16 位小端字
//! - [`ShortWordWriter`]: 12 位值, 每 3 字节打包两个
//! - [`NibbleWriter`]: 4 位值, 每字节打包两个 (低半字节在前)

/// 比特流写入器
///
/// 按高位在前 (MSB first) 填充 32 位字, 每满 32 位以小端序输出 4 字节.
///
/// # 示例
/// ```
/// use hnm_core::bitwriter::BitWriter;
///
/// let mut bw = BitWriter::new();
/// bw.write_bits(0b11, 2);
/// assert_eq!(bw.finish(), vec![0x00, 0x00, 0x00, 0xC0]);
/// ```
#[derive(Debug, Default)]
pub struct BitWriter {
    /// 输出缓冲区
    data: Vec<u8>,
    /// 当前正在填充的字
    current: u32,
    /// 当前字中已填充的位数 (0-31)
    bit_count: u32,
}

impl BitWriter {
    /// 创建新的比特流写入器
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取已写入的总位数
    pub fn bits_written(&self) -> usize {
        self.data.len() * 8 + self.bit_count as usize
    }

    /// 写入 1 个位
    pub fn write_bit(&mut self, bit: u32) {
        self.current |= (bit & 1) << (31 - self.bit_count);
        self.bit_count += 1;
        if self.bit_count == 32 {
            self.data.extend_from_slice(&self.current.to_le_bytes());
            self.current = 0;
            self.bit_count = 0;
        }
    }

    /// 写入 N 个位 (最多 32 位), 值的低 N 位高位在前
    pub fn write_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32, "write_bits: n={} 超过 32 位", n);
        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1);
        }
    }

    /// 结束写入, 未满的字以 0 补齐
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.data.extend_from_slice(&self.current.to_le_bytes());
        }
        self.data
    }
}

/// 16 位运动字写入器
#[derive(Debug, Default)]
pub struct WordWriter {
    data: Vec<u8>,
}

impl WordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一个 16 位小端字
    pub fn push(&mut self, word: u16) {
        self.data.extend_from_slice(&word.to_le_bytes());
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

/// 12 位短运动值写入器
///
/// 成对打包: 第一个值占 24 位小端组合的低 12 位, 第二个值占高 12 位.
/// 值的个数为奇数时, 最后一个值单独以 2 字节写出 (读取端的尾部特例).
#[derive(Debug, Default)]
pub struct ShortWordWriter {
    data: Vec<u8>,
    /// 等待配对的前一个值
    pending: Option<u16>,
}

impl ShortWordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一个 12 位值 (高位被截断)
    pub fn push(&mut self, value: u16) {
        let value = value & 0x0FFF;
        match self.pending.take() {
            Some(first) => {
                let packed = u32::from(first) | (u32::from(value) << 12);
                self.data.extend_from_slice(&packed.to_le_bytes()[..3]);
            }
            None => self.pending = Some(value),
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        if let Some(last) = self.pending.take() {
            self.data.extend_from_slice(&last.to_le_bytes());
        }
        self.data
    }
}

/// 半字节写入器
///
/// 每字节存放两个 4 位值, 先写入的值占低半字节.
#[derive(Debug, Default)]
pub struct NibbleWriter {
    data: Vec<u8>,
    pending: Option<u8>,
}

impl NibbleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一个 4 位值 (高位被截断)
    pub fn push(&mut self, nibble: u8) {
        let nibble = nibble & 0x0F;
        match self.pending.take() {
            Some(low) => self.data.push(low | (nibble << 4)),
            None => self.pending = Some(nibble),
        }
    }

    /// 写入一个 8 位值, 高半字节在前
    pub fn push_byte(&mut self, value: u8) {
        self.push(value >> 4);
        self.push(value & 0x0F);
    }

    /// 已写入的半字节个数
    pub fn len(&self) -> usize {
        self.data.len() * 2 + usize::from(self.pending.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn finish(mut self) -> Vec<u8> {
        if let Some(low) = self.pending.take() {
            self.data.push(low);
        }
        self.data
    }
}
