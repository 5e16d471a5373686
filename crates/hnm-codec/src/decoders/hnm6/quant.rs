//! HNM6 反量化表
//!
//! 由帧头质量值每帧重建. 表项已乘入 AAN 缩放因子, 因此 IDCT 无需再做缩放.

use super::tables::{AAN_SCALES, BASE_CHROMA_QUANT, BASE_LUMA_QUANT};

/// 亮度/色度反量化表 (自然顺序)
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct QuantTables {
    pub luma: [i32; 64],
    pub chroma: [i32; 64],
}

impl QuantTables {
    /// 按质量值 (1..=100) 构建
    pub fn build(quality: u32) -> Self {
        let q = quality.clamp(1, 100) as i32;
        let scale = if q >= 50 { 200 - 2 * q } else { 5000 / q };
        Self {
            luma: scale_table(&BASE_LUMA_QUANT, scale),
            chroma: scale_table(&BASE_CHROMA_QUANT, scale),
        }
    }
}

fn scale_table(base: &[u16; 64], scale: i32) -> [i32; 64] {
    let mut out = [0i32; 64];
    for (p, entry) in out.iter_mut().enumerate() {
        let q = ((i32::from(base[p]) * scale + 50) / 100).clamp(8, 255);
        *entry = (q * AAN_SCALES[p]) >> 13;
    }
    out
}
