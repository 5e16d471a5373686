//! HNM6 DCT 系数解码
//!
//! 残差区以半字节为单位编码每个 8x8 平面的系数. 先是两个半字节组成的 DC 值,
//! 之后每个半字节是一个控制码, 描述零游程与随后的系数值.
//! 系数按 zig-zag 顺序放置, 乘以反量化表后以自然顺序存储.

use hnm_core::{HnmError, HnmResult};

use super::bitreader::NibbleReader;
use super::tables::{PAIR_COEFFS, SIGNED_COEFFS, ZIGZAG};

/// 单个平面的系数块与占用掩码
///
/// 掩码高字节第 r 位表示第 r 行有系数, 低字节第 c 位表示第 c 列有系数.
pub(super) struct CoeffBlock {
    pub coeffs: [i32; 64],
    pub mask: u16,
}

/// 解码过程中的写入游标
struct Cursor<'q> {
    quant: &'q [i32; 64],
    coeffs: [i32; 64],
    mask: u16,
    index: usize,
}

impl Cursor<'_> {
    fn skip(&mut self, run: usize) {
        self.index += run;
    }

    fn emit(&mut self, value: i32) -> HnmResult<()> {
        let Some(&pos) = ZIGZAG.get(self.index) else {
            return Err(HnmError::InvalidData(format!(
                "系数索引 {} 超出 8x8 块",
                self.index
            )));
        };
        let pos = pos as usize;
        self.coeffs[pos] = value * self.quant[pos];
        self.mask |= (0x100 << (pos >> 3)) | (1 << (pos & 7));
        self.index += 1;
        Ok(())
    }

    fn emit_pair(&mut self, n: u8) -> HnmResult<()> {
        let n = n as usize;
        self.emit(i32::from(PAIR_COEFFS[2 * n]))?;
        self.emit(i32::from(PAIR_COEFFS[2 * n + 1]))
    }

    fn emit_signed(&mut self, n: u8) -> HnmResult<()> {
        self.emit(i32::from(SIGNED_COEFFS[n as usize]))
    }
}

/// 解码一个平面的系数
pub(super) fn decode_block(
    reader: &mut NibbleReader<'_>,
    quant: &[i32; 64],
) -> HnmResult<CoeffBlock> {
    let mut cur = Cursor {
        quant,
        coeffs: [0; 64],
        mask: 0,
        index: 0,
    };

    let dc = reader.read_i8()?;
    cur.emit(i32::from(dc))?;

    while cur.index < 64 {
        let code = reader.read_nibble()?;
        match code {
            0 => break,
            1 => cur.skip(5),
            2..=7 => {
                // 2/3: 跳 1, 4/5: 跳 2, 6/7: 跳 3; 偶数 +1, 奇数 -1
                cur.skip(usize::from(code / 2));
                cur.emit(if code & 1 == 0 { 1 } else { -1 })?;
            }
            8 => {
                let e = reader.read_nibble()?;
                cur.skip(usize::from(e >> 2));
                for _ in 0..=(e & 3) {
                    let n = reader.read_nibble()?;
                    cur.emit_pair(n)?;
                }
            }
            9 => {
                let e = reader.read_nibble()?;
                cur.skip(usize::from(e >> 2));
                for _ in 0..=(e & 3) {
                    let n = reader.read_nibble()?;
                    cur.emit_signed(n)?;
                }
            }
            10 => {
                let n = reader.read_nibble()?;
                cur.emit_pair(n)?;
            }
            11..=13 => {
                for _ in 0..(code - 10) {
                    let n = reader.read_nibble()?;
                    cur.emit_signed(n)?;
                }
            }
            14 => cur.skip(1),
            _ => {
                let v = reader.read_i8()?;
                cur.emit(i32::from(v))?;
            }
        }
    }

    Ok(CoeffBlock {
        coeffs: cur.coeffs,
        mask: cur.mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hnm_core::bitwriter::NibbleWriter;

    /// 全 1 反量化表, 便于直接观察系数值
    const UNIT: [i32; 64] = [1; 64];

    fn decode(nibbles: &[u8]) -> HnmResult<CoeffBlock> {
        let mut nw = NibbleWriter::new();
        for &n in nibbles {
            nw.push(n);
        }
        let data = nw.finish();
        let mut reader = NibbleReader::new(&data);
        decode_block(&mut reader, &UNIT)
    }

    /// 自然位置 -> zig-zag 索引值的期望块
    fn expect(entries: &[(usize, i32)]) -> [i32; 64] {
        let mut out = [0; 64];
        for &(i, v) in entries {
            out[ZIGZAG[i] as usize] = v;
        }
        out
    }

    #[test]
    fn test_dc_only() {
        let b = decode(&[0x4, 0x0, 0x0]).unwrap();
        assert_eq!(b.coeffs, expect(&[(0, 64)]));
        assert_eq!(b.mask, 0x0101);
    }

    #[test]
    fn test_negative_dc_is_signed() {
        let b = decode(&[0xC, 0x0, 0x0]).unwrap();
        assert_eq!(b.coeffs[0], -64);
    }

    #[test]
    fn test_dequantized_by_natural_position() {
        let mut quant = [0i32; 64];
        for (p, q) in quant.iter_mut().enumerate() {
            *q = p as i32 + 2;
        }
        let mut nw = NibbleWriter::new();
        for n in [0x0, 0x3, 0x2, 0x0] {
            nw.push(n);
        }
        let data = nw.finish();
        let mut reader = NibbleReader::new(&data);
        let b = decode_block(&mut reader, &quant).unwrap();
        // DC = 3 -> 3 * 2; 码 2: 跳到索引 2 (自然位置 8), +1 * 10
        assert_eq!(b.coeffs[0], 6);
        assert_eq!(b.coeffs[8], 10);
        // 第 1 行第 0 列
        assert_eq!(b.mask, 0x0101 | 0x0200);
    }

    #[test]
    fn test_unit_skips_and_signs() {
        // 码 1 跳 5 -> 索引 6; 码 3: 跳 1, -1 放在 7; 码 14 跳 1 -> 9;
        // 码 6: 跳 3, +1 放在 12; 码 5: 跳 2, -1 放在 15
        let b = decode(&[0x0, 0x1, 0x1, 0x3, 0xE, 0x6, 0x5, 0x0]).unwrap();
        assert_eq!(b.coeffs, expect(&[(0, 1), (7, -1), (12, 1), (15, -1)]));
    }

    #[test]
    fn test_code_8_pair_groups() {
        // e = 0b0101: 跳 1, 两组系数对; 对 0 = (1, 1), 对 15 = (-2, -2)
        let b = decode(&[0x0, 0x1, 0x8, 0x5, 0x0, 0xF, 0x0]).unwrap();
        assert_eq!(
            b.coeffs,
            expect(&[(0, 1), (2, 1), (3, 1), (4, -2), (5, -2)])
        );
    }

    #[test]
    fn test_code_9_signed_groups() {
        // e = 0b1010: 跳 2, 三个有符号值: SIGNED[0]=3, SIGNED[7]=-6, SIGNED[14]=10
        let b = decode(&[0x0, 0x1, 0x9, 0xA, 0x0, 0x7, 0xE, 0x0]).unwrap();
        assert_eq!(
            b.coeffs,
            expect(&[(0, 1), (3, 3), (4, -6), (5, 10)])
        );
    }

    #[test]
    fn test_code_10_to_13() {
        // 码 10 对 6 = (-1, 2); 码 11: 4; 码 12: -4, 5; 码 13: -5, 6, -6
        let b = decode(&[
            0x0, 0x1, 0xA, 0x6, 0xB, 0x2, 0xC, 0x3, 0x4, 0xD, 0x5, 0x6, 0x7, 0x0,
        ])
        .unwrap();
        assert_eq!(
            b.coeffs,
            expect(&[
                (0, 1),
                (1, -1),
                (2, 2),
                (3, 4),
                (4, -4),
                (5, 5),
                (6, -5),
                (7, 6),
                (8, -6),
            ])
        );
    }

    #[test]
    fn test_code_15_escape() {
        // 跳 5 到索引 6, 然后码 15 写入 -128
        let b = decode(&[0x0, 0x1, 0x1, 0xF, 0x8, 0x0, 0x0]).unwrap();
        assert_eq!(b.coeffs, expect(&[(0, 1), (6, -128)]));
        // 索引 6 = 自然位置 3: 第 0 行第 3 列
        assert_eq!(b.mask, 0x0101 | 0x0008);
    }

    #[test]
    fn test_full_block_ends_without_terminator() {
        // 码 10 每次写 2 个, 31 次写满索引 1..=62, 再用码 11 写索引 63
        let mut nibbles = vec![0x0, 0x1];
        for _ in 0..31 {
            nibbles.extend_from_slice(&[0xA, 0x0]);
        }
        nibbles.extend_from_slice(&[0xB, 0x0]);
        // 结束后的多余半字节不会被读取
        let mut nw = NibbleWriter::new();
        for &n in &nibbles {
            nw.push(n);
        }
        nw.push(0x1);
        let data = nw.finish();
        let mut reader = NibbleReader::new(&data);
        let b = decode_block(&mut reader, &UNIT).unwrap();
        assert!(b.coeffs[1..].iter().all(|&c| c == 1 || c == 3));
        assert_eq!(b.coeffs[63], 3);
        assert_eq!(b.mask, 0xFFFF);
        assert_eq!(reader.read_nibble().unwrap(), 0x1);
    }

    #[test]
    fn test_skip_past_end_without_emit_is_ok() {
        // 13 次跳 5 (1 + 65 > 64), 循环自然结束
        let mut nibbles = vec![0x0, 0x1];
        nibbles.extend(std::iter::repeat_n(0x1, 13));
        let b = decode(&nibbles).unwrap();
        assert_eq!(b.mask, 0x0101);
    }

    #[test]
    fn test_emit_past_end_is_invalid() {
        // 12 次跳 5 到索引 61, 码 6 跳 3 到 64 后写入
        let mut nibbles = vec![0x0, 0x1];
        nibbles.extend(std::iter::repeat_n(0x1, 12));
        nibbles.push(0x6);
        assert!(matches!(decode(&nibbles), Err(HnmError::InvalidData(_))));
    }

    #[test]
    fn test_truncated_residual_is_underrun() {
        assert!(matches!(decode(&[0x0]), Err(HnmError::Underrun(_))));
    }
}
