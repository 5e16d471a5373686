//! 带掩码的快速 AAN IDCT
//!
//! 一维核为 Arai-Agui-Nakajima 蝶形 (与 libjpeg jidctfst 相同), 常量为 Q8.
//! 反量化表已包含 AAN 缩放, 变换内部不做降位, 输出为像素值的 16 倍.
//!
//! 占用掩码用于跳过全零的行或列: 先沿稀疏方向只处理有系数的线,
//! 若该方向只有第 0 条线有系数, 第二遍退化为逐线广播.

const FIX_1_082392200: i64 = 277;
const FIX_1_414213562: i64 = 362;
const FIX_1_847759065: i64 = 473;
const FIX_2_613125930: i64 = 669;

#[inline]
fn mul(x: i32, c: i64) -> i32 {
    ((i64::from(x) * c) >> 8) as i32
}

/// 对 `block[start + k * stride]` (k = 0..8) 做一维 IDCT
fn idct_1d(block: &mut [i32; 64], start: usize, stride: usize) {
    let at = |k: usize| start + k * stride;
    let x: [i32; 8] = std::array::from_fn(|k| block[at(k)]);

    // 偶数部分
    let tmp10 = x[0] + x[4];
    let tmp11 = x[0] - x[4];
    let tmp13 = x[2] + x[6];
    let tmp12 = mul(x[2] - x[6], FIX_1_414213562) - tmp13;

    let tmp0 = tmp10 + tmp13;
    let tmp3 = tmp10 - tmp13;
    let tmp1 = tmp11 + tmp12;
    let tmp2 = tmp11 - tmp12;

    // 奇数部分
    let z13 = x[5] + x[3];
    let z10 = x[5] - x[3];
    let z11 = x[1] + x[7];
    let z12 = x[1] - x[7];

    let tmp7 = z11 + z13;
    let tmp11 = mul(z11 - z13, FIX_1_414213562);
    let z5 = mul(z10 + z12, FIX_1_847759065);
    let tmp10 = mul(z12, FIX_1_082392200) - z5;
    let tmp12 = mul(z10, -FIX_2_613125930) + z5;

    let tmp6 = tmp12 - tmp7;
    let tmp5 = tmp11 - tmp6;
    let tmp4 = tmp10 + tmp5;

    block[at(0)] = tmp0 + tmp7;
    block[at(7)] = tmp0 - tmp7;
    block[at(1)] = tmp1 + tmp6;
    block[at(6)] = tmp1 - tmp6;
    block[at(2)] = tmp2 + tmp5;
    block[at(5)] = tmp2 - tmp5;
    block[at(4)] = tmp3 + tmp4;
    block[at(3)] = tmp3 - tmp4;
}

/// 按占用掩码做二维 IDCT (原地)
pub(super) fn idct_masked(block: &mut [i32; 64], mask: u16) {
    if mask == 0x0101 {
        let dc = block[0];
        block.fill(dc);
        return;
    }

    let rows = (mask >> 8) as u8;
    let cols = (mask & 0xFF) as u8;

    if rows < cols {
        for r in (0..8).filter(|r| rows & (1 << r) != 0) {
            idct_1d(block, r * 8, 1);
        }
        if rows == 1 {
            for c in 0..8 {
                let v = block[c];
                for r in 1..8 {
                    block[r * 8 + c] = v;
                }
            }
        } else {
            for c in 0..8 {
                idct_1d(block, c, 8);
            }
        }
    } else {
        for c in (0..8).filter(|c| cols & (1 << c) != 0) {
            idct_1d(block, c, 8);
        }
        if cols == 1 {
            for r in 0..8 {
                let v = block[r * 8];
                block[r * 8 + 1..r * 8 + 8].fill(v);
            }
        } else {
            for r in 0..8 {
                idct_1d(block, r * 8, 1);
            }
        }
    }
}
