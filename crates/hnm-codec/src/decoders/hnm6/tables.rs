//! HNM6 常量表

/// Zig-zag 扫描顺序: 扫描索引 -> 自然位置 (row * 8 + col)
pub(super) const ZIGZAG: [u8; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, //
    17, 24, 32, 25, 18, 11, 4, 5, //
    12, 19, 26, 33, 40, 48, 41, 34, //
    27, 20, 13, 6, 7, 14, 21, 28, //
    35, 42, 49, 56, 57, 50, 43, 36, //
    29, 22, 15, 23, 30, 37, 44, 51, //
    58, 59, 52, 45, 38, 31, 39, 46, //
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// JPEG Annex K.1 亮度量化表 (自然顺序)
pub(super) const BASE_LUMA_QUANT: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// JPEG Annex K.2 色度量化表 (自然顺序)
pub(super) const BASE_CHROMA_QUANT: [u16; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99, //
    18, 21, 26, 66, 99, 99, 99, 99, //
    24, 26, 56, 99, 99, 99, 99, 99, //
    47, 66, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// AAN 缩放因子 (自然顺序, Q14)
///
/// `AAN_SCALES[row * 8 + col] = 16384 * s(row) * s(col)`,
/// 其中 `s(0) = 1`, `s(k) = cos(k * pi / 16) * sqrt(2)`.
pub(super) const AAN_SCALES: [i32; 64] = [
    16384, 22725, 21407, 19266, 16384, 12873, 8867, 4520, //
    22725, 31521, 29692, 26722, 22725, 17855, 12299, 6270, //
    21407, 29692, 27969, 25172, 21407, 16819, 11585, 5906, //
    19266, 26722, 25172, 22654, 19266, 15137, 10426, 5315, //
    16384, 22725, 21407, 19266, 16384, 12873, 8867, 4520, //
    12873, 17855, 16819, 15137, 12873, 10114, 6967, 3552, //
    8867, 12299, 11585, 10426, 8867, 6967, 4799, 2446, //
    4520, 6270, 5906, 5315, 4520, 3552, 2446, 1247,
];

/// 控制码 8/10 使用的系数对表: 16 个有序对, 取值 {1, -1, 2, -2}
pub(super) const PAIR_COEFFS: [i8; 32] = [
    1, 1, 1, -1, 1, 2, 1, -2, //
    -1, 1, -1, -1, -1, 2, -1, -2, //
    2, 1, 2, -1, 2, 2, 2, -2, //
    -2, 1, -2, -1, -2, 2, -2, -2,
];

/// 控制码 9/11/12/13 使用的有符号半字节表
pub(super) const SIGNED_COEFFS: [i8; 16] = [
    3, -3, 4, -4, 5, -5, 6, -6, //
    7, -7, 8, -8, 9, -9, 10, -10,
];

/// 短运动索引的近距离区间上限
pub(super) const SHORT_MOTION_NEAR_LIMIT: u16 = 96;
