//! HNM6 YUV -> RGB 转换
//!
//! 定点公式为格式固有部分, 不是 BT.601/BT.709.
//! 三个平面均为完整 8x8 (4:4:4), 输入为 IDCT 输出 (像素值的 16 倍).

use super::surface::Surface;

#[inline]
fn clip(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// 单个位置的颜色转换
#[inline]
pub(super) fn yuv_to_rgb(y: i32, u: i32, v: i32) -> (u8, u8, u8) {
    // 蓝色分量使用未右移的 U
    let blue = u >> 3;
    let (y, u, v) = (y >> 4, u >> 4, v >> 4);
    let cr = (16 * v + 8) / 10;
    let cb = u / 3;
    (
        clip(y + 128 + cr),
        clip(y + 128 - cr / 2 - cb),
        clip(y + 128 + blue),
    )
}

/// 将 Y/U/V 三个 8x8 平面写入 `dst` 的 (x, y) 处
pub(super) fn block_to_rgb(dst: &mut Surface, x: usize, y: usize, planes: &[[i32; 64]; 3]) {
    let [py, pu, pv] = planes;
    for row in 0..8 {
        for col in 0..8 {
            let p = row * 8 + col;
            let (r, g, b) = yuv_to_rgb(py[p], pu[p], pv[p]);
            dst.put_rgb(x + col, y + row, r, g, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hnm_core::PixelFormat;

    #[test]
    fn test_neutral_chroma_is_gray() {
        // Y = 32 * 16 -> y = 32
        assert_eq!(yuv_to_rgb(512, 0, 0), (160, 160, 160));
        assert_eq!(yuv_to_rgb(0, 0, 0), (128, 128, 128));
    }

    #[test]
    fn test_known_values() {
        // y = 128, u = v = 136: cr = 218, cb = 45, U >> 3 = 272
        assert_eq!(yuv_to_rgb(2048, 2176, 2176), (255, 102, 255));
        // U = 160: u = 10, cb = 3, 蓝色 128 + (160 >> 3) = 148
        assert_eq!(yuv_to_rgb(0, 160, 0), (128, 125, 148));
        // U = -160: cb = -3, 蓝色 128 - 20 = 108
        assert_eq!(yuv_to_rgb(0, -160, 0), (128, 131, 108));
        // v = -80: cr = (-1280 + 8) / 10 = -127 (向零截断)
        assert_eq!(yuv_to_rgb(0, 0, -1280), (1, 191, 128));
    }

    #[test]
    fn test_clipping() {
        assert_eq!(yuv_to_rgb(4096, 0, 0), (255, 255, 255));
        assert_eq!(yuv_to_rgb(-4096, 0, 0), (0, 0, 0));
    }

    #[test]
    fn test_arithmetic_shift_on_negative() {
        // -1 >> 4 = -1, 不是 0
        assert_eq!(yuv_to_rgb(-1, 0, 0), (127, 127, 127));
    }

    #[test]
    fn test_block_to_rgb_position() {
        let mut s = Surface::new(16, 16, PixelFormat::Bgra).unwrap();
        let mut planes = [[0i32; 64]; 3];
        planes[0].fill(512);
        // 块内第 2 行第 3 列提高亮度
        planes[0][2 * 8 + 3] = 1024;
        block_to_rgb(&mut s, 8, 8, &planes);

        assert_eq!(s.rgb(8, 8), (160, 160, 160));
        assert_eq!(s.rgb(15, 15), (160, 160, 160));
        assert_eq!(s.rgb(11, 10), (192, 192, 192));
        assert_eq!(s.rgb(7, 7), (0, 0, 0));
        assert_eq!(s.pixel(7, 7), 0);
    }
}
