//! 像素覆盖统计
//!
//! 四叉树的每个叶子动作 (关键块, 运动, 跳过) 都恰好写入一次其目标区域.
//! [`CoverageMap`] 记录每个像素在一帧内被写入的次数, 用于检查这一性质.

/// 每像素写入计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMap {
    width: usize,
    height: usize,
    counts: Vec<u8>,
}

impl CoverageMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            counts: vec![0; width * height],
        }
    }

    /// 清零, 开始新的一帧
    pub fn reset(&mut self) {
        self.counts.fill(0);
    }

    /// 记录一次对矩形区域的写入
    pub fn mark(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for row in y..y + h {
            let start = row * self.width + x;
            for c in &mut self.counts[start..start + w] {
                *c = c.saturating_add(1);
            }
        }
    }

    /// (x, y) 处的写入次数
    pub fn count(&self, x: usize, y: usize) -> u8 {
        self.counts[y * self.width + x]
    }

    /// 未被写入的像素个数
    pub fn uncovered(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 0).count()
    }

    /// 被写入多于一次的像素个数
    pub fn overdrawn(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 1).count()
    }

    /// 每个像素是否恰好被写入一次
    pub fn is_exact(&self) -> bool {
        self.counts.iter().all(|&c| c == 1)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tiling() {
        let mut map = CoverageMap::new(8, 8);
        map.mark(0, 0, 4, 8);
        map.mark(4, 0, 4, 4);
        map.mark(4, 4, 2, 4);
        map.mark(6, 4, 2, 4);
        assert!(map.is_exact());
    }

    #[test]
    fn test_gap_and_overlap() {
        let mut map = CoverageMap::new(8, 8);
        map.mark(0, 0, 8, 4);
        map.mark(0, 2, 2, 2);
        assert!(!map.is_exact());
        assert_eq!(map.uncovered(), 32);
        assert_eq!(map.overdrawn(), 4);
        assert_eq!(map.count(1, 3), 2);

        map.reset();
        assert_eq!(map.uncovered(), 64);
    }
}
