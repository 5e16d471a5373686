//! 编解码器标识符.

use std::fmt;

/// 编解码器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// 未知编解码器
    None,
    /// HNM6 (四叉树运动补偿 + DCT 残差, Cryo 引擎 FMV)
    Hnm6,
}

impl CodecId {
    /// 编解码器短名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hnm6 => "hnm6",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
