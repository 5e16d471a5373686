//! 统一错误类型定义.
//!
//! 所有 HNM crate 共用的错误类型, 支持跨模块传播.
//! 解码过程中的任何错误都会使当前帧整体失败, 不做部分恢复.

use thiserror::Error;

/// HNM 解码库统一错误类型
#[derive(Debug, Error)]
pub enum HnmError {
    /// 无效参数 (尺寸非 8 的倍数、像素格式不支持等)
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 当前模式不支持的操作
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 编解码器状态错误
    #[error("编解码器错误: {0}")]
    Codec(String),

    /// 帧头损坏 (偏移量乱序或越界)
    #[error("帧头损坏: {0}")]
    MalformedHeader(String),

    /// 数据区读取越界
    #[error("数据区读取越界: {0}")]
    Underrun(String),

    /// 数据不足, 需要更多输入
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

/// HNM 解码库统一 Result 类型
pub type HnmResult<T> = Result<T, HnmError>;
