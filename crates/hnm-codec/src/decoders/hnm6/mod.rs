//! HNM6 视频解码器.
//!
//! HNM6 是 Cryo 引擎 FMV 使用的四叉树运动补偿视频格式:
//! - 每帧由 24 字节帧头与四个数据区组成 (决策位, 运动字, 短运动, 残差)
//! - 8x8 根块按前缀码递归切分, 叶子为关键块 (DCT 残差), 运动补偿或跳过
//! - 关键块为 YUV 4:4:4 三个 8x8 平面, 经带掩码的 AAN IDCT 后转换为 RGB
//! - 运动补偿支持 8 种几何变换, 可引用当前帧已解码部分或前一帧
//!
//! 解码器持有当前帧与参考帧两个缓冲区, 每帧成功后互换; 解码失败时撤销互换,
//! 上一次成功解码的帧仍作为参考帧.

mod bitreader;
mod block;
pub mod coverage;
pub mod header;
mod idct;
pub mod motion;
pub mod quadtree;
mod quant;
pub mod surface;
mod tables;
mod yuv;


use log::{debug, trace, warn};

use hnm_core::{HnmError, HnmResult};

use crate::codec_id::CodecId;
use crate::codec_parameters::{CodecParameters, Hnm6Options};
use crate::decoder::Decoder;
use crate::frame::{PictureType, VideoFrame};
use crate::packet::Packet;

use bitreader::{BitReader, MotionWordReader, NibbleReader, ShortMotionReader};
use coverage::CoverageMap;
use header::FrameHeader;
use quadtree::{BlockDecoder, BlockStats, DecodeMode};
use quant::QuantTables;
use surface::Surface;

/// 待取出的解码结果
struct PendingFrame {
    is_keyframe: bool,
    pts: i64,
    duration: i64,
}

/// HNM6 解码器
pub struct Hnm6Decoder {
    /// 当前帧 (最近一次成功解码的结果)
    current: Surface,
    /// 参考帧缓冲 (仅视频模式分配)
    previous: Option<Surface>,
    /// 解码选项
    options: Hnm6Options,
    /// 参考帧是否有效 (成功解码过至少一帧且未 flush)
    has_reference: bool,
    /// 最近一次成功解码的帧是否为关键帧
    last_keyframe: bool,
    /// 上一帧块统计
    stats: BlockStats,
    /// 像素覆盖统计 (可选)
    coverage: Option<CoverageMap>,
    /// Decoder trait: 是否已打开
    opened: bool,
    /// Decoder trait: 已解码待取出的帧
    pending: Option<PendingFrame>,
    /// Decoder trait: 是否已收到刷新信号 (空包)
    flushing: bool,
}

impl Hnm6Decoder {
    /// 创建未打开的解码器 (经 `Decoder::open` 配置)
    pub fn create() -> HnmResult<Box<dyn Decoder>> {
        Ok(Box::new(Self::unopened()))
    }

    /// 按参数直接创建解码器
    pub fn new(params: &CodecParameters) -> HnmResult<Self> {
        let mut decoder = Self::unopened();
        decoder.configure(params)?;
        Ok(decoder)
    }

    fn unopened() -> Self {
        Self {
            current: Surface::empty(),
            previous: None,
            options: Hnm6Options::default(),
            has_reference: false,
            last_keyframe: false,
            stats: BlockStats::default(),
            coverage: None,
            opened: false,
            pending: None,
            flushing: false,
        }
    }

    fn configure(&mut self, params: &CodecParameters) -> HnmResult<()> {
        if params.codec_id != CodecId::Hnm6 {
            return Err(HnmError::InvalidArgument(format!(
                "hnm6 解码器不支持编解码器 {}",
                params.codec_id
            )));
        }
        let current = Surface::new(params.width, params.height, params.pixel_format)?;
        let previous = if params.options.video_mode {
            Some(current.clone())
        } else {
            None
        };

        self.coverage = self
            .coverage
            .as_ref()
            .map(|_| CoverageMap::new(params.width as usize, params.height as usize));
        self.current = current;
        self.previous = previous;
        self.options = params.options;
        self.has_reference = false;
        self.last_keyframe = false;
        self.stats = BlockStats::default();
        self.opened = true;
        self.pending = None;
        self.flushing = false;

        debug!(
            "打开 hnm6 解码器: {}x{}, 格式={}, 视频模式={}, warp={}",
            params.width,
            params.height,
            params.pixel_format,
            params.options.video_mode,
            params.options.warp_mode,
        );
        Ok(())
    }

    /// 设置关键帧是否使用 warp (IW) 遍历, 可在帧之间切换
    pub fn set_warp_mode(&mut self, warp: bool) {
        self.options.warp_mode = warp;
    }

    /// 开启或关闭像素覆盖统计
    pub fn set_coverage_tracking(&mut self, enabled: bool) {
        self.coverage = enabled.then(|| {
            CoverageMap::new(self.current.width() as usize, self.current.height() as usize)
        });
    }

    /// 最近一帧的像素覆盖统计 (未开启时为 None)
    pub fn coverage(&self) -> Option<&CoverageMap> {
        self.coverage.as_ref()
    }

    /// 最近一次成功解码的块统计
    pub fn last_stats(&self) -> BlockStats {
        self.stats
    }

    /// 当前帧
    pub fn surface(&self) -> &Surface {
        &self.current
    }

    /// 解码一帧, 返回解码器持有的当前帧
    ///
    /// 失败时不修改参考帧, [`surface`](Self::surface) 仍为上一次成功解码的结果
    /// (非视频模式下只有一个缓冲区, 失败的帧可能已部分写入).
    pub fn decode_frame(&mut self, data: &[u8]) -> HnmResult<&Surface> {
        if !self.opened {
            return Err(HnmError::Codec("解码器未打开, 请先调用 open()".into()));
        }
        match self.decode_checked(data) {
            Ok(()) => Ok(&self.current),
            Err(err) => {
                warn!("hnm6 帧解码失败 ({} 字节): {err}", data.len());
                Err(err)
            }
        }
    }

    /// 最近一次成功解码的帧是否为关键帧
    pub fn last_was_keyframe(&self) -> bool {
        self.last_keyframe
    }

    fn decode_checked(&mut self, data: &[u8]) -> HnmResult<()> {
        let max = self.options.max_frame_size;
        if max != 0 && data.len() > max {
            return Err(HnmError::InvalidData(format!(
                "帧数据 {} 字节超过上限 {} 字节",
                data.len(),
                max
            )));
        }

        let header = FrameHeader::parse(data)?;
        trace!(
            "hnm6 帧头: quality={}, offsets={:?}, 数据长度={}",
            header.quality,
            header.offsets,
            data.len()
        );

        let mode = if !header.is_keyframe() {
            if self.previous.is_none() {
                return Err(HnmError::Unsupported("非视频模式不支持帧间帧".into()));
            }
            if !self.has_reference {
                return Err(HnmError::InvalidData(
                    "没有参考帧, 第一帧必须是关键帧".into(),
                ));
            }
            DecodeMode::Inter
        } else if self.options.warp_mode {
            DecodeMode::Warp
        } else {
            DecodeMode::Keyframe
        };

        self.swap_buffers();
        let stats = match self.run_traversal(&header, data, mode) {
            Ok(stats) => stats,
            Err(err) => {
                self.swap_buffers();
                return Err(err);
            }
        };

        self.stats = stats;
        self.has_reference = true;
        self.last_keyframe = header.is_keyframe();
        debug!(
            "hnm6 帧解码完成: 模式={:?}, 质量={}, 关键块={}, 长运动={}, 短运动={}, 跳过={}, 切分={}",
            mode,
            header.quality_level(),
            stats.keyblocks,
            stats.long_motions,
            stats.short_motions,
            stats.skips,
            stats.cuts,
        );
        Ok(())
    }

    fn swap_buffers(&mut self) {
        if let Some(previous) = self.previous.as_mut() {
            std::mem::swap(&mut self.current, previous);
        }
    }

    fn run_traversal(
        &mut self,
        header: &FrameHeader,
        data: &[u8],
        mode: DecodeMode,
    ) -> HnmResult<BlockStats> {
        let [bits, motion, short, residual] = header.regions(data);
        let quant = QuantTables::build(header.quality_level());

        let coverage = self.coverage.as_mut().map(|c| {
            c.reset();
            c
        });
        let previous = match mode {
            DecodeMode::Inter => self.previous.as_ref(),
            _ => None,
        };

        let mut decoder = BlockDecoder {
            mode,
            bits: BitReader::new(bits),
            motion: MotionWordReader::new(motion),
            short: ShortMotionReader::new(short),
            residual: NibbleReader::new(residual),
            quant: &quant,
            current: &mut self.current,
            previous,
            coverage,
            stats: BlockStats::default(),
        };
        decoder.decode_frame()?;
        Ok(decoder.stats)
    }

    fn output_frame(&self, pending: &PendingFrame) -> VideoFrame {
        let mut frame = VideoFrame::new(
            self.current.width(),
            self.current.height(),
            self.current.format(),
        );
        frame.data = self.current.data().to_vec();
        frame.pts = pending.pts;
        frame.duration = pending.duration;
        frame.is_keyframe = pending.is_keyframe;
        frame.picture_type = if pending.is_keyframe {
            PictureType::I
        } else {
            PictureType::P
        };
        frame
    }
}

impl Decoder for Hnm6Decoder {
    fn codec_id(&self) -> CodecId {
        CodecId::Hnm6
    }

    fn name(&self) -> &str {
        "hnm6"
    }

    fn open(&mut self, params: &CodecParameters) -> HnmResult<()> {
        self.configure(params)
    }

    fn send_packet(&mut self, packet: &Packet) -> HnmResult<()> {
        if !self.opened {
            return Err(HnmError::Codec("解码器未打开, 请先调用 open()".into()));
        }
        if self.pending.is_some() {
            return Err(HnmError::NeedMoreData);
        }

        // 空包 = flush
        if packet.is_empty() {
            self.flushing = true;
            return Ok(());
        }

        self.decode_frame(&packet.data)?;
        self.pending = Some(PendingFrame {
            is_keyframe: self.last_keyframe,
            pts: packet.pts,
            duration: packet.duration,
        });
        Ok(())
    }

    fn receive_frame(&mut self) -> HnmResult<VideoFrame> {
        if let Some(pending) = self.pending.take() {
            return Ok(self.output_frame(&pending));
        }
        if self.flushing {
            return Err(HnmError::Eof);
        }
        Err(HnmError::NeedMoreData)
    }

    fn flush(&mut self) {
        self.pending = None;
        self.flushing = false;
        self.has_reference = false;
    }
}
