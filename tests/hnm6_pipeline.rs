//! 端到端集成测试: HNM6 合成流的完整解码管线.
//!
//! 测试流程: 按前缀码表随机生成四叉树 → 打包四个数据区 → 拼装帧 →
//! Packet → 解码器 → 验证像素、覆盖与块统计

use bytes::Bytes;
use hnm::codec::decoders::hnm6::header::{FrameHeader, HEADER_SIZE, assemble_frame};
use hnm::codec::decoders::hnm6::quadtree::{
    BlockAction, BlockSize, BlockStats, DecodeMode, prefix_codes,
};
use hnm::codec::{CodecId, CodecParameters, Decoder, Hnm6Decoder, Hnm6Options, Packet, PictureType};
use hnm::core::bitwriter::{BitWriter, NibbleWriter, ShortWordWriter, WordWriter};
use hnm::core::{HnmError, PixelFormat};

/// 零位移的短运动值 (远窗口 index 304, 恒等变换)
const SHORT_ZERO: u16 = 304 << 3;

/// 确定性伪随机数 (LCG)
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

/// 合成帧构造器, 四个打包器对应四个数据区
struct FrameBuilder {
    mode: DecodeMode,
    bits: BitWriter,
    words: WordWriter,
    shorts: ShortWordWriter,
    nibbles: NibbleWriter,
    stats: BlockStats,
    /// 关键块 DC 值 (Y, U, V)
    dc: [u8; 3],
}

impl FrameBuilder {
    fn new(mode: DecodeMode, dc: [u8; 3]) -> Self {
        Self {
            mode,
            bits: BitWriter::new(),
            words: WordWriter::new(),
            shorts: ShortWordWriter::new(),
            nibbles: NibbleWriter::new(),
            stats: BlockStats::default(),
            dc,
        }
    }

    /// 写入一个节点: 前缀码 + 动作负载, 切分时递归写入子节点
    fn node(&mut self, size: BlockSize, choose: &mut impl FnMut(usize) -> usize) {
        let codes = prefix_codes(self.mode, size);
        let entry = codes[choose(codes.len())];
        self.bits.write_bits(u32::from(entry.code), u32::from(entry.len));
        match entry.action {
            BlockAction::KeyBlock => {
                for value in self.dc {
                    self.nibbles.push_byte(value);
                    self.nibbles.push(0);
                }
                self.stats.keyblocks += 1;
            }
            BlockAction::LongMotion => {
                self.bits.write_bits(0, 3);
                // 均为原位复制. 帧间: f = 64; warp: f = 块高; 关键帧: f = 0
                let word = match self.mode {
                    DecodeMode::Inter => 0x4000,
                    DecodeMode::Warp => (size.dims().1 as u16) << 8,
                    DecodeMode::Keyframe => 0x0000,
                };
                self.words.push(word);
                self.stats.long_motions += 1;
            }
            BlockAction::ShortMotion => {
                self.shorts.push(SHORT_ZERO);
                self.stats.short_motions += 1;
            }
            BlockAction::SmallMotion => {
                self.words.push(SHORT_ZERO);
                self.stats.short_motions += 1;
            }
            BlockAction::Skip => self.stats.skips += 1,
            cut => {
                self.stats.cuts += 1;
                let child = size.split(cut).unwrap_or_else(|| panic!("{size:?} 不能 {cut:?}"));
                let count = if cut == BlockAction::CrossCut { 4 } else { 2 };
                for _ in 0..count {
                    self.node(child, choose);
                }
            }
        }
    }

    fn finish(self, quality: i32) -> (Vec<u8>, BlockStats) {
        let frame = assemble_frame(
            quality,
            [
                &self.bits.finish(),
                &self.words.finish(),
                &self.shorts.finish(),
                &self.nibbles.finish(),
            ],
        );
        (frame, self.stats)
    }
}

/// 随机四叉树帧
fn random_frame(
    mode: DecodeMode,
    width: u32,
    height: u32,
    seed: u64,
    dc: [u8; 3],
) -> (Vec<u8>, BlockStats) {
    let mut rng = Lcg(seed);
    let mut choose = |n: usize| rng.next(n);
    let mut builder = FrameBuilder::new(mode, dc);
    for _ in 0..(width / 8) * (height / 8) {
        builder.node(BlockSize::S8x8, &mut choose);
    }
    let quality = if mode == DecodeMode::Inter { 50 } else { -50 };
    builder.finish(quality)
}

/// 每个根块都选第一个码表项
fn uniform_frame(mode: DecodeMode, width: u32, height: u32, index: usize, dc: [u8; 3]) -> Vec<u8> {
    let mut builder = FrameBuilder::new(mode, dc);
    let mut choose = |_: usize| index;
    for _ in 0..(width / 8) * (height / 8) {
        builder.node(BlockSize::S8x8, &mut choose);
    }
    let quality = if mode == DecodeMode::Inter { 50 } else { -50 };
    builder.finish(quality).0
}

fn open_decoder(width: u32, height: u32, format: PixelFormat) -> Hnm6Decoder {
    let params = CodecParameters::hnm6(width, height, format);
    match Hnm6Decoder::new(&params) {
        Ok(decoder) => decoder,
        Err(err) => panic!("打开解码器失败: {err}"),
    }
}

#[test]
fn test_minimal_keyframe_end_to_end() {
    // 8x8 帧, 单个 "11" 关键块, Y = 64 U = V = 0
    let mut bits = BitWriter::new();
    bits.write_bits(0b11, 2);
    let mut nibbles = NibbleWriter::new();
    for value in [64u8, 0, 0] {
        nibbles.push_byte(value);
        nibbles.push(0);
    }
    let frame = assemble_frame(-50, [&bits.finish(), &[], &[], &nibbles.finish()]);

    let header = FrameHeader::parse(&frame).unwrap();
    assert!(header.is_keyframe());
    assert_eq!(header.quality_level(), 50);
    assert_eq!(header.offsets[0], HEADER_SIZE);
    assert_eq!(header.offsets[4], frame.len());

    let mut decoder = Hnm6Decoder::create().unwrap();
    decoder
        .open(&CodecParameters::hnm6(8, 8, PixelFormat::Bgra))
        .unwrap();
    let mut packet = Packet::from_data(Bytes::from(frame));
    packet.pts = 0;
    decoder.send_packet(&packet).unwrap();
    let output = decoder.receive_frame().unwrap();

    assert_eq!(output.picture_type, PictureType::I);
    assert_eq!(output.pixel_format, PixelFormat::Bgra);
    for pixel in output.data.chunks_exact(4) {
        assert_eq!(pixel, &[255, 255, 255, 0xFF]);
    }
}

#[test]
fn test_random_keyframe_trees_cover_every_pixel() {
    let (width, height) = (64, 48);
    for seed in 1..=20u64 {
        let mut decoder = open_decoder(width, height, PixelFormat::Rgb565le);
        decoder.set_coverage_tracking(true);
        let (frame, expected) = random_frame(DecodeMode::Keyframe, width, height, seed, [16, 0, 0]);
        decoder
            .decode_frame(&frame)
            .unwrap_or_else(|err| panic!("seed {seed}: {err}"));

        let coverage = decoder.coverage().unwrap();
        assert!(
            coverage.is_exact(),
            "seed {seed}: 未覆盖 {} 重复 {}",
            coverage.uncovered(),
            coverage.overdrawn()
        );
        assert_eq!(decoder.last_stats(), expected, "seed {seed}");
    }
}

#[test]
fn test_random_interframe_trees_cover_every_pixel() {
    let (width, height) = (48, 32);
    let mut decoder = open_decoder(width, height, PixelFormat::Bgra);
    decoder.set_coverage_tracking(true);
    decoder
        .decode_frame(&uniform_frame(DecodeMode::Keyframe, width, height, 0, [16, 0, 0]))
        .unwrap();

    for seed in 100..120u64 {
        let (frame, expected) = random_frame(DecodeMode::Inter, width, height, seed, [16, 0, 0]);
        let surface = decoder
            .decode_frame(&frame)
            .unwrap_or_else(|err| panic!("seed {seed}: {err}"));

        // 所有运动都是零位移, 关键块同色, 画面保持不变
        for y in 0..height {
            for x in 0..width {
                assert_eq!(surface.rgb(x, y), (160, 160, 160), "seed {seed} ({x}, {y})");
            }
        }
        let coverage = decoder.coverage().unwrap();
        assert!(coverage.is_exact(), "seed {seed}");
        assert_eq!(decoder.last_stats(), expected, "seed {seed}");
        assert!(!decoder.last_was_keyframe());
    }
}

#[test]
fn test_random_warp_trees_cover_every_pixel() {
    let (width, height) = (32, 32);
    for seed in 7..15u64 {
        let mut decoder = open_decoder(width, height, PixelFormat::Rgba);
        decoder.set_warp_mode(true);
        decoder.set_coverage_tracking(true);
        let (frame, expected) = random_frame(DecodeMode::Warp, width, height, seed, [16, 0, 0]);
        decoder
            .decode_frame(&frame)
            .unwrap_or_else(|err| panic!("seed {seed}: {err}"));
        assert!(decoder.coverage().unwrap().is_exact(), "seed {seed}");
        assert_eq!(decoder.last_stats(), expected, "seed {seed}");
    }
}

#[test]
fn test_skip_frames_preserve_picture() {
    let (width, height) = (32, 16);
    let mut decoder = open_decoder(width, height, PixelFormat::Rgb555le);
    let key = uniform_frame(DecodeMode::Keyframe, width, height, 0, [64, 0, 0]);
    let reference = decoder.decode_frame(&key).unwrap().clone();

    // 帧间 8x8 码表第一项为跳过
    let skip = uniform_frame(DecodeMode::Inter, width, height, 0, [0, 0, 0]);
    for _ in 0..3 {
        let surface = decoder.decode_frame(&skip).unwrap();
        assert_eq!(surface, &reference);
    }
    assert_eq!(decoder.last_stats().skips, 8);
}

#[test]
fn test_packet_flow_with_timestamps() {
    let (width, height) = (16, 16);
    let mut decoder = Hnm6Decoder::create().unwrap();
    decoder
        .open(&CodecParameters::hnm6(width, height, PixelFormat::Rgba))
        .unwrap();
    assert_eq!(decoder.codec_id(), CodecId::Hnm6);

    let frames = [
        uniform_frame(DecodeMode::Keyframe, width, height, 0, [16, 0, 0]),
        uniform_frame(DecodeMode::Inter, width, height, 0, [0, 0, 0]),
        random_frame(DecodeMode::Inter, width, height, 42, [16, 0, 0]).0,
    ];
    for (index, data) in frames.into_iter().enumerate() {
        let mut packet = Packet::from_data(data);
        packet.pts = index as i64 * 2;
        packet.duration = 2;
        decoder.send_packet(&packet).unwrap();
        let frame = decoder.receive_frame().unwrap();
        assert_eq!(frame.pts, index as i64 * 2);
        assert_eq!(frame.is_keyframe, index == 0);
        assert_eq!(frame.linesize, 64);
        assert_eq!(&frame.data[..4], &[160, 160, 160, 0xFF]);
    }

    decoder.send_packet(&Packet::empty()).unwrap();
    assert!(matches!(decoder.receive_frame(), Err(HnmError::Eof)));
}

#[test]
fn test_malformed_headers_rejected() {
    let mut decoder = open_decoder(8, 8, PixelFormat::Bgra);
    let good = uniform_frame(DecodeMode::Keyframe, 8, 8, 0, [16, 0, 0]);

    assert!(matches!(
        decoder.decode_frame(&good[..HEADER_SIZE - 1]),
        Err(HnmError::MalformedHeader(_))
    ));

    // 结束偏移超出缓冲区
    assert!(matches!(
        decoder.decode_frame(&good[..good.len() - 1]),
        Err(HnmError::MalformedHeader(_))
    ));

    // 偏移逆序
    let mut reversed = good.clone();
    reversed[8..12].copy_from_slice(&2u32.to_le_bytes());
    assert!(matches!(
        decoder.decode_frame(&reversed),
        Err(HnmError::MalformedHeader(_))
    ));

    decoder.decode_frame(&good).unwrap();
}

#[test]
fn test_truncated_regions_underrun() {
    let mut decoder = open_decoder(16, 8, PixelFormat::Bgra);
    // 两个关键块的决策位, 但残差只够一个块
    let mut bits = BitWriter::new();
    bits.write_bits(0b1111, 4);
    let mut nibbles = NibbleWriter::new();
    for value in [16u8, 0, 0] {
        nibbles.push_byte(value);
        nibbles.push(0);
    }
    let frame = assemble_frame(-50, [&bits.finish(), &[], &[], &nibbles.finish()]);
    assert!(matches!(
        decoder.decode_frame(&frame),
        Err(HnmError::Underrun(_))
    ));
}

#[test]
fn test_motion_outside_frame_rejected() {
    let mut decoder = open_decoder(8, 8, PixelFormat::Bgra);
    decoder
        .decode_frame(&uniform_frame(DecodeMode::Keyframe, 8, 8, 0, [16, 0, 0]))
        .unwrap();

    // 帧间长运动 f = 127: 源在帧下方 63 行
    let mut bits = BitWriter::new();
    bits.write_bits(0b01, 2);
    bits.write_bits(0, 3);
    let mut words = WordWriter::new();
    words.push(0x7F00);
    let frame = assemble_frame(50, [&bits.finish(), &words.finish(), &[], &[]]);
    assert!(matches!(
        decoder.decode_frame(&frame),
        Err(HnmError::InvalidData(_))
    ));

    // 参考帧未受影响
    let skip = uniform_frame(DecodeMode::Inter, 8, 8, 0, [0, 0, 0]);
    let surface = decoder.decode_frame(&skip).unwrap();
    assert_eq!(surface.rgb(0, 0), (160, 160, 160));
}

#[test]
fn test_still_image_mode() {
    let options = Hnm6Options {
        video_mode: false,
        ..Hnm6Options::default()
    };
    let params = CodecParameters::hnm6(16, 16, PixelFormat::Bgra).with_options(options);
    let mut decoder = Hnm6Decoder::new(&params).unwrap();

    let (frame, _) = random_frame(DecodeMode::Keyframe, 16, 16, 3, [16, 0, 0]);
    decoder.decode_frame(&frame).unwrap();
    let inter = uniform_frame(DecodeMode::Inter, 16, 16, 0, [0, 0, 0]);
    assert!(matches!(
        decoder.decode_frame(&inter),
        Err(HnmError::Unsupported(_))
    ));
}
