//! 日志维护任务: 按日翻滚, 过期删除, 往日压缩.

use super::{LoggingConfig, dated_log_path};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, TimeZone, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};
use tracing::{error, warn};

/// 启动维护任务
///
/// 不在 tokio 运行时内时只做一次启动清理.
pub(super) fn spawn_maintenance(config: LoggingConfig, rotate_requested: Arc<AtomicBool>) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        warn!("未检测到 tokio 运行时, 日志翻滚与定期清理未启动");
        if let Err(err) = cleanup_logs(&config) {
            error!("启动时清理日志失败: {err:#}");
        }
        return;
    };

    handle.spawn(async move {
        let mut cleanup_interval =
            tokio::time::interval(Duration::from_secs(config.cleanup_interval_seconds.max(1)));
        let mut next_rollover = next_midnight(Local::now());

        loop {
            tokio::select! {
                _ = cleanup_interval.tick() => {
                    if let Err(err) = cleanup_logs(&config) {
                        error!("清理日志失败: {err:#}");
                    }
                }
                _ = tokio::time::sleep_until(next_rollover) => {
                    match touch_today_log(&config) {
                        Ok(()) => rotate_requested.store(true, Ordering::Release),
                        Err(err) => error!("日志翻滚失败: {err:#}"),
                    }
                    if let Err(err) = cleanup_logs(&config) {
                        error!("翻滚后清理日志失败: {err:#}");
                    }
                    next_rollover = next_midnight(Local::now());
                }
            }
        }
    });
}

/// 创建当天日志文件 (已存在则不变)
fn touch_today_log(config: &LoggingConfig) -> Result<()> {
    let directory = Path::new(&config.directory);
    fs::create_dir_all(directory)?;
    let path = dated_log_path(directory, &config.file_prefix, Local::now().date_naive());
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("创建当天日志文件失败, path={}", path.display()))?;
    Ok(())
}

/// 目录中的一个历史日志文件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DatedLog {
    date: NaiveDate,
    compressed: bool,
}

impl DatedLog {
    /// 解析 `{prefix}.{YYYY-MM-DD}.log` 或 `{prefix}.{YYYY-MM-DD}.log.gz`
    fn parse(file_name: &str, prefix: &str) -> Option<Self> {
        let rest = file_name.strip_prefix(prefix)?.strip_prefix('.')?;
        let (date_part, compressed) = match rest.strip_suffix(".log.gz") {
            Some(date_part) => (date_part, true),
            None => (rest.strip_suffix(".log")?, false),
        };
        if date_part.len() != 10 {
            return None;
        }
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
        Some(Self { date, compressed })
    }
}

fn cleanup_logs(config: &LoggingConfig) -> Result<()> {
    cleanup_logs_at(config, Local::now().date_naive())
}

/// 以 `today` 为基准: 早于保留期的删除, 其余往日未压缩文件压缩
fn cleanup_logs_at(config: &LoggingConfig, today: NaiveDate) -> Result<()> {
    let directory = Path::new(&config.directory);
    if !directory.exists() {
        return Ok(());
    }
    let cutoff = today - ChronoDuration::days(config.retention_days);

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let Some(log) = DatedLog::parse(&file_name, &config.file_prefix) else {
            continue;
        };
        let path = entry.path();

        if log.date < cutoff {
            if let Err(err) = fs::remove_file(&path) {
                warn!("删除过期日志失败, path={}: {err}", path.display());
            }
        } else if config.compress_history && !log.compressed && log.date < today {
            if let Err(err) = gzip_file(&path) {
                warn!("压缩日志失败, path={}: {err:#}", path.display());
            }
        }
    }
    Ok(())
}

/// 压缩为 `{path}.gz` 并删除原文件
fn gzip_file(path: &Path) -> Result<()> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    if gz_path.exists() {
        return Ok(());
    }

    let mut input =
        File::open(path).with_context(|| format!("打开待压缩日志失败, path={}", path.display()))?;
    let output = File::create(&gz_path)
        .with_context(|| format!("创建压缩日志失败, path={}", gz_path.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path).with_context(|| format!("删除已压缩日志失败, path={}", path.display()))
}

/// 下一个本地午夜对应的 tokio 时刻
fn next_midnight(now: DateTime<Local>) -> tokio::time::Instant {
    let fallback = tokio::time::Instant::now() + Duration::from_secs(60);
    let next_date = now.date_naive() + ChronoDuration::days(1);
    let Some(midnight) = next_date.and_hms_opt(0, 0, 0) else {
        return fallback;
    };
    let Some(local) = Local.from_local_datetime(&midnight).earliest() else {
        return fallback;
    };
    let wait = SystemTime::from(local.with_timezone(&Utc))
        .duration_since(SystemTime::now())
        .unwrap_or(Duration::ZERO);
    tokio::time::Instant::now() + wait
}
