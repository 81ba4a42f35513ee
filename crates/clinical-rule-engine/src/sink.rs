//! 状态输出
//!
//! `StatusSink` 是评估结果的外部去向（控制台、日志、消息总线等），
//! 与解析流程本身解耦。

use crate::executor::EventResolver;
use crate::models::{Message, Resolution};
use anyhow::Result;
use parking_lot::Mutex;
use std::io::Write;
use tracing::{error, info};

/// 状态输出接口
#[cfg_attr(test, mockall::automock)]
pub trait StatusSink: Send + Sync {
    /// 报告一个周期的状态列表（按事件目录顺序）
    fn report(&self, statuses: &[String]) -> Result<()>;
}

/// 通过 tracing 输出
#[derive(Debug, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn report(&self, statuses: &[String]) -> Result<()> {
        for status in statuses {
            info!(status = %status, "Patient has status {}", status);
        }
        Ok(())
    }
}

/// 逐行写入任意输出流，默认为标准输出
pub struct ConsoleSink<W: Write + Send = std::io::Stdout> {
    writer: Mutex<W>,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> StatusSink for ConsoleSink<W> {
    fn report(&self, statuses: &[String]) -> Result<()> {
        let mut writer = self.writer.lock();
        for status in statuses {
            writeln!(writer, "Patient has status {}", status)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// 监护服务：解析一个消息并把状态交给输出端
pub struct MonitorService<S: StatusSink> {
    resolver: EventResolver,
    sink: S,
}

impl<S: StatusSink> MonitorService<S> {
    pub fn new(resolver: EventResolver, sink: S) -> Self {
        Self { resolver, sink }
    }

    pub fn resolver(&self) -> &EventResolver {
        &self.resolver
    }

    /// 处理一个消息；输出失败只记录日志，不影响解析结果
    pub fn process(&self, message: &Message) -> Resolution {
        let resolution = self.resolver.resolve(message);

        if let Err(e) = self.sink.report(&resolution.statuses) {
            error!(error = %e, statuses = ?resolution.statuses, "Failed to report statuses");
        }

        resolution
    }
}
