//! 临床监护规则引擎
//!
//! 从 JSON Lines 读取监护消息，逐条评估规则、解析事件状态并输出。

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use monitor_shared::config::AppConfig;
use monitor_shared::observability;
use monitor_shared::observability::metrics::record_message;
use rule_engine::{
    Catalog, CatalogCompiler, ConsoleSink, EventResolver, LogSink, Message, MonitorService,
    StatusSink, ventilator_catalog,
};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SERVICE_NAME: &str = "clinical-rule-engine";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    Console,
    Log,
}

impl SinkKind {
    fn from_config(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "log" => Ok(Self::Log),
            other => bail!("Unknown sink '{}', expected 'console' or 'log'", other),
        }
    }
}

/// 命令行参数，优先于配置文件
#[derive(Debug, Parser)]
#[command(name = "rule-engine", version, about = "Resolve clinical monitoring events from message snapshots")]
struct Args {
    /// 目录 JSON 文件（覆盖 engine.catalog_path）
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// 消息输入（JSON Lines），默认读取 stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// 状态输出端
    #[arg(long, value_enum)]
    sink: Option<SinkKind>,

    /// 记录每个周期的评估追踪
    #[arg(long)]
    trace: bool,

    /// 丢弃无效的目录条目而不是启动失败
    #[arg(long)]
    lenient: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig {
            service_name: SERVICE_NAME.to_string(),
            ..AppConfig::default()
        }
    });

    let _guard = observability::init(&config.service_name, &config.observability)?;

    info!("Starting {} ...", config.service_name);

    let catalog = load_catalog(&args, &config)?;
    info!(
        rules = catalog.rules().len(),
        events = catalog.events().len(),
        "Catalog loaded"
    );

    let mut resolver = EventResolver::new(Arc::new(catalog));
    if args.trace || config.engine.trace {
        resolver = resolver.with_trace();
    }

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open input {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let sink_kind = match args.sink {
        Some(kind) => kind,
        None => SinkKind::from_config(&config.engine.sink)?,
    };

    let processed = match sink_kind {
        SinkKind::Console => run(&MonitorService::new(resolver, ConsoleSink::stdout()), reader)?,
        SinkKind::Log => run(&MonitorService::new(resolver, LogSink), reader)?,
    };

    info!(processed, "Input exhausted, shutdown complete");
    Ok(())
}

/// 加载目录：命令行 > 配置文件 > 内置目录
fn load_catalog(args: &Args, config: &AppConfig) -> Result<Catalog> {
    let compiler = CatalogCompiler::new().strict(config.engine.strict_catalog && !args.lenient);

    let path = args
        .catalog
        .clone()
        .or_else(|| config.engine.catalog_path.as_ref().map(PathBuf::from));

    match path {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read catalog {}", path.display()))?;
            compiler
                .compile_from_json(&json)
                .with_context(|| format!("Invalid catalog {}", path.display()))
        }
        None => {
            info!("No catalog configured, using built-in ventilator catalog");
            Ok(compiler.compile(ventilator_catalog())?)
        }
    }
}

/// 逐行处理消息，返回成功处理的数量
fn run<S: StatusSink>(service: &MonitorService<S>, reader: impl BufRead) -> Result<usize> {
    let mut processed = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        match Message::from_json(&line) {
            Ok(message) => {
                let resolution = service.process(&message);
                for entry in &resolution.evaluation_trace {
                    debug!(line = index + 1, "{}", entry);
                }
                record_message("ok");
                processed += 1;
            }
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping malformed message");
                record_message("malformed");
            }
        }
    }

    Ok(processed)
}
