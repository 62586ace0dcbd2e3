use anyhow::{anyhow, Context as _, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::rc::Rc;

use plotctx::context::{Context, FigureOptions};
use plotctx::csv_reader;
use plotctx::parser::parse_script;
use plotctx::script::Executor;
use plotctx::sync::{NullChannel, RecordingChannel, SyncChannel};
use plotctx::PlotConfig;

#[derive(Parser, Debug)]
#[command(name = "plotctx")]
#[command(
    about = "Build plot model graphs from CSV data with a pipeline of pyplot-style calls",
    long_about = None
)]
struct Args {
    #[arg(help = r#"Pipeline script, e.g. 'figure(key: "a") | plot(x: date, y: temp, style: "r-o") | xlabel("Date")'"#)]
    script: String,

    #[arg(long = "key", help = "Select this figure key before the script runs")]
    key: Option<String>,

    #[arg(long = "width", help = "Figure width in pixels")]
    width: Option<u32>,

    #[arg(long = "height", help = "Figure height in pixels")]
    height: Option<u32>,

    #[arg(long = "title-prefix", help = "Prefix of default titles for keyed figures")]
    title_prefix: Option<String>,

    #[arg(long = "no-axes", help = "Do not create axes when drawing marks")]
    no_axes: bool,

    #[arg(long = "trace", help = "Print every sync message instead of the final model graph")]
    trace: bool,

    /// Log verbosity level
    #[arg(long = "log-level", default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.to_level_filter())
        .format_module_path(false)
        .init();

    let (_, script) = parse_script(&args.script).map_err(|e| anyhow!("Parse error: {}", e))?;

    let csv_data = csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?;

    let mut config = PlotConfig::from_env().draw_axes(!args.no_axes);
    if let Some(prefix) = args.title_prefix {
        config = config.title_prefix(prefix);
    }
    let width = args.width.unwrap_or(config.width);
    let height = args.height.unwrap_or(config.height);
    config = config.size(width, height);

    let recorder = Rc::new(RecordingChannel::new());
    let channel: Rc<dyn SyncChannel> = if args.trace {
        recorder.clone()
    } else {
        Rc::new(NullChannel)
    };
    let mut ctx = Context::new(config, channel);

    if let Some(key) = args.key {
        ctx.figure(FigureOptions::new().key(key))
            .context("Failed to select figure")?;
    }

    Executor::new(&mut ctx, &csv_data)
        .run(&script)
        .context("Failed to run script")?;

    let output = if args.trace {
        recorder.to_json()
    } else {
        ctx.current_figure().graph()
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &output).context("Failed to write JSON to stdout")?;
    writeln!(handle).context("Failed to write JSON to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
