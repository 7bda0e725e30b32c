use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};

use mdwalk::core::config::{self, CliOverrides, MdwalkConfig};
use mdwalk::tui;

#[derive(Parser)]
#[command(name = "mdwalk", about = "Terminal markdown pager that follows local links")]
struct Args {
    /// Markdown file to open
    file: PathBuf,

    /// Directory links may not leave (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Show a line-number gutter
    #[arg(long)]
    line_numbers: bool,

    /// Don't reload when the file changes on disk
    #[arg(long)]
    no_watch: bool,

    /// Word-wrap width cap (0 = terminal width)
    #[arg(long)]
    width: Option<u16>,

    /// Where to write the log
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // The logger needs the resolved config, so loading is reported after init.
    let (file_config, loaded) = match config::load_config() {
        Ok((config, origin)) => (config, Ok(origin)),
        Err(e) => {
            eprintln!("mdwalk: {e}, using defaults");
            (MdwalkConfig::default(), Err(e))
        }
    };
    let cli = CliOverrides {
        root_dir: args.root,
        line_numbers: args.line_numbers,
        no_watch: args.no_watch,
        width: args.width,
        log_file: args.log_file,
    };
    let mut resolved = config::resolve(&file_config, &cli);

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }
    match &loaded {
        Ok(origin) => log::info!("{origin}"),
        Err(e) => log::warn!("{e}, using defaults"),
    }
    for warning in &resolved.warnings {
        log::warn!("{warning}");
    }

    let file = std::fs::canonicalize(&args.file).map_err(|e| {
        std::io::Error::new(e.kind(), format!("{}: {e}", args.file.display()))
    })?;
    let root = std::path::absolute(&resolved.root_dir)?;
    resolved.root_dir = std::fs::canonicalize(&root).unwrap_or(root);

    log::info!(
        "mdwalk starting: file={} root={}",
        file.display(),
        resolved.root_dir.display()
    );

    tui::run(resolved, file)
}
