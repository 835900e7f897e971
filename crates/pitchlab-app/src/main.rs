// Pitchlab entry point.
//
// Startup sequence:
// 1. Parse CLI arguments
// 2. Initialize tracing (stderr)
// 3. Load config (copying defaults on first run), apply CLI overrides
// 4. Read pitching and hitting sheets
// 5. Build leaderboards
// 6. Write output files

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use pitchlab_app::config::{self, Overrides};
use pitchlab_app::{ingest, output};
use pitchlab_engine::leaderboard;
use pitchlab_engine::record::Role;

#[derive(Parser, Debug)]
#[command(name = "pitchlab")]
#[command(about = "Build pitch, pitcher and hitter leaderboards from tracked pitch exports", long_about = None)]
struct Args {
    /// Directory holding config/ and defaults/; relative input and output
    /// paths resolve against it
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Output directory (overrides output.data_dir)
    #[arg(long)]
    out: Option<String>,

    /// Skip writing data_embedded.js
    #[arg(long)]
    no_embedded: bool,

    /// Log without ANSI colors
    #[arg(long)]
    no_color: bool,
}

fn main() -> anyhow::Result<()> {
    // 1. Parse CLI arguments
    let args = Args::parse();

    // 2. Initialize tracing
    init_tracing(!args.no_color)?;
    info!("Pitchlab starting up");

    // 3. Load config
    let overrides = Overrides {
        data_dir: args.out.clone(),
        no_embedded: args.no_embedded,
    };
    let config = config::load_config(&args.base_dir)
        .and_then(|c| c.with_overrides(&overrides))
        .context("failed to load configuration")?;
    info!(
        "Config loaded: {} pitching sheet(s), {} hitting sheet(s), output to {}",
        config.input.pitching.len(),
        config.input.hitting.len(),
        config.output.data_dir
    );

    // 4. Read sheets
    let pitching = ingest::load_side(
        &config.pitching_paths(&args.base_dir),
        Role::Pitcher,
        config.input.require_rows,
    )
    .context("failed to read pitching sheets")?;
    let hitting = ingest::load_side(
        &config.hitting_paths(&args.base_dir),
        Role::Hitter,
        config.input.require_rows,
    )
    .context("failed to read hitting sheets")?;

    // 5. Build leaderboards
    let generated_at = chrono::Local::now().naive_local();
    let boards = leaderboard::build(&pitching, &hitting, generated_at);

    // 6. Write output
    let data_dir = config.data_dir(&args.base_dir);
    let written = output::write_all(&boards, &data_dir, &config.output)
        .context("failed to write output files")?;
    for path in &written {
        info!("  wrote {}", path.display());
    }

    info!("Pitchlab finished");
    Ok(())
}

/// Initialize tracing to stderr so stdout stays free for piping.
fn init_tracing(ansi: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pitchlab=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
