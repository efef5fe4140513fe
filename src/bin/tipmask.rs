use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "tipmask", version)]
struct Cli {
    /// Engine config JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Asset root standing in for the object store (overrides config and environment).
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite one color image into a shape and write the PNG preview.
    Preview(PreviewArgs),
    /// Composite many color images into the same shape.
    Batch(BatchArgs),
    /// List the mask template reference of every shape.
    Masks(MasksArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Nail shape (round, square, stiletto, ballerina, almond).
    #[arg(long)]
    shape: tipmask::Shape,

    /// Input color image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Nail shape (round, square, stiletto, ballerina, almond).
    #[arg(long)]
    shape: tipmask::Shape,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Failure policy. Defaults to the config's `batch_policy`.
    #[arg(long, value_enum)]
    policy: Option<PolicyChoice>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Name outputs `nail/<aa>/<sha256>.png` instead of after their input.
    #[arg(long, default_value_t = false)]
    content_addressed: bool,

    /// Input color images.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct MasksArgs {
    /// Load every mask and print its size and silhouette coverage.
    #[arg(long, default_value_t = false)]
    inspect: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyChoice {
    AllOrNothing,
    PerItem,
}

impl From<PolicyChoice> for tipmask::BatchPolicy {
    fn from(choice: PolicyChoice) -> Self {
        match choice {
            PolicyChoice::AllOrNothing => tipmask::BatchPolicy::AllOrNothing,
            PolicyChoice::PerItem => tipmask::BatchPolicy::PerItem,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = load_config(cli.config.as_deref(), cli.assets)?;
    match cli.cmd {
        Command::Preview(args) => cmd_preview(&cfg, args),
        Command::Batch(args) => cmd_batch(&cfg, args),
        Command::Masks(args) => cmd_masks(&cfg, args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(
    path: Option<&Path>,
    assets: Option<PathBuf>,
) -> anyhow::Result<tipmask::EngineConfig> {
    let cfg = match path {
        Some(p) => tipmask::EngineConfig::from_path(p)?,
        None => tipmask::EngineConfig::default(),
    };
    let mut cfg = cfg.apply_env();
    if let Some(root) = assets {
        cfg.asset_root = root;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_preview(cfg: &tipmask::EngineConfig, args: PreviewArgs) -> anyhow::Result<()> {
    let engine = tipmask::PreviewEngine::from_config(cfg)?;
    let color = std::fs::read(&args.in_path)
        .with_context(|| format!("read color image '{}'", args.in_path.display()))?;

    let png = engine.generate_preview(args.shape, &color)?;
    write_output(&args.out, &png)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(cfg: &tipmask::EngineConfig, args: BatchArgs) -> anyhow::Result<()> {
    let engine = tipmask::PreviewEngine::from_config(cfg)?;

    let mut inputs = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        inputs.push(
            std::fs::read(path)
                .with_context(|| format!("read color image '{}'", path.display()))?,
        );
    }

    let opts = tipmask::BatchOpts {
        policy: args.policy.map(Into::into).unwrap_or(cfg.batch_policy),
        threads: args.threads.or(cfg.threads),
    };
    let report = engine.generate_batch(args.shape, &inputs, &opts)?;

    let ext = engine.encoder().extension();
    for (index, (path, item)) in args.inputs.iter().zip(&report.items).enumerate() {
        match item {
            Ok(png) => {
                let out = if args.content_addressed {
                    args.out_dir.join(tipmask::content_key(png))
                } else {
                    args.out_dir.join(output_name(index, path, ext))
                };
                write_output(&out, png)?;
                eprintln!("wrote {}", out.display());
            }
            Err(e) => eprintln!("failed {}: {e}", path.display()),
        }
    }

    if report.failed() > 0 {
        anyhow::bail!(
            "{} of {} images failed ({})",
            report.failed(),
            report.len(),
            tipmask::TipmaskError::GENERIC_MESSAGE
        );
    }
    Ok(())
}

fn cmd_masks(cfg: &tipmask::EngineConfig, args: MasksArgs) -> anyhow::Result<()> {
    let engine = tipmask::PreviewEngine::from_config(cfg)?;
    for (shape, reference) in engine.registry().entries() {
        if !args.inspect {
            println!("{shape:<10} {reference}");
            continue;
        }
        let mask = engine
            .load_mask(shape)
            .with_context(|| format!("load mask for {shape}"))?;
        let coverage = tipmask::mask_coverage(&mask);
        println!(
            "{shape:<10} {reference} {}x{} interior={} exterior={}",
            mask.width(),
            mask.height(),
            coverage.interior,
            coverage.exterior
        );
    }
    Ok(())
}

/// Inputs from different directories may share a stem; the index keeps names unique.
fn output_name(index: usize, input: &Path, ext: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "preview".to_string());
    format!("processed-{index}-{stem}.{ext}")
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))
}
