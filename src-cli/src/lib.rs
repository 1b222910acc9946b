//! Shared plumbing for the shipkit binaries: argument parsing, logging,
//! the two tool bodies and the mapping from outcome to exit code.

use anyhow::{bail, Context};
use shipkit_core::{generate_icon, plan_sync, resolve, Config};
use std::io::Write;
use std::path::PathBuf;

/// Exit code for a failed run.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for unusable arguments.
pub const EXIT_USAGE: u8 = 2;

pub const ICON_USAGE: &str = "usage: gen-windows-icon [--root <dir>] [--config <file>]";
pub const SYNC_USAGE: &str = "usage: sync-versions [--root <dir>] [--config <file>] [--check]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonArgs {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub check: bool,
    pub help: bool,
}

/// Parse `--root`, `--config`, `--check` and `-h/--help`.
/// `--check` is only accepted when `allow_check` is set.
pub fn parse_args<I>(args: I, allow_check: bool) -> anyhow::Result<CommonArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CommonArgs {
        root: PathBuf::from("."),
        ..Default::default()
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--root" => {
                parsed.root = args.next().map(PathBuf::from).context("--root needs a value")?;
            }
            "--config" => {
                parsed.config = Some(args.next().map(PathBuf::from).context("--config needs a value")?);
            }
            "--check" if allow_check => parsed.check = true,
            "-h" | "--help" => parsed.help = true,
            other => bail!("unexpected argument: {other}"),
        }
    }
    Ok(parsed)
}

/// Fallback filter when `RUST_LOG` is unset. The binaries are crates of
/// their own, so they are listed next to the libraries.
const DEFAULT_LOG_FILTER: &str =
    "shipkit_core=info,shipkit_cli=info,gen_windows_icon=info,sync_versions=info";

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .try_init();
}

/// Which tool a binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    WindowsIcon,
    SyncVersions,
}

impl Tool {
    fn usage(self) -> &'static str {
        match self {
            Tool::WindowsIcon => ICON_USAGE,
            Tool::SyncVersions => SYNC_USAGE,
        }
    }

    fn failure_label(self) -> &'static str {
        match self {
            Tool::WindowsIcon => "Icon generation failed",
            Tool::SyncVersions => "Version sync failed",
        }
    }

    fn run(self, args: &CommonArgs, out: &mut dyn Write) -> anyhow::Result<()> {
        match self {
            Tool::WindowsIcon => run_icon(args, out),
            Tool::SyncVersions => run_sync(args, out),
        }
    }
}

/// Parse `argv`, run `tool` and return the process exit code.
///
/// Summary lines go to `out`. Every failure is reported on `err`, whatever
/// the log filter says.
pub fn execute<I>(tool: Tool, argv: I, out: &mut dyn Write, err: &mut dyn Write) -> u8
where
    I: IntoIterator<Item = String>,
{
    let args = match parse_args(argv, tool == Tool::SyncVersions) {
        Ok(args) => args,
        Err(e) => {
            let _ = writeln!(err, "{e}\n{}", tool.usage());
            return EXIT_USAGE;
        }
    };
    if args.help {
        let _ = writeln!(out, "{}", tool.usage());
        return 0;
    }

    init_logging();
    match tool.run(&args, out) {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!("{e:?}");
            let _ = writeln!(err, "{}: {e:#}", tool.failure_label());
            EXIT_FAILURE
        }
    }
}

/// Build the Windows application icon from the project's PNG icon.
pub fn run_icon(args: &CommonArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = Config::load(&args.root, args.config.as_deref()).context("loading config")?;
    let input = resolve(&args.root, &config.icon.input);
    let output = resolve(&args.root, &config.icon.output);

    let report = generate_icon(&input, &output, &config.icon.options(&args.root))
        .with_context(|| format!("generating {}", output.display()))?;

    writeln!(out, "Generated Windows icon: {}", report.output.display())?;
    writeln!(out, "  sizes: {}", report.sizes_label())?;
    writeln!(out, "  file size: {:.2} KB", report.kib())?;
    for png in &report.pngs {
        writeln!(out, "  preview: {}", png.display())?;
    }
    Ok(())
}

/// Copy the Dart version constants into the platform build files.
pub fn run_sync(args: &CommonArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = Config::load(&args.root, args.config.as_deref()).context("loading config")?;
    let plan = plan_sync(&args.root, &config).context("reading version files")?;
    writeln!(out, "Version from Dart constants: {}", plan.version)?;

    if args.check {
        for target in plan.out_of_sync() {
            writeln!(out, "  out of sync: {} ({})", target.kind, target.path.display())?;
        }
        plan.check()?;
        writeln!(out, "All targets are in sync.")?;
        return Ok(());
    }

    for report in plan.apply().context("writing build files")? {
        let state = if report.written { "updated" } else { "unchanged" };
        writeln!(out, "  {}: {} ({state})", report.kind, report.path.display())?;
        for rule in &report.unmatched {
            writeln!(out, "    warning: {rule} not found")?;
        }
    }
    writeln!(out, "Version sync complete.")?;
    Ok(())
}
