//! piam-anc installer CLI entrypoint.
//!
//! This binary resolves the release archive for the host platform,
//! installs the verified `piam-anc` executable, smoke-tests it and prints
//! post-install guidance. Each failure kind exits with its own code.

use camino::Utf8Path;
use clap::Parser;
use log::debug;
use piam_anc_installer::artefact::release_table::ReleaseTable;
use piam_anc_installer::cli::{Cli, Command, InstallArgs, PlatformArgs, ResolveArgs, TestArgs};
use piam_anc_installer::dirs::{BaseDirs, SystemBaseDirs};
use piam_anc_installer::error::{InstallerError, Result};
use piam_anc_installer::installer::{InstallRequest, install};
use piam_anc_installer::layout::{EXECUTABLE_NAME, InstallLayout, LayoutOverrides};
use piam_anc_installer::logging;
use piam_anc_installer::output::{
    CAVEATS, DryRunInfo, ResolvedArtefact, descriptor_text, success_message, write_stderr_line,
};
use piam_anc_installer::platform::Platform;
use piam_anc_installer::smoke::smoke_test;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    if let Err(e) = logging::init(cli.verbosity) {
        write_stderr_line(&mut stderr, format!("warning: logging unavailable: {e}"));
    }
    let run_result = run(&cli, &SystemBaseDirs, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(
    cli: &Cli,
    dirs: &dyn BaseDirs,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<()> {
    match &cli.command {
        Some(Command::Resolve(args)) => run_resolve(args, stdout),
        Some(Command::Test(args)) => run_smoke_test(args, dirs, stdout),
        Some(Command::Caveats) => write_stdout(stdout, CAVEATS),
        Some(Command::Install(_)) | None => {
            run_install(cli.install_args(), cli.quiet, dirs, stderr)
        }
    }
}

/// Resolve → fetch → verify → extract → place → provision → smoke test.
fn run_install(
    args: &InstallArgs,
    quiet: bool,
    dirs: &dyn BaseDirs,
    stderr: &mut dyn Write,
) -> Result<()> {
    let table = load_release_table(args.release_table.as_deref())?;
    let platform = resolve_platform(&args.platform)?;
    let descriptor = table.resolve(platform)?;
    let layout = InstallLayout::resolve(
        dirs,
        &LayoutOverrides {
            prefix: args.prefix.as_deref(),
            bin_dir: args.bin_dir.as_deref(),
            state_dir: args.state_dir.as_deref(),
        },
    )?;

    // Dry-run mode: show what would be done without side effects
    if args.dry_run {
        let info = DryRunInfo {
            platform,
            descriptor,
            version: table.version(),
            layout: &layout,
            smoke_test: !args.skip_smoke_test,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let request = InstallRequest {
        descriptor,
        version: table.version(),
        layout: &layout,
        quiet,
    };
    let installed = install(&request, stderr)?;

    if !args.skip_smoke_test {
        let version_output = smoke_test(installed.binary_path())?;
        debug!("smoke test output: {version_output}");
        if !quiet {
            write_stderr_line(stderr, "Smoke test passed.");
        }
    }

    if !quiet {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, success_message(&installed));
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, CAVEATS);
    }
    Ok(())
}

/// Prints the descriptor selected for the requested platform.
fn run_resolve(args: &ResolveArgs, stdout: &mut dyn Write) -> Result<()> {
    let table = load_release_table(args.release_table.as_deref())?;
    let platform = resolve_platform(&args.platform)?;
    let descriptor = table.resolve(platform)?;

    if args.json {
        let json = ResolvedArtefact {
            version: table.version(),
            descriptor,
        }
        .to_json()
        .map_err(|e| InstallerError::WriteFailed {
            source: std::io::Error::other(e),
        })?;
        write_stdout(stdout, json)
    } else {
        write_stdout(stdout, descriptor_text(descriptor, table.version()))
    }
}

/// Runs the smoke test against an existing installation.
fn run_smoke_test(args: &TestArgs, dirs: &dyn BaseDirs, stdout: &mut dyn Write) -> Result<()> {
    let binary = args.bin_dir.as_ref().map_or_else(
        || {
            let overrides = LayoutOverrides {
                prefix: args.prefix.as_deref(),
                ..LayoutOverrides::default()
            };
            InstallLayout::resolve(dirs, &overrides).map(|layout| layout.binary_path())
        },
        |bin_dir| Ok(bin_dir.join(EXECUTABLE_NAME)),
    )?;
    let version_output = smoke_test(&binary)?;
    write_stdout(stdout, version_output)
}

/// Loads the release table from `path`, or the built-in one.
fn load_release_table(path: Option<&Utf8Path>) -> Result<ReleaseTable> {
    let table = path.map_or_else(ReleaseTable::pinned, ReleaseTable::from_file)?;
    debug!("release table for version {}", table.version());
    Ok(table)
}

/// Detects the host platform, applying any overrides.
fn resolve_platform(args: &PlatformArgs) -> Result<Platform> {
    let platform = Platform::from_overrides(args.os.as_deref(), args.arch.as_deref())?;
    debug!("resolved platform {platform}");
    Ok(platform)
}

fn write_stdout(stdout: &mut dyn Write, message: impl std::fmt::Display) -> Result<()> {
    writeln!(stdout, "{message}").map_err(|source| InstallerError::WriteFailed { source })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error [{}]: {err}", err.kind()));
            err.exit_code()
        }
    }
}
