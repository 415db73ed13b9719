//! CLI argument definitions for the piam-anc installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Install the PIAM Admin Network Configurator (`piam-anc`).
#[derive(Parser, Debug)]
#[command(name = "piam-anc-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install the PIAM Admin Network Configurator (piam-anc).\n\n",
    "piam-anc is a terminal UI for managing Google Cloud SQL and GKE authorised ",
    "networks. This installer selects the release archive for the host platform, ",
    "verifies it against a pinned SHA-256 digest, and places the piam-anc ",
    "executable in <prefix>/bin with a state directory at <prefix>/var/piam-anc.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install into ~/.local:\n",
    "    $ piam-anc-installer\n\n",
    "  Install into a custom prefix:\n",
    "    $ piam-anc-installer --prefix /opt/piam\n\n",
    "  Show which archive would be installed on linux/arm64:\n",
    "    $ piam-anc-installer resolve --os linux --arch arm64\n\n",
    "  Check an existing installation:\n",
    "    $ piam-anc-installer test --prefix /opt/piam\n\n",
    "  Preview without installing:\n",
    "    $ piam-anc-installer --dry-run\n\n",
    "For more information, see: https://github.com/ExclamationLabs/piam-anc",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Install arguments (used when no subcommand is given).
    #[command(flatten)]
    pub install: InstallArgs,

    /// Increase diagnostic logging (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install piam-anc (default when no subcommand given).
    Install(InstallArgs),

    /// Print the release archive selected for a platform.
    Resolve(ResolveArgs),

    /// Check that an installed piam-anc identifies itself correctly.
    Test(TestArgs),

    /// Print post-install guidance.
    Caveats,
}

/// Platform selection shared by `install` and `resolve`.
#[derive(Args, Debug, Clone, Default)]
pub struct PlatformArgs {
    /// Operating system to install for [default: host].
    #[arg(long, value_name = "OS")]
    pub os: Option<String>,

    /// CPU architecture to install for [default: host].
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,
}

/// Arguments for the install command.
#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Install prefix; the executable goes to <PREFIX>/bin [default: ~/.local].
    #[arg(short, long, value_name = "DIR", env = "PIAM_ANC_PREFIX")]
    pub prefix: Option<Utf8PathBuf>,

    /// Directory for the executable, overriding the prefix.
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// State directory, overriding the prefix.
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<Utf8PathBuf>,

    /// Platform overrides.
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Release table to use instead of the built-in one (TOML).
    #[arg(long, value_name = "FILE", env = "PIAM_ANC_RELEASE_TABLE")]
    pub release_table: Option<Utf8PathBuf>,

    /// Skip running `piam-anc --version` after installing.
    #[arg(long)]
    pub skip_smoke_test: bool,

    /// Show what would be installed and exit without changing anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the resolve command.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Platform overrides.
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Release table to use instead of the built-in one (TOML).
    #[arg(long, value_name = "FILE", env = "PIAM_ANC_RELEASE_TABLE")]
    pub release_table: Option<Utf8PathBuf>,

    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the test command.
#[derive(Args, Debug, Clone, Default)]
pub struct TestArgs {
    /// Install prefix to check [default: ~/.local].
    #[arg(short, long, value_name = "DIR", env = "PIAM_ANC_PREFIX")]
    pub prefix: Option<Utf8PathBuf>,

    /// Directory holding the executable, overriding the prefix.
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,
}

impl Cli {
    /// Returns the effective install arguments.
    ///
    /// If an `Install` subcommand was provided, returns those arguments.
    /// Otherwise returns the flattened install arguments.
    ///
    /// # Note
    ///
    /// For the other subcommands this returns the default flattened
    /// install arguments. Callers should check `self.command` first.
    #[must_use]
    pub fn install_args(&self) -> &InstallArgs {
        match &self.command {
            Some(Command::Install(args)) => args,
            Some(Command::Resolve(_) | Command::Test(_) | Command::Caveats) | None => {
                &self.install
            }
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
