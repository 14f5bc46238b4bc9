use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::{ArgAction, ColorChoice};
use clap::{CommandFactory, FromArgMatches, Parser};
use commands::{check_packages, CheckPackagesArgs};
use miette::Result;

mod commands;
mod errors;
mod utils;

/// Displays info about potential / overlapping VPK file conflicts.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = None,
    after_help = "Either a mod directory or a base package and checked packages must be specified."
)]
struct Args {
    /// Path to the game's directory (e.g. .../Left 4 Dead 2/left4dead2)
    #[arg(short, long, value_name = "DIR")]
    mod_directory: Option<Utf8PathBuf>,

    /// Path to an addon list file (from a workshop downloader)
    #[arg(short = 'l', long, value_name = "FILE")]
    addon_list: Option<Utf8PathBuf>,

    /// The base package to compare add-ons against
    #[arg(short = 'p', long, value_name = "VPK")]
    base_package: Option<Utf8PathBuf>,

    /// Only check file paths containing the specified string
    #[arg(short, long, value_name = "STRING")]
    name_match: Option<String>,

    /// Path to the configuration file (defaults to config.toml next to the executable)
    #[arg(short, long, value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// One or more packages to check
    #[arg(value_name = "PACKAGE")]
    packages: Vec<Utf8PathBuf>,
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn main() -> Result<()> {
    let args = parse_args();

    utils::logging::init_logging(args.verbose);
    utils::disable_colors_unless_terminal();

    check_packages(CheckPackagesArgs {
        mod_directory: args.mod_directory,
        addon_list: args.addon_list,
        base_package: args.base_package,
        name_match: args.name_match,
        config_path: args.config,
        packages: args.packages,
    })
}
