use std::io::{self, Write};

use camino::Utf8PathBuf;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use vpk_conflicts::{
    AddonListSource, CandidateOutcome, CandidateResult, KnownGames, ScanPlan, ScanRequest,
    ScanSummary,
};
use vpk_index::VpkError;

use crate::errors::CliError;
use crate::utils::config::load_config;

pub struct CheckPackagesArgs {
    pub mod_directory: Option<Utf8PathBuf>,
    pub addon_list: Option<Utf8PathBuf>,
    pub base_package: Option<Utf8PathBuf>,
    pub name_match: Option<String>,
    pub config_path: Option<Utf8PathBuf>,
    pub packages: Vec<Utf8PathBuf>,
}

pub fn check_packages(args: CheckPackagesArgs) -> Result<()> {
    let config = load_config(args.config_path.as_deref())?;

    let request = ScanRequest {
        mod_directory: args.mod_directory,
        base_package: args.base_package,
        addon_list: args.addon_list,
        name_match: args
            .name_match
            .or_else(|| config.name_match.clone())
            .unwrap_or_default(),
        packages: args.packages,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_check(request, &config.known_games(), &mut out)
}

/// Resolve, scan and print the report to `out`.
pub fn run_check<W: Write>(
    request: ScanRequest,
    games: &KnownGames,
    out: &mut W,
) -> Result<()> {
    let plan = ScanPlan::resolve(request, games).map_err(CliError::from)?;

    if let Some(AddonListSource::Detected(path)) = &plan.addon_list {
        tracing::info!("Using addon list {}", path);
        writeln!(out, "{}\n", "Automatically detected addon list".bright_cyan())
            .into_diagnostic()?;
    }
    let addon_list = plan.load_addon_list().map_err(CliError::from)?;

    let mut write_result: io::Result<()> = Ok(());
    let summary = plan
        .execute(addon_list.as_ref(), |outcome| {
            if write_result.is_ok() {
                write_result = write_outcome(out, outcome);
            }
        })
        .map_err(CliError::from)?;
    write_result.into_diagnostic()?;

    write_summary(out, &summary).into_diagnostic()?;
    Ok(())
}

/// Print the report block for one candidate. Clean candidates print nothing.
pub fn write_outcome<W: Write>(out: &mut W, outcome: &CandidateOutcome) -> io::Result<()> {
    match &outcome.result {
        CandidateResult::Clean => Ok(()),
        CandidateResult::Conflicts(paths) => {
            writeln!(
                out,
                "{} {}",
                "Conflicting files in".bright_yellow().bold(),
                outcome.display_name.bright_white().bold()
            )?;
            for path in paths {
                writeln!(out, "\t{}", path)?;
            }
            writeln!(out)
        }
        CandidateResult::Skipped(err) => {
            writeln!(
                out,
                "{} {} {}",
                "Skipping addon".bright_red(),
                outcome.display_name,
                describe_error(err).dimmed()
            )?;
            writeln!(out)
        }
    }
}

/// `(<kind>: <message>)`
fn describe_error(err: &VpkError) -> String {
    format!("({}: {})", err.kind(), err)
}

pub fn write_summary<W: Write>(out: &mut W, summary: &ScanSummary) -> io::Result<()> {
    writeln!(
        out,
        "{} plugin(s) checked ({} skipped, {} conflicts).",
        summary.checked.to_string().bright_white().bold(),
        summary.skipped.to_string().bright_red(),
        summary.conflicting.to_string().bright_yellow()
    )
}
