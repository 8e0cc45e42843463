// Conformance runner for string-parsable value types
// Exit status is non-zero when any check fails.

use anyhow::{bail, Result};
use strparse_conformance::{logging, run_all_checks, ConformanceConfig};
use tracing::{error, info};

fn main() -> Result<()> {
    let config = ConformanceConfig::from_env();
    logging::init_logging(&config)?;

    info!(fail_fast = config.fail_fast, "Starting conformance run");
    let report = run_all_checks(&config)?;

    for outcome in &report.outcomes {
        let status = if outcome.passed { "ok" } else { "FAILED" };
        println!("{:<40} {}", outcome.name, status);
        if let Some(detail) = &outcome.detail {
            println!("    {}", detail);
        }
    }
    println!("{}/{} checks passed", report.passed(), report.outcomes.len());

    if !report.is_success() {
        for outcome in report.failed() {
            error!(check = %outcome.name, "Conformance check failed");
        }
        bail!("{} conformance check(s) failed", report.outcomes.len() - report.passed());
    }
    Ok(())
}
