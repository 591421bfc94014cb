//! Sync command implementation

use console::Style;

use crate::cli::SyncArgs;
use crate::config::Config;
use crate::error::{MirrorError, Result};
use crate::remote::HttpRemote;
use crate::resources::HostProbe;
use crate::sync::{Orchestrator, SyncReport};

/// Run one synchronization cycle; fails unless every file is up to date
pub fn run(mut config: Config, args: SyncArgs) -> Result<()> {
    if args.no_unpack {
        config.unpack.enabled = false;
    }

    let remote = HttpRemote::new(&config.source.user_agent, config.download.timeout())?;
    let report = Orchestrator::new(&config, &remote, &HostProbe).run();
    print_summary(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(MirrorError::SyncFailed {
            succeeded: report.succeeded(),
            total: report.total(),
        })
    }
}

fn print_summary(report: &SyncReport) {
    let ok = Style::new().green();
    let failed = Style::new().red();
    let dim = Style::new().dim();

    if let Some(reason) = &report.aborted {
        println!("{} {}", failed.apply_to("Aborted:"), reason);
        return;
    }

    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!("  {} {}", ok.apply_to(outcome.state), outcome.filename),
            Some(error) => println!(
                "  {} {} {}",
                failed.apply_to("failed"),
                outcome.filename,
                dim.apply_to(format!("({error})"))
            ),
        }
    }

    if report.swept > 0 {
        println!(
            "  {} {} orphaned temp file(s)",
            dim.apply_to("swept"),
            report.swept
        );
    }

    for retention in &report.retention {
        for deletion in &retention.deleted {
            println!(
                "  {} {} {}",
                dim.apply_to(format!("removed {}", retention.kind)),
                deletion.path.display(),
                dim.apply_to(format!("({})", deletion.reason))
            );
        }
        for (path, error) in &retention.failed {
            println!(
                "  {} {} {}",
                failed.apply_to(format!("could not remove {}", retention.kind)),
                path.display(),
                dim.apply_to(format!("({error})"))
            );
        }
    }

    let deleted: usize = report.retention.iter().map(|r| r.deleted.len()).sum();
    println!(
        "\n{}/{} files up to date, {} downloaded, {} old files removed",
        report.succeeded(),
        report.total(),
        report.downloaded(),
        deleted
    );
}
