//! Service command implementation

use crate::config::Config;
use crate::error::Result;
use crate::remote::HttpRemote;
use crate::resources::HostProbe;
use crate::scheduler::{Schedule, Scheduler};
use crate::sync::Orchestrator;

/// Run cycles on the configured schedule until the process is stopped.
///
/// Cycle failures are logged and never end the loop.
pub fn run(config: &Config) -> Result<()> {
    let schedule = Schedule::from_config(&config.schedule)?;
    let remote = HttpRemote::new(&config.source.user_agent, config.download.timeout())?;
    let orchestrator = Orchestrator::new(config, &remote, &HostProbe);

    tracing::info!(
        frequency = ?config.schedule.frequency,
        time = %config.schedule.time,
        poll_interval_secs = config.schedule.poll_interval_secs,
        "starting dumpmirror service"
    );

    Scheduler::new(schedule).run_forever(|| {
        let report = orchestrator.run();
        if !report.is_success() {
            tracing::error!(
                succeeded = report.succeeded(),
                total = report.total(),
                aborted = report.aborted.as_ref().map(ToString::to_string),
                "synchronization cycle failed"
            );
        }
    })
}
