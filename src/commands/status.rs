//! Status command implementation

use console::Style;

use crate::cli::StatusArgs;
use crate::common::size::format_size;
use crate::config::Config;
use crate::error::Result;
use crate::resources::HostProbe;
use crate::scheduler::local_now;
use crate::status::{self, KindSummary, MirrorStatus};

pub fn run(config: &Config, args: StatusArgs) -> Result<()> {
    let status = status::collect(config, &HostProbe, local_now())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_status(config, &status);
    }
    Ok(())
}

fn print_status(config: &Config, status: &MirrorStatus) {
    let header = Style::new().bold().green();
    let label = Style::new().cyan();
    let dim = Style::new().dim();

    let kind = |name: &str, summary: &KindSummary, dir: &std::path::Path| {
        println!(
            "  {:<11} {} file{}, {} {}",
            label.apply_to(name),
            summary.files,
            if summary.files == 1 { "" } else { "s" },
            summary.formatted_size(),
            dim.apply_to(format!("({})", dir.display()))
        );
    };

    println!("{}", header.apply_to("Mirror Status:"));
    kind("Compressed", &status.compressed, &config.paths.compressed);
    kind("Unpacked", &status.unpacked, &config.paths.unpacked);
    kind("Canonical", &status.canonical, &config.paths.canonical);

    println!(
        "  {:<11} {}",
        label.apply_to("Last sync"),
        status
            .last_sync
            .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
    );
    println!(
        "  {:<11} {}",
        label.apply_to("Next sync"),
        status
            .next_sync
            .map_or_else(|| "unknown".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
    );
    println!(
        "  {:<11} {}",
        label.apply_to("Free disk"),
        status
            .free_disk_bytes
            .map_or_else(|| "unknown".to_string(), format_size)
    );

    if !status.canonical_files.is_empty() {
        println!("\n{}", header.apply_to("Canonical files:"));
        for name in &status.canonical_files {
            println!("  {name}");
        }
    }
}
