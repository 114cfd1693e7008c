use anyhow::Context;
use tracing::{error, info};

use subscriber_cleanse::{logging, pipeline, PipelineConfig};

fn main() -> anyhow::Result<()> {
    // Fixed relative data-directory convention; no flags or env beyond it.
    let config =
        PipelineConfig::at_root(".").context("failed to prepare data directories")?;

    logging::init_logging(&config.log_dir);
    info!("starting cleanse run");

    match pipeline::run(&config) {
        Ok(summary) => {
            println!("\n📊 Run summary:");
            println!("   Cleansed rows added: {}", summary.rows_added);
            println!("   Rows quarantined:    {}", summary.rows_quarantined);
            match summary.version {
                Some(version) => println!("   Changelog version:   0.0.{version}"),
                None => println!("   No new data; stores unchanged"),
            }
            info!("end of run");
            Ok(())
        }
        Err(e) => {
            error!("run failed: {e}");
            Err(anyhow::Error::from(e).context("cleanse run aborted"))
        }
    }
}
