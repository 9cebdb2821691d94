use anyhow::{Context, Result};
use clap::Parser;

use grasp_glb::cli::Cli;
use grasp_glb::pipeline;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter())).init();

    let config = cli.to_config();
    log::debug!("Config: {:?}", config);

    let report = pipeline::run(&config).with_context(|| {
        format!(
            "Failed to convert {:?} + {:?} into {:?}",
            config.hand, config.object, config.out
        )
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let file_name = config
            .out
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "Wrote {} (load with <model-viewer src='models/{}'>)",
            config.out.display(),
            file_name
        );
    }

    Ok(())
}
