mod commands;
mod terminal;

use commands::{CommandLine, Commands, probe, winrm};
use reachr_common::config::{Config, FileConfig};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet)?;

    let file_config: FileConfig = match &commands.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    match commands.command {
        Commands::Probe(args) => {
            let cfg = Config {
                quiet: commands.quiet,
                json: args.run.json,
            };
            print::banner(banner_level(&cfg));
            probe::probe(args, &file_config.probe, &cfg).await
        }
        Commands::Winrm(args) => {
            let cfg = Config {
                quiet: commands.quiet,
                json: args.run.json || args.ready_only,
            };
            print::banner(banner_level(&cfg));
            winrm::winrm(args, &file_config.winrm, &cfg).await
        }
    }
}

/// Machine-readable output gets no banner.
fn banner_level(cfg: &Config) -> u8 {
    if cfg.json { cfg.quiet.max(1) } else { cfg.quiet }
}
