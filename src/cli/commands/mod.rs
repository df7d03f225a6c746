//! CLI command implementations

pub mod boards;
pub mod locate;
pub mod ports;
pub mod upload;

use crate::cli::args::Commands;
use crate::config::AppConfig;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute_command(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Boards => boards::execute_boards_command(config).await,
        Commands::Locate => locate::execute_locate_command(config).await,
        Commands::Ports { wait } => ports::execute_ports_command(config, wait).await,
        Commands::Upload {
            sketch,
            board,
            port,
            compile_url,
            wait,
            timeout,
        } => {
            upload::execute_upload_command(
                config,
                upload::UploadArgs {
                    sketch,
                    board,
                    port,
                    compile_url,
                    wait,
                    timeout,
                },
            )
            .await
        }
    }
}
