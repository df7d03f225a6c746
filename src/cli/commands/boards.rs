//! Boards command implementation - List the board catalog

use anyhow::Result;
use log::debug;

use crate::config::{AppConfig, BoardCatalog};

/// Print every board the session can target
pub async fn execute_boards_command(config: &AppConfig) -> Result<()> {
    let catalog = BoardCatalog::with_extra(&config.boards);
    debug!(
        "Catalog has {} boards ({} from configuration)",
        catalog.list_boards().len(),
        config.boards.len()
    );

    println!("📋 Available Boards:");
    println!("====================\n");

    let default_id = config
        .default_board
        .as_deref()
        .or_else(|| catalog.default_board().map(|b| b.id.as_str()));

    for board in catalog.list_boards() {
        let marker = if Some(board.id.as_str()) == default_id {
            " (default)"
        } else {
            ""
        };
        println!("{}{}", board.id, marker);
        println!("  Name: {}", board.label);
        if board.use_1200bps_touch {
            println!("  Reset: 1200 bps touch");
        }
        if board.wait_for_upload_port {
            println!("  Waits for upload port");
        }
        println!();
    }

    println!("Total boards: {}", catalog.list_boards().len());
    Ok(())
}
