/*!
Command handlers for the CLI

Each handler runs one dashboard operation against an already started
[`Dashboard`] and prints the resulting session state. Backend failures have
already been surfaced as toasts by the time a handler returns them.
*/

pub mod render;

use crate::api::UploadProgress;
use crate::cli::Commands;
use crate::dashboard::Dashboard;
use crate::error::{Result, WellscopeError};
use crate::session::selection::{DepthEdit, Tab};
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;

/// Progress callback printing an upload percentage to stderr
fn upload_progress() -> UploadProgress {
    Arc::new(|sent: u64, total: u64| {
        let percent = if total == 0 { 100 } else { sent * 100 / total };
        eprint!("\rUploading... {:>3}%", percent);
        let _ = std::io::stderr().flush();
    })
}

/// Execute a CLI command against the dashboard
///
/// # Arguments
///
/// * `dashboard` - Dashboard restored from the previous run
/// * `command` - Parsed subcommand
///
/// # Errors
///
/// Returns the error of the underlying operation after the session state
/// has been printed
pub async fn execute(dashboard: &mut Dashboard, command: Commands) -> Result<()> {
    tracing::debug!(?command, "Executing command");

    let result = match command {
        Commands::Health => dashboard.check_health().await.map(|_| ()),
        Commands::Wells => {
            let result = dashboard.refresh_wells().await;
            render::print_wells(
                dashboard.controller().wells(),
                dashboard.controller().selection().selected_well_id,
            );
            render::print_toast(dashboard.toasts().current());
            return result;
        }
        Commands::Upload { file } => {
            let result = dashboard.upload(&file, Some(upload_progress())).await;
            eprintln!();
            result.map(|_| ())
        }
        Commands::Select { id } => dashboard.select_well(id).await,
        Commands::Curves { curves } => {
            dashboard.set_curves(&curves);
            Ok(())
        }
        Commands::Toggle { mnemonic } => {
            let selected = dashboard.toggle_curve(&mnemonic);
            println!(
                "{} {}",
                mnemonic,
                if selected { "selected".green() } else { "deselected".yellow() }
            );
            Ok(())
        }
        Commands::Preset { name } => {
            if let Some(count) = dashboard.apply_preset(&name) {
                println!("Preset {} selected {} curves", name.cyan(), count);
            }
            Ok(())
        }
        Commands::Depth { min, max } => match dashboard.set_depth_range(&min, &max) {
            DepthEdit::Applied { .. } => Ok(()),
            DepthEdit::Rejected => Err(WellscopeError::Validation(format!(
                "Depth range {}..{} is not increasing",
                min, max
            ))
            .into()),
        },
        Commands::Chart => dashboard.load_chart().await,
        Commands::Interpret => dashboard.interpret().await,
        Commands::Tab { name } => match Tab::parse_str(&name) {
            Ok(tab) => {
                dashboard.set_tab(tab);
                Ok(())
            }
            Err(e) => Err(WellscopeError::Validation(e).into()),
        },
        Commands::Chat { message, detail } => {
            if let Some(raw) = detail {
                let level = dashboard.set_detail_level(&raw);
                tracing::debug!(%level, "Detail level set");
            }
            let outcome = dashboard.send_chat(&message).await;
            tracing::debug!(?outcome, "Chat message handled");
            render::print_chat(dashboard.chat());
            return Ok(());
        }
        Commands::ChatClear => {
            dashboard.clear_chat();
            render::print_chat(dashboard.chat());
            return Ok(());
        }
        Commands::Delete { id } => dashboard.delete_well(id).await,
        Commands::ClearAll => {
            let summary = dashboard.clear_all().await;
            if summary.failed > 0 {
                println!(
                    "{}",
                    format!("{} wells could not be deleted", summary.failed).yellow()
                );
            }
            Ok(())
        }
        Commands::Status => Ok(()),
    };

    render::print_toast(dashboard.toasts().current());
    render::print_status(dashboard);
    result
}
