//! Text rendering of the dashboard session

use crate::api::{ChatRole, WellDetail, WellId, WellSummary};
use crate::chat::ChatContextBinder;
use crate::dashboard::Dashboard;
use crate::session::activity::{ActivityEntry, ActivityKind};
use crate::session::selection::{curves_by_category, SelectionState};
use crate::session::toast::{Toast, ToastKind};
use colored::{ColoredString, Colorize};
use prettytable::{format, Table};
use serde_json::Value;

/// Activity entries shown by `status`
const RECENT_ACTIVITY: usize = 8;

fn activity_tag(kind: ActivityKind) -> ColoredString {
    let tag = format!("{:<7}", kind);
    match kind {
        ActivityKind::Info => tag.cyan(),
        ActivityKind::Success => tag.green(),
        ActivityKind::Warning => tag.yellow(),
        ActivityKind::Error => tag.red(),
    }
}

fn toast_line(toast: &Toast) -> ColoredString {
    match toast.kind {
        ToastKind::Info => toast.message.cyan(),
        ToastKind::Success => toast.message.green(),
        ToastKind::Warning => toast.message.yellow(),
        ToastKind::Error => toast.message.red().bold(),
    }
}

/// Print the visible toast, if any
pub fn print_toast(toast: Option<Toast>) {
    if let Some(toast) = toast {
        println!("{} {}", "»".bold(), toast_line(&toast));
    }
}

/// Print the well list as a table
pub fn print_wells(wells: &[WellSummary], selected: Option<WellId>) {
    if wells.is_empty() {
        println!("{}", "No wells uploaded yet.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Name".bold(),
        "File".bold(),
        "Depth".bold(),
        "Curves".bold(),
        "Uploaded".bold()
    ]);

    for well in wells {
        let id = if Some(well.id) == selected {
            format!("*{}", well.id).green()
        } else {
            well.id.to_string().cyan()
        };
        let curves = well
            .curve_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(prettytable::row![
            id,
            well.well_name,
            well.original_filename,
            format!("{:.1}-{:.1} {}", well.start_depth, well.stop_depth, well.depth_unit),
            curves,
            well.uploaded_at.as_deref().unwrap_or("-")
        ]);
    }

    table.printstd();
}

fn print_activity(entries: &[ActivityEntry]) {
    if entries.is_empty() {
        return;
    }
    println!("\n{}", "Activity:".bold());
    for entry in entries.iter().take(RECENT_ACTIVITY) {
        let time = chrono::DateTime::parse_from_rfc3339(&entry.time)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|_| entry.time.clone());
        println!("  {} {} {}", time.dimmed(), activity_tag(entry.kind), entry.msg);
    }
}

/// One line per curve category, selected curves marked with `*`
fn curve_picker_lines(well: &WellDetail, selection: &SelectionState) -> Vec<String> {
    curves_by_category(well)
        .into_iter()
        .map(|(category, curves)| {
            let marked: Vec<String> = curves
                .into_iter()
                .map(|curve| {
                    if selection.selected_curves.contains(&curve) {
                        format!("*{}", curve)
                    } else {
                        curve
                    }
                })
                .collect();
            format!("{}: {}", category, marked.join(" "))
        })
        .collect()
}

fn interpretation_summary(value: &Value) -> String {
    match value.get("summary").and_then(Value::as_str) {
        Some(summary) => summary.to_string(),
        None => {
            let keys: Vec<&str> = value
                .as_object()
                .map(|o| o.keys().map(String::as_str).collect())
                .unwrap_or_default();
            format!("{{{}}}", keys.join(", "))
        }
    }
}

/// Print the selected well, selection, chart, interpretation and recent activity
pub fn print_status(dashboard: &Dashboard) {
    let controller = dashboard.controller();
    let selection = controller.selection();

    match (selection.selected_well_id, controller.well_detail()) {
        (_, Some(well)) => println!(
            "{} {} (id {}, {} curves, {:.1}-{:.1} {})",
            "Well:".bold(),
            well.well_name.green(),
            well.id,
            well.curves.len(),
            well.start_depth,
            well.stop_depth,
            well.depth_unit
        ),
        (Some(id), None) => println!("{} {} {}", "Well:".bold(), id, "(not loaded)".red()),
        (None, None) => println!("{} {}", "Well:".bold(), "none selected".dimmed()),
    }

    let curves: Vec<&str> = selection.selected_curves.iter().map(String::as_str).collect();
    println!(
        "{} {}",
        "Curves:".bold(),
        if curves.is_empty() {
            "-".to_string()
        } else {
            curves.join(", ")
        }
    );
    match selection.depth_range() {
        Some((min, max)) => println!("{} {:.1} - {:.1}", "Depth:".bold(), min, max),
        None => println!("{} -", "Depth:".bold()),
    }
    println!("{} {}", "Tab:".bold(), selection.active_tab);

    if let Some(well) = controller.well_detail() {
        println!("\n{}", "Available curves:".bold());
        for line in curve_picker_lines(well, selection) {
            println!("  {}", line);
        }
    }

    if let Some(chart) = controller.chart() {
        println!(
            "{} {} ({} points, {:.1}-{:.1})",
            "Chart:".bold(),
            controller.chart_curves().join(", "),
            chart.point_count(),
            chart.depth_range.min,
            chart.depth_range.max
        );
    }
    if let Some(interpretation) = controller.interpretation() {
        println!(
            "{} {}",
            "Interpretation:".bold(),
            interpretation_summary(interpretation)
        );
    }

    print_activity(&controller.activity().to_vec());
}

/// Print the bound well's chat
pub fn print_chat(chat: &ChatContextBinder) {
    let context = chat.context();
    println!(
        "{} curves: {} | detail {}",
        context.mode.colored_tag(),
        if context.curves.is_empty() {
            "-".to_string()
        } else {
            context.curves.join(", ")
        },
        chat.detail_level()
    );
    for turn in chat.messages() {
        match turn.role {
            ChatRole::User => println!("{} {}", "you:".cyan().bold(), turn.content),
            ChatRole::Assistant => println!("{} {}", "assistant:".magenta().bold(), turn.content),
        }
    }
}
