//! Summary output for a finished simulation

use crate::app::simulation::SimulationReport;
use crate::core::styles::StyleRole;
use crate::queue::api::BackpressureState;
use prettytable::{format, Cell, Row, Table};

/// Build the summary table
pub fn summary_table(report: &SimulationReport, use_color: bool) -> Table {
    let stats = &report.final_stats;
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(vec![
        Cell::new("Metric").style_spec(&format!("b{}", StyleRole::Title.table_spec(use_color))),
        Cell::new("Value").style_spec(&format!("b{}", StyleRole::Title.table_spec(use_color))),
    ]));

    let mut row = |metric: &str, value: String, role: StyleRole| {
        table.add_row(Row::new(vec![
            Cell::new(metric).style_spec(&StyleRole::Metric.table_spec(use_color)),
            Cell::new(&value).style_spec(&format!("r{}", role.table_spec(use_color))),
        ]));
    };

    row("Producers", report.producers.to_string(), StyleRole::Value);
    row(
        "Events per producer",
        report.events_per_producer.to_string(),
        StyleRole::Value,
    );
    row(
        "Throttling",
        if report.throttled { "on" } else { "off" }.to_string(),
        StyleRole::Accent,
    );
    row(
        "Capacity policy",
        stats.capacity_policy.to_string(),
        StyleRole::Accent,
    );
    row("Accepted", report.produced.accepted.to_string(), StyleRole::Healthy);
    row(
        "Rejected",
        report.produced.rejected.to_string(),
        if report.produced.rejected > 0 {
            StyleRole::Pressured
        } else {
            StyleRole::Value
        },
    );
    row(
        "Throttle waits",
        report.produced.throttle_waits.to_string(),
        StyleRole::Value,
    );
    row("Drained", report.consumed.drained.to_string(), StyleRole::Healthy);
    row("Batches", report.consumed.batches.to_string(), StyleRole::Value);
    row(
        "Largest batch",
        report.consumed.largest_batch.to_string(),
        StyleRole::Value,
    );
    row("Peak size", stats.peak_size.to_string(), StyleRole::Value);
    row(
        "Depth (configured / final)",
        format!("{} / {}", stats.configured_max_depth, stats.max_queue_depth),
        if stats.is_scaled() {
            StyleRole::Accent
        } else {
            StyleRole::Value
        },
    );
    row(
        "Resizes (up / down)",
        format!("{} / {}", stats.scale_ups, stats.scale_downs),
        StyleRole::Value,
    );
    row(
        "Final state",
        stats.state().to_string(),
        match stats.state() {
            BackpressureState::Normal => StyleRole::Healthy,
            BackpressureState::Backpressure => StyleRole::Pressured,
        },
    );
    row(
        "Report failures",
        stats.report_failures.to_string(),
        if stats.report_failures > 0 {
            StyleRole::Pressured
        } else {
            StyleRole::Dim
        },
    );
    row(
        "Elapsed",
        format!("{} ms", report.elapsed_ms),
        StyleRole::Value,
    );
    row(
        "Throughput",
        format!("{:.0} events/s", report.throughput()),
        StyleRole::Value,
    );

    table
}

/// Print the summary, as a table or as pretty JSON
pub fn display_summary(report: &SimulationReport, use_color: bool, as_json: bool) -> Result<(), String> {
    if as_json {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| format!("could not serialise summary: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    println!("{}", StyleRole::Title.paint("Simulation summary", use_color));
    summary_table(report, use_color).printstd();
    Ok(())
}
