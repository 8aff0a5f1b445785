use std::fmt::Write as _;

use client_core::{
    view::{ExperimentRow, RunRow, StatusTone},
    RunSnapshot,
};
use shared::protocol::{Experiment, Run};

fn tone_marker(tone: StatusTone) -> char {
    match tone {
        StatusTone::Success => '+',
        StatusTone::Failure => '!',
        StatusTone::Pending => '~',
    }
}

pub fn experiments_table(experiments: &[Experiment]) -> String {
    if experiments.is_empty() {
        return "no experiments\n".into();
    }
    let rows: Vec<ExperimentRow> = experiments.iter().map(ExperimentRow::from).collect();
    let name_width = rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<36}  {:<name_width$}  VECTOR", "ID", "NAME");
    for row in rows {
        let _ = writeln!(out, "{:<36}  {:<name_width$}  {}", row.id, row.name, row.vector);
    }
    out
}

pub fn runs_table(snapshot: Option<&RunSnapshot>) -> String {
    let Some(snapshot) = snapshot else {
        return "runs not loaded yet\n".into();
    };
    let mut out = format!("runs for {}\n", snapshot.experiment_id);
    if snapshot.runs.is_empty() {
        out.push_str("no runs\n");
        return out;
    }

    let _ = writeln!(
        out,
        "  {:<11}  {:<12}  {:>8}  {:>10}  ELAPSED",
        "RUN", "STATUS", "F1", "P95 (ms)"
    );
    for run in &snapshot.runs {
        let row = RunRow::from(run);
        let _ = writeln!(
            out,
            "{} {:<11}  {:<12}  {:>8}  {:>10}  {}",
            tone_marker(row.tone),
            row.short_id,
            row.status,
            row.f1,
            row.p95_latency,
            row.elapsed.as_deref().unwrap_or("")
        );
    }
    out
}

pub fn run_details(run: &Run) -> String {
    let row = RunRow::from(run);
    let mut out = String::new();
    let _ = writeln!(out, "run         {}", run.id);
    let _ = writeln!(out, "experiment  {}", run.experiment_id);
    let _ = writeln!(out, "status      {} {}", tone_marker(row.tone), row.status);
    if let Some(start) = run.start_time {
        let _ = writeln!(out, "started     {}", start.to_rfc3339());
    }
    if let Some(end) = run.end_time {
        let _ = writeln!(out, "finished    {}", end.to_rfc3339());
    }
    if let Some(elapsed) = &row.elapsed {
        let _ = writeln!(out, "elapsed     {elapsed}");
    }
    let _ = writeln!(out, "f1          {}", row.f1);
    let _ = writeln!(out, "p95 (ms)    {}", row.p95_latency);
    if let Some(metrics) = &run.metrics {
        for (name, value) in &metrics.extra {
            let _ = writeln!(out, "{name:<12}{value}");
        }
    }
    out
}
