use std::fmt::Write;

use crate::{input::TargetInput, types::PolledStatus};

const TITLE: &str = "Proofuino";
const LOADING: &str = "Loading...";

/// Renders one full dashboard frame.
///
/// Status and Controls only appear once a snapshot exists and the device is
/// not paused; the power switch is absent until the first snapshot.
pub fn render(status: Option<&PolledStatus>, input: &TargetInput) -> String {
    let mut out = String::new();

    match status {
        Some(polled) => {
            let switch = if polled.snapshot.state.is_paused() {
                "[ OFF]"
            } else {
                "[ON  ]"
            };
            let _ = writeln!(out, "{TITLE}  {switch}");
        }
        None => {
            let _ = writeln!(out, "{TITLE}");
        }
    }

    section(&mut out, "Sensors");
    match status {
        Some(polled) => {
            let snapshot = &polled.snapshot;
            labelled(&mut out, "Dough", &format_temp(snapshot.dough_temp_c));
            labelled(&mut out, "Box", &format_temp(snapshot.box_temp_c));
            labelled(&mut out, "Relay", snapshot.relay.as_str());
        }
        None => {
            let _ = writeln!(out, "  {LOADING}");
        }
    }

    if let Some(polled) = status.filter(|polled| !polled.snapshot.state.is_paused()) {
        let snapshot = &polled.snapshot;

        section(&mut out, "Status");
        labelled(&mut out, "State", snapshot.state.as_str());
        labelled(
            &mut out,
            "Target Dough Temperature",
            &format_temp(snapshot.target_temp_c),
        );

        section(&mut out, "Controls");
        labelled(
            &mut out,
            "Target Dough Temperature",
            &input.value().to_string(),
        );
        let _ = writeln!(out, "  (type a number, then 'submit' to set it)");
    }

    if let Some(polled) = status {
        let _ = writeln!(
            out,
            "\nUpdated {}",
            polled.received_at.format("%H:%M:%S UTC")
        );
    }

    out
}

pub fn format_temp(value: f32) -> String {
    format!("{value}°C")
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {title} ==");
}

fn labelled(out: &mut String, label: &str, text: &str) {
    let label = format!("{label}:");
    let _ = writeln!(out, "  {label:<26}{text}");
}
