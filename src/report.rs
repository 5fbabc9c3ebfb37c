//! Plain-text rendering of resolutions and the catalog for the terminal.

use crate::catalog::{Catalog, ServiceCenter};
use crate::location::WorkflowState;
use crate::proximity::rejection_message;
use std::fmt::Write;

/// Render a finished workflow state. Idle/Locating render as a one-liner.
pub fn render_resolution(state: &WorkflowState) -> String {
    let mut out = String::new();
    match state {
        WorkflowState::Resolved { sample, centers } => {
            let _ = writeln!(out, "  \u{1F4CD} {} ({})", sample.coordinate, sample.source);
            let _ = writeln!(out, "  Found {} GOHUBS centers near you.", centers.len());
            for (i, ranked) in centers.iter().enumerate() {
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "  {:>2}. {}  \u{2014}  {:.1} km away",
                    i + 1,
                    ranked.center.name,
                    ranked.distance_km
                );
                write_center_details(&mut out, &ranked.center);
            }
        }
        WorkflowState::Rejected { reason, failure } => {
            let message = rejection_message(*reason, *failure);
            match failure {
                Some(f) => {
                    let _ = writeln!(out, "  \u{26A0}\u{FE0F}  {} ({})", message, f);
                }
                None => {
                    let _ = writeln!(out, "  \u{26A0}\u{FE0F}  {}", message);
                }
            }
        }
        WorkflowState::Idle => out.push_str("  Click to find GOHUBS centers near you.\n"),
        WorkflowState::Locating { .. } => out.push_str("  Finding location...\n"),
    }
    out
}

/// Render the full catalog in catalog order.
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {} GOHUBS centers", catalog.len());
    for center in catalog.centers() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  [{}] {}  \u{2014}  {}", center.id, center.name, center.location);
        write_center_details(&mut out, center);
    }
    out
}

fn write_center_details(out: &mut String, center: &ServiceCenter) {
    if !center.address.is_empty() {
        let _ = writeln!(out, "      {}", center.address);
    }
    if !center.phone.is_empty() {
        let _ = writeln!(out, "      \u{260E} {}  ({})", center.phone, center.tel_uri());
    }
    if !center.services.is_empty() {
        let _ = writeln!(out, "      Services: {}", center.services.join(", "));
    }
}
