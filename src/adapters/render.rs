//! Terminal rendering of the views: plain text, no terminal control codes.

use crate::app::candidate::{AmountLine, CandidateProfile};
use crate::app::legislators::LegislatorList;
use crate::app::routes::Route;
use crate::core::events::{Subscribers, Subscription, WidthChanged};
use crate::core::format::format_number;
use crate::domain::model::ChartPoint;
use std::fmt::Write;
use std::sync::{Arc, Mutex};

const BAR: char = '█';
const MAX_LABEL: usize = 32;

fn truncate_label(name: &str) -> String {
    if name.chars().count() <= MAX_LABEL {
        name.to_string()
    } else {
        let mut cut: String = name.chars().take(MAX_LABEL - 1).collect();
        cut.push('~');
        cut
    }
}

fn grouped(value: u64) -> String {
    let plain = value.to_string();
    format_number(&plain).unwrap_or(plain)
}

/// Horizontal bars in input order, scaled so the largest value spans `width`.
pub fn render_bar_chart(title: &str, points: &[ChartPoint], width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    if points.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return out;
    }

    let labels: Vec<String> = points.iter().map(|p| truncate_label(&p.name)).collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max = points.iter().map(|p| p.value).max().unwrap_or(0);

    for (point, label) in points.iter().zip(&labels) {
        let len = if max == 0 {
            0
        } else {
            (u128::from(point.value) * width as u128 / u128::from(max)) as usize
        };
        let bar: String = std::iter::repeat(BAR).take(len).collect();
        let pad = label_width - label.chars().count();
        let _ = writeln!(
            out,
            "  {}{} {}{} {}",
            label,
            " ".repeat(pad),
            bar,
            " ".repeat(width - len),
            grouped(point.value)
        );
    }
    out
}

pub fn render_legislators(list: &LegislatorList) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Legislators: {} ({})", list.state_name, list.state_code);

    if list.entries.is_empty() {
        let _ = writeln!(out, "  (none returned)");
        return out;
    }

    for (index, entry) in list.entries.iter().enumerate() {
        let _ = write!(out, "  {:>2}. {}", index + 1, entry.name);
        if !entry.party.is_empty() {
            let _ = write!(out, " ({})", entry.party);
        }
        if !entry.office.is_empty() {
            let _ = write!(out, " {}", entry.office);
        }
        if let Some(link) = &entry.link {
            let _ = write!(out, "  -> {}", link);
        }
        out.push('\n');
    }
    out
}

fn render_lines(out: &mut String, title: &str, lines: &[AmountLine]) {
    let _ = writeln!(out, "{}", title);
    if lines.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for line in lines {
        let _ = writeln!(out, "  {}: {}", line.name, line.amount.currency());
    }
}

pub fn render_candidate(profile: &CandidateProfile, chart_width: usize) -> String {
    let s = &profile.summary;
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", s.name, s.party);
    let _ = writeln!(out, "{}", s.state);
    if !s.chamber.is_empty() {
        let _ = writeln!(
            out,
            "Chamber: {}  First elected: {}  Next election: {}",
            s.chamber, s.first_elected, s.next_election
        );
    }
    let _ = writeln!(out, "Total Raised: {}", s.total.currency());
    let _ = writeln!(out, "Spent: {}", s.spent.currency());
    let _ = writeln!(out, "Cash on Hand: {}", s.cash_on_hand.currency());
    let _ = writeln!(out, "Debt: {}", s.debt.currency());
    if !s.last_updated.is_empty() {
        let _ = writeln!(out, "Last updated: {}  Source: {}", s.last_updated, s.source);
    }
    out.push('\n');

    render_lines(&mut out, "Candidate Sectors", &profile.sectors);
    out.push('\n');
    render_lines(&mut out, "Top Contributors", &profile.contributors);
    out.push('\n');

    out.push_str(&render_bar_chart("Sector totals", &profile.sector_chart, chart_width));
    out.push('\n');
    out.push_str(&render_bar_chart(
        "Contributor totals",
        &profile.contributor_chart,
        chart_width,
    ));
    out.push('\n');

    let here = Route::Candidate { cid: s.cid.clone() };
    let _ = writeln!(out, "Go back: {}", here.back());
    out
}

/// A chart bound to a width source: redraws its points whenever the width changes.
///
/// The listener lives as long as the panel.
pub struct ChartPanel {
    frame: Arc<Mutex<String>>,
    _subscription: Subscription<WidthChanged>,
}

impl ChartPanel {
    pub fn attach(
        hub: &Subscribers<WidthChanged>,
        title: impl Into<String>,
        points: Vec<ChartPoint>,
        width: usize,
    ) -> Self {
        let title = title.into();
        let frame = Arc::new(Mutex::new(render_bar_chart(&title, &points, width)));

        let target = Arc::clone(&frame);
        let subscription = hub.subscribe(move |WidthChanged(width)| {
            let redrawn = render_bar_chart(&title, &points, *width);
            *target.lock().unwrap_or_else(|p| p.into_inner()) = redrawn;
        });

        Self {
            frame,
            _subscription: subscription,
        }
    }

    pub fn frame(&self) -> String {
        self.frame.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}
