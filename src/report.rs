// ===============================
// src/report.rs
// ===============================
//
// Lapisan presentasi tipis di atas Snapshot:
// - text: tabel per channel + ringkasan, warning bila alokasi != 100%
// - json: Snapshot apa adanya (serde_json, pretty)
// CPA sentinel (0) selalu dirender "N/A", bukan "$0.00".
//
use std::fmt::Write;

use crate::config::Format;
use crate::domain::Snapshot;

pub fn render(snap: &Snapshot, format: Format) -> Result<String, serde_json::Error> {
    match format {
        Format::Text => Ok(render_text(snap)),
        Format::Json => serde_json::to_string_pretty(snap),
    }
}

pub fn render_text(snap: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Multi-Channel Marketing Budget");
    let _ = writeln!(out, "Total monthly budget: {}", money(snap.total_budget));

    if !snap.balanced {
        let _ = writeln!(
            out,
            "WARNING: total allocation must equal 100% (currently: {}%)",
            number(snap.total_allocation, 2)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:<20} {:>7} {:>14} {:>10} {:>12} {:>12}",
        "Channel", "Alloc%", "Budget", "Clicks", "Conversions", "CPA"
    );
    for row in &snap.channels {
        let m = &row.metrics;
        let _ = writeln!(
            out,
            "{:<20} {:>7} {:>14} {:>10} {:>12} {:>12}",
            row.channel.name,
            number(row.channel.allocation, 2),
            money(m.budget),
            count(m.clicks),
            count(m.conversions),
            cpa(m.cpa_value()),
        );
    }

    let agg = &snap.aggregate;
    let _ = writeln!(out);
    let _ = writeln!(out, "Summary");
    let _ = writeln!(out, "  Total clicks:      {}", count(agg.total_clicks));
    let _ = writeln!(out, "  Total conversions: {}", count(agg.total_conversions));
    let _ = writeln!(out, "  Avg. CPA:          {}", cpa(agg.avg_cpa_value()));
    out
}

fn cpa(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("${}", fixed2(v)),
        None => "N/A".to_string(),
    }
}

fn money(v: f64) -> String {
    format!("${}", number(v, 2))
}

fn count(v: u64) -> String {
    group(&v.to_string())
}

/// Ribuan dipisah koma, desimal dibuang bila nol (4000 -> "4,000", 12.5 -> "12.5").
fn number(v: f64, max_decimals: usize) -> String {
    let s = format!("{:.*}", max_decimals, v);
    let (int, frac) = match s.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (s.as_str(), ""),
    };
    if frac.is_empty() {
        group(int)
    } else {
        format!("{}.{}", group(int), frac)
    }
}

fn fixed2(v: f64) -> String {
    let s = format!("{:.2}", v);
    match s.split_once('.') {
        Some((i, f)) => format!("{}.{}", group(i), f),
        None => group(&s),
    }
}

fn group(int: &str) -> String {
    let (sign, digits) = match int.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", int),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{sign}{out}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChannelId;
    use crate::engine::AllocationEngine;

    #[test]
    fn number_formatting() {
        assert_eq!(number(4000.0, 2), "4,000");
        assert_eq!(number(1234567.5, 2), "1,234,567.5");
        assert_eq!(number(999.0, 2), "999");
        assert_eq!(fixed2(333.3333), "333.33");
        assert_eq!(fixed2(100.0), "100.00");
        assert_eq!(count(1600), "1,600");
    }

    #[test]
    fn text_report_balanced_seed() {
        let out = render_text(&AllocationEngine::default().snapshot());
        assert!(out.contains("$10,000"));
        assert!(out.contains("Google Ads"));
        assert!(out.contains("$100.00"));
        assert!(!out.contains("WARNING"));
    }

    #[test]
    fn text_report_warns_and_shows_na() {
        let mut eng = AllocationEngine::default();
        eng.set_channel_allocation(ChannelId(1), 41.0);
        let out = render_text(&eng.snapshot());
        assert!(out.contains("currently: 101%"));

        eng.set_total_budget(0.0);
        let out = render_text(&eng.snapshot());
        assert!(out.contains("N/A"));
        assert!(!out.contains("$0.00"));
    }

    #[test]
    fn json_report_roundtrips_snapshot() {
        let snap = AllocationEngine::default().snapshot();
        let raw = render(&snap, Format::Json).unwrap();
        let back: Snapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, snap);
    }
}
