use vm::{Report, Stats, Tier};

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

fn row(label: &str, stats: &Stats) -> String {
    let replacements = stats.page_replacements;

    let counts: Vec<_> = Tier::ALL
        .iter()
        .map(|&tier| format!("{:3}", stats.attempts_for(tier)))
        .collect();
    let shares: Vec<_> = Tier::ALL
        .iter()
        .map(|&tier| format!("{:4.2}%", percent(stats.attempts_for(tier), replacements)))
        .collect();

    format!(
        "    {:<8} {:>8}    {:>5} ({:5.2}%)    {:>5} ({:5.2}%)    {} ({})\n",
        label,
        stats.page_accesses,
        stats.page_faults,
        percent(stats.page_faults, stats.page_accesses),
        replacements,
        percent(replacements, stats.page_accesses),
        counts.join(" + "),
        shares.join(" + "),
    )
}

/// The page access summary table: one row per process and a total row.
pub fn render(report: &Report) -> String {
    let mut out = String::from(
        "+++ Page access summary\n    PID      Accesses        Faults           Replacements          Attempts\n",
    );

    for (pid, stats) in report.processes.iter().enumerate() {
        out.push_str(&row(&pid.to_string(), stats));
    }

    out.push('\n');
    out.push_str(&row("Total", &report.total));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_guard_against_zero() {
        assert_eq!(percent(3, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn renders_process_and_total_rows() {
        let stats = Stats {
            page_accesses: 200,
            page_faults: 50,
            page_replacements: 20,
            attempts: [5, 10, 0, 5],
        };
        let report = Report {
            total: stats,
            processes: vec![stats],
        };

        let table = render(&report);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines[0], "+++ Page access summary");
        assert!(lines[2].trim_start().starts_with("0 "));
        assert!(lines[2].contains("(25.00%)"));
        assert!(lines[2].contains("(10.00%)"));
        assert!(lines[2].contains("5 +  10 +   0 +   5"));
        assert!(lines[2].contains("(25.00% + 50.00% + 0.00% + 25.00%)"));
        assert!(lines[4].trim_start().starts_with("Total"));
    }

    #[test]
    fn table_has_one_line_per_process_plus_total() {
        let stats = Stats {
            page_accesses: 9,
            page_faults: 3,
            page_replacements: 1,
            attempts: [0, 0, 0, 1],
        };
        let report = Report {
            total: stats,
            processes: vec![Stats::default(), stats],
        };

        let table = render(&report);

        assert!(table.ends_with('\n'));
        assert_eq!(table.lines().count(), 6);

        let lines: Vec<_> = table.lines().collect();
        assert!(lines[2].contains("(0.00% + 0.00% + 0.00% + 0.00%)"));
        assert!(lines[3].contains("  0 +   0 +   0 +   1 (0.00% + 0.00% + 0.00% + 100.00%)"));
    }
}
