use tradesim_domain::value_objects::trade::{PersistedTrade, TradeSummary};

pub const TRADE_HEADERS: [&str; 6] = ["ID", "Ticker", "Side", "Quantity", "Price", "Timestamp"];

pub fn not_found(id: i64) -> String {
    format!("No trade found with ID: {id}")
}

pub fn trade_table(trade: &PersistedTrade) -> String {
    let row = vec![
        trade.id.to_string(),
        trade.ticker.clone(),
        trade.side.to_string(),
        trade.quantity.to_string(),
        format!("{:.2}", trade.price),
        trade.created_at.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
    ];
    grid(&TRADE_HEADERS, &[row])
}

/// Recent-rows report. Failed attempts are never stored, so this lists the
/// newest persisted trades as pointers into the simulator log.
pub fn investigation_report(limit: i64, recent: &[TradeSummary]) -> String {
    let mut lines = vec![
        "--- Note: This is a simulated log search ---".to_string(),
        "A full tool would search the simulator log for 'failed to process trade'.".to_string(),
        format!("Finding last {limit} simulated failed trades..."),
        "Recent successful trades (as a proxy for failed trade investigation):".to_string(),
    ];
    if recent.is_empty() {
        lines.push("No trades have been persisted yet.".to_string());
    }
    for summary in recent {
        lines.push(format!(
            "  - Investigated potential failure around trade ID {} for ticker {}",
            summary.id, summary.ticker
        ));
    }
    lines.join("\n")
}

/// Boxed text grid with a double rule under the header row.
pub fn grid(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut out = vec![rule(&widths, '-')];
    out.push(grid_row(&widths, headers));
    out.push(rule(&widths, '='));
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push(grid_row(&widths, &cells));
        out.push(rule(&widths, '-'));
    }
    if rows.is_empty() {
        out.push(rule(&widths, '-'));
    }
    out.join("\n")
}

fn rule(widths: &[usize], fill: char) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.extend(std::iter::repeat(fill).take(width + 2));
        line.push('+');
    }
    line
}

fn grid_row(widths: &[usize], cells: &[&str]) -> String {
    let mut line = String::from("|");
    for (idx, width) in widths.iter().enumerate() {
        let cell = cells.get(idx).copied().unwrap_or("");
        let pad = width.saturating_sub(cell.chars().count());
        line.push(' ');
        line.push_str(cell);
        line.extend(std::iter::repeat(' ').take(pad + 1));
        line.push('|');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{grid, investigation_report, not_found, trade_table};
    use chrono::{TimeZone, Utc};
    use tradesim_domain::value_objects::side::Side;
    use tradesim_domain::value_objects::trade::{PersistedTrade, TradeSummary};

    #[test]
    fn grid_pads_columns_to_widest_cell() {
        let rendered = grid(&["ID", "Ticker"], &[vec!["12345".to_string(), "AAPL".to_string()]]);
        let expected = "\
+-------+--------+
| ID    | Ticker |
+=======+========+
| 12345 | AAPL   |
+-------+--------+";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn trade_table_shows_every_column() {
        let trade = PersistedTrade {
            id: 7,
            ticker: "GOOG".to_string(),
            side: Side::Sell,
            quantity: 250,
            price: 123.4,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap(),
        };
        let rendered = trade_table(&trade);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("| ID "));
        assert!(lines[1].contains("| Timestamp "));
        assert!(lines[3].contains("| GOOG "));
        assert!(lines[3].contains("| SELL "));
        assert!(lines[3].contains("| 123.40 "));
        assert!(lines[3].contains("2024-03-01 12:30:05.000000"));
    }

    #[test]
    fn investigation_lists_each_recent_trade() {
        let recent = vec![
            TradeSummary { id: 9, ticker: "MSFT".to_string() },
            TradeSummary { id: 8, ticker: "GTSX".to_string() },
        ];
        let report = investigation_report(5, &recent);
        assert!(report.starts_with("--- Note: This is a simulated log search ---"));
        assert!(report.contains("  - Investigated potential failure around trade ID 9 for ticker MSFT"));
        assert!(report.ends_with("  - Investigated potential failure around trade ID 8 for ticker GTSX"));
    }

    #[test]
    fn not_found_message_names_the_id() {
        assert_eq!(not_found(999), "No trade found with ID: 999");
    }
}
