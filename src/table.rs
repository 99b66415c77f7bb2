use crate::errors::FetchError;
use crate::fetcher::{EmptyReason, Fetched};
use crate::models::{LooseNumber, Mode, NicknameStats, RankingRow, StatsPayload};

const NO_RECORDS: &str = "No records found.";
const NO_RESULTS: &str = "No results.";

pub fn render_ranking(rows: &[RankingRow]) -> String {
    let mut html = String::from(
        "<table><thead><tr><th>Rank</th><th>Nickname</th><th>Total amount</th>\
         <th>Net profit</th><th>Bets</th><th>Wins</th><th>Win rate (%)</th></tr></thead><tbody>",
    );
    for (idx, row) in rows.iter().enumerate() {
        html.push_str("<tr>");
        push_cell(&mut html, &(idx + 1).to_string());
        push_cell(&mut html, &escape_html(&row.nickname));
        push_cell(&mut html, &format_amount(row.total_amount));
        push_cell(&mut html, &format_amount(row.total_profit));
        push_cell(&mut html, &format_amount(row.total_bets));
        push_cell(&mut html, &format_amount(row.wins));
        push_cell(&mut html, &format_percent(row.win_rate));
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

pub fn render_stats(mode: Mode, payload: &StatsPayload) -> String {
    let period_header = match mode {
        Mode::MonthlyBetting => "Month",
        Mode::DailyBetting => "Date",
    };

    let mut html = String::new();
    for (nickname, stats) in &payload.entries {
        html.push_str(&format!("<h3>{} ({})</h3>", escape_html(nickname), mode.label()));
        let rows = match stats {
            NicknameStats::Rows(rows) => rows,
            NicknameStats::NoRecords => {
                html.push_str("<p>No records</p>");
                continue;
            }
        };

        html.push_str(&format!(
            "<table><thead><tr><th>{period_header}</th><th>Total amount</th><th>Net profit</th>\
             <th>Bets</th><th>Wins</th><th>Win rate (%)</th></tr></thead><tbody>"
        ));
        for row in rows {
            html.push_str("<tr>");
            push_cell(&mut html, &escape_html(&row.period_label));
            push_cell(&mut html, &format_amount(row.total_amount));
            push_cell(&mut html, &format_amount(row.total_profit));
            push_cell(&mut html, &format_amount(row.total_bets));
            push_cell(&mut html, &format_amount(row.wins));
            push_cell(&mut html, &format_percent(row.win_rate));
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
    }
    html
}

pub fn render_ranking_outcome(outcome: &Result<Fetched<Vec<RankingRow>>, FetchError>) -> String {
    match outcome {
        Ok(Fetched::Rows(rows)) => render_ranking(rows),
        Ok(Fetched::Empty(reason)) => render_empty(reason),
        Err(err) => render_failure(err),
    }
}

pub fn render_stats_outcome(mode: Mode, outcome: &Result<Fetched<StatsPayload>, FetchError>) -> String {
    match outcome {
        Ok(Fetched::Rows(payload)) => render_stats(mode, payload),
        Ok(Fetched::Empty(reason)) => render_empty(reason),
        Err(err) => render_failure(err),
    }
}

pub fn render_empty(reason: &EmptyReason) -> String {
    match reason {
        EmptyReason::NoRecords => render_message(NO_RECORDS),
        EmptyReason::NoResults => render_message(NO_RESULTS),
        EmptyReason::Server(message) => render_message(message),
    }
}

pub fn render_failure(err: &FetchError) -> String {
    match err {
        FetchError::Status { .. } => render_message(&format!("Error: {err}")),
        _ => render_message(&format!("Request failed: {err}")),
    }
}

pub fn render_message(message: &str) -> String {
    format!("<p>{}</p>", escape_html(message))
}

/// Grouped amount with up to three fraction digits; non-numbers render as `0`.
pub fn format_amount(value: LooseNumber) -> String {
    let num = value.finite().unwrap_or(0.0);
    let rounded = (num * 1000.0).round() / 1000.0;
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

pub fn format_percent(value: LooseNumber) -> String {
    match value.finite() {
        // -0.0 prints as "-0.00" otherwise.
        Some(num) if num == 0.0 => "0.00%".to_string(),
        Some(num) => format!("{num:.2}%"),
        None => "-".to_string(),
    }
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn push_cell(html: &mut String, content: &str) {
    html.push_str("<td>");
    html.push_str(content);
    html.push_str("</td>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodRow;

    fn n(value: f64) -> LooseNumber {
        LooseNumber::new(value)
    }

    #[test]
    fn amounts_are_grouped() {
        assert_eq!(format_amount(n(0.0)), "0");
        assert_eq!(format_amount(n(999.0)), "999");
        assert_eq!(format_amount(n(1000.0)), "1,000");
        assert_eq!(format_amount(n(1234567.0)), "1,234,567");
        assert_eq!(format_amount(n(-250000.0)), "-250,000");
        assert_eq!(format_amount(n(1234.5)), "1,234.5");
        assert_eq!(format_amount(n(0.12345)), "0.123");
        assert_eq!(format_amount(n(-0.0001)), "0");
    }

    #[test]
    fn missing_amounts_fall_back_to_zero() {
        assert_eq!(format_amount(LooseNumber::not_a_number()), "0");
        let null: LooseNumber = serde_json::from_str("null").unwrap();
        assert_eq!(format_amount(null), "0");
    }

    #[test]
    fn percentages_use_two_decimals() {
        assert_eq!(format_percent(n(60.0)), "60.00%");
        assert_eq!(format_percent(n(33.333)), "33.33%");
        assert_eq!(format_percent(n(-0.0)), "0.00%");
        assert_eq!(format_percent(n(-12.5)), "-12.50%");
        assert_eq!(format_percent(LooseNumber::not_a_number()), "-");
        let text: LooseNumber = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(format_percent(text), "-");
    }

    #[test]
    fn ranking_table_rows_are_ranked_in_order() {
        let rows: Vec<RankingRow> = serde_json::from_str(
            r#"[{"nickname":"A","total_amount":1000,"total_profit":200,"total_bets":5,"wins":3,"win_rate":60},
                {"nickname":"B","total_amount":10,"total_profit":-5,"total_bets":1,"wins":0,"win_rate":0}]"#,
        )
        .unwrap();

        let html = render_ranking(&rows);
        assert!(html.contains(
            "<tr><td>1</td><td>A</td><td>1,000</td><td>200</td><td>5</td><td>3</td><td>60.00%</td></tr>"
        ));
        assert!(html.contains("<tr><td>2</td><td>B</td><td>10</td><td>-5</td>"));
        assert!(html.find(">A<").unwrap() < html.find(">B<").unwrap());
    }

    #[test]
    fn nicknames_are_escaped() {
        let rows: Vec<RankingRow> =
            serde_json::from_str(r#"[{"nickname":"<b>x</b>","win_rate":"abc"}]"#).unwrap();
        let html = render_ranking(&rows);
        assert!(html.contains("<td>&lt;b&gt;x&lt;/b&gt;</td>"));
        assert!(html.contains("<td>-</td>"));
    }

    #[test]
    fn stats_sections_per_nickname() {
        let rows: Vec<PeriodRow> = serde_json::from_str(
            r#"[{"stat_date":"2026-10-02","total_amount":5000,"total_profit":-1200,"total_bets":4,"wins":1,"win_rate":25}]"#,
        )
        .unwrap();
        let payload = StatsPayload {
            entries: vec![
                ("A".to_string(), NicknameStats::Rows(rows)),
                ("B".to_string(), NicknameStats::NoRecords),
            ],
        };

        let html = render_stats(Mode::DailyBetting, &payload);
        assert!(html.starts_with("<h3>A (Daily betting)</h3><table><thead><tr><th>Date</th>"));
        assert!(html.contains(
            "<tr><td>2026-10-02</td><td>5,000</td><td>-1,200</td><td>4</td><td>1</td><td>25.00%</td></tr>"
        ));
        assert!(html.ends_with("<h3>B (Daily betting)</h3><p>No records</p>"));
    }

    #[test]
    fn outcomes_render_inline_messages() {
        assert_eq!(
            render_stats_outcome(Mode::MonthlyBetting, &Ok(Fetched::Empty(EmptyReason::NoRecords))),
            "<p>No records found.</p>"
        );
        assert_eq!(
            render_ranking_outcome(&Err(FetchError::Status {
                code: 502,
                reason: Some("Bad Gateway")
            })),
            "<p>Error: 502 Bad Gateway</p>"
        );
        assert_eq!(
            render_ranking_outcome(&Err(FetchError::Transport("connection refused".to_string()))),
            "<p>Request failed: connection refused</p>"
        );
        assert_eq!(
            render_empty(&EmptyReason::Server("user <none>".to_string())),
            "<p>user &lt;none&gt;</p>"
        );
    }
}
