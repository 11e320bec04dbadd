//! Formatting utilities.

use chrono::NaiveDate;

/// Format a byte count as a human-readable size.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Format an amount in euros the way the on-screen preview does: `1.234,56 €`.
pub fn format_money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let units = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}{},{:02} €", sign, grouped, fraction)
}

/// Format a rate as a percentage, dropping decimals when the rate is whole.
pub fn format_percent(rate: f64) -> String {
    if (rate - rate.round()).abs() < 1e-9 {
        format!("{}%", rate.round() as i64)
    } else {
        let text = format!("{:.2}", rate);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        format!("{}%", text.replace('.', ","))
    }
}

/// Format an ISO date (`YYYY-MM-DD`, optionally with a time part) as `dd/mm/yyyy`.
///
/// Unparseable input is returned unchanged.
pub fn format_date(value: &str) -> String {
    let date_part = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1500), "1.5 KB");
        assert_eq!(format_size(1_500_000), "1.5 MB");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0,00 €");
        assert_eq!(format_money(5.5), "5,50 €");
        assert_eq!(format_money(1234.567), "1.234,57 €");
        assert_eq!(format_money(1_000_000.0), "1.000.000,00 €");
        assert_eq!(format_money(-250.1), "-250,10 €");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(21.0), "21%");
        assert_eq!(format_percent(10.5), "10,5%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-01"), "01/03/2025");
        assert_eq!(format_date("2025-12-31T10:00:00+00:00"), "31/12/2025");
        assert_eq!(format_date("pronto"), "pronto");
    }
}
