//! Number and date rendering in the en-IN conventions the dashboard uses:
//! lakh/crore digit grouping, rupee amounts to three significant digits,
//! and compact `K`/`L`/`Cr` suffixes.

use chrono::NaiveDate;

/// Group an integer digit string Indian style: last three digits, then pairs.
fn group_digits(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (h, t) = rest.split_at(rest.len() - 2);
        groups.push(t);
        rest = h;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Render `value` with at most `decimals` fraction digits, trailing zeros
/// dropped, and Indian grouping on the integer part.
fn grouped(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int, frac) = match text.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (text.as_str(), ""),
    };
    let sign = if value < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{sign}{}", group_digits(int))
    } else {
        format!("{sign}{}.{frac}", group_digits(int))
    }
}

/// `1234567.891` → `12,34,567.891`
pub fn number(value: f64) -> String {
    grouped(value, 3)
}

/// Rupees rounded to three significant digits: `1234567` → `₹12,30,000`.
pub fn inr(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "₹0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let places = 2 - magnitude;
    let rounded = if places >= 0 {
        let f = 10f64.powi(places);
        (value * f).round() / f
    } else {
        let f = 10f64.powi(-places);
        (value / f).round() * f
    };
    let text = grouped(rounded, places.max(0) as usize);
    match text.strip_prefix('-') {
        Some(unsigned) => format!("-₹{unsigned}"),
        None => format!("₹{text}"),
    }
}

/// Two decimals and a percent sign: `17.254` → `17.25%`.
pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Compact Indian notation: `1234` → `1.2K`, `250000` → `2.5L`,
/// `35000000` → `3.5Cr`.
pub fn compact(value: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e7, "Cr"), (1e5, "L"), (1e3, "K")];
    let abs = value.abs();
    for (unit, suffix) in UNITS {
        if abs >= unit {
            let scaled = value / unit;
            let decimals = if scaled.abs() < 10.0 { 1 } else { 0 };
            return format!("{}{suffix}", grouped(scaled, decimals));
        }
    }
    grouped(value, 0)
}

/// `2023-10-05` → `Oct 5`
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indian_grouping() {
        assert_eq!(number(0.0), "0");
        assert_eq!(number(999.0), "999");
        assert_eq!(number(1000.0), "1,000");
        assert_eq!(number(100000.0), "1,00,000");
        assert_eq!(number(1234567.0), "12,34,567");
        assert_eq!(number(123456789.0), "12,34,56,789");
        assert_eq!(number(-98765.4321), "-98,765.432");
    }

    #[test]
    fn rupees_keep_three_significant_digits() {
        assert_eq!(inr(500000.0), "₹5,00,000");
        assert_eq!(inr(1234567.0), "₹12,30,000");
        assert_eq!(inr(12.345), "₹12.3");
        assert_eq!(inr(0.0), "₹0");
        assert_eq!(inr(-4567.0), "-₹4,570");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(percent(17.254), "17.25%");
        assert_eq!(percent(0.0), "0.00%");
    }

    #[test]
    fn compact_uses_lakh_and_crore() {
        assert_eq!(compact(950.0), "950");
        assert_eq!(compact(1234.0), "1.2K");
        assert_eq!(compact(45000.0), "45K");
        assert_eq!(compact(250000.0), "2.5L");
        assert_eq!(compact(100000.0), "1L");
        assert_eq!(compact(35000000.0), "3.5Cr");
    }

    #[test]
    fn short_date_drops_leading_zero() {
        let d: NaiveDate = "2023-10-05".parse().unwrap();
        assert_eq!(short_date(d), "Oct 5");
        let d: NaiveDate = "2023-11-20".parse().unwrap();
        assert_eq!(short_date(d), "Nov 20");
    }
}
