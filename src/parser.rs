use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Label that introduces an explicit invoice date.
pub const DATE_LABEL: &str = "Invoice date:";

/// Accepted input date layouts, tried in order. Day/month before month/day.
pub const DATE_FORMATS: [&str; 4] = ["%d.%m.%Y", "%m/%d/%Y", "%Y-%m-%d", "%b %d, %Y"];

/// Canonical output layout for every recognized date.
pub const CANONICAL_DATE_FORMAT: &str = "%d-%m-%Y";

// Billing period such as "01.02.2024 - 28.02.2024"; the separator inside a date is any char.
static DATE_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2}.\d{2}.\d{4})\s*-\s*(\d{2}.\d{2}.\d{4})").unwrap());

// Year field of each entry in DATE_FORMATS, same order. `%Y` alone takes any digit count.
static YEAR_GUARDS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"\D\d{4}$").unwrap(),
        Regex::new(r"\D\d{4}$").unwrap(),
        Regex::new(r"^\d{4}\D").unwrap(),
        Regex::new(r"\D\d{4}$").unwrap(),
    ]
});

// Everything that can't be part of an amount.
static NON_AMOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d,.-]").unwrap());

/// Returns the text following `label` on the first line that contains it.
///
/// The remainder is taken after the label's last occurrence on that line and
/// trimmed. Scanning stops at the first matching line.
pub fn locate_value<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines()
        .find_map(|line| line.rsplit_once(label))
        .map(|(_, rest)| rest.trim())
}

/// Tries each label in order and returns the first hit with the label that matched.
pub fn locate_value_with_fallback<'a, 'l, S: AsRef<str>>(
    text: &'a str,
    labels: &'l [S],
) -> Option<(&'l str, &'a str)> {
    labels.iter().find_map(|label| {
        let label = label.as_ref();
        locate_value(text, label).map(|value| (label, value))
    })
}

/// Finds a date candidate in the extracted text.
///
/// Lines are scanned once, in order. On each line an `Invoice date:` label wins;
/// otherwise a date range yields its start date. The first line that produces
/// either ends the scan.
pub fn locate_date(text: &str) -> Option<&str> {
    text.lines().find_map(|line| {
        if let Some((_, rest)) = line.rsplit_once(DATE_LABEL) {
            return Some(rest.trim());
        }
        DATE_RANGE_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })
}

/// Parses a date with the first matching entry of [`DATE_FORMATS`].
///
/// The year must have exactly four digits.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .zip(YEAR_GUARDS.iter())
        .filter(|(_, guard)| guard.is_match(raw))
        .find_map(|(fmt, _)| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Reformats a date candidate to `DD-MM-YYYY`, or hands it back untouched when
/// no known layout fits.
pub fn normalize_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format(CANONICAL_DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Cleans an amount string down to digits and separators.
///
/// Amounts carrying a `€` sign use the European convention, so `.` and `,`
/// swap roles first ("1.234,56 €" reads as "1,234.56"). Anything other than
/// digits, `,`, `.` and `-` is then dropped.
pub fn normalize_value(raw: &str) -> String {
    let swapped: String = if raw.contains('€') {
        raw.chars()
            .map(|c| match c {
                '.' => ',',
                ',' => '.',
                other => other,
            })
            .collect()
    } else {
        raw.to_string()
    };
    NON_AMOUNT_RE.replace_all(&swapped, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INVOICE: &str = "ACME GmbH\n\
        Invoice date: 12.03.2024\n\
        Net Amount 167.23 €\n\
        Gross Amount incl. VAT 199.00 €\n\
        Total 199.00 €\n";

    #[test]
    fn test_locate_value_returns_trailing_text() {
        assert_eq!(
            locate_value(INVOICE, "Gross Amount incl. VAT"),
            Some("199.00 €")
        );
    }

    #[test]
    fn test_locate_value_first_line_wins() {
        let text = "Total 10.00\nTotal 20.00\n";
        assert_eq!(locate_value(text, "Total"), Some("10.00"));
    }

    #[test]
    fn test_locate_value_uses_last_occurrence_on_line() {
        let text = "Total Total: 42.00 USD";
        assert_eq!(locate_value(text, "Total"), Some(": 42.00 USD"));
    }

    #[test]
    fn test_locate_value_missing_label() {
        assert_eq!(locate_value("nothing to see here", "Total"), None);
    }

    #[test]
    fn test_fallback_label_used_when_primary_missing() {
        let text = "Invoice 4711\nTotal: 50.00 USD\n";
        let labels = ["Gross Amount incl. VAT", "Total"];
        assert_eq!(
            locate_value_with_fallback(text, &labels),
            Some(("Total", ": 50.00 USD"))
        );
    }

    #[test]
    fn test_primary_label_preferred_over_fallback() {
        let labels = ["Gross Amount incl. VAT", "Total"];
        assert_eq!(
            locate_value_with_fallback(INVOICE, &labels),
            Some(("Gross Amount incl. VAT", "199.00 €"))
        );
    }

    #[test]
    fn test_locate_date_label() {
        assert_eq!(locate_date(INVOICE), Some("12.03.2024"));
    }

    #[test]
    fn test_locate_date_period_start() {
        let text = "Customer 123\nInvoice period: 01.02.2024 - 28.02.2024\n";
        let candidate = locate_date(text).unwrap();
        assert_eq!(candidate, "01.02.2024");
        assert_eq!(normalize_date(candidate), "01-02-2024");
    }

    #[test]
    fn test_locate_date_range_without_spaces() {
        assert_eq!(locate_date("01/02/2024-28/02/2024"), Some("01/02/2024"));
    }

    #[test]
    fn test_locate_date_label_beats_range_on_same_line() {
        let text = "Invoice date: Mar 1, 2024 (01.02.2024 - 28.02.2024)";
        assert_eq!(
            locate_date(text),
            Some("Mar 1, 2024 (01.02.2024 - 28.02.2024)")
        );
    }

    #[test]
    fn test_locate_date_earlier_range_line_wins() {
        let text = "Period 01.02.2024 - 28.02.2024\nInvoice date: 05.03.2024\n";
        assert_eq!(locate_date(text), Some("01.02.2024"));
    }

    #[test]
    fn test_locate_date_none() {
        assert_eq!(locate_date("Total 12.00\nThanks!"), None);
    }

    #[test]
    fn test_normalize_date_all_formats() {
        assert_eq!(normalize_date("05.01.2024"), "05-01-2024");
        assert_eq!(normalize_date("01/05/2024"), "05-01-2024");
        assert_eq!(normalize_date("2024-01-05"), "05-01-2024");
        assert_eq!(normalize_date("Jan 5, 2024"), "05-01-2024");
        assert_eq!(normalize_date("Dec 31, 1999"), "31-12-1999");
    }

    #[test]
    fn test_normalize_date_pads_day_and_month() {
        assert_eq!(normalize_date("7.3.2024"), "07-03-2024");
        assert_eq!(normalize_date("3/7/2024"), "07-03-2024");
    }

    #[test]
    fn test_normalize_date_unknown_is_identity() {
        for raw in ["next Tuesday", "2024/01/05", "31.02.2024", ""] {
            assert_eq!(normalize_date(raw), raw);
        }
    }

    #[test]
    fn test_normalize_date_requires_four_digit_year() {
        for raw in ["05.01.24", "01/05/24", "24-01-05", "Jan 5, 24", "05.01.12024", "12024-01-05"] {
            assert_eq!(normalize_date(raw), raw);
        }
        assert_eq!(parse_date("05.01.0024"), NaiveDate::from_ymd_opt(24, 1, 5));
    }

    #[test]
    fn test_normalize_value_euro_swaps_separators() {
        assert_eq!(normalize_value("1.234,56 €"), "1,234.56");
        assert_eq!(normalize_value("199,00€"), "199.00");
    }

    #[test]
    fn test_normalize_value_keeps_us_separators() {
        assert_eq!(normalize_value("$1,234.56"), "1,234.56");
        assert_eq!(normalize_value(": 50.00 USD"), "50.00");
    }

    #[test]
    fn test_normalize_value_keeps_minus() {
        assert_eq!(normalize_value("-12,50 €"), "-12.50");
    }

    #[test]
    fn test_normalize_value_no_digits() {
        assert_eq!(normalize_value("n/a"), "");
    }
}
