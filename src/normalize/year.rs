use once_cell::sync::Lazy;
use regex::Regex;

static FULL_YEAR_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{4})$").expect("year range regex is valid"));

/// `"2014-2015"` → `"2014-15"`. Anything not shaped `YYYY-YYYY` comes back
/// unchanged.
pub fn format_financial_year(raw: &str) -> String {
    match FULL_YEAR_RANGE.captures(raw) {
        Some(caps) => format!("{}-{}", &caps[1], &caps[2][2..]),
        None => raw.to_string(),
    }
}

/// Calendar year the financial year starts in: `"2014-15"` → `Some(2014)`.
pub fn year_start(financial_year: &str) -> Option<i32> {
    financial_year.split('-').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_range_is_shortened() {
        assert_eq!(format_financial_year("2014-2015"), "2014-15");
        assert_eq!(format_financial_year("1999-2000"), "1999-00");
    }

    #[test]
    fn other_shapes_pass_through() {
        assert_eq!(format_financial_year("2014/15"), "2014/15");
        assert_eq!(format_financial_year("2014-15"), "2014-15");
        assert_eq!(format_financial_year(" 2014-2015"), " 2014-2015");
        assert_eq!(format_financial_year(""), "");
    }

    #[test]
    fn year_start_reads_leading_year() {
        assert_eq!(year_start("2014-15"), Some(2014));
        assert_eq!(year_start("2020"), Some(2020));
        assert_eq!(year_start("unknown"), None);
    }
}
