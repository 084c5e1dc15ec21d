//! Document number formatting

use chrono::NaiveDate;

/// Format a document number as `PREFIX-DDMMYY-SERIAL`.
///
/// The daily serial is zero-padded to two digits and widens naturally once
/// a mill crosses 99 documents of one kind in a day.
pub fn format_document_number(prefix: &str, date: NaiveDate, serial: i64) -> String {
    format!("{}-{}-{:02}", prefix, date.format("%d%m%y"), serial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_day_month_year_and_padded_serial() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_document_number("PDP", date, 1), "PDP-050324-01");
        assert_eq!(format_document_number("PDP", date, 42), "PDP-050324-42");
    }

    #[test]
    fn serial_widens_past_two_digits() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(format_document_number("RCS", date, 100), "RCS-311224-100");
    }
}
