//! Date extraction.
//!
//! Dates are searched in three field orders (day-month-year, month-day-year,
//! year-month-day). A document usually sticks to one order, so the order with
//! the most matches wins.

use regex::Regex;
use tracing::{debug, warn};

use crate::models::invoice::{DateData, DatePartsPosition};

use super::patterns::{
    DATE_DAY_MONTH_YEAR, DATE_MONTH_DAY_YEAR, DATE_PART_SEPARATOR, DATE_YEAR_MONTH_DAY,
};
use super::FieldExtractor;

/// Date field extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// All dates matching one field order.
    pub fn find_dates<S: AsRef<str>>(
        &self,
        lines: &[S],
        pattern: &Regex,
        positions: DatePartsPosition,
    ) -> Vec<DateData> {
        lines
            .iter()
            .flat_map(|line| {
                let line = line.as_ref();
                pattern
                    .find_iter(line)
                    .filter_map(move |m| map_string_to_date(line, m.as_str(), positions))
            })
            .collect()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = DateData;

    fn extract_from_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<DateData> {
        let candidates: [(&Regex, DatePartsPosition); 3] = [
            (&*DATE_DAY_MONTH_YEAR, DatePartsPosition::DAY_MONTH_YEAR),
            (&*DATE_MONTH_DAY_YEAR, DatePartsPosition::MONTH_DAY_YEAR),
            (&*DATE_YEAR_MONTH_DAY, DatePartsPosition::YEAR_MONTH_DAY),
        ];

        // Ties keep the earlier field order.
        let dates = candidates
            .into_iter()
            .map(|(pattern, positions)| self.find_dates(lines, pattern, positions))
            .fold(Vec::new(), |largest, dates| {
                if dates.len() > largest.len() {
                    dates
                } else {
                    largest
                }
            });

        debug!("Found {} dates", dates.len());
        dates
    }
}

/// Split a matched date on its separators and read the fields at `positions`.
fn map_string_to_date(line: &str, date: &str, positions: DatePartsPosition) -> Option<DateData> {
    let parts: Vec<&str> = DATE_PART_SEPARATOR.split(date).collect();

    if parts.len() != 3 {
        debug!("Date {:?} does not have three parts", date);
        return None;
    }

    let part = |position: usize| parts.get(position.wrapping_sub(1)).copied().unwrap_or("");

    match (
        part(positions.day_position).parse::<u32>(),
        part(positions.month_position).parse::<u32>(),
        part(positions.year_position).parse::<i32>(),
    ) {
        (Ok(day), Ok(month), Ok(year)) => Some(DateData {
            day,
            month,
            year,
            text: date.to_string(),
            line: line.to_string(),
        }),
        _ => {
            warn!("Could not map date string {:?} to a date", date);
            None
        }
    }
}

/// Extract dates from invoice text.
pub fn extract_dates(text: &str) -> Vec<DateData> {
    DateExtractor::new().extract_all(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ymd(dates: &[DateData]) -> Vec<(i32, u32, u32)> {
        dates.iter().map(|d| (d.year, d.month, d.day)).collect()
    }

    #[test]
    fn test_extract_date_dmy() {
        let result = DateExtractor::new().extract("Rechnungsdatum: 15.01.2024").unwrap();

        assert_eq!((result.year, result.month, result.day), (2024, 1, 15));
        assert_eq!(result.text, "15.01.2024");
        assert_eq!(result.line, "Rechnungsdatum: 15.01.2024");
        assert_eq!(result.to_naive_date(), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_extract_date_mdy() {
        let dates = DateExtractor::new().extract_all("Invoice date 01/15/2024\nDue 01/29/2024");

        assert_eq!(ymd(&dates), vec![(2024, 1, 15), (2024, 1, 29)]);
    }

    #[test]
    fn test_extract_date_ymd() {
        let dates = DateExtractor::new().extract_all("Date: 2024-01-15");

        assert_eq!(ymd(&dates), vec![(2024, 1, 15)]);
    }

    #[test]
    fn test_two_digit_year() {
        let result = DateExtractor::new().extract("15.01.24").unwrap();

        assert_eq!((result.year, result.month, result.day), (24, 1, 15));
        assert_eq!(result.to_naive_date(), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_ambiguous_dates_prefer_day_month_year() {
        // 05.06.2024 reads as both DMY and MDY; equal counts keep DMY.
        let dates = DateExtractor::new().extract_all("Lieferdatum 05.06.2024");

        assert_eq!(ymd(&dates), vec![(2024, 6, 5)]);
    }

    #[test]
    fn test_largest_list_wins() {
        let text = "Issued 03/25/2024\nShipped 03/20/2024\nPaid 04/02/2024";
        let dates = DateExtractor::new().extract_all(text);

        // Only 04/02/2024 also reads as DMY; MDY matches all three.
        assert_eq!(
            ymd(&dates),
            vec![(2024, 3, 25), (2024, 3, 20), (2024, 4, 2)]
        );
    }

    #[test]
    fn test_impossible_date_is_accepted() {
        let dates = extract_dates("31.02.2024");

        assert_eq!(ymd(&dates), vec![(2024, 2, 31)]);
        assert_eq!(dates[0].to_naive_date(), None);
    }

    #[test]
    fn test_no_dates() {
        assert!(extract_dates("Total: 119,00 €").is_empty());
    }
}
