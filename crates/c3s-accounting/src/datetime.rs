use chrono::{Datelike, NaiveDate};

/// Get the current local date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// First day of a fiscal year
pub fn year_start(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Last day of a fiscal year
pub fn year_end(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Align a date to the beginning of its month
pub trait AlignStart {
    fn align_start(&self) -> Self;
}

impl AlignStart for NaiveDate {
    fn align_start(&self) -> Self {
        self.with_day(1).unwrap_or(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_bounds() {
        assert_eq!(year_start(2018), NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(year_end(2018), NaiveDate::from_ymd_opt(2018, 12, 31).unwrap());
    }

    #[test]
    fn test_align_start() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(date.align_start(), NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
    }
}
