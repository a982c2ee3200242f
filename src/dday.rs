use chrono::{Local, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Signed number of days from `today` to `date`; positive means the date is
/// still ahead.
pub fn calculate_dday(today: NaiveDate, date: &str) -> Option<i64> {
    parse_date(date).map(|target| (target - today).num_days())
}

pub fn format_dday(days: i64) -> String {
    match days {
        0 => "D-Day".to_string(),
        n if n > 0 => format!("D-{n}"),
        n => format!("D+{}", n.unsigned_abs()),
    }
}
