//! Calendar view model: a 6x7 month grid or a single Sunday-based week.

use crate::dday::{calculate_dday, date_key, format_dday};
use crate::models::Event;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MONTH_CELLS: usize = 42;
pub const WEEK_CELLS: usize = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub day: u32,
    /// Set only for cells that belong to the displayed period.
    pub date: Option<String>,
    pub other_month: bool,
    pub sunday: bool,
    pub saturday: bool,
    pub today: bool,
    pub event_count: usize,
}

impl CalendarCell {
    fn padding(day: u32) -> Self {
        Self {
            day,
            date: None,
            other_month: true,
            sunday: false,
            saturday: false,
            today: false,
            event_count: 0,
        }
    }

    fn active(date: NaiveDate, today: NaiveDate, grouped: &BTreeMap<String, Vec<&Event>>) -> Self {
        let key = date_key(date);
        let weekday = date.weekday().num_days_from_sunday();
        Self {
            day: date.day(),
            event_count: grouped.get(&key).map_or(0, Vec::len),
            date: Some(key),
            other_month: false,
            sunday: weekday == 0,
            saturday: weekday == 6,
            today: date == today,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub collapsed: bool,
    pub cells: Vec<CalendarCell>,
    pub show_clear_all: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateEntry {
    pub id: i64,
    pub title: String,
    pub dday: String,
    pub has_image: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateEvents {
    pub date: String,
    pub events: Vec<DateEntry>,
}

pub fn group_events_by_date(events: &[Event]) -> BTreeMap<String, Vec<&Event>> {
    let mut grouped: BTreeMap<String, Vec<&Event>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.date.clone()).or_default().push(event);
    }
    grouped
}

pub fn month_title(year: i32, month: u32) -> String {
    format!("{year}년 {month}월")
}

/// Moves `delta` months from `year`/`month`, wrapping across years.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}

/// Month grid padded to exactly 42 cells. Returns `None` for an invalid
/// year/month pair.
pub fn month_view(
    year: i32,
    month: u32,
    today: NaiveDate,
    events: &[Event],
) -> Option<CalendarView> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let start_day = first.weekday().num_days_from_sunday();
    let (prev_year, prev_month) = shift_month(year, month, -1);
    let prev_last_day = days_in_month(prev_year, prev_month);
    let grouped = group_events_by_date(events);

    let mut cells = Vec::with_capacity(MONTH_CELLS);
    for offset in (0..start_day).rev() {
        cells.push(CalendarCell::padding(prev_last_day - offset));
    }

    for day in 0..days_in_month(year, month) {
        let date = first + Duration::days(i64::from(day));
        cells.push(CalendarCell::active(date, today, &grouped));
    }

    let mut trailing = 1;
    while cells.len() < MONTH_CELLS {
        cells.push(CalendarCell::padding(trailing));
        trailing += 1;
    }

    Some(CalendarView {
        year,
        month,
        title: month_title(year, month),
        collapsed: false,
        cells,
        show_clear_all: !events.is_empty(),
    })
}

/// The seven days of the week containing `today`, starting on Sunday.
pub fn week_view(today: NaiveDate, events: &[Event]) -> CalendarView {
    let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    let grouped = group_events_by_date(events);

    let cells = (0..WEEK_CELLS as i64)
        .map(|offset| CalendarCell::active(week_start + Duration::days(offset), today, &grouped))
        .collect();

    CalendarView {
        year: today.year(),
        month: today.month(),
        title: month_title(today.year(), today.month()),
        collapsed: true,
        cells,
        show_clear_all: !events.is_empty(),
    }
}

pub fn events_on(date: &str, today: NaiveDate, events: &[Event]) -> DateEvents {
    let entries = events
        .iter()
        .filter(|event| event.date == date)
        .map(|event| DateEntry {
            id: event.id,
            title: event.title.clone(),
            dday: calculate_dday(today, &event.date)
                .map(format_dday)
                .unwrap_or_default(),
            has_image: event.has_image(),
        })
        .collect();

    DateEvents {
        date: date.to_string(),
        events: entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, date: &str) -> Event {
        Event {
            id,
            title: format!("event {id}"),
            date: date.to_string(),
            image: None,
            detail: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn month_view_always_has_42_cells() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        for year in [2023, 2024, 2026] {
            for month in 1..=12 {
                let view = month_view(year, month, today, &[]).unwrap();
                assert_eq!(view.cells.len(), MONTH_CELLS, "{year}-{month}");
                let active = view.cells.iter().filter(|cell| !cell.other_month).count();
                assert_eq!(active as u32, days_in_month(year, month));
            }
        }
    }

    #[test]
    fn leading_padding_shows_previous_month_tail() {
        // 2026-10-01 is a Thursday.
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let view = month_view(2026, 10, today, &[]).unwrap();
        let leading: Vec<u32> = view
            .cells
            .iter()
            .take_while(|cell| cell.other_month)
            .map(|cell| cell.day)
            .collect();
        assert_eq!(leading, vec![27, 28, 29, 30]);
        assert_eq!(view.cells[4].date.as_deref(), Some("2026-10-01"));
        assert!(view.cells[41].other_month);
    }

    #[test]
    fn decorates_weekends_today_and_badges() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let events = vec![event(1, "2026-10-16"), event(2, "2026-10-16"), event(3, "2026-10-18")];
        let view = month_view(2026, 10, today, &events).unwrap();

        let cell = |date: &str| {
            view.cells
                .iter()
                .find(|cell| cell.date.as_deref() == Some(date))
                .unwrap()
        };

        assert!(cell("2026-10-16").today);
        assert_eq!(cell("2026-10-16").event_count, 2);
        assert!(cell("2026-10-17").saturday);
        assert!(cell("2026-10-18").sunday);
        assert_eq!(cell("2026-10-18").event_count, 1);
        assert_eq!(cell("2026-10-19").event_count, 0);
        assert!(view.show_clear_all);
    }

    #[test]
    fn padding_cells_are_inert() {
        let today = NaiveDate::from_ymd_opt(2026, 9, 30).unwrap();
        let events = vec![event(1, "2026-09-30")];
        let view = month_view(2026, 10, today, &events).unwrap();
        for cell in view.cells.iter().filter(|cell| cell.other_month) {
            assert_eq!(cell.event_count, 0);
            assert!(!cell.today);
            assert!(cell.date.is_none());
        }
    }

    #[test]
    fn week_view_starts_on_sunday() {
        for day in 11..=17 {
            let today = NaiveDate::from_ymd_opt(2026, 10, day).unwrap();
            let view = week_view(today, &[]);
            assert_eq!(view.cells.len(), WEEK_CELLS);
            assert_eq!(view.cells[0].date.as_deref(), Some("2026-10-11"));
            assert!(view.cells[0].sunday);
            assert!(view.cells[6].saturday);
            assert_eq!(view.cells.iter().filter(|cell| cell.today).count(), 1);
            assert!(view.collapsed);
        }
    }

    #[test]
    fn week_view_crosses_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
        let view = week_view(today, &[event(1, "2026-10-31")]);
        assert_eq!(view.cells[0].date.as_deref(), Some("2026-11-01"));

        let today = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let view = week_view(today, &[event(1, "2026-09-28")]);
        assert_eq!(view.cells[0].date.as_deref(), Some("2026-09-27"));
        assert_eq!(view.cells[1].event_count, 1);
    }

    #[test]
    fn shift_month_wraps_years() {
        assert_eq!(shift_month(2026, 1, -1), (2025, 12));
        assert_eq!(shift_month(2026, 12, 1), (2027, 1));
        assert_eq!(shift_month(2026, 5, 0), (2026, 5));
        assert_eq!(shift_month(2026, 3, -15), (2024, 12));
    }

    #[test]
    fn invalid_month_has_no_view() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert!(month_view(2026, 13, today, &[]).is_none());
        assert!(month_view(2026, 0, today, &[]).is_none());
    }

    #[test]
    fn events_on_date_lists_labels() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut with_image = event(2, "2026-10-20");
        with_image.image = Some("data:image/png;base64,AAAA".to_string());
        let events = vec![event(1, "2026-10-20"), with_image, event(3, "2026-10-21")];

        let panel = events_on("2026-10-20", today, &events);
        assert_eq!(panel.events.len(), 2);
        assert_eq!(panel.events[0].dday, "D-4");
        assert!(!panel.events[0].has_image);
        assert!(panel.events[1].has_image);
    }
}
