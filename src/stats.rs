use crate::dday::{calculate_dday, format_dday, parse_date, today};
use crate::models::Event;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NextEvent {
    pub event: Event,
    pub dday: i64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total: usize,
    pub upcoming: usize,
    pub passed: usize,
    pub badge: usize,
    pub next_event: Option<NextEvent>,
}

pub fn build_stats(events: &[Event]) -> EventStats {
    build_stats_at(today(), events)
}

pub fn build_stats_at(today: NaiveDate, events: &[Event]) -> EventStats {
    let mut upcoming = 0;
    let mut passed = 0;
    let mut badge = 0;

    for event in events {
        match calculate_dday(today, &event.date) {
            Some(days) if days > 0 => {
                upcoming += 1;
                badge += 1;
            }
            Some(0) => badge += 1,
            Some(_) => passed += 1,
            None => {}
        }
    }

    let next_event = upcoming_events(today, events)
        .into_iter()
        .next()
        .map(|(event, dday)| NextEvent {
            event: event.clone(),
            dday,
            label: format_dday(dday),
        });

    EventStats {
        total: events.len(),
        upcoming,
        passed,
        badge,
        next_event,
    }
}

/// Events happening today or later, nearest first. Events on the same day
/// keep their insertion order.
pub fn upcoming_events(today: NaiveDate, events: &[Event]) -> Vec<(&Event, i64)> {
    let mut upcoming: Vec<_> = events
        .iter()
        .filter_map(|event| {
            let date = parse_date(&event.date)?;
            let days = (date - today).num_days();
            (days >= 0).then_some((event, days))
        })
        .collect();
    upcoming.sort_by_key(|(_, days)| *days);
    upcoming
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
    fn splits_upcoming_today_and_passed() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let events = vec![
            event(1, "2026-01-01"),
            event(2, "2026-01-05"),
            event(3, "2026-01-20"),
            event(4, "2026-01-07"),
        ];

        let stats = build_stats_at(today, &events);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.upcoming, 2);
        assert_eq!(stats.passed, 1);
        assert_eq!(stats.badge, 3);

        let next = stats.next_event.expect("missing next event");
        assert_eq!(next.event.id, 2);
        assert_eq!(next.label, "D-Day");
    }

    #[test]
    fn next_event_is_nearest_future_date() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let events = vec![event(1, "2026-03-01"), event(2, "2026-01-09"), event(3, "2025-12-31")];

        let next = build_stats_at(today, &events).next_event.unwrap();
        assert_eq!(next.event.id, 2);
        assert_eq!(next.dday, 4);
        assert_eq!(next.label, "D-4");
    }

    #[test]
    fn empty_list_has_zero_counts() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let stats = build_stats_at(today, &[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.upcoming, 0);
        assert_eq!(stats.passed, 0);
        assert_eq!(stats.badge, 0);
        assert!(stats.next_event.is_none());
    }

    #[test]
    fn same_day_events_keep_insertion_order() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let events = vec![event(7, "2026-02-01"), event(3, "2026-02-01"), event(9, "2026-01-10")];
        let ids: Vec<i64> = upcoming_events(today, &events)
            .into_iter()
            .map(|(event, _)| event.id)
            .collect();
        assert_eq!(ids, vec![9, 7, 3]);
    }
}
