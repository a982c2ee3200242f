use crate::dday::parse_date;
use crate::errors::AppError;
use crate::models::{AppData, Event, NewEventRequest};
use crate::stats::upcoming_events;
use chrono::{DateTime, NaiveDate, TimeZone};

/// Epoch-millisecond id that does not collide with `taken`.
pub fn next_id(now_millis: i64, taken: impl Iterator<Item = i64>) -> i64 {
    match taken.max() {
        Some(max) if max >= now_millis => max + 1,
        _ => now_millis,
    }
}

pub fn create_event<Tz: TimeZone>(
    data: &mut AppData,
    request: NewEventRequest,
    now: DateTime<Tz>,
) -> Result<Event, AppError>
where
    Tz::Offset: std::fmt::Display,
{
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("Title is required"));
    }
    let date = parse_date(&request.date)
        .ok_or_else(|| AppError::bad_request("Date must be in YYYY-MM-DD format"))?;

    let event = Event {
        id: next_id(now.timestamp_millis(), data.events.iter().map(|event| event.id)),
        title: title.to_string(),
        date: date.format(crate::dday::DATE_FORMAT).to_string(),
        image: request.image.filter(|image| !image.is_empty()),
        detail: request
            .detail
            .map(|detail| detail.trim().to_string())
            .filter(|detail| !detail.is_empty()),
        created_at: now.to_rfc3339(),
    };

    data.events.push(event.clone());
    Ok(event)
}

pub fn delete_event(data: &mut AppData, id: i64) -> Result<(), AppError> {
    let before = data.events.len();
    data.events.retain(|event| event.id != id);
    if data.events.len() == before {
        return Err(AppError::not_found(format!("event {id} not found")));
    }
    Ok(())
}

pub fn clear_events(data: &mut AppData) -> usize {
    let removed = data.events.len();
    data.events.clear();
    removed
}

/// All events in insertion order, or only those still ahead sorted by date.
pub fn list_events(today: NaiveDate, events: &[Event], upcoming_only: bool) -> Vec<Event> {
    if upcoming_only {
        upcoming_events(today, events)
            .into_iter()
            .map(|(event, _)| event.clone())
            .collect()
    } else {
        events.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::build_stats_at;
    use chrono::Utc;

    fn request(title: &str, date: &str) -> NewEventRequest {
        NewEventRequest {
            title: title.to_string(),
            date: date.to_string(),
            image: None,
            detail: None,
        }
    }

    #[test]
    fn create_trims_and_assigns_ids() {
        let mut data = AppData::default();
        let now = Utc::now();
        let first = create_event(&mut data, request("  Midterm  ", "2026-11-17"), now).unwrap();
        let second = create_event(&mut data, request("Trip", "2026-11-17"), now).unwrap();

        assert_eq!(first.title, "Midterm");
        assert_eq!(first.id, now.timestamp_millis());
        assert_eq!(second.id, first.id + 1);
        assert_eq!(data.events.len(), 2);
    }

    #[test]
    fn create_validates_title_and_date() {
        let mut data = AppData::default();
        let err = create_event(&mut data, request("   ", "2026-11-17"), Utc::now()).unwrap_err();
        assert_eq!(err.message, "Title is required");
        assert!(create_event(&mut data, request("Exam", "17/11/2026"), Utc::now()).is_err());
        assert!(create_event(&mut data, request("Exam", ""), Utc::now()).is_err());
        assert!(data.events.is_empty());
    }

    #[test]
    fn create_keeps_image_and_detail() {
        let mut data = AppData::default();
        let mut req = request("Concert", "2026-12-24");
        req.image = Some("data:image/jpeg;base64,/9j/".to_string());
        req.detail = Some("  Row C  ".to_string());
        let event = create_event(&mut data, req, Utc::now()).unwrap();
        assert!(event.has_image());
        assert_eq!(event.detail.as_deref(), Some("Row C"));
    }

    #[test]
    fn delete_removes_only_matching_id() {
        let mut data = AppData::default();
        let now = Utc::now();
        let keep = create_event(&mut data, request("Keep", "2026-11-01"), now).unwrap();
        let gone = create_event(&mut data, request("Drop", "2026-11-02"), now).unwrap();

        delete_event(&mut data, gone.id).unwrap();
        assert_eq!(data.events, vec![keep]);
        assert!(delete_event(&mut data, gone.id).is_err());
    }

    #[test]
    fn clear_then_stats_is_all_zero() {
        let mut data = AppData::default();
        let now = Utc::now();
        create_event(&mut data, request("Past", "2020-01-01"), now).unwrap();
        create_event(&mut data, request("Future", "2099-01-01"), now).unwrap();

        assert_eq!(clear_events(&mut data), 2);
        let stats = build_stats_at(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), &data.events);
        assert_eq!((stats.total, stats.upcoming, stats.passed), (0, 0, 0));
    }

    #[test]
    fn upcoming_listing_is_sorted() {
        let mut data = AppData::default();
        let now = Utc::now();
        create_event(&mut data, request("Later", "2026-12-01"), now).unwrap();
        create_event(&mut data, request("Gone", "2026-01-01"), now).unwrap();
        create_event(&mut data, request("Sooner", "2026-10-20"), now).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let titles: Vec<String> = list_events(today, &data.events, true)
            .into_iter()
            .map(|event| event.title)
            .collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
        assert_eq!(list_events(today, &data.events, false).len(), 3);
    }

    #[test]
    fn next_id_prefers_clock() {
        assert_eq!(next_id(500, [1, 2, 3].into_iter()), 500);
        assert_eq!(next_id(500, [499, 500].into_iter()), 501);
        assert_eq!(next_id(500, std::iter::empty()), 500);
    }
}
