use crate::stats::EventStats;

pub fn render_index(date: &str, stats: &EventStats) -> String {
    INDEX_HTML
        .replace("{{DATE}}", date)
        .replace("{{TOTAL}}", &stats.total.to_string())
        .replace("{{UPCOMING}}", &stats.upcoming.to_string())
        .replace("{{PASSED}}", &stats.passed.to_string())
        .replace("{{BADGE}}", &stats.badge.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>D-Day Manager</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #6366f1;
      --accent-2: #2f4858;
      --sunday: #d9480f;
      --saturday: #1c7ed6;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #eef0ff 70%);
      color: var(--ink);
      font-family: "Pretendard", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(760px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      letter-spacing: 0.08em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .calendar-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .calendar-header h2 {
      margin: 0;
      font-size: 1.3rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      cursor: pointer;
      background: rgba(99, 102, 241, 0.12);
      color: var(--accent);
    }

    button.primary {
      background: var(--accent);
      color: white;
    }

    .calendar-grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
    }

    .calendar-day {
      position: relative;
      min-height: 54px;
      border-radius: 12px;
      background: white;
      padding: 6px;
      cursor: pointer;
    }

    .calendar-day.other-month {
      opacity: 0.35;
      cursor: default;
    }

    .calendar-day.sunday { color: var(--sunday); }
    .calendar-day.saturday { color: var(--saturday); }
    .calendar-day.today { outline: 2px solid var(--accent); }

    .event-badge {
      position: absolute;
      right: 6px;
      bottom: 6px;
      min-width: 20px;
      border-radius: 999px;
      background: var(--accent);
      color: white;
      font-size: 0.75rem;
      text-align: center;
    }

    form.event-form {
      display: grid;
      grid-template-columns: 2fr 1fr auto;
      gap: 8px;
    }

    input {
      border: 1px solid rgba(47, 72, 88, 0.2);
      border-radius: 12px;
      padding: 10px 12px;
      font-size: 1rem;
    }

    .list {
      display: grid;
      gap: 8px;
    }

    .list-item {
      display: flex;
      justify-content: space-between;
      align-items: center;
      background: white;
      border-radius: 14px;
      padding: 10px 14px;
    }

    .status {
      min-height: 1.2em;
      color: #6b645d;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    @media (max-width: 600px) {
      .app {
        padding: 24px 16px;
      }
      form.event-form {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>D-Day Manager</h1>
      <p class="subtitle">오늘: <span id="today">{{DATE}}</span></p>
    </header>

    <section class="panel">
      <div class="stat"><span class="label">전체</span><span id="total" class="value">{{TOTAL}}</span></div>
      <div class="stat"><span class="label">다가오는</span><span id="upcoming" class="value">{{UPCOMING}}</span></div>
      <div class="stat"><span class="label">지난</span><span id="passed" class="value">{{PASSED}}</span></div>
      <div class="stat"><span class="label">D-Day 포함</span><span id="badge" class="value">{{BADGE}}</span></div>
    </section>

    <section id="next-event" class="stat"></section>

    <section>
      <div class="calendar-header">
        <button type="button" id="prev">‹</button>
        <h2 id="calendar-title"></h2>
        <button type="button" id="next">›</button>
        <button type="button" id="toggle">접기/펼치기</button>
      </div>
      <div class="calendar-grid" id="calendar-grid"></div>
    </section>

    <section class="list" id="date-events"></section>

    <form class="event-form" id="event-form">
      <input id="title-input" placeholder="이벤트 제목" />
      <input id="date-input" type="date" />
      <button class="primary" type="submit">저장</button>
    </form>
    <input id="image-input" type="file" accept="image/*" />

    <div class="status" id="status"></div>
    <button type="button" id="clear-all">모든 이벤트 삭제</button>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const gridEl = document.getElementById('calendar-grid');
    const titleEl = document.getElementById('calendar-title');
    const dateEventsEl = document.getElementById('date-events');
    const clearAllBtn = document.getElementById('clear-all');
    let view = { year: null, month: null };
    let pendingImage = '';

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeHtml = (text) => {
      const div = document.createElement('div');
      div.textContent = text;
      return div.innerHTML;
    };

    const request = async (url, options) => {
      const res = await fetch(url, options);
      if (!res.ok) {
        const body = await res.json().catch(() => ({}));
        throw new Error(body.error || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const shiftMonth = (delta) => {
      const index = view.year * 12 + view.month - 1 + delta;
      view = { year: Math.floor(index / 12), month: (index % 12) + 1 };
    };

    const renderCalendar = (calendar) => {
      view = { year: calendar.year, month: calendar.month };
      titleEl.textContent = calendar.title;
      clearAllBtn.style.display = calendar.showClearAll ? 'inline-flex' : 'none';
      gridEl.innerHTML = calendar.cells.map((cell) => {
        const classes = ['calendar-day'];
        if (cell.otherMonth) classes.push('other-month');
        if (cell.sunday) classes.push('sunday');
        if (cell.saturday) classes.push('saturday');
        if (cell.today) classes.push('today');
        const badge = cell.eventCount > 0 ? `<span class="event-badge">${cell.eventCount}</span>` : '';
        const dateAttr = cell.date ? `data-date="${cell.date}"` : '';
        return `<div class="${classes.join(' ')}" ${dateAttr}><span>${cell.day}</span>${badge}</div>`;
      }).join('');
    };

    const renderStats = (stats) => {
      document.getElementById('total').textContent = stats.total;
      document.getElementById('upcoming').textContent = stats.upcoming;
      document.getElementById('passed').textContent = stats.passed;
      document.getElementById('badge').textContent = stats.badge;
      const next = document.getElementById('next-event');
      next.innerHTML = stats.nextEvent
        ? `<span class="label">다음 이벤트</span><span class="value">${escapeHtml(stats.nextEvent.event.title)} · ${stats.nextEvent.label}</span>`
        : '<span class="label">등록된 이벤트가 없습니다</span>';
    };

    const loadCalendar = async () => {
      const query = view.year ? `?year=${view.year}&month=${view.month}` : '';
      renderCalendar(await request(`/api/calendar${query}`));
    };

    const refresh = async () => {
      const [stats] = await Promise.all([request('/api/stats'), loadCalendar()]);
      renderStats(stats);
    };

    const showDate = async (date) => {
      const panel = await request(`/api/calendar/date/${date}`);
      document.getElementById('date-input').value = date;
      dateEventsEl.innerHTML = panel.events.map((event) => `
        <div class="list-item">
          <span>${event.hasImage ? '🖼️ ' : ''}${escapeHtml(event.title)} · ${event.dday}</span>
          <button type="button" data-delete="${event.id}">✕</button>
        </div>`).join('');
    };

    gridEl.addEventListener('click', (event) => {
      const cell = event.target.closest('[data-date]');
      if (cell) {
        showDate(cell.dataset.date).catch((err) => setStatus(err.message, 'error'));
      }
    });

    dateEventsEl.addEventListener('click', async (event) => {
      const id = event.target.dataset.delete;
      if (!id || !confirm('정말 이 이벤트를 삭제하시겠습니까?')) return;
      try {
        await request(`/api/events/${id}`, { method: 'DELETE' });
        dateEventsEl.innerHTML = '';
        await refresh();
        setStatus('이벤트가 삭제되었습니다', 'ok');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('prev').addEventListener('click', () => {
      shiftMonth(-1);
      loadCalendar().catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('next').addEventListener('click', () => {
      shiftMonth(1);
      loadCalendar().catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('toggle').addEventListener('click', async () => {
      try {
        const query = view.year ? `?year=${view.year}&month=${view.month}` : '';
        renderCalendar(await request(`/api/calendar/toggle${query}`, { method: 'POST' }));
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    clearAllBtn.addEventListener('click', async () => {
      if (!confirm('모든 이벤트를 삭제하시겠습니까?')) return;
      try {
        await request('/api/events', { method: 'DELETE' });
        dateEventsEl.innerHTML = '';
        await refresh();
        setStatus('모든 이벤트가 삭제되었습니다', 'ok');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('image-input').addEventListener('change', (event) => {
      const file = event.target.files[0];
      if (!file) return;
      const reader = new FileReader();
      reader.onload = async () => {
        pendingImage = reader.result;
        setStatus('이미지 분석 중...', 'info');
        try {
          const result = await request('/api/extract-text', {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ image: pendingImage })
          });
          document.getElementById('title-input').value = result.title || '';
          document.getElementById('date-input').value = result.date || '';
          setStatus('텍스트 추출 완료! 확인 후 저장해주세요', 'ok');
        } catch (err) {
          setStatus(`이미지 처리에 실패했습니다. 직접 입력해 주세요. (${err.message})`, 'error');
        }
      };
      reader.readAsDataURL(file);
    });

    document.getElementById('event-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const title = document.getElementById('title-input').value.trim();
      const date = document.getElementById('date-input').value;
      try {
        await request('/api/events', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ title, date, image: pendingImage || undefined })
        });
        pendingImage = '';
        event.target.reset();
        await refresh();
        setStatus('이벤트가 추가되었습니다! 🎉', 'ok');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::build_stats_at;
    use chrono::NaiveDate;

    #[test]
    fn fills_every_placeholder() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let html = render_index("2026-10-16", &build_stats_at(today, &[]));
        assert!(html.contains("<span id=\"today\">2026-10-16</span>"));
        assert!(!html.contains("{{"));
    }
}
