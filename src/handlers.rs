use crate::calendar::{events_on, month_view, week_view, CalendarView, DateEvents};
use crate::cart;
use crate::chat;
use crate::dday::{parse_date, today};
use crate::errors::AppError;
use crate::events;
use crate::models::{
    AddCartRequest, AppData, ArchiveResponse, CalendarQuery, CartItem, CartResponse, ChatRequest,
    ChatResponse, CheckoutRequest, CheckoutResponse, ClearChatRequest, Event, EventsQuery,
    ExtractTextResponse, Extraction, HealthResponse, ImageRequest, NewEventRequest,
    ProfileResponse, SessionStatsResponse, Settings, SettingsUpdate, Solution,
    SolveProblemResponse, WebhookResponse,
};
use crate::notify::{relay, relay_best_effort, Delivery};
use crate::repair::parse_ai_response;
use crate::state::AppState;
use crate::stats::{build_stats, build_stats_at, EventStats};
use crate::ui::render_index;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{Datelike, Local};
use serde_json::{json, Value};
use tracing::{info, warn};

type Payload<T> = Result<Json<T>, JsonRejection>;
type PathParam<T> = Result<Path<T>, PathRejection>;
type QueryParams<T> = Result<Query<T>, QueryRejection>;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let date = today();
    let data = state.read().await;
    let stats = build_stats_at(date, &data.events);
    Html(render_index(&date.to_string(), &stats))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

// ---- events -------------------------------------------------------------

pub async fn list_events(
    State(state): State<AppState>,
    query: QueryParams<EventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let Query(query) = query?;
    let data = state.read().await;
    Ok(Json(events::list_events(today(), &data.events, query.upcoming)))
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Payload<NewEventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let Json(request) = payload?;
    let event = state
        .update(|data| events::create_event(data, request, Local::now()))
        .await?;
    info!(id = event.id, date = %event.date, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    id: PathParam<i64>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.update(|data| events::delete_event(data, id)).await?;
    info!(id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_events(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let removed = state.update(|data| Ok(events::clear_events(data))).await?;
    info!(removed, "all events cleared");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_stats(State(state): State<AppState>) -> Json<EventStats> {
    let data = state.read().await;
    Json(build_stats(&data.events))
}

// ---- calendar -----------------------------------------------------------

fn current_view(data: &AppData, query: &CalendarQuery) -> Result<CalendarView, AppError> {
    let date = today();
    if data.settings.calendar_collapsed {
        return Ok(week_view(date, &data.events));
    }
    let year = query.year.unwrap_or(date.year());
    let month = query.month.unwrap_or(date.month());
    month_view(year, month, date, &data.events)
        .ok_or_else(|| AppError::bad_request(format!("invalid month {year}-{month}")))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    query: QueryParams<CalendarQuery>,
) -> Result<Json<CalendarView>, AppError> {
    let Query(query) = query?;
    let data = state.read().await;
    Ok(Json(current_view(&data, &query)?))
}

pub async fn toggle_calendar(
    State(state): State<AppState>,
    query: QueryParams<CalendarQuery>,
) -> Result<Json<CalendarView>, AppError> {
    let Query(query) = query?;
    let view = state
        .update(|data| {
            data.settings.calendar_collapsed = !data.settings.calendar_collapsed;
            current_view(data, &query)
        })
        .await?;
    Ok(Json(view))
}

pub async fn date_events(
    State(state): State<AppState>,
    date: PathParam<String>,
) -> Result<Json<DateEvents>, AppError> {
    let Path(date) = date?;
    if parse_date(&date).is_none() {
        return Err(AppError::bad_request("Date must be in YYYY-MM-DD format"));
    }
    let data = state.read().await;
    Ok(Json(events_on(&date, today(), &data.events)))
}

// ---- settings -----------------------------------------------------------

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.read().await.settings.clone())
}

pub async fn update_settings(
    State(state): State<AppState>,
    payload: Payload<SettingsUpdate>,
) -> Result<Json<Settings>, AppError> {
    let Json(update) = payload?;
    let settings = state
        .update(|data| {
            let settings = &mut data.settings;
            if let Some(collapsed) = update.calendar_collapsed {
                settings.calendar_collapsed = collapsed;
            }
            if let Some(name) = update.textbook_name {
                settings.textbook_name = name;
            }
            if let Some(version) = update.verification_version {
                settings.verification_version = version;
            }
            if let Some(version) = update.cta_version {
                settings.cta_version = version;
            }
            if let Some(nickname) = update.user_nickname {
                let nickname = nickname.trim().to_string();
                settings.user_nickname = (!nickname.is_empty()).then_some(nickname);
            }
            Ok(settings.clone())
        })
        .await?;
    Ok(Json(settings))
}

// ---- AI proxy -----------------------------------------------------------

fn require_image(request: ImageRequest) -> Result<String, AppError> {
    request
        .image
        .filter(|image| !image.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("No image provided"))
}

pub async fn extract_text(
    State(state): State<AppState>,
    payload: Payload<ImageRequest>,
) -> Result<Json<ExtractTextResponse>, AppError> {
    let Json(request) = payload?;
    let image = require_image(request)?;
    state.vision.ensure_configured()?;

    let raw_text = state.vision.extract_event(&image, today().year()).await?;
    let extraction: Extraction = parse_ai_response(&raw_text)?;

    Ok(Json(ExtractTextResponse {
        title: extraction.title.unwrap_or_default(),
        date: extraction.date.unwrap_or_default(),
        raw_text,
    }))
}

pub async fn solve_problem(
    State(state): State<AppState>,
    payload: Payload<ImageRequest>,
) -> Result<Json<SolveProblemResponse>, AppError> {
    let Json(request) = payload?;
    let image = require_image(request)?;
    state.vision.ensure_configured()?;

    let raw_text = state.vision.solve_problem(&image).await?;
    let solution: Solution = parse_ai_response(&raw_text)?;
    info!(steps = solution.steps.len(), "solution parsed");

    Ok(Json(SolveProblemResponse { solution, raw_text }))
}

// ---- cart ---------------------------------------------------------------

pub async fn get_cart(State(state): State<AppState>) -> Json<CartResponse> {
    Json(cart::summarize(&state.read().await.cart))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    payload: Payload<AddCartRequest>,
) -> Result<(StatusCode, Json<CartItem>), AppError> {
    let Json(request) = payload?;
    let now = Local::now();
    let item = state
        .update(|data| {
            cart::add_item(data, &request.image_data, now.timestamp_millis(), now.to_rfc3339())
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn toggle_cart_item(
    State(state): State<AppState>,
    id: PathParam<i64>,
) -> Result<Json<CartItem>, AppError> {
    let Path(id) = id?;
    let item = state.update(|data| cart::toggle_item(data, id)).await?;
    Ok(Json(item))
}

pub async fn remove_cart_item(
    State(state): State<AppState>,
    id: PathParam<i64>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.update(|data| cart::remove_item(data, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn checkout(
    State(state): State<AppState>,
    payload: Payload<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let Json(request) = payload?;
    let summary = state.update(|data| cart::checkout(data, &request)).await?;
    info!(items = summary.item_count, total = summary.total, "checkout completed");

    let hook = state.config.purchase_webhook_url();
    let message = match relay_best_effort(&state.http, hook, &summary).await {
        Some(Delivery::Sent) => "Payment completed. Notification sent.",
        Some(Delivery::Logged) => "Payment completed. Notification logged.",
        None => "Payment completed. Notification could not be delivered.",
    };

    Ok(Json(CheckoutResponse {
        success: true,
        item_count: summary.item_count,
        total: summary.total,
        message: message.to_string(),
    }))
}

// ---- chat ---------------------------------------------------------------

pub async fn chat(
    State(state): State<AppState>,
    payload: Payload<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload?;
    let question = request.message.trim().to_string();
    let session_id = request.session_id.trim().to_string();
    if question.is_empty() {
        return Err(AppError::bad_request("Message is required"));
    }
    if session_id.is_empty() {
        return Err(AppError::bad_request("Session id is required"));
    }
    state.vision.ensure_configured()?;

    let history = state
        .read()
        .await
        .chats
        .get(&session_id)
        .cloned()
        .unwrap_or_default();
    let answer = state.vision.complete(chat::build_messages(&history, &question)).await?;

    let timestamp = Local::now().to_rfc3339();
    let (query_count, session) = state
        .update(|data| {
            let session = data.chats.entry(session_id.clone()).or_default();
            let count = chat::record_exchange(session, &question, &answer, &timestamp);
            Ok((count, session.clone()))
        })
        .await?;

    let mut summary_generated = false;
    if chat::summary_due(query_count) {
        match state.vision.complete(chat::build_summary_messages(&session)).await {
            Ok(summary) => {
                let timestamp = Local::now().to_rfc3339();
                state
                    .update(|data| {
                        if let Some(session) = data.chats.get_mut(&session_id) {
                            chat::set_profile(session, summary.trim().to_string(), timestamp);
                        }
                        Ok(())
                    })
                    .await?;
                summary_generated = true;
                info!(session = %session_id, query_count, "profile summary generated");
            }
            Err(err) => warn!(session = %session_id, "profile summary failed: {err}"),
        }
    }

    Ok(Json(ChatResponse {
        message: answer,
        query_count,
        summary_generated,
    }))
}

pub async fn clear_chat(
    State(state): State<AppState>,
    payload: Payload<ClearChatRequest>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let session_id = request.session_id.trim().to_string();
    if session_id.is_empty() {
        return Err(AppError::bad_request("Session id is required"));
    }
    let removed = state
        .update(|data| Ok(data.chats.remove(&session_id).is_some()))
        .await?;
    Ok(Json(json!({ "success": true, "cleared": removed })))
}

pub async fn archive(
    State(state): State<AppState>,
    session_id: PathParam<String>,
) -> Result<Json<ArchiveResponse>, AppError> {
    let Path(session_id) = session_id?;
    let data = state.read().await;
    let messages = data
        .chats
        .get(&session_id)
        .map(|session| session.messages.clone())
        .unwrap_or_default();
    Ok(Json(ArchiveResponse { session_id, messages }))
}

pub async fn session_stats(
    State(state): State<AppState>,
    session_id: PathParam<String>,
) -> Result<Json<SessionStatsResponse>, AppError> {
    let Path(session_id) = session_id?;
    let data = state.read().await;
    Ok(Json(chat::session_stats(data.chats.get(&session_id))))
}

pub async fn profile(
    State(state): State<AppState>,
    session_id: PathParam<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let Path(session_id) = session_id?;
    let data = state.read().await;
    Ok(Json(chat::profile_response(data.chats.get(&session_id))))
}

// ---- webhooks -----------------------------------------------------------

pub async fn sheets_webhook(
    State(state): State<AppState>,
    payload: Payload<Value>,
) -> Result<Json<WebhookResponse>, AppError> {
    let Json(body) = payload?;
    let delivery = relay(&state.http, state.config.sheets_webhook_url.as_deref(), &body).await?;
    let message = match delivery {
        Delivery::Sent => "Forwarded to webhook",
        Delivery::Logged => "Logged (webhook not configured)",
    };
    Ok(Json(WebhookResponse {
        success: true,
        message: message.to_string(),
    }))
}
