//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use grappling_tournament_web::{
    build_brackets, category_groups, distribute_mats, generate_fight_order,
    reassign_on_overweight, record_result, regenerate_division, revert_result, Athlete, AthleteId,
    Belt, BracketId, Division, DivisionId, Event, EventId, EventSettings, Gender, MatchId,
    MatchResult, ResultType,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-event entry: event data + last activity time (for auto-cleanup).
struct EventEntry {
    event: Event,
    last_activity: Instant,
}

/// In-memory state: many events by ID (sessioned). Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<EventId, EventEntry>>>;

/// Inactivity threshold: events not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateEventBody {
    name: String,
    #[serde(default)]
    settings: Option<EventSettings>,
}

#[derive(Deserialize)]
struct DivisionBody {
    name: String,
    gender: Gender,
    belt: Belt,
    min_age: u32,
    max_age: u32,
    min_weight: f64,
    max_weight: f64,
    #[serde(default)]
    no_gi: bool,
}

#[derive(Deserialize)]
struct AthleteBody {
    name: String,
    club: String,
    gender: Gender,
    belt: Belt,
    weight: f64,
    division_id: DivisionId,
}

/// One row of a bulk roster CSV: name,club,gender,belt,weight,division_id.
#[derive(Deserialize)]
struct CsvAthleteRow {
    name: String,
    club: String,
    gender: Gender,
    belt: Belt,
    weight: f64,
    division_id: DivisionId,
}

#[derive(Deserialize)]
struct CheckInBody {
    measured_weight: f64,
}

#[derive(Deserialize)]
struct RecordResultBody {
    match_id: MatchId,
    winner_id: AthleteId,
    result_type: ResultType,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Deserialize)]
struct RevertResultBody {
    match_id: MatchId,
}

#[derive(Deserialize)]
struct DistributeMatsBody {
    #[serde(default)]
    mat_count: Option<usize>,
}

/// Path segment: event id (e.g. /api/events/{id})
#[derive(Deserialize)]
struct EventPath {
    id: EventId,
}

/// Path segments: event id and athlete id.
#[derive(Deserialize)]
struct EventAthletePath {
    id: EventId,
    athlete_id: AthleteId,
}

/// Path segments: event id and division id.
#[derive(Deserialize)]
struct EventDivisionPath {
    id: EventId,
    division_id: DivisionId,
}

/// Path segments: event id and bracket id (division id or `<divisionId>-<letter>`).
#[derive(Deserialize)]
struct EventBracketPath {
    id: EventId,
    bracket_id: BracketId,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "grappling-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new event (returns it with id; client stores id for subsequent requests).
#[post("/api/events")]
async fn api_create_event(state: AppState, body: Json<CreateEventBody>) -> HttpResponse {
    let settings = body.settings.clone().unwrap_or_default();
    let event = Event::new(body.name.trim(), settings);
    let id = event.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        EventEntry {
            event,
            last_activity: Instant::now(),
        },
    );
    match g.get(&id) {
        Some(entry) => HttpResponse::Ok().json(&entry.event),
        None => HttpResponse::InternalServerError().body("state error"),
    }
}

/// Get an event by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/events/{id}")]
async fn api_get_event(state: AppState, path: Path<EventPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.event)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    }
}

/// Delete an event and everything in it.
#[delete("/api/events/{id}")]
async fn api_delete_event(state: AppState, path: Path<EventPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.remove(&path.id) {
        Some(_) => HttpResponse::Ok().json(serde_json::json!({ "deleted": true })),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    }
}

/// Replace event settings (weigh-in flags, bracket options, mat count).
#[put("/api/events/{id}/settings")]
async fn api_update_settings(
    state: AppState,
    path: Path<EventPath>,
    body: Json<EventSettings>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    entry.event.settings = body.into_inner();
    HttpResponse::Ok().json(&entry.event)
}

/// Add a division to the event.
#[post("/api/events/{id}/divisions")]
async fn api_add_division(
    state: AppState,
    path: Path<EventPath>,
    body: Json<DivisionBody>,
) -> HttpResponse {
    if body.max_weight < body.min_weight {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "max_weight must be >= min_weight" }));
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    let division = Division::new(
        body.name.trim(),
        body.gender,
        body.belt,
        body.min_age,
        body.max_age,
        body.min_weight,
        body.max_weight,
        body.no_gi,
    );
    entry.event.divisions.push(division);
    HttpResponse::Ok().json(&entry.event)
}

/// Register a single athlete (registration approval itself is out of scope;
/// athletes added here are treated as approved).
#[post("/api/events/{id}/athletes")]
async fn api_add_athlete(
    state: AppState,
    path: Path<EventPath>,
    body: Json<AthleteBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    if entry.event.division(body.division_id).is_none() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "No such division" }));
    }
    let athlete = Athlete::new(
        body.name.trim(),
        body.club.trim(),
        body.gender,
        body.belt,
        body.weight,
        body.division_id,
    );
    entry.event.athletes.push(athlete);
    HttpResponse::Ok().json(&entry.event)
}

/// Bulk roster import: CSV body with columns name,club,gender,belt,weight,division_id.
#[post("/api/events/{id}/athletes/import")]
async fn api_import_athletes(state: AppState, path: Path<EventPath>, body: String) -> HttpResponse {
    let mut rows = Vec::new();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    for record in reader.deserialize::<CsvAthleteRow>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": format!("CSV parse error: {}", e) }))
            }
        }
    }

    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    for row in &rows {
        if entry.event.division(row.division_id).is_none() {
            return HttpResponse::BadRequest().json(
                serde_json::json!({ "error": format!("No such division: {}", row.division_id) }),
            );
        }
    }
    let imported = rows.len();
    for row in rows {
        entry.event.athletes.push(Athlete::new(
            row.name,
            row.club,
            row.gender,
            row.belt,
            row.weight,
            row.division_id,
        ));
    }
    log::info!("Imported {} athlete(s) into event {}", imported, path.id);
    HttpResponse::Ok().json(serde_json::json!({ "imported": imported }))
}

/// Weigh an athlete in. Over-limit readings run the reweigh reassignment
/// (auto-move to the tightest-fitting division, or flag overweight).
#[post("/api/events/{id}/athletes/{athlete_id}/check-in")]
async fn api_check_in(
    state: AppState,
    path: Path<EventAthletePath>,
    body: Json<CheckInBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    let event = &mut entry.event;
    let athlete = match event.athlete(path.athlete_id) {
        Some(a) => a.clone(),
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No athlete" }))
        }
    };
    let division = match event.division(athlete.effective_division_id()) {
        Some(d) => d.clone(),
        None => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "Athlete's division no longer exists" }))
        }
    };
    let outcome = reassign_on_overweight(
        &athlete,
        &division,
        body.measured_weight,
        &event.settings.flags(),
        &event.divisions,
    );
    if let Some(reason) = &outcome.athlete.move_reason {
        log::info!("Athlete {}: {}", outcome.athlete.name, reason);
    }
    let updated = outcome.athlete.clone();
    if let Some(a) = event.athlete_mut(path.athlete_id) {
        *a = updated;
    }
    HttpResponse::Ok().json(serde_json::json!({
        "status": outcome.status,
        "athlete": outcome.athlete,
    }))
}

/// Generate (or regenerate) brackets for every enabled division from the
/// checked-in roster. Fully replaces the previous bracket set.
#[post("/api/events/{id}/brackets/generate")]
async fn api_generate_brackets(state: AppState, path: Path<EventPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    let event = &mut entry.event;
    let options = event.settings.bracket_options();
    let report = build_brackets(
        &event.divisions,
        &event.athletes,
        &options,
        &mut rand::thread_rng(),
    );
    event.brackets.clear();
    for bracket in report.brackets {
        event.brackets.insert(bracket.id.clone(), bracket);
    }
    refresh_fight_order(event);
    let errors: Vec<String> = report
        .errors
        .iter()
        .map(|(div, e)| format!("{}: {}", div, e))
        .collect();
    log::info!(
        "Generated {} bracket(s) for event {} ({} division(s) skipped)",
        event.brackets.len(),
        path.id,
        errors.len()
    );
    HttpResponse::Ok().json(serde_json::json!({ "event": event, "errors": errors }))
}

/// Regenerate one division's brackets, purging stale split groups first.
#[post("/api/events/{id}/divisions/{division_id}/brackets/generate")]
async fn api_generate_division_brackets(
    state: AppState,
    path: Path<EventDivisionPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    let event = &mut entry.event;
    let division = match event.division(path.division_id) {
        Some(d) => d.clone(),
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No division" }))
        }
    };
    let roster = event.eligible_roster(division.id);
    let options = event.settings.bracket_options();
    match regenerate_division(
        &mut event.brackets,
        &division,
        &roster,
        &options,
        &mut rand::thread_rng(),
    ) {
        Ok(ids) => {
            refresh_fight_order(event);
            log::info!("Regenerated {:?} for event {}", ids, path.id);
            HttpResponse::Ok().json(&*event)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Record a match result. The result, the winner's advancement, and the
/// third-place seeding commit together under the event write lock.
#[post("/api/events/{id}/brackets/{bracket_id}/results")]
async fn api_record_result(
    state: AppState,
    path: Path<EventBracketPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    let event = &mut entry.event;
    let bracket = match event.brackets.get_mut(&path.bracket_id) {
        Some(b) => b,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No bracket" }))
        }
    };
    let result = MatchResult {
        result_type: body.result_type,
        details: body.details.clone(),
    };
    match record_result(bracket, body.match_id, body.winner_id, result) {
        Ok(outcome) => {
            // Fire-and-forget change notification for downstream viewers.
            log::info!(
                "Bracket {} changed: match {} decided (round complete: {:?}, bracket complete: {})",
                path.bracket_id,
                body.match_id,
                outcome.round_complete,
                outcome.bracket_complete
            );
            refresh_fight_order(event);
            HttpResponse::Ok().json(serde_json::json!({
                "event": event,
                "bracket_complete": outcome.bracket_complete,
                "round_complete": outcome.round_complete,
            }))
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Revert a match result (refused while a downstream match is decided).
#[post("/api/events/{id}/brackets/{bracket_id}/results/revert")]
async fn api_revert_result(
    state: AppState,
    path: Path<EventBracketPath>,
    body: Json<RevertResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    let event = &mut entry.event;
    let bracket = match event.brackets.get_mut(&path.bracket_id) {
        Some(b) => b,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No bracket" }))
        }
    };
    match revert_result(bracket, body.match_id) {
        Ok(()) => {
            log::info!(
                "Bracket {} changed: match {} reverted",
                path.bracket_id,
                body.match_id
            );
            refresh_fight_order(event);
            HttpResponse::Ok().json(&*event)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Auto-distribute category groups onto mats and renumber the fight order.
#[post("/api/events/{id}/mats/distribute")]
async fn api_distribute_mats(
    state: AppState,
    path: Path<EventPath>,
    body: Json<DistributeMatsBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    let event = &mut entry.event;
    if let Some(count) = body.mat_count {
        event.settings.mat_count = count;
    }
    let groups = category_groups(
        &event.divisions,
        &event.athletes,
        event.settings.belt_grouping_enabled,
    );
    let assignment = distribute_mats(&groups, event.settings.mat_count);
    event.mat_assignment = Some(assignment);
    refresh_fight_order(event);
    HttpResponse::Ok().json(&*event)
}

/// Current fight order, renumbered from live bracket state.
#[get("/api/events/{id}/fight-order")]
async fn api_fight_order(state: AppState, path: Path<EventPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    let event = &mut entry.event;
    let assignment = match event.mat_assignment.clone() {
        Some(a) => a,
        None => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "Mats not distributed yet" }))
        }
    };
    let fights = generate_fight_order(&mut event.brackets, &assignment);
    HttpResponse::Ok().json(&fights)
}

/// Podium view: winner, runner-up, and third place per bracket.
#[get("/api/events/{id}/podium")]
async fn api_podium(state: AppState, path: Path<EventPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" })),
    };
    entry.last_activity = Instant::now();
    let event = &entry.event;
    let mut podium: Vec<serde_json::Value> = event
        .brackets
        .values()
        .map(|b| {
            let division_name = event
                .division(b.division_id)
                .map(|d| d.name.clone())
                .unwrap_or_default();
            serde_json::json!({
                "bracket_id": b.id,
                "division": division_name,
                "group": b.group_name,
                "winner_id": b.winner_id,
                "runner_up_id": b.runner_up_id,
                "third_place_winner_id": b.third_place_winner_id,
                "decided": b.is_decided(),
            })
        })
        .collect();
    podium.sort_by(|a, b| a["bracket_id"].as_str().cmp(&b["bracket_id"].as_str()));
    HttpResponse::Ok().json(&podium)
}

/// Renumber the fight order after any bracket or assignment change (the
/// scheduler only writes mat/sequence marks; safe to re-run).
fn refresh_fight_order(event: &mut Event) {
    if let Some(assignment) = event.mat_assignment.clone() {
        let fights = generate_fight_order(&mut event.brackets, &assignment);
        log::debug!("Fight order refreshed: {} fight(s)", fights.len());
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<EventId, EventEntry>::new()));

    // Background task: every 30 minutes, remove events inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive event(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_create_event)
            .service(api_get_event)
            .service(api_delete_event)
            .service(api_update_settings)
            .service(api_add_division)
            .service(api_add_athlete)
            .service(api_import_athletes)
            .service(api_check_in)
            .service(api_generate_brackets)
            .service(api_generate_division_brackets)
            .service(api_record_result)
            .service(api_revert_result)
            .service(api_distribute_mats)
            .service(api_fight_order)
            .service(api_podium)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
