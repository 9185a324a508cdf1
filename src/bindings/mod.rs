//! Python bindings for the game server
//!
//! The service lives in Rust memory behind a global handle, created once with
//! `init_service`. Structured values cross the boundary as plain dicts and lists, converted
//! through Python's `json` module and serde.

mod leaderboard;

pub use leaderboard::Leaderboard;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::competition::{
    CategoryId, CompetitionId, CompetitorId, EntryId, JudgeId, PrizeId, RegistrationId,
    SessionId, SystemClock,
};
use crate::config::{CompetitionConfig, EngineSettings};
use crate::error::CompetitionError;
use crate::judging::{Judge, ScoreBreakdown};
use crate::qualification::ParticipantProfile;
use crate::service::CompetitionService;
use crate::submission::{EntryDocumentation, PlantSubmission};

/// Global service handle
static SERVICE: OnceCell<RwLock<Arc<CompetitionService>>> = OnceCell::new();

fn service() -> PyResult<Arc<CompetitionService>> {
    SERVICE
        .get()
        .map(|lock| Arc::clone(&lock.read()))
        .ok_or_else(|| PyRuntimeError::new_err("Service not initialized. Call init_service() first."))
}

/// Python object -> serde value, through `json.dumps`
fn from_py<T: DeserializeOwned>(obj: &Bound<'_, PyAny>) -> PyResult<T> {
    let json = obj.py().import("json")?;
    let text: String = json.call_method1("dumps", (obj,))?.extract()?;
    Ok(serde_json::from_str(&text).map_err(CompetitionError::from)?)
}

/// serde value -> Python object, through `json.loads`
fn to_py<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<Py<PyAny>> {
    let text = serde_json::to_string(value).map_err(CompetitionError::from)?;
    let json = py.import("json")?;
    Ok(json.call_method1("loads", (text,))?.unbind())
}

// ============================================================================
// Setup
// ============================================================================

/// Install a `tracing` subscriber writing to stderr.
///
/// `filter` uses `EnvFilter` syntax (default `"info"`). Returns False if a subscriber was
/// already installed.
#[pyfunction]
#[pyo3(signature = (filter=None))]
fn init_logging(filter: Option<&str>) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter.unwrap_or("info")))
        .try_init()
        .is_ok()
}

/// Create and start the global service (call once at startup).
///
/// Calling it again replaces the service; the previous one is shut down first.
#[pyfunction]
#[pyo3(signature = (settings=None))]
fn init_service(settings: Option<&Bound<'_, PyAny>>) -> PyResult<()> {
    let settings: EngineSettings = match settings {
        Some(obj) => from_py(obj)?,
        None => EngineSettings::default(),
    };
    let fresh = Arc::new(CompetitionService::new(settings, Arc::new(SystemClock))?);
    fresh.initialize();

    if let Some(existing) = SERVICE.get() {
        let mut guard = existing.write();
        guard.shutdown();
        *guard = fresh;
    } else if let Err(rejected) = SERVICE.set(RwLock::new(Arc::clone(&fresh))) {
        // lost an initialization race; keep the winner
        rejected.into_inner().shutdown();
    }
    Ok(())
}

#[pyfunction]
fn is_service_initialized() -> bool {
    SERVICE.get().map_or(false, |lock| lock.read().is_running())
}

#[pyfunction]
fn shutdown_service() -> PyResult<()> {
    service()?.shutdown();
    Ok(())
}

// ============================================================================
// Registry
// ============================================================================

/// Host a competition described by a dict; returns its id
#[pyfunction]
fn create_competition(config: &Bound<'_, PyAny>) -> PyResult<String> {
    let config: CompetitionConfig = from_py(config)?;
    Ok(service()?.create_competition(config)?.to_string())
}

#[pyfunction]
fn register_judge(judge: &Bound<'_, PyAny>) -> PyResult<()> {
    let judge: Judge = from_py(judge)?;
    Ok(service()?.register_judge(judge)?)
}

// ============================================================================
// Registration and entries
// ============================================================================

/// Register a competitor; returns the registration dict including qualification results
#[pyfunction]
fn register_participant(
    py: Python<'_>,
    competition_id: &str,
    profile: &Bound<'_, PyAny>,
    category_id: &str,
) -> PyResult<Py<PyAny>> {
    let profile: ParticipantProfile = from_py(profile)?;
    let registration = service()?.register_participant(
        &CompetitionId::new(competition_id),
        profile,
        &CategoryId::new(category_id),
    )?;
    to_py(py, &registration)
}

#[pyfunction]
fn register_entry(
    competition_id: &str,
    registration_id: &str,
    submission: &Bound<'_, PyAny>,
    documentation: &Bound<'_, PyAny>,
) -> PyResult<String> {
    let submission: PlantSubmission = from_py(submission)?;
    let documentation: EntryDocumentation = from_py(documentation)?;
    let entry = service()?.register_entry(
        &CompetitionId::new(competition_id),
        &RegistrationId::new(registration_id),
        submission,
        documentation,
    )?;
    Ok(entry.to_string())
}

#[pyfunction]
fn submit_entry(competition_id: &str, entry_id: &str) -> PyResult<()> {
    Ok(service()?.submit_entry(&CompetitionId::new(competition_id), &EntryId::new(entry_id))?)
}

#[pyfunction]
fn cancel_registration(competition_id: &str, registration_id: &str) -> PyResult<()> {
    Ok(service()?.cancel_registration(
        &CompetitionId::new(competition_id),
        &RegistrationId::new(registration_id),
    )?)
}

/// Current status name of an entry; `"not_found"` for unknown ids
#[pyfunction]
fn entry_status(competition_id: &str, entry_id: &str) -> PyResult<String> {
    let status = service()?.entry_status(&CompetitionId::new(competition_id), &EntryId::new(entry_id));
    Ok(serde_json::to_value(status)
        .map_err(CompetitionError::from)?
        .as_str()
        .unwrap_or_default()
        .to_string())
}

#[pyfunction]
fn entry_view(py: Python<'_>, competition_id: &str, entry_id: &str) -> PyResult<Py<PyAny>> {
    let view = service()?.entry_view(&CompetitionId::new(competition_id), &EntryId::new(entry_id))?;
    to_py(py, &view)
}

// ============================================================================
// Judging
// ============================================================================

#[pyfunction]
fn start_judging_session(
    py: Python<'_>,
    competition_id: &str,
    judge_id: &str,
    entry_ids: Vec<String>,
) -> PyResult<Py<PyAny>> {
    let session = service()?.start_judging_session(
        &CompetitionId::new(competition_id),
        &JudgeId::new(judge_id),
        entry_ids.into_iter().map(EntryId::new).collect(),
    )?;
    to_py(py, &session)
}

/// Open sessions for every submitted entry; returns the session dicts
#[pyfunction]
fn assign_judges(py: Python<'_>, competition_id: &str) -> PyResult<Py<PyAny>> {
    let sessions = service()?.assign_judges(&CompetitionId::new(competition_id))?;
    to_py(py, &sessions)
}

#[pyfunction]
#[pyo3(signature = (competition_id, session_id, judge_id, entry_id, visual, aroma, potency, overall, comments=""))]
#[allow(clippy::too_many_arguments)]
fn submit_score(
    py: Python<'_>,
    competition_id: &str,
    session_id: &str,
    judge_id: &str,
    entry_id: &str,
    visual: f64,
    aroma: f64,
    potency: f64,
    overall: f64,
    comments: &str,
) -> PyResult<Py<PyAny>> {
    let breakdown = ScoreBreakdown::new(visual, aroma, potency, overall)?;
    let score = service()?.submit_score(
        &CompetitionId::new(competition_id),
        &SessionId::new(session_id),
        &JudgeId::new(judge_id),
        &EntryId::new(entry_id),
        breakdown,
        comments,
    )?;
    to_py(py, &score)
}

#[pyfunction]
fn complete_session(py: Python<'_>, competition_id: &str, session_id: &str) -> PyResult<Py<PyAny>> {
    let session = service()?.complete_session(
        &CompetitionId::new(competition_id),
        &SessionId::new(session_id),
    )?;
    to_py(py, &session)
}

#[pyfunction]
fn expire_sessions() -> PyResult<usize> {
    Ok(service()?.expire_sessions()?)
}

#[pyfunction]
fn disqualify_entry(competition_id: &str, entry_id: &str, reason: &str) -> PyResult<()> {
    Ok(service()?.disqualify_entry(
        &CompetitionId::new(competition_id),
        &EntryId::new(entry_id),
        reason,
    )?)
}

// ============================================================================
// Results and rewards
// ============================================================================

#[pyfunction]
fn finalize_results(py: Python<'_>, competition_id: &str) -> PyResult<Py<PyAny>> {
    let results = service()?.finalize_results(&CompetitionId::new(competition_id))?;
    to_py(py, &results)
}

/// Finalize results on a blocking worker thread.
///
/// Returns an awaitable resolving to the final overall `Leaderboard`, so the asyncio loop
/// stays responsive while entries are resolved and ranked.
///
/// # Example (Python)
/// ```python
/// board = await finalize_results_async("summer-cup")
/// print(board.get_page(1))
/// ```
#[pyfunction]
fn finalize_results_async(py: Python<'_>, competition_id: String) -> PyResult<Bound<'_, PyAny>> {
    let service = service()?;
    let page_size = service.settings().leaderboard_page_size;

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let board = tokio::task::spawn_blocking(move || {
            let id = CompetitionId::new(competition_id);
            service.finalize_results(&id)?;
            let (standings, provisional) = service.standings(&id, None)?;
            Ok::<Leaderboard, PyErr>(Leaderboard::new(id, None, standings, provisional, page_size))
        })
        .await
        .map_err(|e| PyRuntimeError::new_err(format!("Finalization task panicked: {}", e)))??;

        Ok(board)
    })
}

#[pyfunction]
fn validate_results(py: Python<'_>, competition_id: &str) -> PyResult<Py<PyAny>> {
    let results = service()?.validate_results(&CompetitionId::new(competition_id))?;
    to_py(py, &results)
}

#[pyfunction]
fn distribute_prizes(py: Python<'_>, competition_id: &str) -> PyResult<Py<PyAny>> {
    let prizes = service()?.distribute_prizes(&CompetitionId::new(competition_id))?;
    to_py(py, &prizes)
}

#[pyfunction]
fn claim_prize(
    py: Python<'_>,
    competition_id: &str,
    prize_id: &str,
    claimant: &str,
) -> PyResult<Py<PyAny>> {
    let prize = service()?.claim_prize(
        &CompetitionId::new(competition_id),
        &PrizeId::new(prize_id),
        &CompetitorId::new(claimant),
    )?;
    to_py(py, &prize)
}

// ============================================================================
// Projections
// ============================================================================

#[pyfunction]
fn snapshot(py: Python<'_>, competition_id: &str) -> PyResult<Py<PyAny>> {
    let snapshot = service()?.snapshot(&CompetitionId::new(competition_id))?;
    to_py(py, &snapshot)
}

/// Standings as a lazily paginated `Leaderboard`
#[pyfunction]
#[pyo3(signature = (competition_id, category_id=None))]
fn leaderboard(competition_id: &str, category_id: Option<&str>) -> PyResult<Leaderboard> {
    let service = service()?;
    let id = CompetitionId::new(competition_id);
    let category = category_id.map(CategoryId::new);
    let (standings, provisional) = service.standings(&id, category.as_ref())?;
    Ok(Leaderboard::new(
        id,
        category,
        standings,
        provisional,
        service.settings().leaderboard_page_size,
    ))
}

#[pyfunction]
fn winner_profile(py: Python<'_>, competitor_id: &str) -> PyResult<Py<PyAny>> {
    match service()?.winner_profile(&CompetitorId::new(competitor_id)) {
        Some(profile) => to_py(py, &profile),
        None => Ok(py.None()),
    }
}

#[pyfunction]
fn history(py: Python<'_>) -> PyResult<Py<PyAny>> {
    to_py(py, &service()?.history())
}

/// Register every binding on the extension module
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(init_service, m)?)?;
    m.add_function(wrap_pyfunction!(is_service_initialized, m)?)?;
    m.add_function(wrap_pyfunction!(shutdown_service, m)?)?;
    m.add_function(wrap_pyfunction!(create_competition, m)?)?;
    m.add_function(wrap_pyfunction!(register_judge, m)?)?;
    m.add_function(wrap_pyfunction!(register_participant, m)?)?;
    m.add_function(wrap_pyfunction!(register_entry, m)?)?;
    m.add_function(wrap_pyfunction!(submit_entry, m)?)?;
    m.add_function(wrap_pyfunction!(cancel_registration, m)?)?;
    m.add_function(wrap_pyfunction!(entry_status, m)?)?;
    m.add_function(wrap_pyfunction!(entry_view, m)?)?;
    m.add_function(wrap_pyfunction!(start_judging_session, m)?)?;
    m.add_function(wrap_pyfunction!(assign_judges, m)?)?;
    m.add_function(wrap_pyfunction!(submit_score, m)?)?;
    m.add_function(wrap_pyfunction!(complete_session, m)?)?;
    m.add_function(wrap_pyfunction!(expire_sessions, m)?)?;
    m.add_function(wrap_pyfunction!(disqualify_entry, m)?)?;
    m.add_function(wrap_pyfunction!(finalize_results, m)?)?;
    m.add_function(wrap_pyfunction!(finalize_results_async, m)?)?;
    m.add_function(wrap_pyfunction!(validate_results, m)?)?;
    m.add_function(wrap_pyfunction!(distribute_prizes, m)?)?;
    m.add_function(wrap_pyfunction!(claim_prize, m)?)?;
    m.add_function(wrap_pyfunction!(snapshot, m)?)?;
    m.add_function(wrap_pyfunction!(leaderboard, m)?)?;
    m.add_function(wrap_pyfunction!(winner_profile, m)?)?;
    m.add_function(wrap_pyfunction!(history, m)?)?;
    m.add_class::<Leaderboard>()?;
    Ok(())
}
