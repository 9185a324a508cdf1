//! The competition service
//!
//! One `CompetitionService` hosts many competitions and one shared judge roster. Each
//! competition sits behind its own mutex, so commands on different competitions never
//! contend; judges are shared and their capacity is tracked atomically on the slot.
//!
//! Events produced by a command are drained from the aggregate while the lock is held and
//! published after it is released.

use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::views::{standings, CompetitionSnapshot, EntryView, LeaderboardView};
use crate::competition::{
    CategoryId, Clock, Competition, CompetitionId, CompetitorId, EntryId, EntryStatus, JudgeId,
    PrizeId, RegistrationId, SessionId, SystemClock,
};
use crate::config::{CompetitionConfig, EngineSettings};
use crate::error::{CompetitionError, Result};
use crate::events::{CompetitionEvent, EventBroker, Subscription, Topic};
use crate::judging::{
    plan_assignments, Judge, JudgeScore, JudgeSlot, JudgingSession, ScoreBreakdown,
};
use crate::qualification::{ParticipantProfile, ParticipantRegistration};
use crate::rewards::{DistributedPrize, HallOfFame, HistoricalRecord, WinnerProfile};
use crate::scoring::{CompetitionResults, PlantRanking};
use crate::submission::{EntryDocumentation, PlantSubmission};

struct CompetitionCell {
    competition: Mutex<Competition>,
    /// Set by the first finalization attempt that wins the race
    finalizing: AtomicBool,
}

/// Hosts competitions and the judges who score them
pub struct CompetitionService {
    settings: EngineSettings,
    clock: Arc<dyn Clock>,
    broker: EventBroker,
    competitions: RwLock<AHashMap<CompetitionId, Arc<CompetitionCell>>>,
    judges: RwLock<AHashMap<JudgeId, Arc<JudgeSlot>>>,
    hall_of_fame: Mutex<HallOfFame>,
    running: AtomicBool,
}

impl std::fmt::Debug for CompetitionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompetitionService")
            .field("settings", &self.settings)
            .field("competitions", &self.competitions.read().len())
            .field("judges", &self.judges.read().len())
            .field("running", &self.is_running())
            .finish()
    }
}

impl CompetitionService {
    /// Create a stopped service; call [`initialize`](Self::initialize) before sending commands
    pub fn new(settings: EngineSettings, clock: Arc<dyn Clock>) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(settings, clock))
    }

    /// Default settings on the system clock
    pub fn with_defaults() -> Self {
        Self::build(EngineSettings::default(), Arc::new(SystemClock))
    }

    fn build(settings: EngineSettings, clock: Arc<dyn Clock>) -> Self {
        let history_limit = settings.history_limit;
        Self {
            settings,
            clock,
            broker: EventBroker::new(),
            competitions: RwLock::new(AHashMap::new()),
            judges: RwLock::new(AHashMap::new()),
            hall_of_fame: Mutex::new(HallOfFame::new(history_limit)),
            running: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn broker(&self) -> &EventBroker {
        &self.broker
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    pub fn initialize(&self) {
        if !self.running.swap(true, Ordering::AcqRel) {
            tracing::info!(
                competitions = self.competitions.read().len(),
                judges = self.judges.read().len(),
                "competition service started"
            );
        }
    }

    /// Stop accepting commands, close every competition's entries and release judges
    pub fn shutdown(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }

        let now = self.clock.now();
        let cells: Vec<Arc<CompetitionCell>> = self.competitions.read().values().cloned().collect();
        let mut closed_sessions = 0;
        for cell in cells {
            let events = {
                let mut competition = cell.competition.lock();
                competition.close_entries(now);
                closed_sessions += competition.close_all_sessions(now);
                competition.take_events()
            };
            self.broker.publish_all(&events);
        }
        tracing::info!(closed_sessions, "competition service stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(CompetitionError::ServiceNotRunning)
        }
    }

    // ============================================================================
    // Registry
    // ============================================================================

    #[tracing::instrument(skip_all, fields(name = %config.name))]
    pub fn create_competition(&self, config: CompetitionConfig) -> Result<CompetitionId> {
        self.ensure_running()?;
        let mut competition = Competition::from_config(config, self.clock.now())?;
        let id = competition.id.clone();
        let events = competition.take_events();

        {
            let mut competitions = self.competitions.write();
            if competitions.contains_key(&id) {
                tracing::warn!(competition = %id, "duplicate competition rejected");
                return Err(CompetitionError::DuplicateCompetition(id));
            }
            competitions.insert(
                id.clone(),
                Arc::new(CompetitionCell {
                    competition: Mutex::new(competition),
                    finalizing: AtomicBool::new(false),
                }),
            );
        }

        tracing::info!(competition = %id, "competition created");
        self.broker.publish_all(&events);
        Ok(id)
    }

    /// Parse, validate and host a competition definition
    pub fn load_competition_json(&self, json: &str) -> Result<CompetitionId> {
        self.create_competition(CompetitionConfig::from_json(json)?)
    }

    /// Ids of every hosted competition, sorted
    pub fn competition_ids(&self) -> Vec<CompetitionId> {
        let mut ids: Vec<CompetitionId> = self.competitions.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn register_judge(&self, judge: Judge) -> Result<()> {
        self.ensure_running()?;
        judge.validate()?;

        let mut judges = self.judges.write();
        if judges.contains_key(&judge.id) {
            return Err(CompetitionError::DuplicateJudge(judge.id));
        }
        tracing::info!(judge = %judge.id, capacity = judge.max_concurrent_competitions, "judge registered");
        judges.insert(judge.id.clone(), JudgeSlot::new(judge));
        Ok(())
    }

    pub fn judge(&self, id: &JudgeId) -> Result<Arc<JudgeSlot>> {
        self.judges
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| CompetitionError::JudgeNotFound(id.clone()))
    }

    fn cell(&self, id: &CompetitionId) -> Result<Arc<CompetitionCell>> {
        self.competitions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| CompetitionError::CompetitionNotFound(id.clone()))
    }

    /// Run a command against one competition and publish what it emitted
    fn command<T>(
        &self,
        id: &CompetitionId,
        action: &'static str,
        f: impl FnOnce(&mut Competition, DateTime<Utc>) -> Result<T>,
    ) -> Result<T> {
        self.ensure_running()?;
        let cell = self.cell(id)?;

        let (result, events) = {
            let mut competition = cell.competition.lock();
            let result = f(&mut competition, self.clock.now());
            (result, competition.take_events())
        };

        if let Err(ref error) = result {
            tracing::warn!(competition = %id, action, %error, "command rejected");
        }
        self.broker.publish_all(&events);
        result
    }

    /// Read from one competition; allowed while the service is stopped
    fn query<T>(
        &self,
        id: &CompetitionId,
        f: impl FnOnce(&Competition, DateTime<Utc>) -> T,
    ) -> Result<T> {
        let cell = self.cell(id)?;
        let competition = cell.competition.lock();
        Ok(f(&competition, self.clock.now()))
    }

    // ============================================================================
    // Registration
    // ============================================================================

    pub fn register_participant(
        &self,
        competition_id: &CompetitionId,
        profile: ParticipantProfile,
        category_id: &CategoryId,
    ) -> Result<ParticipantRegistration> {
        let registration = self.command(competition_id, "register participant", |c, now| {
            c.register_participant(profile, category_id, now)
        })?;
        tracing::debug!(
            competition = %competition_id,
            registration = %registration.id,
            status = %registration.status(),
            "participant registered"
        );
        Ok(registration)
    }

    pub fn register_entry(
        &self,
        competition_id: &CompetitionId,
        registration_id: &RegistrationId,
        submission: PlantSubmission,
        documentation: EntryDocumentation,
    ) -> Result<EntryId> {
        self.command(competition_id, "register entry", |c, now| {
            c.register_entry(registration_id, submission, documentation, now)
        })
    }

    pub fn revise_entry(
        &self,
        competition_id: &CompetitionId,
        entry_id: &EntryId,
        submission: PlantSubmission,
        documentation: EntryDocumentation,
    ) -> Result<()> {
        self.command(competition_id, "revise entry", |c, now| {
            c.revise_entry(entry_id, submission, documentation, now)
        })
    }

    pub fn submit_entry(&self, competition_id: &CompetitionId, entry_id: &EntryId) -> Result<()> {
        self.command(competition_id, "submit entry", |c, now| {
            c.submit_entry(entry_id, now)
        })
    }

    pub fn cancel_registration(
        &self,
        competition_id: &CompetitionId,
        registration_id: &RegistrationId,
    ) -> Result<()> {
        self.command(competition_id, "cancel registration", |c, now| {
            c.cancel_registration(registration_id, now)
        })
    }

    pub fn close_entries(&self, competition_id: &CompetitionId) -> Result<()> {
        self.command(competition_id, "close entries", |c, now| {
            c.close_entries(now);
            Ok(())
        })
    }

    // ============================================================================
    // Judging
    // ============================================================================

    fn session_duration(&self) -> Duration {
        Duration::try_hours(self.settings.session_duration_hours).unwrap_or(Duration::MAX)
    }

    #[tracing::instrument(skip(self, entry_ids), fields(entries = entry_ids.len()))]
    pub fn start_judging_session(
        &self,
        competition_id: &CompetitionId,
        judge_id: &JudgeId,
        entry_ids: Vec<EntryId>,
    ) -> Result<JudgingSession> {
        let slot = self.judge(judge_id)?;
        let duration = self.session_duration();
        let session = self.command(competition_id, "start judging session", |c, now| {
            c.start_session(&slot, entry_ids, duration, now)
        })?;
        tracing::info!(session = %session.id, ends_at = %session.ends_at, "judging session started");
        Ok(session)
    }

    /// Open sessions that give every submitted entry `judges_per_entry` judges
    #[tracing::instrument(skip(self))]
    pub fn assign_judges(&self, competition_id: &CompetitionId) -> Result<Vec<JudgingSession>> {
        let slots: Vec<Arc<JudgeSlot>> = self.judges.read().values().cloned().collect();
        let judges_per_entry = self.settings.judges_per_entry;
        let duration = self.session_duration();

        let sessions = self.command(competition_id, "assign judges", |c, now| {
            let pending: Vec<EntryId> = c
                .entries()
                .iter()
                .filter(|e| e.status() == EntryStatus::Submitted)
                .map(|e| e.id.clone())
                .collect();
            let covered: AHashSet<(JudgeId, EntryId)> = c
                .sessions()
                .filter(|s| s.is_active(now))
                .flat_map(|s| s.entry_ids.iter().map(move |e| (s.judge_id.clone(), e.clone())))
                .collect();
            let plan = plan_assignments(
                &pending,
                &slots,
                judges_per_entry,
                c.competition_type,
                |judge, entry| covered.contains(&(judge.clone(), entry.clone())),
                &mut rand::thread_rng(),
            )?;

            let mut opened = Vec::with_capacity(plan.len());
            for assignment in plan {
                let started = slots
                    .iter()
                    .find(|s| s.id() == &assignment.judge_id)
                    .ok_or_else(|| CompetitionError::JudgeNotFound(assignment.judge_id.clone()))
                    .and_then(|slot| c.start_session(slot, assignment.entries, duration, now));
                match started {
                    Ok(session) => opened.push(session),
                    Err(error) => {
                        // a judge filled up since planning; undo the sessions opened so far
                        for session in &opened {
                            let _ = c.complete_session(&session.id, now);
                        }
                        return Err(error);
                    }
                }
            }
            Ok(opened)
        })?;

        tracing::info!(sessions = sessions.len(), "judges assigned");
        Ok(sessions)
    }

    pub fn submit_score(
        &self,
        competition_id: &CompetitionId,
        session_id: &SessionId,
        judge_id: &JudgeId,
        entry_id: &EntryId,
        breakdown: ScoreBreakdown,
        comments: &str,
    ) -> Result<JudgeScore> {
        let score = self.command(competition_id, "submit score", |c, now| {
            c.submit_score(session_id, judge_id, entry_id, breakdown, comments, now)
        })?;
        tracing::debug!(
            competition = %competition_id,
            entry = %entry_id,
            judge = %judge_id,
            total = score.total_score,
            "score recorded"
        );
        Ok(score)
    }

    pub fn complete_session(
        &self,
        competition_id: &CompetitionId,
        session_id: &SessionId,
    ) -> Result<JudgingSession> {
        self.command(competition_id, "complete session", |c, now| {
            c.complete_session(session_id, now)
        })
    }

    /// Close sessions whose window has passed in every hosted competition
    pub fn expire_sessions(&self) -> Result<usize> {
        let mut expired = 0;
        for id in self.competition_ids() {
            expired += self.command(&id, "expire sessions", |c, now| Ok(c.expire_sessions(now)))?;
        }
        if expired > 0 {
            tracing::info!(expired, "expired judging sessions closed");
        }
        Ok(expired)
    }

    pub fn disqualify_entry(
        &self,
        competition_id: &CompetitionId,
        entry_id: &EntryId,
        reason: &str,
    ) -> Result<()> {
        self.command(competition_id, "disqualify entry", |c, now| {
            c.disqualify_entry(entry_id, reason, now)
        })?;
        tracing::info!(competition = %competition_id, entry = %entry_id, reason, "entry disqualified");
        Ok(())
    }

    // ============================================================================
    // Results
    // ============================================================================

    /// Finalize results exactly once, even when several callers race
    #[tracing::instrument(skip(self))]
    pub fn finalize_results(&self, competition_id: &CompetitionId) -> Result<CompetitionResults> {
        self.ensure_running()?;
        let cell = self.cell(competition_id)?;
        if cell
            .finalizing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("finalization already claimed");
            return Err(CompetitionError::AlreadyFinalized(competition_id.clone()));
        }

        let result = self.command(competition_id, "finalize results", |c, now| {
            c.finalize_results(now).map(CompetitionResults::clone)
        });
        match result {
            Ok(results) => {
                tracing::info!(
                    ranked = results.rankings.len(),
                    winner = ?results.overall_winner.as_ref().map(|w| &w.competitor_id),
                    "results finalized"
                );
                Ok(results)
            }
            Err(error) => {
                cell.finalizing.store(false, Ordering::Release);
                Err(error)
            }
        }
    }

    pub fn validate_results(&self, competition_id: &CompetitionId) -> Result<CompetitionResults> {
        self.command(competition_id, "validate results", |c, now| {
            c.validate_results(now).map(CompetitionResults::clone)
        })
    }

    /// Award prizes and record the competition in the hall of fame
    #[tracing::instrument(skip(self))]
    pub fn distribute_prizes(&self, competition_id: &CompetitionId) -> Result<Vec<DistributedPrize>> {
        let (prizes, name, competition_type, results, now) =
            self.command(competition_id, "distribute prizes", |c, now| {
                let prizes = c.distribute_prizes(now)?.to_vec();
                let results = c
                    .results()
                    .cloned()
                    .ok_or_else(|| CompetitionError::ResultsNotFinalized(c.id.clone()))?;
                Ok((prizes, c.name.clone(), c.competition_type, results, now))
            })?;

        self.hall_of_fame
            .lock()
            .record(&name, competition_type, &results, &prizes, now);
        tracing::info!(prizes = prizes.len(), "prizes distributed");
        Ok(prizes)
    }

    pub fn claim_prize(
        &self,
        competition_id: &CompetitionId,
        prize_id: &PrizeId,
        claimant: &CompetitorId,
    ) -> Result<DistributedPrize> {
        self.command(competition_id, "claim prize", |c, now| {
            c.claim_prize(prize_id, claimant, now)
        })
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub fn snapshot(&self, competition_id: &CompetitionId) -> Result<CompetitionSnapshot> {
        self.query(competition_id, CompetitionSnapshot::of)
    }

    /// Status of an entry; unknown competitions and entries report `NotFound`
    pub fn entry_status(&self, competition_id: &CompetitionId, entry_id: &EntryId) -> EntryStatus {
        self.query(competition_id, |c, _| {
            c.entry(entry_id).map_or(EntryStatus::NotFound, |e| e.status())
        })
        .unwrap_or(EntryStatus::NotFound)
    }

    pub fn entry_view(&self, competition_id: &CompetitionId, entry_id: &EntryId) -> Result<EntryView> {
        self.query(competition_id, |c, _| {
            c.entry(entry_id)
                .map(|e| EntryView::of(e, c.results()))
                .ok_or_else(|| CompetitionError::EntryNotFound(entry_id.clone()))
        })?
    }

    pub fn registration(
        &self,
        competition_id: &CompetitionId,
        registration_id: &RegistrationId,
    ) -> Result<ParticipantRegistration> {
        self.query(competition_id, |c, _| {
            c.registration(registration_id)
                .cloned()
                .ok_or_else(|| CompetitionError::RegistrationNotFound(registration_id.clone()))
        })?
    }

    /// One page of standings, using the configured page size
    pub fn leaderboard(
        &self,
        competition_id: &CompetitionId,
        category: Option<&CategoryId>,
        page: usize,
    ) -> Result<LeaderboardView> {
        let page_size = self.settings.leaderboard_page_size;
        self.query(competition_id, |c, _| {
            LeaderboardView::build(c, category, page, page_size)
        })
    }

    /// Full standings and whether they are still provisional
    pub fn standings(
        &self,
        competition_id: &CompetitionId,
        category: Option<&CategoryId>,
    ) -> Result<(Vec<PlantRanking>, bool)> {
        self.query(competition_id, |c, _| standings(c, category))
    }

    pub fn results(&self, competition_id: &CompetitionId) -> Result<Option<CompetitionResults>> {
        self.query(competition_id, |c, _| c.results().cloned())
    }

    pub fn prizes(&self, competition_id: &CompetitionId) -> Result<Vec<DistributedPrize>> {
        self.query(competition_id, |c, _| c.prizes().to_vec())
    }

    pub fn sessions(&self, competition_id: &CompetitionId) -> Result<Vec<JudgingSession>> {
        self.query(competition_id, |c, _| c.sessions().cloned().collect())
    }

    pub fn winner_profile(&self, competitor: &CompetitorId) -> Option<WinnerProfile> {
        self.hall_of_fame.lock().profile(competitor).cloned()
    }

    /// Concluded competitions, newest first
    pub fn history(&self) -> Vec<HistoricalRecord> {
        self.hall_of_fame.lock().records().cloned().collect()
    }

    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&CompetitionEvent) + Send + Sync + 'static,
    {
        self.broker.subscribe(topic, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::ManualClock;
    use crate::config::test_support::{sample_config, season_start};
    use crate::qualification::test_support::veteran_profile;
    use crate::submission::test_support::{complete_documentation, sample_submission};
    use std::sync::atomic::AtomicUsize;

    fn service() -> (CompetitionService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(season_start()));
        let service = CompetitionService::new(EngineSettings::default(), clock.clone()).unwrap();
        service.initialize();
        (service, clock)
    }

    fn profile(id: &str) -> ParticipantProfile {
        ParticipantProfile {
            competitor_id: CompetitorId::new(id),
            ..veteran_profile()
        }
    }

    fn enter(service: &CompetitionService, id: &CompetitionId, competitor: &str) -> EntryId {
        let reg = service
            .register_participant(id, profile(competitor), &CategoryId::new("indica"))
            .unwrap();
        let entry = service
            .register_entry(id, &reg.id, sample_submission(), complete_documentation())
            .unwrap();
        service.submit_entry(id, &entry).unwrap();
        entry
    }

    #[test]
    fn test_commands_require_running_service() {
        let clock = Arc::new(ManualClock::new(season_start()));
        let service = CompetitionService::new(EngineSettings::default(), clock).unwrap();
        assert_eq!(
            service.create_competition(sample_config()).unwrap_err(),
            CompetitionError::ServiceNotRunning
        );

        service.initialize();
        let id = service.create_competition(sample_config()).unwrap();
        assert_eq!(
            service.create_competition(sample_config()).unwrap_err(),
            CompetitionError::DuplicateCompetition(id.clone())
        );

        service.shutdown();
        assert!(service.snapshot(&id).is_ok());
        assert_eq!(
            service.close_entries(&id).unwrap_err(),
            CompetitionError::ServiceNotRunning
        );
    }

    #[test]
    fn test_shutdown_releases_judges() {
        let (service, clock) = service();
        let id = service.create_competition(sample_config()).unwrap();
        service.register_judge(Judge::new("ada", "Ada")).unwrap();
        clock.advance(Duration::days(1));
        let entry = enter(&service, &id, "g1");

        service
            .start_judging_session(&id, &JudgeId::new("ada"), vec![entry])
            .unwrap();
        let slot = service.judge(&JudgeId::new("ada")).unwrap();
        assert_eq!(slot.active_sessions(), 1);

        service.shutdown();
        assert_eq!(slot.active_sessions(), 0);
        assert!(!service.snapshot(&id).unwrap().accepting_entries);
    }

    #[test]
    fn test_entry_status_unknown_ids() {
        let (service, _) = service();
        let id = service.create_competition(sample_config()).unwrap();
        assert_eq!(
            service.entry_status(&id, &EntryId::new("missing")),
            EntryStatus::NotFound
        );
        assert_eq!(
            service.entry_status(&CompetitionId::new("nope"), &EntryId::new("missing")),
            EntryStatus::NotFound
        );
    }

    #[test]
    fn test_assign_judges_spreads_entries() {
        let (service, clock) = service();
        let id = service.create_competition(sample_config()).unwrap();
        for judge in ["ada", "bob", "cyd", "dee"] {
            service.register_judge(Judge::new(judge, judge)).unwrap();
        }
        clock.advance(Duration::days(1));
        let entries: Vec<EntryId> = (0..4).map(|i| enter(&service, &id, &format!("g{}", i))).collect();

        let sessions = service.assign_judges(&id).unwrap();
        for entry in &entries {
            let judges = sessions.iter().filter(|s| s.contains(entry)).count();
            assert_eq!(judges, 3);
        }
    }

    #[test]
    fn test_assign_judges_skips_judges_already_on_entry() {
        let (service, clock) = service();
        let id = service.create_competition(sample_config()).unwrap();
        for judge in ["ada", "bob", "cyd", "dee"] {
            service.register_judge(Judge::new(judge, judge)).unwrap();
        }
        clock.advance(Duration::days(1));
        let entry = enter(&service, &id, "g1");
        let ada = JudgeId::new("ada");
        let manual = service
            .start_judging_session(&id, &ada, vec![entry.clone()])
            .unwrap();

        let assigned = service.assign_judges(&id).unwrap();
        assert_eq!(assigned.len(), 3);
        assert!(assigned.iter().all(|s| s.judge_id != ada));

        let raw = ScoreBreakdown::new(70.0, 70.0, 70.0, 70.0).unwrap();
        for session in assigned.iter().chain(std::iter::once(&manual)) {
            service
                .submit_score(&id, &session.id, &session.judge_id, &entry, raw, "")
                .unwrap();
        }
        assert_eq!(
            service.entry_view(&id, &entry).unwrap().statistics.unwrap().judge_count,
            4
        );
    }

    #[test]
    fn test_assign_judges_not_enough() {
        let (service, clock) = service();
        let id = service.create_competition(sample_config()).unwrap();
        service.register_judge(Judge::new("ada", "Ada")).unwrap();
        clock.advance(Duration::days(1));
        enter(&service, &id, "g1");

        assert!(matches!(
            service.assign_judges(&id),
            Err(CompetitionError::NotEnoughJudges { required: 3, available: 1 })
        ));
        assert!(service.sessions(&id).unwrap().is_empty());
    }

    #[test]
    fn test_events_published_after_commands() {
        let (service, clock) = service();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let _sub = service.subscribe(Topic::EntryStatusChanged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let id = service.create_competition(sample_config()).unwrap();
        clock.advance(Duration::days(1));
        enter(&service, &id, "g1");
        // created as draft, then submitted
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_finalization_happens_once() {
        let (service, clock) = service();
        let id = service.create_competition(sample_config()).unwrap();
        clock.advance(Duration::days(20));
        let service = Arc::new(service);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                let id = id.clone();
                std::thread::spawn(move || service.finalize_results(&id).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
        assert!(service.results(&id).unwrap().is_some());
    }
}
