//! Error types for the competition engine

use thiserror::Error;

use crate::competition::{
    CategoryId, CompetitionId, CompetitorId, EntryId, JudgeId, PrizeId, RegistrationId, SessionId,
};

/// Main error type for the competition engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompetitionError {
    #[error("Ineligible submission: {0}")]
    IneligibleSubmission(String),

    #[error("Invalid judging weights: {0}")]
    InvalidWeights(String),

    #[error("Results for competition {0} are not finalized")]
    ResultsNotFinalized(CompetitionId),

    #[error("Results for competition {0} are not validated")]
    ResultsNotValidated(CompetitionId),

    #[error("Prize {0} has already been claimed")]
    AlreadyClaimed(PrizeId),

    #[error("Qualification failed: {0}")]
    QualificationFailed(String),

    #[error("Competitor {competitor} is already registered for competition {competition}")]
    DuplicateRegistration {
        competitor: CompetitorId,
        competition: CompetitionId,
    },

    #[error("Cannot {action} while {state}")]
    InvalidTransition { state: String, action: &'static str },

    #[error("Competition not found: {0}")]
    CompetitionNotFound(CompetitionId),

    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Judge not found: {0}")]
    JudgeNotFound(JudgeId),

    #[error("Judging session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Registration not found: {0}")]
    RegistrationNotFound(RegistrationId),

    #[error("Prize not found: {0}")]
    PrizeNotFound(PrizeId),

    #[error("Competition {0} is not accepting entries")]
    EntriesClosed(CompetitionId),

    #[error("Category {0} has reached its entry limit")]
    CategoryFull(CategoryId),

    #[error("Judge {judge} is already at capacity ({max} concurrent sessions)")]
    JudgeAtCapacity { judge: JudgeId, max: u32 },

    #[error("Judge {judge} has already scored entry {entry}")]
    DuplicateScore { judge: JudgeId, entry: EntryId },

    #[error("Judging session {0} is closed")]
    SessionClosed(SessionId),

    #[error("Entry {entry} is not part of judging session {session}")]
    EntryNotInSession { session: SessionId, entry: EntryId },

    #[error("Judge {judge} is not assigned to judging session {session}")]
    NotSessionJudge { session: SessionId, judge: JudgeId },

    #[error("Competition {0} has already been finalized")]
    AlreadyFinalized(CompetitionId),

    #[error("Prizes for competition {0} have already been distributed")]
    PrizesAlreadyDistributed(CompetitionId),

    #[error("Competitor {claimant} did not win prize {prize}")]
    NotPrizeWinner { prize: PrizeId, claimant: CompetitorId },

    #[error("Not enough judges: {required} required, {available} available")]
    NotEnoughJudges { required: usize, available: usize },

    #[error("Results failed validation: {0}")]
    InvalidResults(String),

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Competition service is not running")]
    ServiceNotRunning,

    #[error("Competition already exists: {0}")]
    DuplicateCompetition(CompetitionId),

    #[error("Judge already registered: {0}")]
    DuplicateJudge(JudgeId),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for CompetitionError {
    fn from(err: serde_json::Error) -> Self {
        CompetitionError::Deserialization(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<CompetitionError> for pyo3::PyErr {
    fn from(err: CompetitionError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};

        let message = err.to_string();
        match err {
            CompetitionError::CompetitionNotFound(_)
            | CompetitionError::CategoryNotFound(_)
            | CompetitionError::EntryNotFound(_)
            | CompetitionError::JudgeNotFound(_)
            | CompetitionError::SessionNotFound(_)
            | CompetitionError::RegistrationNotFound(_)
            | CompetitionError::PrizeNotFound(_) => PyKeyError::new_err(message),
            CompetitionError::InvalidWeights(_)
            | CompetitionError::InvalidScore(_)
            | CompetitionError::InvalidCondition(_)
            | CompetitionError::InvalidConfig(_)
            | CompetitionError::InvalidMetadata(_)
            | CompetitionError::Deserialization(_) => PyValueError::new_err(message),
            _ => PyRuntimeError::new_err(message),
        }
    }
}

/// Result type alias for the competition engine
pub type Result<T> = std::result::Result<T, CompetitionError>;
