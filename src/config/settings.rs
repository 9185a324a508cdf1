//! Engine-wide settings

use serde::{Deserialize, Serialize};

use crate::error::{CompetitionError, Result};

/// Longest judging session window a service accepts (one year)
pub const MAX_SESSION_DURATION_HOURS: i64 = 24 * 366;

/// Tunables shared by every competition hosted by a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Length of a judging session window
    pub session_duration_hours: i64,
    /// Distinct judges assigned to each entry by automatic assignment
    pub judges_per_entry: usize,
    pub leaderboard_page_size: usize,
    /// Historical records kept in the hall of fame (oldest dropped first)
    pub history_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            session_duration_hours: 48,
            judges_per_entry: 3,
            leaderboard_page_size: 25,
            history_limit: 100,
        }
    }
}

impl EngineSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session_duration_hours <= 0
            || self.session_duration_hours > MAX_SESSION_DURATION_HOURS
        {
            return Err(CompetitionError::InvalidConfig(format!(
                "session_duration_hours must be between 1 and {}, got {}",
                MAX_SESSION_DURATION_HOURS, self.session_duration_hours
            )));
        }
        if self.judges_per_entry == 0 {
            return Err(CompetitionError::InvalidConfig(
                "judges_per_entry must be at least 1".to_string(),
            ));
        }
        if self.leaderboard_page_size == 0 {
            return Err(CompetitionError::InvalidConfig(
                "leaderboard_page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = EngineSettings::from_json(r#"{"judges_per_entry": 5}"#).unwrap();
        assert_eq!(settings.judges_per_entry, 5);
        assert_eq!(settings.session_duration_hours, 48);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(EngineSettings::from_json(r#"{"session_duration_hours": 0}"#).is_err());
        assert!(EngineSettings::from_json(r#"{"leaderboard_page_size": 0}"#).is_err());
    }

    #[test]
    fn test_session_duration_is_bounded() {
        let max = format!(r#"{{"session_duration_hours": {}}}"#, MAX_SESSION_DURATION_HOURS);
        assert!(EngineSettings::from_json(&max).is_ok());
        assert!(matches!(
            EngineSettings::from_json(r#"{"session_duration_hours": 1000000000000}"#),
            Err(CompetitionError::InvalidConfig(_))
        ));
    }
}
