use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::model::id::Id;
use crate::store::AdapterError;

/// How a respondent participates in a form, resolved per (form, respondent)
/// by the enrollment collaborator. The engine only consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    /// Submits their own answer set.
    Individual,
    /// The single writer of a team's shared answer set.
    Leader,
    /// May only observe the leader's shared answer set.
    Member,
}

impl ParticipantRole {
    /// Whether this role is ever allowed to write a submission.
    pub fn can_write(self) -> bool {
        self != Self::Member
    }
}

impl Display for ParticipantRole {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Individual => "individual",
                Self::Leader => "leader",
                Self::Member => "member",
            }
        )
    }
}

/// A respondent's enrollment for one form: their role, plus their team ID
/// when the form runs in team mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub role: ParticipantRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Id>,
}

impl Enrollment {
    pub fn individual() -> Self {
        Self {
            role: ParticipantRole::Individual,
            team: None,
        }
    }

    pub fn leader(team: Id) -> Self {
        Self {
            role: ParticipantRole::Leader,
            team: Some(team),
        }
    }

    pub fn member(team: Id) -> Self {
        Self {
            role: ParticipantRole::Member,
            team: Some(team),
        }
    }

    /// The key an answer set for this respondent is stored under: the team ID
    /// in team mode (so members resolve the leader's record), the respondent
    /// ID otherwise. A team role without a team is corrupt enrollment data.
    pub fn submission_key(&self, respondent: Id) -> Result<Id, AdapterError> {
        match self.role {
            ParticipantRole::Individual => Ok(respondent),
            ParticipantRole::Leader | ParticipantRole::Member => self.team.ok_or_else(|| {
                AdapterError::Corrupt(format!(
                    "{} enrollment for respondent {respondent} has no team",
                    self.role
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_cannot_write() {
        assert!(ParticipantRole::Individual.can_write());
        assert!(ParticipantRole::Leader.can_write());
        assert!(!ParticipantRole::Member.can_write());
    }

    #[test]
    fn submission_key_resolves_team_for_team_roles() {
        let respondent = Id::new();
        let team = Id::new();

        assert_eq!(
            Enrollment::individual().submission_key(respondent).unwrap(),
            respondent
        );
        assert_eq!(
            Enrollment::leader(team).submission_key(respondent).unwrap(),
            team
        );
        assert_eq!(
            Enrollment::member(team).submission_key(respondent).unwrap(),
            team
        );
    }

    #[test]
    fn team_role_without_team_is_corrupt() {
        let enrollment = Enrollment {
            role: ParticipantRole::Leader,
            team: None,
        };
        assert!(matches!(
            enrollment.submission_key(Id::new()),
            Err(AdapterError::Corrupt(_))
        ));
    }

    #[test]
    fn role_names_are_snake_case() {
        let json = serde_json::to_string(&ParticipantRole::Individual).unwrap();
        assert_eq!(json, "\"individual\"");
    }
}
