//! Stage Catalog — the fixed set of pipeline stage types and their display
//! metadata. Anything outside this set is dropped (and reported) by the
//! normalizer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    ResumeScreening,
    AptitudeTest,
    CodingChallenge,
    VoiceInterview,
    TechnicalInterview,
    CustomRound,
}

impl StageType {
    pub const ALL: [StageType; 6] = [
        StageType::ResumeScreening,
        StageType::AptitudeTest,
        StageType::CodingChallenge,
        StageType::VoiceInterview,
        StageType::TechnicalInterview,
        StageType::CustomRound,
    ];

    /// Lenient parse of a client-supplied stage-type string. Legacy clients
    /// send the catalog `id` field with hyphenated or shortened names.
    pub fn parse(raw: &str) -> Option<StageType> {
        match raw.trim().to_lowercase().as_str() {
            "resume_screening" | "resume-screening" | "screening" => {
                Some(StageType::ResumeScreening)
            }
            "aptitude_test" | "aptitude-test" | "aptitude" => Some(StageType::AptitudeTest),
            "coding_challenge" | "coding-challenge" | "coding" => Some(StageType::CodingChallenge),
            "voice_interview" | "voice-interview" | "ai_interview" => {
                Some(StageType::VoiceInterview)
            }
            "technical_interview" | "technical-interview" | "interview" => {
                Some(StageType::TechnicalInterview)
            }
            "custom_round" | "custom" => Some(StageType::CustomRound),
            _ => None,
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            StageType::ResumeScreening => "resume_screening",
            StageType::AptitudeTest => "aptitude_test",
            StageType::CodingChallenge => "coding_challenge",
            StageType::VoiceInterview => "voice_interview",
            StageType::TechnicalInterview => "technical_interview",
            StageType::CustomRound => "custom_round",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StageType::ResumeScreening => "Resume Screening",
            StageType::AptitudeTest => "Aptitude Test",
            StageType::CodingChallenge => "Coding Challenge",
            StageType::VoiceInterview => "AI Voice Interview",
            StageType::TechnicalInterview => "Technical Interview",
            StageType::CustomRound => "Custom Round",
        }
    }

    /// Candidate-facing route path for this stage, or `None` for stages with
    /// no client route (custom rounds are run entirely by HR).
    pub fn route_path(&self) -> Option<&'static str> {
        match self {
            StageType::ResumeScreening => Some("/round/resume-screening"),
            StageType::AptitudeTest => Some("/round/aptitude-test"),
            StageType::CodingChallenge => Some("/round/coding"),
            StageType::VoiceInterview => Some("/round/voice-interview"),
            StageType::TechnicalInterview => Some("/round/technical-interview"),
            StageType::CustomRound => None,
        }
    }
}

/// Question and stage difficulty. Drives grading weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(raw: &str) -> Option<Difficulty> {
        match raw.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Grading weight: Easy=1, Medium=2, Hard=3.
    pub fn weight(&self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_wire_names() {
        for st in StageType::ALL {
            assert_eq!(StageType::parse(st.wire_name()), Some(st));
        }
    }

    #[test]
    fn test_parse_legacy_aliases() {
        assert_eq!(
            StageType::parse("resume-screening"),
            Some(StageType::ResumeScreening)
        );
        assert_eq!(StageType::parse("aptitude"), Some(StageType::AptitudeTest));
        assert_eq!(
            StageType::parse("ai_interview"),
            Some(StageType::VoiceInterview)
        );
        assert_eq!(StageType::parse("CODING"), Some(StageType::CodingChallenge));
    }

    #[test]
    fn test_parse_unknown_returns_none() {
        assert_eq!(StageType::parse("group_discussion"), None);
        assert_eq!(StageType::parse(""), None);
    }

    #[test]
    fn test_custom_round_has_no_route() {
        assert_eq!(StageType::CustomRound.route_path(), None);
        for st in StageType::ALL {
            if st != StageType::CustomRound {
                assert!(st.route_path().is_some(), "{st:?} should have a route");
            }
        }
    }

    #[test]
    fn test_stage_type_serde_snake_case() {
        let st: StageType = serde_json::from_str(r#""aptitude_test""#).unwrap();
        assert_eq!(st, StageType::AptitudeTest);
        assert_eq!(
            serde_json::to_string(&StageType::VoiceInterview).unwrap(),
            r#""voice_interview""#
        );
    }

    #[test]
    fn test_difficulty_weights() {
        assert_eq!(Difficulty::Easy.weight(), 1);
        assert_eq!(Difficulty::Medium.weight(), 2);
        assert_eq!(Difficulty::Hard.weight(), 3);
    }

    #[test]
    fn test_difficulty_defaults_to_medium() {
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!(Difficulty::parse("brutal"), None);
    }
}
