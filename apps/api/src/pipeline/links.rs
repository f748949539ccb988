//! Assessment Link Builder — maps a stage to the candidate-facing URL for
//! taking that stage. Pure; returns None for stages with no client route.

use uuid::Uuid;

use crate::pipeline::catalog::StageType;

pub fn build_assessment_link(
    frontend_url: &str,
    stage_type: StageType,
    job_id: Uuid,
    candidate_id: Uuid,
    round: Option<u32>,
) -> Option<String> {
    let path = stage_type.route_path()?;
    let base = frontend_url.trim_end_matches('/');
    let mut url = format!("{base}{path}?jobId={job_id}&candidateId={candidate_id}");
    if let Some(round) = round {
        url.push_str(&format!("&round={round}"));
    }
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://app.example.com";

    #[test]
    fn test_aptitude_link_shape() {
        let job = Uuid::new_v4();
        let candidate = Uuid::new_v4();
        let url =
            build_assessment_link(BASE, StageType::AptitudeTest, job, candidate, None).unwrap();
        assert!(url.starts_with("https://app.example.com/round/aptitude-test?"));
        assert!(url.contains(&format!("jobId={job}")));
        assert!(url.contains(&format!("candidateId={candidate}")));
        assert!(!url.contains("round="));
    }

    #[test]
    fn test_round_query_param_appended() {
        let url = build_assessment_link(
            BASE,
            StageType::CodingChallenge,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some(2),
        )
        .unwrap();
        assert!(url.contains("&round=2"));
    }

    #[test]
    fn test_custom_round_has_no_link() {
        assert_eq!(
            build_assessment_link(
                BASE,
                StageType::CustomRound,
                Uuid::new_v4(),
                Uuid::new_v4(),
                None
            ),
            None
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let url = build_assessment_link(
            "https://app.example.com/",
            StageType::VoiceInterview,
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
        )
        .unwrap();
        assert!(url.starts_with("https://app.example.com/round/voice-interview?"));
    }
}
