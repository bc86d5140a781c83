//! Career match scoring — pure, deterministic, fully testable.
//!
//! A career's score against a user is a weighted sum: skill overlap (50),
//! education-level fit (30) and stated-interest match (20), rounded and
//! clamped to 0–100. Identical inputs always produce identical output;
//! ranking ties break on career id ascending.

use crate::models::catalog::CareerRow;

const SKILL_WEIGHT: f64 = 50.0;
const EDUCATION_WEIGHT: f64 = 30.0;
const INTEREST_WEIGHT: f64 = 20.0;

/// The profile signals the scorer consumes.
#[derive(Debug, Clone, Default)]
pub struct UserFeatures {
    pub skills: Vec<String>,
    pub education_level: Option<String>,
    pub interests: Vec<String>,
    pub major: Option<String>,
}

impl UserFeatures {
    /// True when there is nothing to score against.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.education_level.is_none()
            && self.interests.is_empty()
            && self.major.is_none()
    }
}

/// One scored candidate, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCareer {
    pub career_id: i64,
    pub match_score: i32,
    pub match_reasons: Vec<String>,
}

/// Ordered education ladder. Unknown labels score as unknown, not as zero
/// years of schooling.
fn education_rank(level: &str) -> Option<u8> {
    match level.trim().to_lowercase().replace(' ', "_").as_str() {
        "high_school" => Some(1),
        "associate" => Some(2),
        "bachelor" => Some(3),
        "master" => Some(4),
        "doctorate" | "phd" => Some(5),
        _ => None,
    }
}

fn matched_skills(career: &CareerRow, features: &UserFeatures) -> Vec<String> {
    let user: Vec<String> = features.skills.iter().map(|s| s.to_lowercase()).collect();
    career
        .required_skills
        .iter()
        .filter(|req| user.contains(&req.to_lowercase()))
        .cloned()
        .collect()
}

fn matched_interests(career: &CareerRow, features: &UserFeatures) -> Vec<String> {
    let title = career.title.to_lowercase();
    let description = career.description.to_lowercase();
    features
        .interests
        .iter()
        .filter(|interest| {
            let needle = interest.to_lowercase();
            !needle.is_empty() && (title.contains(&needle) || description.contains(&needle))
        })
        .cloned()
        .collect()
}

/// Scores one career and explains the result. Reasons are ordered: skills,
/// education, interests, major, with a generic fallback when nothing hit.
pub fn score_career(career: &CareerRow, features: &UserFeatures) -> (i32, Vec<String>) {
    let mut score = 0.0_f64;
    let mut reasons = Vec::new();

    let matched = matched_skills(career, features);
    if !career.required_skills.is_empty() && !matched.is_empty() {
        score += matched.len() as f64 / career.required_skills.len() as f64 * SKILL_WEIGHT;
        let shown: Vec<&str> = matched.iter().take(3).map(String::as_str).collect();
        reasons.push(format!(
            "You already have {} of the {} required skills ({})",
            matched.len(),
            career.required_skills.len(),
            shown.join(", ")
        ));
    }

    if let (Some(user_level), Some(required)) = (
        features.education_level.as_deref().and_then(education_rank),
        education_rank(&career.education_required),
    ) {
        if user_level >= required {
            score += EDUCATION_WEIGHT;
            reasons.push(format!(
                "Your education level meets the requirement ({})",
                career.education_required
            ));
        } else {
            // Under-qualified still earns partial credit.
            score += EDUCATION_WEIGHT / 2.0;
        }
    }

    let interests = matched_interests(career, features);
    if !interests.is_empty() && !features.interests.is_empty() {
        score += interests.len() as f64 * INTEREST_WEIGHT / features.interests.len() as f64;
        reasons.push(format!(
            "Matches your stated interests ({})",
            interests.join(", ")
        ));
    }

    if let Some(major) = &features.major {
        let needle = major.to_lowercase();
        if !needle.is_empty()
            && (career.title.to_lowercase().contains(&needle)
                || career.description.to_lowercase().contains(&needle))
        {
            reasons.push(format!("Your major ({major}) is related to this career"));
        }
    }

    if reasons.is_empty() {
        reasons.push("Based on your overall profile, this career may suit you".to_string());
    }

    ((score.round() as i32).clamp(0, 100), reasons)
}

/// Scores every candidate, sorts descending by score with career id
/// ascending as tie-break, and truncates to the top `limit`.
pub fn rank_careers(
    careers: &[CareerRow],
    features: &UserFeatures,
    limit: usize,
) -> Vec<ScoredCareer> {
    let mut scored: Vec<ScoredCareer> = careers
        .iter()
        .map(|career| {
            let (match_score, match_reasons) = score_career(career, features);
            ScoredCareer {
                career_id: career.id,
                match_score,
                match_reasons,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then(a.career_id.cmp(&b.career_id))
    });
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn career(id: i64, title: &str, skills: &[&str], education: &str) -> CareerRow {
        CareerRow {
            id,
            title: title.to_string(),
            description: format!("{title} description"),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            education_required: education.to_string(),
            experience_required: "2-4 years".to_string(),
            salary_range: None,
            future_prospect: None,
            category_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn features(skills: &[&str], education: Option<&str>, interests: &[&str]) -> UserFeatures {
        UserFeatures {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            education_level: education.map(String::from),
            interests: interests.iter().map(|s| s.to_string()).collect(),
            major: None,
        }
    }

    #[test]
    fn test_full_match_hits_all_weights() {
        let c = career(1, "Data Engineer", &["SQL", "Python"], "bachelor");
        let f = features(&["sql", "python"], Some("master"), &["data"]);
        let (score, reasons) = score_career(&c, &f);
        // 50 (all skills) + 30 (education) + 20 (single interest matched).
        assert_eq!(score, 100);
        assert_eq!(reasons.len(), 3);
    }

    #[test]
    fn test_partial_skill_overlap() {
        let c = career(1, "Data Engineer", &["SQL", "Python", "Airflow", "Spark"], "none-listed");
        let f = features(&["sql"], None, &[]);
        let (score, _) = score_career(&c, &f);
        // 1/4 of the skill weight, nothing else.
        assert_eq!(score, 13); // 12.5 rounds to 13
    }

    #[test]
    fn test_underqualified_education_gets_half_credit() {
        let c = career(1, "Research Scientist", &[], "doctorate");
        let f = features(&[], Some("bachelor"), &[]);
        let (score, reasons) = score_career(&c, &f);
        assert_eq!(score, 15);
        // Half credit is not advertised as a match reason.
        assert_eq!(reasons, vec!["Based on your overall profile, this career may suit you"]);
    }

    #[test]
    fn test_unknown_education_label_scores_nothing() {
        let c = career(1, "Data Engineer", &[], "apprenticeship");
        let f = features(&[], Some("bachelor"), &[]);
        let (score, _) = score_career(&c, &f);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_interest_weight_splits_across_interests() {
        let c = career(1, "Game Developer", &[], "x");
        let f = features(&[], None, &["game", "music"]);
        let (score, _) = score_career(&c, &f);
        // One of two interests matched: 20 / 2.
        assert_eq!(score, 10);
    }

    #[test]
    fn test_deterministic() {
        let c = career(1, "Data Engineer", &["SQL", "Python"], "bachelor");
        let f = features(&["sql"], Some("bachelor"), &["data"]);
        assert_eq!(score_career(&c, &f), score_career(&c, &f));
    }

    #[test]
    fn test_score_bounded() {
        let c = career(1, "Data Data Data", &["a"], "high_school");
        let f = features(&["a"], Some("phd"), &["data", "Data", "DATA"]);
        let (score, _) = score_career(&c, &f);
        assert!(score <= 100);
    }

    #[test]
    fn test_ranking_sorted_descending_with_id_tiebreak() {
        let careers = vec![
            career(3, "B", &["x"], "unrated"),
            career(1, "A", &["x"], "unrated"),
            career(2, "Winner", &["x", "y"], "unrated"),
        ];
        // User has x and y: career 2 scores 50, careers 1 and 3 score 25 each.
        let f = features(&["x", "y"], None, &[]);
        let ranked = rank_careers(&careers, &f, 10);
        assert_eq!(
            ranked.iter().map(|r| r.career_id).collect::<Vec<_>>(),
            vec![2, 1, 3]
        );
        assert_eq!(ranked[0].match_score, 50);
        assert_eq!(ranked[1].match_score, ranked[2].match_score);
    }

    #[test]
    fn test_ranking_truncates_to_limit() {
        let careers: Vec<CareerRow> = (1..=25)
            .map(|id| career(id, "Role", &["x"], "unrated"))
            .collect();
        let ranked = rank_careers(&careers, &features(&["x"], None, &[]), 10);
        assert_eq!(ranked.len(), 10);
        // Equal scores: ids ascending.
        assert_eq!(ranked[0].career_id, 1);
        assert_eq!(ranked[9].career_id, 10);
    }

    #[test]
    fn test_fallback_reason_when_nothing_matches() {
        let c = career(1, "Marine Biologist", &["diving"], "master");
        let f = features(&["rust"], None, &["databases"]);
        let (score, reasons) = score_career(&c, &f);
        assert_eq!(score, 0);
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("overall profile"));
    }

    #[test]
    fn test_education_rank_ladder() {
        assert!(education_rank("High School") < education_rank("associate"));
        assert!(education_rank("bachelor") < education_rank("Master"));
        assert_eq!(education_rank("phd"), education_rank("doctorate"));
        assert_eq!(education_rank("bootcamp"), None);
    }
}
