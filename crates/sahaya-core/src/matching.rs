//! Match scoring and the match lifecycle.
//!
//! The scorer is a pure weighted sum over independent criteria; order of the
//! terms does not matter and missing optional fields degrade to a zero
//! contribution. All weights and thresholds live in [`MatchPolicy`] so
//! deployments can tune them without code changes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::{ExamDetails, Scribe, Student};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// One reputation tier: scribes rated at or above `min_rating` earn `bonus`
/// points. Tiers are checked in order and are not interpolated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReputationTier {
  pub min_rating: f64,
  pub bonus:      f64,
}

/// Weight distribution and thresholds for the match scorer, plus the match
/// cap. Defaults reproduce the production policy: 40/30/20 weights, 10-point
/// reputation ceiling, top 3 matches, "Delhi" hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
  pub subject_weight:   f64,
  pub location_weight:  f64,
  pub language_weight:  f64,
  pub reputation_tiers: Vec<ReputationTier>,
  /// How many top-ranked matches a proposal persists.
  pub top_n:            usize,
  /// Scribes located in the hub city match any exam location.
  pub hub_location:     String,
}

impl Default for MatchPolicy {
  fn default() -> Self {
    Self {
      subject_weight:   40.0,
      location_weight:  30.0,
      language_weight:  20.0,
      reputation_tiers: vec![
        ReputationTier { min_rating: 4.5, bonus: 10.0 },
        ReputationTier { min_rating: 4.0, bonus: 7.0 },
        ReputationTier { min_rating: 3.5, bonus: 5.0 },
      ],
      top_n:            3,
      hub_location:     "Delhi".to_string(),
    }
  }
}

// ─── Scorer ──────────────────────────────────────────────────────────────────

/// Coarse location heuristic: the exam location string contains the scribe's
/// location, or the scribe sits in the hub city.
///
/// Deliberately a named, swappable policy function — replacing it with real
/// geo-matching must not touch the weight structure in [`match_score`].
pub fn location_matches(
  exam_location:   &str,
  scribe_location: &str,
  hub:             &str,
) -> bool {
  if exam_location.is_empty() || scribe_location.is_empty() {
    return false;
  }
  exam_location.contains(scribe_location) || scribe_location.contains(hub)
}

fn reputation_bonus(rating: f64, tiers: &[ReputationTier]) -> f64 {
  tiers
    .iter()
    .find(|t| rating >= t.min_rating)
    .map(|t| t.bonus)
    .unwrap_or(0.0)
}

/// Compute the 0–100 compatibility score between a student and a candidate
/// scribe. Deterministic, no side effects, no failure modes.
pub fn match_score(
  student: &Student,
  scribe:  &Scribe,
  policy:  &MatchPolicy,
) -> u8 {
  let mut score = 0.0;

  // Subject overlap, proportional to the student's subject count.
  if !student.subjects.is_empty() {
    let overlap = student
      .subjects
      .iter()
      .filter(|s| scribe.subjects.contains(s))
      .count();
    score +=
      overlap as f64 / student.subjects.len() as f64 * policy.subject_weight;
  }

  if let Some(exam) = &student.exam_details {
    if location_matches(&exam.location, &scribe.location, &policy.hub_location)
    {
      score += policy.location_weight;
    }
    if !exam.language.is_empty()
      && scribe.languages.iter().any(|l| l == &exam.language)
    {
      score += policy.language_weight;
    }
  }

  score += reputation_bonus(scribe.rating, &policy.reputation_tiers);

  // Clamp guards float rounding drift even though the weights sum to 100.
  score.round().min(100.0) as u8
}

/// Score `candidates` against `student`, sort descending (stable — ties keep
/// candidate order), and keep the top [`MatchPolicy::top_n`].
pub fn rank_candidates(
  student:    &Student,
  candidates: Vec<Scribe>,
  policy:     &MatchPolicy,
) -> Vec<(Scribe, u8)> {
  let mut scored: Vec<(Scribe, u8)> = candidates
    .into_iter()
    .map(|scribe| {
      let score = match_score(student, &scribe, policy);
      (scribe, score)
    })
    .collect();
  scored.sort_by(|a, b| b.1.cmp(&a.1));
  scored.truncate(policy.top_n);
  scored
}

// ─── Match lifecycle ─────────────────────────────────────────────────────────

/// Lifecycle state of a proposed pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
  Matched,
  Confirmed,
  Completed,
  Cancelled,
}

impl MatchStatus {
  /// The explicit transition table: `matched → confirmed → completed`, with
  /// `cancelled` reachable from any non-terminal state. Everything else is
  /// rejected.
  pub fn can_transition_to(self, next: MatchStatus) -> bool {
    use MatchStatus::*;
    matches!(
      (self, next),
      (Matched, Confirmed)
        | (Confirmed, Completed)
        | (Matched, Cancelled)
        | (Confirmed, Cancelled)
    )
  }
}

impl fmt::Display for MatchStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      MatchStatus::Matched => "matched",
      MatchStatus::Confirmed => "confirmed",
      MatchStatus::Completed => "completed",
      MatchStatus::Cancelled => "cancelled",
    };
    f.write_str(s)
  }
}

/// A proposed or confirmed student-scribe pairing for a specific exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
  pub match_id:      Uuid,
  pub student_id:    String,
  pub scribe_id:     String,
  pub exam_details:  ExamDetails,
  pub match_score:   u8,
  pub status:        MatchStatus,
  pub created_at:    DateTime<Utc>,
  pub confirmed_at:  Option<DateTime<Utc>>,
  pub completed_at:  Option<DateTime<Utc>>,
  pub cancelled_at:  Option<DateTime<Utc>>,
  pub cancel_reason: Option<String>,
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::profile::{Availability, Disability};

  fn student(
    subjects: &[&str],
    location: &str,
    language: &str,
  ) -> Student {
    let now = Utc::now();
    Student {
      user_id:      "student-1".into(),
      class:        "12".into(),
      subjects:     subjects.iter().map(|s| s.to_string()).collect(),
      exam_details: Some(ExamDetails {
        exam_name:         "Board Exam".into(),
        exam_type:         "board".into(),
        exam_date:         "2026-03-01".into(),
        exam_time:         "10:00".into(),
        location:          location.into(),
        language:          language.into(),
        gender_preference: None,
        subjects:          subjects.iter().map(|s| s.to_string()).collect(),
      }),
      disability:   Disability { kind: "visual".into(), description: None },
      school_id:    None,
      created_at:   now,
      updated_at:   now,
    }
  }

  fn scribe(
    id:       &str,
    subjects: &[&str],
    location: &str,
    languages: &[&str],
    rating:   f64,
  ) -> Scribe {
    let now = Utc::now();
    Scribe {
      user_id:       id.into(),
      subjects:      subjects.iter().map(|s| s.to_string()).collect(),
      experience:    "2 years".into(),
      rating,
      total_ratings: 10,
      exam_types:    vec!["board".into()],
      location:      location.into(),
      languages:     languages.iter().map(|s| s.to_string()).collect(),
      availability:  Availability::Available,
      gender:        "female".into(),
      age:           24,
      created_at:    now,
      updated_at:    now,
    }
  }

  #[test]
  fn full_overlap_hub_language_and_top_rating_scores_100() {
    let s = student(&["Math", "Physics"], "Delhi Public School", "English");
    let c = scribe(
      "scribe-1",
      &["Math", "Physics", "Chemistry"],
      "Delhi",
      &["English"],
      4.8,
    );
    assert_eq!(match_score(&s, &c, &MatchPolicy::default()), 100);
  }

  #[test]
  fn no_criteria_matched_scores_0() {
    let s = student(&["Math", "Physics"], "Delhi Public School", "English");
    let c = scribe(
      "scribe-1",
      &["Chemistry", "Biology"],
      "Mumbai",
      &["Hindi"],
      3.0,
    );
    assert_eq!(match_score(&s, &c, &MatchPolicy::default()), 0);
  }

  #[test]
  fn partial_subject_overlap_is_proportional() {
    let s = student(&["Math", "Physics"], "Mumbai", "Hindi");
    let c = scribe("scribe-1", &["Math"], "Pune", &["English"], 0.0);
    // 1/2 × 40 = 20; nothing else matches.
    assert_eq!(match_score(&s, &c, &MatchPolicy::default()), 20);
  }

  #[test]
  fn student_without_subjects_gets_no_subject_term() {
    let s = student(&[], "Mumbai", "Hindi");
    let c = scribe("scribe-1", &["Math"], "Pune", &["English"], 0.0);
    assert_eq!(match_score(&s, &c, &MatchPolicy::default()), 0);
  }

  #[test]
  fn student_without_exam_details_skips_location_and_language() {
    let mut s = student(&["Math"], "Delhi", "English");
    s.exam_details = None;
    let c = scribe("scribe-1", &["Math"], "Delhi", &["English"], 0.0);
    // Only the subject term contributes.
    assert_eq!(match_score(&s, &c, &MatchPolicy::default()), 40);
  }

  #[test]
  fn reputation_tiers_are_exact_and_not_interpolated() {
    let s = student(&[], "Mumbai", "Hindi");
    let policy = MatchPolicy::default();

    let at = |rating| {
      let c = scribe("scribe-1", &[], "Pune", &["English"], rating);
      match_score(&s, &c, &policy)
    };

    assert_eq!(at(4.5), 10);
    assert_eq!(at(4.9), 10);
    assert_eq!(at(4.4), 7);
    assert_eq!(at(4.0), 7);
    assert_eq!(at(3.9), 5);
    assert_eq!(at(3.5), 5);
    assert_eq!(at(3.4), 0);
  }

  #[test]
  fn scorer_is_deterministic() {
    let s = student(&["Math"], "Delhi", "English");
    let c = scribe("scribe-1", &["Math"], "Delhi", &["English"], 4.2);
    let policy = MatchPolicy::default();
    assert_eq!(match_score(&s, &c, &policy), match_score(&s, &c, &policy));
  }

  #[test]
  fn empty_location_strings_never_match() {
    assert!(!location_matches("", "Delhi", "Delhi"));
    assert!(!location_matches("Delhi Public School", "", "Delhi"));
    assert!(location_matches("Delhi Public School", "Delhi", "Delhi"));
    assert!(location_matches("Mumbai Central", "Delhi", "Delhi"));
  }

  #[test]
  fn rank_candidates_sorts_descending_and_caps_at_top_n() {
    // Engineer distinct scores through subject overlap alone.
    let s = student(
      &["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"],
      "Mumbai",
      "Hindi",
    );
    let candidates = vec![
      scribe("s95", &["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"], "Pune", &[], 4.8), // 40 + 10
      scribe("s60", &["A", "B", "C", "D", "E"], "Pune", &[], 0.0),                          // 20
      scribe("s88", &["A", "B", "C", "D", "E", "F", "G", "H"], "Pune", &[], 4.8),           // 32 + 10
      scribe("s40", &["A", "B"], "Pune", &[], 0.0),                                         // 8
    ];

    let ranked = rank_candidates(&s, candidates, &MatchPolicy::default());
    let ids: Vec<&str> =
      ranked.iter().map(|(sc, _)| sc.user_id.as_str()).collect();
    assert_eq!(ids, ["s95", "s88", "s60"]);
    assert!(ranked[0].1 > ranked[1].1 && ranked[1].1 > ranked[2].1);
  }

  #[test]
  fn rank_candidates_breaks_ties_by_candidate_order() {
    let s = student(&["Math"], "Mumbai", "Hindi");
    let candidates = vec![
      scribe("first", &["Math"], "Pune", &[], 0.0),
      scribe("second", &["Math"], "Pune", &[], 0.0),
      scribe("third", &["Math"], "Pune", &[], 0.0),
    ];
    let ranked = rank_candidates(&s, candidates, &MatchPolicy::default());
    let ids: Vec<&str> =
      ranked.iter().map(|(sc, _)| sc.user_id.as_str()).collect();
    assert_eq!(ids, ["first", "second", "third"]);
  }

  #[test]
  fn match_transitions_follow_the_table() {
    use MatchStatus::*;
    assert!(Matched.can_transition_to(Confirmed));
    assert!(Confirmed.can_transition_to(Completed));
    assert!(Matched.can_transition_to(Cancelled));
    assert!(Confirmed.can_transition_to(Cancelled));

    assert!(!Matched.can_transition_to(Completed));
    assert!(!Completed.can_transition_to(Cancelled));
    assert!(!Cancelled.can_transition_to(Confirmed));
    assert!(!Confirmed.can_transition_to(Confirmed));
  }
}
