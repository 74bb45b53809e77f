// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

/// Represents the 'student_results' table in the database.
/// Exactly one row per (student, exam); written once at submission and
/// never updated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StudentResult {
    pub id: i64,
    pub student_id: i64,
    pub exam_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub time_taken_minutes: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// Raw row for the results listing: result joined with student identity.
#[derive(Debug, FromRow)]
pub struct ResultRow {
    pub id: i64,
    pub student_id: String,
    pub student_name: String,
    pub score: i64,
    pub total_questions: i64,
    pub time_taken_minutes: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// One formatted entry of the results listing.
#[derive(Debug, Serialize)]
pub struct ResultEntry {
    pub id: i64,
    pub student_id: String,
    pub student_name: String,
    pub score: i64,
    pub total_questions: i64,
    pub percentage: i64,
    pub grade: &'static str,
    pub time_taken_minutes: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl From<ResultRow> for ResultEntry {
    fn from(row: ResultRow) -> Self {
        let pct = percentage(row.score, row.total_questions);
        Self {
            id: row.id,
            student_id: row.student_id,
            student_name: row.student_name,
            score: row.score,
            total_questions: row.total_questions,
            percentage: pct,
            grade: grade_for(pct),
            time_taken_minutes: row.time_taken_minutes,
            submitted_at: row.submitted_at,
        }
    }
}

/// Exam-wide statistics over submitted results. All zero when nothing has
/// been submitted yet.
#[derive(Debug, Default, Serialize)]
pub struct ExamStats {
    pub total_students: i64,
    pub completed_students: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub lowest_score: i64,
    pub average_time: f64,
}

impl ExamStats {
    pub fn compute(total_students: i64, entries: &[ResultEntry]) -> Self {
        let mut stats = Self {
            total_students,
            completed_students: entries.len() as i64,
            ..Self::default()
        };

        if entries.is_empty() {
            return stats;
        }

        let count = entries.len() as f64;
        stats.average_score =
            entries.iter().map(|e| e.percentage).sum::<i64>() as f64 / count;
        stats.highest_score = entries.iter().map(|e| e.percentage).max().unwrap_or(0);
        stats.lowest_score = entries.iter().map(|e| e.percentage).min().unwrap_or(0);
        stats.average_time =
            entries.iter().map(|e| e.time_taken_minutes).sum::<i64>() as f64 / count;
        stats
    }
}

/// DTO for submitting an exam attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    /// Question id mapped to the selected option marker.
    pub answers: HashMap<i64, String>,
    /// Elapsed seconds reported by the client timer.
    #[serde(rename = "timeTaken")]
    pub time_taken: i64,
}

/// DTO for the scoring result returned to the student.
#[derive(Debug, Serialize)]
pub struct SubmitExamResponse {
    pub score: i64,
    #[serde(rename = "totalQuestions")]
    pub total_questions: i64,
    pub percentage: i64,
}

/// Integer percentage, rounded half-up; 0 for an empty question set.
pub fn percentage(score: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as i64
}

/// Display grade bucket. Not persisted.
pub fn grade_for(percentage: i64) -> &'static str {
    match percentage {
        p if p >= 90 => "A+",
        p if p >= 80 => "A",
        p if p >= 70 => "B",
        p if p >= 60 => "C",
        _ => "F",
    }
}

/// Whole minutes taken, rounded up from the reported seconds.
pub fn minutes_taken(seconds: i64) -> i64 {
    if seconds <= 0 { 0 } else { (seconds + 59) / 60 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(percentage: i64, minutes: i64) -> ResultEntry {
        ResultEntry {
            id: 0,
            student_id: "s".to_string(),
            student_name: "S".to_string(),
            score: 0,
            total_questions: 0,
            percentage,
            grade: grade_for(percentage),
            time_taken_minutes: minutes,
            submitted_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(0, 5), 0);
    }

    #[test]
    fn percentage_of_empty_exam_is_zero() {
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn grade_buckets() {
        assert_eq!(grade_for(100), "A+");
        assert_eq!(grade_for(90), "A+");
        assert_eq!(grade_for(89), "A");
        assert_eq!(grade_for(80), "A");
        assert_eq!(grade_for(79), "B");
        assert_eq!(grade_for(70), "B");
        assert_eq!(grade_for(69), "C");
        assert_eq!(grade_for(60), "C");
        assert_eq!(grade_for(59), "F");
        assert_eq!(grade_for(0), "F");
    }

    #[test]
    fn minutes_round_up() {
        assert_eq!(minutes_taken(0), 0);
        assert_eq!(minutes_taken(1), 1);
        assert_eq!(minutes_taken(60), 1);
        assert_eq!(minutes_taken(61), 2);
        assert_eq!(minutes_taken(-5), 0);
    }

    #[test]
    fn stats_default_to_zero_without_submissions() {
        let stats = ExamStats::compute(4, &[]);
        assert_eq!(stats.total_students, 4);
        assert_eq!(stats.completed_students, 0);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.highest_score, 0);
        assert_eq!(stats.lowest_score, 0);
        assert_eq!(stats.average_time, 0.0);
    }

    #[test]
    fn stats_over_submitted_results() {
        let entries = vec![entry(50, 10), entry(100, 20)];
        let stats = ExamStats::compute(3, &entries);
        assert_eq!(stats.completed_students, 2);
        assert_eq!(stats.average_score, 75.0);
        assert_eq!(stats.highest_score, 100);
        assert_eq!(stats.lowest_score, 50);
        assert_eq!(stats.average_time, 15.0);
    }
}
