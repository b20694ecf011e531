use std::collections::HashMap;

use serde::Serialize;

use crate::model::{CourseId, EnrolledCourse, LessonProgress};

//
// ─── COMPLETION ────────────────────────────────────────────────────────────────
//

/// Completed-of-total lesson counts with a display percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub completed_lessons: u32,
    pub total_lessons: u32,
    pub percent: u8,
}

impl Completion {
    /// Builds a completion, saturating `completed` at `total`.
    #[must_use]
    pub fn new(completed: u32, total: u32) -> Self {
        let completed = completed.min(total);
        Self {
            completed_lessons: completed,
            total_lessons: total,
            percent: percent(completed, total),
        }
    }

    /// True once every lesson of a non-empty course is done.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_lessons > 0 && self.completed_lessons == self.total_lessons
    }
}

/// `round(completed / total * 100)`, half away from zero, or 0 for an empty course.
///
/// # Examples
///
/// ```
/// # use scholar_core::aggregate::percent;
/// assert_eq!(percent(1, 3), 33);
/// assert_eq!(percent(2, 3), 67);
/// assert_eq!(percent(1, 8), 13);
/// assert_eq!(percent(0, 0), 0);
/// ```
#[must_use]
pub fn percent(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed.min(total));
    let total = u64::from(total);
    let rounded = (completed * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Per-course row of a [`ProgressSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCompletion {
    pub course_id: CourseId,
    #[serde(flatten)]
    pub completion: Completion,
}

/// A learner's progress across every enrolled course.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    /// One entry per enrollment, in the order the enrollments were given.
    pub courses: Vec<CourseCompletion>,
    pub overall: Completion,
    pub completed_courses: u32,
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

/// Folds a learner's enrollments and progress rows into display percentages.
///
/// Each enrollment seeds a counter with its lesson count; every progress row
/// flagged `completed` increments the counter of its course. Rows whose course
/// is not among `enrollments` are ignored, as are incomplete rows. The overall
/// completion sums the (saturated) per-course counts.
///
/// If the same course appears twice in `enrollments`, only the first entry is
/// reported.
///
/// # Examples
///
/// ```
/// # use scholar_core::aggregate::aggregate;
/// # use scholar_core::model::{CourseId, EnrolledCourse, LessonId, LessonProgress, UserId};
/// # use scholar_core::time::fixed_now;
/// let enrollments = [EnrolledCourse { course_id: CourseId::new(1), total_lessons: 3 }];
/// let done = [LessonProgress::completed_now(
///     UserId::new(7),
///     CourseId::new(1),
///     LessonId::new(10),
///     fixed_now(),
/// )];
///
/// let summary = aggregate(&enrollments, &done);
/// assert_eq!(summary.courses[0].completion.percent, 33);
/// assert_eq!(summary.overall.percent, 33);
/// ```
#[must_use]
pub fn aggregate(enrollments: &[EnrolledCourse], progress: &[LessonProgress]) -> ProgressSummary {
    let mut slots: HashMap<CourseId, usize> = HashMap::with_capacity(enrollments.len());
    let mut tallies: Vec<(CourseId, u32, u32)> = Vec::with_capacity(enrollments.len());

    for enrollment in enrollments {
        slots.entry(enrollment.course_id).or_insert_with(|| {
            tallies.push((enrollment.course_id, 0, enrollment.total_lessons));
            tallies.len() - 1
        });
    }

    for row in progress.iter().filter(|p| p.completed) {
        if let Some(&slot) = slots.get(&row.course_id) {
            tallies[slot].1 += 1;
        }
    }

    let mut completed_sum: u32 = 0;
    let mut total_sum: u32 = 0;
    let mut completed_courses: u32 = 0;
    let courses = tallies
        .into_iter()
        .map(|(course_id, completed, total)| {
            let completion = Completion::new(completed, total);
            completed_sum = completed_sum.saturating_add(completion.completed_lessons);
            total_sum = total_sum.saturating_add(completion.total_lessons);
            if completion.is_complete() {
                completed_courses += 1;
            }
            CourseCompletion {
                course_id,
                completion,
            }
        })
        .collect();

    ProgressSummary {
        courses,
        overall: Completion::new(completed_sum, total_sum),
        completed_courses,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonId, UserId};
    use crate::time::fixed_now;
    use proptest::prelude::*;

    fn enrolled(course: u64, total: u32) -> EnrolledCourse {
        EnrolledCourse {
            course_id: CourseId::new(course),
            total_lessons: total,
        }
    }

    fn done(course: u64, lesson: u64) -> LessonProgress {
        LessonProgress::completed_now(
            UserId::new(1),
            CourseId::new(course),
            LessonId::new(lesson),
            fixed_now(),
        )
    }

    #[test]
    fn one_of_three_rounds_to_33() {
        let summary = aggregate(&[enrolled(1, 3)], &[done(1, 1)]);
        let course = &summary.courses[0];
        assert_eq!(course.course_id, CourseId::new(1));
        assert_eq!(course.completion.completed_lessons, 1);
        assert_eq!(course.completion.total_lessons, 3);
        assert_eq!(course.completion.percent, 33);
        assert_eq!(summary.overall.percent, 33);
        assert_eq!(summary.completed_courses, 0);
    }

    #[test]
    fn overall_spans_all_enrolled_courses() {
        let summary = aggregate(
            &[enrolled(1, 2), enrolled(2, 4)],
            &[done(1, 1), done(1, 2)],
        );
        assert_eq!(summary.courses[0].completion.percent, 100);
        assert!(summary.courses[0].completion.is_complete());
        assert_eq!(summary.courses[1].completion.percent, 0);
        assert_eq!(summary.overall.completed_lessons, 2);
        assert_eq!(summary.overall.total_lessons, 6);
        assert_eq!(summary.overall.percent, 33);
        assert_eq!(summary.completed_courses, 1);
    }

    #[test]
    fn progress_for_unenrolled_course_is_ignored() {
        let summary = aggregate(&[enrolled(1, 4)], &[done(1, 1), done(99, 7), done(99, 8)]);
        assert_eq!(summary.courses.len(), 1);
        assert_eq!(summary.courses[0].completion.completed_lessons, 1);
        assert_eq!(summary.courses[0].completion.percent, 25);
        assert_eq!(summary.overall.completed_lessons, 1);
        assert_eq!(summary.overall.total_lessons, 4);
    }

    #[test]
    fn empty_course_reports_zero_percent() {
        let summary = aggregate(&[enrolled(1, 0)], &[done(1, 1)]);
        let course = summary.courses[0].completion;
        assert_eq!(course.percent, 0);
        assert_eq!(course.completed_lessons, 0);
        assert!(!course.is_complete());
        assert_eq!(summary.overall.percent, 0);
    }

    #[test]
    fn incomplete_rows_do_not_count() {
        let mut row = done(1, 1);
        row.completed = false;
        row.completed_at = None;
        let summary = aggregate(&[enrolled(1, 2)], &[row]);
        assert_eq!(summary.courses[0].completion.completed_lessons, 0);
    }

    #[test]
    fn preserves_enrollment_order() {
        let summary = aggregate(&[enrolled(5, 1), enrolled(2, 1), enrolled(9, 1)], &[]);
        let order: Vec<u64> = summary.courses.iter().map(|c| c.course_id.value()).collect();
        assert_eq!(order, vec![5, 2, 9]);
    }

    #[test]
    fn duplicate_enrollment_is_reported_once() {
        let summary = aggregate(&[enrolled(1, 2), enrolled(1, 2)], &[done(1, 1)]);
        assert_eq!(summary.courses.len(), 1);
        assert_eq!(summary.overall.total_lessons, 2);
    }

    #[test]
    fn excess_completions_saturate() {
        let summary = aggregate(&[enrolled(1, 1)], &[done(1, 1), done(1, 2)]);
        assert_eq!(summary.courses[0].completion.completed_lessons, 1);
        assert_eq!(summary.courses[0].completion.percent, 100);
    }

    #[test]
    fn no_enrollments_yields_empty_summary() {
        let summary = aggregate(&[], &[done(1, 1)]);
        assert!(summary.courses.is_empty());
        assert_eq!(summary.overall, Completion::default());
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 200), 1);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(199, 200), 100);
        assert_eq!(percent(5, 3), 100);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = aggregate(&[enrolled(3, 2)], &[done(3, 1)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["courses"][0]["courseId"], 3);
        assert_eq!(json["courses"][0]["percent"], 50);
        assert_eq!(json["overall"]["completedLessons"], 1);
        assert_eq!(json["completedCourses"], 0);
    }

    proptest! {
        #[test]
        fn percents_stay_within_bounds(
            totals in prop::collection::vec(0u32..40, 0..8),
            rows in prop::collection::vec((0u64..10, any::<bool>()), 0..120),
        ) {
            let enrollments: Vec<EnrolledCourse> = totals
                .iter()
                .enumerate()
                .map(|(i, total)| enrolled(i as u64, *total))
                .collect();
            let progress: Vec<LessonProgress> = rows
                .iter()
                .enumerate()
                .map(|(i, (course, completed))| {
                    let mut row = done(*course, i as u64);
                    row.completed = *completed;
                    row
                })
                .collect();

            let summary = aggregate(&enrollments, &progress);
            prop_assert!(summary.overall.percent <= 100);
            prop_assert_eq!(summary.courses.len(), enrollments.len());
            for course in &summary.courses {
                let completion = course.completion;
                prop_assert!(completion.percent <= 100);
                prop_assert!(completion.completed_lessons <= completion.total_lessons);
                if completion.total_lessons == 0 {
                    prop_assert_eq!(completion.percent, 0);
                }
            }
        }
    }
}
