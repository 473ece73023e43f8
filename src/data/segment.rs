use serde::Serialize;

use super::model::{Course, CourseTable};
use super::outliers::quantile;

// ---------------------------------------------------------------------------
// Rating thresholds
// ---------------------------------------------------------------------------

/// Rating percentiles of the outlier-free table, shared by the topic
/// predicates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingThresholds {
    /// Median rating.
    pub p50: f64,
    /// 75th-percentile rating.
    pub p75: f64,
}

impl RatingThresholds {
    /// Compute thresholds over a table.  An empty table yields +∞ gates so
    /// every rating-gated predicate matches nothing.
    pub fn from_table(table: &CourseTable) -> Self {
        let ratings = table.ratings();
        RatingThresholds {
            p50: quantile(&ratings, 0.5).unwrap_or(f64::INFINITY),
            p75: quantile(&ratings, 0.75).unwrap_or(f64::INFINITY),
        }
    }
}

// ---------------------------------------------------------------------------
// Min-max scaling
// ---------------------------------------------------------------------------

/// Rating column rescaled to [0, 1] over the table's own min/max.
///
/// A zero rating range would divide by zero; such a table maps every row to
/// 0.0 and logs a warning.
pub fn scaled_ratings(table: &CourseTable) -> Vec<f64> {
    let ratings = table.ratings();
    let min = ratings.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !(range > 0.0) {
        if !ratings.is_empty() {
            log::warn!("rating column has zero spread, scaled ratings pinned to 0.0");
        }
        return vec![0.0; ratings.len()];
    }
    ratings.iter().map(|r| (r - min) / range).collect()
}

// ---------------------------------------------------------------------------
// Topic subsets
// ---------------------------------------------------------------------------

/// Courses removed from the Management table by editorial decision,
/// whatever their title says.
const MANAGEMENT_EXCLUDED: [u32; 11] = [102, 242, 290, 326, 444, 587, 597, 764, 177, 354, 660];

/// The five browsable topic shelves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Topic {
    AiMl,
    Data,
    Python,
    Marketing,
    Management,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::AiMl,
        Topic::Data,
        Topic::Python,
        Topic::Marketing,
        Topic::Management,
    ];

    /// Display label used by the presentation side.
    pub fn label(self) -> &'static str {
        match self {
            Topic::AiMl => "AI/ML",
            Topic::Data => "Data",
            Topic::Python => "Python",
            Topic::Marketing => "Marketing",
            Topic::Management => "Management",
        }
    }

    /// Whether a course belongs on this shelf.  Title matching is
    /// case-sensitive substring search.
    fn matches(self, course: &Course, t: &RatingThresholds) -> bool {
        let title = course.title.as_str();
        let r = course.rating;
        match self {
            // A title containing "AI" qualifies outright; the percentile
            // gate applies only to the "Machine Learning" arm.
            Topic::AiMl => {
                title.contains("AI") || (title.contains("Machine Learning") && r >= t.p75)
            }
            Topic::Data => title.contains("Data") && r >= t.p75,
            Topic::Python => title.contains("Python") && r >= t.p75,
            Topic::Marketing => title.contains("Marketing") && r >= t.p50,
            // Same shape as AI/ML: "Management" titles skip the gate, the
            // "Strategy" arm is percentile-gated.
            Topic::Management => {
                (title.contains("Management") || (title.contains("Strategy") && r >= t.p75))
                    && !MANAGEMENT_EXCLUDED.contains(&course.id)
            }
        }
    }
}

/// Filter one topic's courses out of the outlier-free table.  Shelves may
/// overlap; a course can sit on several of them.
pub fn topic_courses(table: &CourseTable, topic: Topic, thresholds: &RatingThresholds) -> Vec<Course> {
    table
        .courses
        .iter()
        .filter(|c| topic.matches(c, thresholds))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Display tables
// ---------------------------------------------------------------------------

/// Column labels shown by the presentation side, in display order.
pub const DISPLAY_COLUMNS: [&str; 7] = [
    "No.",
    "Title",
    "Organization",
    "Certificate Type",
    "Rating",
    "Difficulty",
    "Students Enrolled",
];

/// A labelled, render-ready table of courses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    pub label: String,
    pub courses: Vec<Course>,
}

impl DisplayTable {
    pub fn new(label: impl Into<String>, courses: Vec<Course>) -> Self {
        DisplayTable {
            label: label.into(),
            courses,
        }
    }

    /// Render each course as display cells, aligned with [`DISPLAY_COLUMNS`].
    pub fn rows(&self) -> Vec<[String; 7]> {
        self.courses
            .iter()
            .map(|c| {
                [
                    c.id.to_string(),
                    c.title.clone(),
                    c.organization.clone(),
                    c.certificate_type.to_string(),
                    format!("{:.1}", c.rating),
                    c.difficulty.to_string(),
                    format!("{:.0}", c.students_enrolled),
                ]
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
