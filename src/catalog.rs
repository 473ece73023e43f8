use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::data::loader;
use crate::data::model::{CertificateType, Course, CourseTable, Difficulty};
use crate::data::outliers::{DEFAULT_THRESHOLD, detect_outliers};
use crate::data::segment::{
    DisplayTable, RatingThresholds, Topic, scaled_ratings, topic_courses,
};

// ---------------------------------------------------------------------------
// Chart table
// ---------------------------------------------------------------------------

/// One outlier-free course flattened for the summary chart: the
/// certificate-type → difficulty path plus the scaled rating used as the
/// color value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub certificate_type: CertificateType,
    pub difficulty: Difficulty,
    pub rating_scaled: f64,
}

/// Chart-ready view of the outlier-free table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartTable {
    pub rows: Vec<ChartRow>,
}

/// Aggregated chart node: mean color value over one
/// certificate-type → difficulty path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGroup {
    pub certificate_type: CertificateType,
    pub difficulty: Difficulty,
    pub courses: usize,
    pub mean_rating_scaled: f64,
}

impl ChartTable {
    /// Collapse rows into per-path aggregates, ordered by path.
    pub fn grouped(&self) -> Vec<ChartGroup> {
        let mut acc: BTreeMap<(CertificateType, Difficulty), (usize, f64)> = BTreeMap::new();
        for row in &self.rows {
            let slot = acc
                .entry((row.certificate_type, row.difficulty))
                .or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += row.rating_scaled;
        }
        acc.into_iter()
            .map(|((certificate_type, difficulty), (courses, sum))| ChartGroup {
                certificate_type,
                difficulty,
                courses,
                mean_rating_scaled: sum / courses as f64,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Catalog – the committed result bundle
// ---------------------------------------------------------------------------

/// Everything the presentation side reads, computed once from the source
/// table and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    /// The outlier-free course table.
    pub cleaned: CourseTable,
    /// Enrollment-outlier rows of the source table: courses with unusual
    /// enrollment counts, surfaced as "popular".  Taken before rating
    /// outliers are removed, so this is not a subset of `cleaned`.
    pub popular: DisplayTable,
    /// One display table per topic shelf.
    pub topics: BTreeMap<Topic, DisplayTable>,
    /// Flattened chart view of the outlier-free table.
    pub chart: ChartTable,
}

impl Catalog {
    /// Load a source file and run the full pipeline.
    pub fn load(path: &Path) -> Result<Catalog> {
        let table = loader::load_file(path)?;
        Catalog::from_table(table)
    }

    /// Run the cleaning and derivation pipeline over a normalized table.
    /// Pure function of the input: the same table always yields the same
    /// catalog.
    pub fn from_table(table: CourseTable) -> Result<Catalog> {
        let rating_flags = detect_outliers(&table.ratings(), "zscore", DEFAULT_THRESHOLD)?;
        let enrolled_flags = detect_outliers(&table.enrollments(), "zscore", DEFAULT_THRESHOLD)?;

        // Popular comes from the source table, before any removal.
        let popular_courses: Vec<Course> = table
            .courses
            .iter()
            .zip(&enrolled_flags)
            .filter(|(_, &flagged)| flagged)
            .map(|(c, _)| c.clone())
            .collect();

        // A row flagged by either detector is removed exactly once.
        let cleaned_courses: Vec<Course> = table
            .courses
            .iter()
            .zip(rating_flags.iter().zip(&enrolled_flags))
            .filter(|(_, (&by_rating, &by_enrolled))| !by_rating && !by_enrolled)
            .map(|(c, _)| c.clone())
            .collect();
        let cleaned = CourseTable::from_courses(cleaned_courses);

        log::info!(
            "{} of {} courses kept after outlier removal ({} rating, {} enrollment flags)",
            cleaned.len(),
            table.len(),
            rating_flags.iter().filter(|&&f| f).count(),
            enrolled_flags.iter().filter(|&&f| f).count(),
        );

        let scaled = scaled_ratings(&cleaned);
        let chart = ChartTable {
            rows: cleaned
                .courses
                .iter()
                .zip(&scaled)
                .map(|(c, &rating_scaled)| ChartRow {
                    certificate_type: c.certificate_type,
                    difficulty: c.difficulty,
                    rating_scaled,
                })
                .collect(),
        };

        let thresholds = RatingThresholds::from_table(&cleaned);
        let topics: BTreeMap<Topic, DisplayTable> = Topic::ALL
            .iter()
            .map(|&topic| {
                let courses = topic_courses(&cleaned, topic, &thresholds);
                log::debug!("topic {}: {} courses", topic.label(), courses.len());
                (topic, DisplayTable::new(topic.label(), courses))
            })
            .collect();

        Ok(Catalog {
            cleaned,
            popular: DisplayTable::new("Popular", popular_courses),
            topics,
            chart,
        })
    }

    /// The display table for one topic shelf.
    pub fn topic(&self, topic: Topic) -> &DisplayTable {
        &self.topics[&topic]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn course(id: u32, title: &str, rating: f64, students_enrolled: f64) -> Course {
        Course {
            id,
            title: title.to_string(),
            organization: "Test University".to_string(),
            certificate_type: if id % 2 == 0 {
                CertificateType::Course
            } else {
                CertificateType::Specialization
            },
            rating,
            difficulty: if id % 3 == 0 {
                Difficulty::Beginner
            } else {
                Difficulty::Intermediate
            },
            students_enrolled,
        }
    }

    /// Twelve courses; id 11 carries an enrollment count far outside the
    /// rest (|z| = sqrt(11) ≈ 3.32), every rating well within threshold.
    fn fixture() -> CourseTable {
        CourseTable::from_courses(vec![
            course(0, "AI For Everyone", 4.0, 10_000.0),
            course(1, "Machine Learning Basics", 4.1, 10_000.0),
            course(2, "Advanced Machine Learning", 4.8, 10_000.0),
            course(3, "Data Science Methods", 4.8, 10_000.0),
            course(4, "Data Entry", 4.2, 10_000.0),
            course(5, "Marketing 101", 4.4, 10_000.0),
            course(6, "Python for Data", 4.8, 10_000.0),
            course(7, "Management Essentials", 4.6, 10_000.0),
            course(8, "Management Principles", 4.3, 10_000.0),
            course(9, "Business Strategy", 4.5, 10_000.0),
            course(10, "Corporate Strategy", 4.9, 10_000.0),
            course(11, "Deep Learning Mega Course", 4.7, 10_000_000.0),
        ])
    }

    fn ids(courses: &[Course]) -> BTreeSet<u32> {
        courses.iter().map(|c| c.id).collect()
    }

    #[test]
    fn popular_is_exactly_the_enrollment_outliers() {
        let catalog = Catalog::from_table(fixture()).unwrap();
        assert_eq!(ids(&catalog.popular.courses), BTreeSet::from([11]));
        assert_eq!(catalog.popular.label, "Popular");
    }

    #[test]
    fn cleaned_table_removes_flagged_rows_once() {
        let catalog = Catalog::from_table(fixture()).unwrap();
        assert_eq!(catalog.cleaned.len(), 11);
        assert!(!ids(&catalog.cleaned.courses).contains(&11));
    }

    #[test]
    fn filtered_columns_stay_within_threshold() {
        let catalog = Catalog::from_table(fixture()).unwrap();
        let rating_flags =
            detect_outliers(&catalog.cleaned.ratings(), "zscore", DEFAULT_THRESHOLD).unwrap();
        let enrolled_flags =
            detect_outliers(&catalog.cleaned.enrollments(), "zscore", DEFAULT_THRESHOLD).unwrap();
        assert!(rating_flags.iter().all(|&f| !f));
        assert!(enrolled_flags.iter().all(|&f| !f));
    }

    #[test]
    fn topic_shelves_are_subsets_of_the_cleaned_table() {
        let catalog = Catalog::from_table(fixture()).unwrap();
        let cleaned_ids = ids(&catalog.cleaned.courses);
        for topic in Topic::ALL {
            let shelf = catalog.topic(topic);
            assert_eq!(shelf.label, topic.label());
            assert!(ids(&shelf.courses).is_subset(&cleaned_ids), "{:?}", topic);
        }
    }

    #[test]
    fn chart_rows_cover_the_cleaned_table_with_unit_interval_colors() {
        let catalog = Catalog::from_table(fixture()).unwrap();
        assert_eq!(catalog.chart.rows.len(), catalog.cleaned.len());
        assert!(catalog
            .chart
            .rows
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.rating_scaled)));

        let min = catalog
            .chart
            .rows
            .iter()
            .map(|r| r.rating_scaled)
            .fold(f64::INFINITY, f64::min);
        let max = catalog
            .chart
            .rows
            .iter()
            .map(|r| r.rating_scaled)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn grouped_chart_aggregates_by_path() {
        let chart = ChartTable {
            rows: vec![
                ChartRow {
                    certificate_type: CertificateType::Course,
                    difficulty: Difficulty::Beginner,
                    rating_scaled: 0.2,
                },
                ChartRow {
                    certificate_type: CertificateType::Course,
                    difficulty: Difficulty::Beginner,
                    rating_scaled: 0.6,
                },
                ChartRow {
                    certificate_type: CertificateType::Specialization,
                    difficulty: Difficulty::Mixed,
                    rating_scaled: 1.0,
                },
            ],
        };
        let groups = chart.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].certificate_type, CertificateType::Course);
        assert_eq!(groups[0].courses, 2);
        assert!((groups[0].mean_rating_scaled - 0.4).abs() < 1e-12);
        assert_eq!(groups[1].courses, 1);
        assert_eq!(groups[1].mean_rating_scaled, 1.0);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let table = fixture();
        let first = Catalog::from_table(table.clone()).unwrap();
        let second = Catalog::from_table(table).unwrap();
        assert_eq!(first, second);
    }
}
