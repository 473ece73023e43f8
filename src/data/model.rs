use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Categorical columns
// ---------------------------------------------------------------------------

/// Certificate earned on completion. The source data spells these in
/// several casings ("COURSE", "Professional Certificate"), so parsing is
/// case- and whitespace-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CertificateType {
    Course,
    Specialization,
    ProfessionalCertificate,
}

impl CertificateType {
    pub const ALL: [CertificateType; 3] = [
        CertificateType::Course,
        CertificateType::Specialization,
        CertificateType::ProfessionalCertificate,
    ];

    /// Parse a raw cell. Returns `None` for values outside the category set.
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_category(raw).as_str() {
            "course" => Some(CertificateType::Course),
            "specialization" => Some(CertificateType::Specialization),
            "professional certificate" => Some(CertificateType::ProfessionalCertificate),
            _ => None,
        }
    }
}

impl fmt::Display for CertificateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateType::Course => write!(f, "Course"),
            CertificateType::Specialization => write!(f, "Specialization"),
            CertificateType::ProfessionalCertificate => write!(f, "Professional Certificate"),
        }
    }
}

/// Stated difficulty level of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Mixed,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Mixed,
    ];

    /// Parse a raw cell. Returns `None` for values outside the category set.
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_category(raw).as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            "mixed" => Some(Difficulty::Mixed),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
            Difficulty::Mixed => write!(f, "Mixed"),
        }
    }
}

/// Collapse whitespace runs and lowercase, so "PROFESSIONAL  CERTIFICATE"
/// and "Professional Certificate" land on the same key.
fn normalize_category(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Course – one row of the source table
// ---------------------------------------------------------------------------

/// A single course (one row of the source table).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    /// Row identifier from the source index column.
    pub id: u32,
    pub title: String,
    pub organization: String,
    pub certificate_type: CertificateType,
    /// Star rating in [0, 5].
    pub rating: f64,
    pub difficulty: Difficulty,
    /// Enrolled student count, normalized from "100k" / "3m" notation.
    /// 0.0 doubles as the unknown sentinel (see `loader::value_to_float`).
    pub students_enrolled: f64,
}

// ---------------------------------------------------------------------------
// CourseTable – the complete loaded catalog
// ---------------------------------------------------------------------------

/// The full course catalog, reindexed ascending by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CourseTable {
    pub courses: Vec<Course>,
}

impl CourseTable {
    /// Build a table from parsed rows, sorted ascending by id.
    pub fn from_courses(mut courses: Vec<Course>) -> Self {
        courses.sort_by_key(|c| c.id);
        CourseTable { courses }
    }

    /// Number of courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// The rating column, in row order.
    pub fn ratings(&self) -> Vec<f64> {
        self.courses.iter().map(|c| c.rating).collect()
    }

    /// The enrolled-students column, in row order.
    pub fn enrollments(&self) -> Vec<f64> {
        self.courses.iter().map(|c| c.students_enrolled).collect()
    }
}
