use course_scout::data::loader::{
    COL_CERTIFICATE, COL_DIFFICULTY, COL_ENROLLED, COL_ORGANIZATION, COL_RATING, COL_TITLE,
};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const SUBJECTS: &[&str] = &[
    "Data Science",
    "Data Analysis",
    "Big Data",
    "Machine Learning",
    "AI",
    "Deep Learning",
    "Python",
    "Python Programming",
    "Statistics",
    "Digital Marketing",
    "Marketing Analytics",
    "Project Management",
    "Supply Chain Management",
    "Business Strategy",
    "Strategy Execution",
    "Leadership",
    "Finance",
    "Accounting",
    "Graphic Design",
    "Public Health",
    "Cybersecurity",
    "Cloud Computing",
];

const PATTERNS: &[&str] = &[
    "Introduction to {}",
    "{} Fundamentals",
    "Advanced {}",
    "{} for Everyone",
    "{} Capstone",
    "Applied {}",
];

const ORGANIZATIONS: &[&str] = &[
    "Stanford University",
    "University of Michigan",
    "Johns Hopkins University",
    "Duke University",
    "University of London",
    "HEC Paris",
    "Google",
    "IBM",
    "Amazon Web Services",
    "deeplearning.ai",
    "Atlassian",
    "PwC",
];

/// Compact student-count notation, the inverse of the loader's
/// `value_to_float`: 120_000 → "120k", 1_200_000 → "1.2m".
fn enrollment_notation(count: f64) -> String {
    if count >= 1_000_000.0 {
        let m = count / 1_000_000.0;
        if m >= 10.0 {
            format!("{m:.0}m")
        } else {
            format!("{m:.1}m")
        }
    } else {
        format!("{:.0}k", (count / 1_000.0).max(1.0))
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let n_courses = 1000;

    std::fs::create_dir_all("dataset").expect("Failed to create dataset directory");
    let output_path = "dataset/coursera_data.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");

    writer
        .write_record([
            "",
            COL_TITLE,
            COL_ORGANIZATION,
            COL_CERTIFICATE,
            COL_RATING,
            COL_DIFFICULTY,
            COL_ENROLLED,
        ])
        .expect("Failed to write header");

    for id in 0..n_courses {
        let title = rng.pick(PATTERNS).replace("{}", *rng.pick(SUBJECTS));
        let organization = *rng.pick(ORGANIZATIONS);

        let certificate = {
            let roll = rng.next_f64();
            if roll < 0.55 {
                "COURSE"
            } else if roll < 0.85 {
                "SPECIALIZATION"
            } else {
                "PROFESSIONAL CERTIFICATE"
            }
        };
        let difficulty = {
            let roll = rng.next_f64();
            if roll < 0.5 {
                "Beginner"
            } else if roll < 0.8 {
                "Intermediate"
            } else if roll < 0.9 {
                "Advanced"
            } else {
                "Mixed"
            }
        };

        let rating = rng.gauss(4.4, 0.3).clamp(2.5, 5.0);

        // Log-uniform enrollment around 3k–3m, with the occasional runaway
        // hit so the popular shelf has something to surface.
        let mut enrolled = 10f64.powf(rng.gauss(4.5, 0.8));
        if rng.next_f64() < 0.02 {
            enrolled *= 40.0;
        }

        writer
            .write_record([
                id.to_string(),
                title,
                organization.to_string(),
                certificate.to_string(),
                format!("{rating:.1}"),
                difficulty.to_string(),
                enrollment_notation(enrolled),
            ])
            .expect("Failed to write record");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_courses} courses to {output_path}");
}
