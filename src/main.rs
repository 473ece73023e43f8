use std::path::Path;

use anyhow::Result;
use course_scout::catalog::Catalog;
use course_scout::data::segment::{DISPLAY_COLUMNS, DisplayTable, Topic};

/// Source dataset, resolved against the working directory.
const DATASET_PATH: &str = "dataset/coursera_data.csv";

fn main() -> Result<()> {
    env_logger::init();

    let catalog = Catalog::load(Path::new(DATASET_PATH))?;

    println!("Course directory");
    println!("================");
    println!();
    println!("Most popular courses (unusual enrollment):");
    print_table(&catalog.popular);

    for topic in Topic::ALL {
        let table = catalog.topic(topic);
        println!();
        println!("{} ({} courses):", table.label, table.len());
        print_table(table);
    }

    println!();
    println!("Rating distribution by certificate type and difficulty:");
    for group in catalog.chart.grouped() {
        println!(
            "  {} / {}: {} courses, mean scaled rating {:.2}",
            group.certificate_type, group.difficulty, group.courses, group.mean_rating_scaled
        );
    }

    Ok(())
}

/// Fixed-width text rendering of a display table.
fn print_table(table: &DisplayTable) {
    let rows = table.rows();

    // Column widths: max of header and cells.
    let mut widths: Vec<usize> = DISPLAY_COLUMNS.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let line = |cells: &[String]| {
        let joined: Vec<String> = cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        println!("  {}", joined.join("  "));
    };

    line(&DISPLAY_COLUMNS.map(String::from));
    for row in &rows {
        line(row);
    }
}
