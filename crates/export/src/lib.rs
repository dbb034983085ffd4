//! Export helpers for CSV and JSON experiment artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod csv {
    use std::io::{self, Write};

    const HEADER: &str = "numpoints,trials,ax_m_s2,ay_m_s2,az_m_s2,magnitude_m_s2,mean_magnitude_m_s2,std_dev_magnitude_m_s2,point_mass_kg,distributed_mass_kg";

    /// Write the standard tier CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// CSV row emitted for one sample-count tier.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TierRecord {
        pub numpoints: usize,
        pub trials: usize,
        pub acceleration: [f64; 3],
        pub magnitude: f64,
        pub mean_magnitude: f64,
        pub std_dev_magnitude: f64,
        pub point_mass_kg: f64,
        pub distributed_mass_kg: f64,
    }

    impl TierRecord {
        /// Serialize the record to CSV, matching the standard header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{},{},{:e},{:e},{:e},{:e},{:e},{:e},{:e},{:e}",
                self.numpoints,
                self.trials,
                self.acceleration[0],
                self.acceleration[1],
                self.acceleration[2],
                self.magnitude,
                self.mean_magnitude,
                self.std_dev_magnitude,
                self.point_mass_kg,
                self.distributed_mass_kg,
            )
        }
    }
}

pub mod json {
    use serde::Serialize;
    use std::io::{self, Write};

    /// Pretty-print any serializable report followed by a newline.
    pub fn write_report<T: Serialize>(writer: &mut dyn Write, report: &T) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, report)?;
        writeln!(writer)
    }
}
