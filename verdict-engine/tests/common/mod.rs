use std::fs;
use std::path::{Path, PathBuf};

use verdict_engine::{CabinClass, Itinerary, Segment, Taxonomy};

/// Repository data directory with the shipped regulation files.
pub fn shipped_regulations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../data/regulations")
}

pub fn taxonomy() -> Taxonomy {
    Taxonomy::load_default().expect("embedded taxonomy must parse")
}

/// Write a file at a relative path under root, creating parent dirs as needed.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let full = root.join(relative);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&full, content).unwrap();
}

pub fn itinerary(origin: &str, via: &[&str], destination: &str) -> Itinerary {
    Itinerary {
        origin: origin.to_string(),
        via: via.iter().map(|s| s.to_string()).collect(),
        destination: destination.to_string(),
        has_rescreening: !via.is_empty(),
    }
}

pub fn segment(carrier: &str, cabin: CabinClass) -> Segment {
    Segment {
        carrier: carrier.to_string(),
        cabin_class: cabin,
        fare_class: None,
    }
}
