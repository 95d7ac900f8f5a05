use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{GraphError, Result};

pub const ENROLLED_IN: &str = "enrolled_in";
pub const TAUGHT_BY: &str = "taught_by";
pub const BELONGS_TO: &str = "belongs_to";
pub const PART_OF: &str = "part_of";

/// Header names every input file must carry, matched case-sensitively.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Student", "Course", "Professor", "Department", "College"];

pub const DEFAULT_NODE_COLOR: &str = "#CCCCCC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Student,
    Course,
    Professor,
    Department,
    College,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::Student,
        EntityType::Course,
        EntityType::Professor,
        EntityType::Department,
        EntityType::College,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Student => "Student",
            EntityType::Course => "Course",
            EntityType::Professor => "Professor",
            EntityType::Department => "Department",
            EntityType::College => "College",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            EntityType::Student => "#00E5FF",
            EntityType::Course => "#FFCA28",
            EntityType::Professor => "#FF5252",
            EntityType::Department => "#7C4DFF",
            EntityType::College => "#69F0AE",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Palette lookup by type name. Anything outside the five known types is gray.
pub fn color_for(type_name: &str) -> &'static str {
    EntityType::ALL
        .iter()
        .find(|t| t.as_str() == type_name)
        .map(|t| t.color())
        .unwrap_or(DEFAULT_NODE_COLOR)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub relation: &'static str,
    pub object: String,
    pub subject_type: EntityType,
    pub object_type: EntityType,
}

impl Triple {
    fn new(
        subject: &str,
        relation: &'static str,
        object: &str,
        subject_type: EntityType,
        object_type: EntityType,
    ) -> Self {
        Triple {
            subject: subject.to_string(),
            relation,
            object: object.to_string(),
            subject_type,
            object_type,
        }
    }
}

/// One row of the college dataset.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CollegeRecord {
    pub student: String,
    pub course: String,
    pub professor: String,
    pub department: String,
    pub college: String,
}

impl CollegeRecord {
    /// Expands the row into its enrollment, teaching, department and college triples, in that order.
    pub fn triples(&self) -> [Triple; 4] {
        use EntityType::*;

        [
            Triple::new(&self.student, ENROLLED_IN, &self.course, Student, Course),
            Triple::new(&self.course, TAUGHT_BY, &self.professor, Course, Professor),
            Triple::new(&self.professor, BELONGS_TO, &self.department, Professor, Department),
            Triple::new(&self.department, PART_OF, &self.college, Department, College),
        ]
    }
}

pub fn extract_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Triple>> {
    let path = path.as_ref();
    log::debug!("Reading college dataset from {}", path.display());

    let file = File::open(path)?;
    extract_from_reader(file)
}

pub fn extract_from_reader<R: Read>(reader: R) -> Result<Vec<Triple>> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers = reader.headers()?;
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(GraphError::MissingColumn(column.to_string()));
        }
    }

    let mut triples = Vec::new();
    let mut rows = 0;
    for record in reader.deserialize::<CollegeRecord>() {
        let record = record?;
        triples.extend(record.triples());
        rows += 1;
    }

    log::debug!("Extracted {} triples from {} rows", triples.len(), rows);
    Ok(triples)
}
