use serde::Serialize;
use smallvec::SmallVec;

pub const SAMPLE_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Date,
    Boolean,
    String,
    Empty,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Date => "date",
            ColumnKind::Boolean => "boolean",
            ColumnKind::String => "string",
            ColumnKind::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: ColumnKind,
    pub sample_values: SmallVec<[String; SAMPLE_SIZE]>,
    pub non_null_count: usize,
    pub null_count: usize,
    pub null_percent: f64,
    pub unique_count: usize,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub has_duplicates: bool,
}
