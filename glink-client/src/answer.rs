/// Query answers
use std::collections::HashMap;

use crate::concept::Concept;

/// One answer of a match, insert or update query: the concepts bound to
/// each query variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptMap {
    map: HashMap<String, Concept>,
}

impl ConceptMap {
    pub fn new(map: HashMap<String, Concept>) -> Self {
        Self { map }
    }

    /// Concept bound to `variable` (without the leading `$`).
    pub fn get(&self, variable: &str) -> Option<&Concept> {
        self.map.get(variable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.map.values()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, Concept> {
        self.map
    }
}

/// Result of an aggregate query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Long(i64),
    Double(f64),
    /// The aggregate is undefined, e.g. the mean of no values.
    NaN,
}

impl Numeric {
    pub fn is_nan(&self) -> bool {
        matches!(self, Numeric::NaN)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Long(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Numeric::Long(value) => *value as f64,
            Numeric::Double(value) => *value,
            Numeric::NaN => f64::NAN,
        }
    }
}
