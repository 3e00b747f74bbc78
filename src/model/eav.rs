//! Semantic triples (entity–attribute–value facts).

use serde::{Deserialize, Serialize};

/// How widely an attribute applies across entities of the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeCategory {
    /// Defining attribute every entity of this class must have.
    Root,
    /// Attribute only this entity has.
    Unique,
    /// Attribute few entities share.
    Rare,
    /// Attribute most entities share.
    Common,
}

/// The relation half of a triple's predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub relation: String,
    pub category: AttributeCategory,
}

/// An immutable entity–attribute–value fact, consumed read-only by phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticTriple {
    pub subject: String,
    pub predicate: Predicate,
    pub object: String,
}

impl SemanticTriple {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        category: AttributeCategory,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: Predicate {
                relation: relation.into(),
                category,
            },
            object: object.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_roundtrip() {
        let t = SemanticTriple::new("espresso", "brew_pressure", AttributeCategory::Root, "9 bar");
        let json = serde_json::to_string(&t).unwrap();
        let back: SemanticTriple = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.predicate.category, AttributeCategory::Root);
    }
}
