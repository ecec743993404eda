//! Validation context with path tracking
//!
//! Copyright (c) 2026 Terrapipe Team
//! Licensed under the Apache-2.0 license

/// Context for a validation error: which section, entry, and field a
/// check was running against
///
/// Contexts print as `section:entry - field` strings so every error
/// points at the exact place in the document that failed.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    path: String,
}

impl ValidationContext {
    /// Start a context at a top-level section
    pub fn section(name: &str) -> Self {
        Self {
            path: name.to_string(),
        }
    }

    /// Narrow to a named entry within the section
    pub fn entry(&self, name: &str) -> Self {
        Self {
            path: format!("{}:{}", self.path, name),
        }
    }

    /// Narrow to a field within the entry
    pub fn field(&self, name: &str) -> Self {
        Self {
            path: format!("{} - {}", self.path, name),
        }
    }

    /// Narrow to a sequence index
    pub fn index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&ValidationContext> for String {
    fn from(context: &ValidationContext) -> Self {
        context.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_paths() {
        let context = ValidationContext::section("samplers");
        assert_eq!(context.as_str(), "samplers");
        let entry = context.entry("wet_season");
        assert_eq!(entry.as_str(), "samplers:wet_season");
        assert_eq!(
            entry.field("n_rows_per_sample").as_str(),
            "samplers:wet_season - n_rows_per_sample"
        );
    }

    #[test]
    fn test_index_path() {
        let context = ValidationContext::section("pipeline").index(2);
        assert_eq!(context.as_str(), "pipeline[2]");
    }
}
