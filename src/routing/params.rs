//! Path parameter extraction
//!
//! Recovers `name -> value` pairs from a concrete path using the same
//! segment walk the pattern compiler uses.

use super::pattern::{CompiledPattern, Segment};

/// Ordered parameter map, populated only for matched dynamic routes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a value, replacing any earlier value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extract parameters for `path` from a route's original template.
///
/// The path is expected to have matched the template already. Names whose
/// position has no usable segment in `path` are left unmapped.
///
/// # Examples
/// ```
/// use rust_router::routing::extract_params;
/// let params = extract_params("/user/:id", "/user/42");
/// assert_eq!(params.get("id"), Some("42"));
/// ```
pub fn extract_params(template: &str, path: &str) -> Params {
    CompiledPattern::compile(template).extract(path)
}

impl CompiledPattern {
    /// Extract parameters using this already-compiled pattern
    pub fn extract(&self, path: &str) -> Params {
        let mut params = Params::new();
        let Some(segments) = self.segments() else {
            return params;
        };

        for (segment, piece) in segments.iter().zip(path.split('/')) {
            if let Segment::Param(name) = segment {
                if !piece.is_empty() {
                    params.insert(name.as_str(), piece);
                }
            }
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_param() {
        let params = extract_params("/user/:id", "/user/42");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn test_params_keep_template_order() {
        let params = extract_params("/:lang/docs/:page", "/en/docs/intro");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("lang", "en"), ("page", "intro")]);
    }

    #[test]
    fn test_literal_template_has_no_params() {
        assert!(extract_params("/about", "/about").is_empty());
    }

    #[test]
    fn test_wildcard_has_no_params() {
        assert!(extract_params("*", "/anything/at/all").is_empty());
    }

    #[test]
    fn test_short_path_leaves_trailing_names_unmapped() {
        let params = extract_params("/a/:x/:y", "/a/1");
        assert_eq!(params.get("x"), Some("1"));
        assert_eq!(params.get("y"), None);
    }

    #[test]
    fn test_reused_pattern_agrees_with_template_walk() {
        let pattern = CompiledPattern::compile("/shop/:category/:item");
        let path = "/shop/books/rust-in-action";
        assert!(pattern.matches(path));
        assert_eq!(
            pattern.extract(path),
            extract_params("/shop/:category/:item", path)
        );
    }

    #[test]
    fn test_values_are_taken_verbatim() {
        let params = extract_params("/files/:name", "/files/report%202024.pdf");
        assert_eq!(params.get("name"), Some("report%202024.pdf"));
    }

    #[test]
    fn test_repeated_name_keeps_last_value() {
        let params = extract_params("/:id/:id", "/first/second");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some("second"));
    }
}
