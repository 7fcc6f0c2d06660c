//! Route template compilation
//!
//! Turns a template such as `/user/:id` or the catch-all `*` into a
//! segment-wise matcher plus the ordered list of parameter names it declares.
//! Literal segments are compared as plain text, so characters like `.` or `+`
//! never take on any special meaning.

/// Template that matches every path unconditionally
pub const WILDCARD: &str = "*";

/// One `/`-separated piece of a compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly (case-sensitive)
    Literal(String),
    /// Captures exactly one non-empty path segment
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Matcher {
    /// `*`: any path, no parameters
    Any,
    Segments(Vec<Segment>),
    /// Malformed template; unreachable route
    Never,
}

/// Matcher compiled once from a route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    matcher: Matcher,
    param_names: Vec<String>,
}

impl CompiledPattern {
    /// Compile a route template.
    ///
    /// Never fails: a malformed template (a segment consisting of a bare `:`)
    /// compiles to a pattern that matches nothing.
    ///
    /// # Examples
    /// ```
    /// use rust_router::routing::CompiledPattern;
    /// let pattern = CompiledPattern::compile("/user/:id");
    /// assert!(pattern.matches("/user/42"));
    /// assert!(!pattern.matches("/user/42/posts"));
    /// assert_eq!(pattern.param_names(), ["id"]);
    /// ```
    pub fn compile(template: &str) -> Self {
        if template == WILDCARD {
            return Self {
                matcher: Matcher::Any,
                param_names: Vec::new(),
            };
        }

        let mut segments = Vec::new();
        let mut param_names = Vec::new();

        for piece in template.split('/') {
            match piece.strip_prefix(':') {
                Some("") => {
                    return Self {
                        matcher: Matcher::Never,
                        param_names: Vec::new(),
                    };
                }
                Some(name) => {
                    param_names.push(name.to_string());
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(piece.to_string())),
            }
        }

        Self {
            matcher: Matcher::Segments(segments),
            param_names,
        }
    }

    /// Whole-path match with implicit start and end anchors
    pub fn matches(&self, path: &str) -> bool {
        match &self.matcher {
            Matcher::Any => true,
            Matcher::Never => false,
            Matcher::Segments(segments) => {
                let mut pieces = path.split('/');
                let all_match = segments.iter().all(|segment| {
                    pieces.next().is_some_and(|piece| match segment {
                        Segment::Literal(text) => piece == text,
                        Segment::Param(_) => !piece.is_empty(),
                    })
                });
                all_match && pieces.next().is_none()
            }
        }
    }

    /// Parameter names in left-to-right template order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Segment matchers, or `None` for the wildcard and malformed templates
    pub fn segments(&self) -> Option<&[Segment]> {
        match &self.matcher {
            Matcher::Segments(segments) => Some(segments),
            Matcher::Any | Matcher::Never => None,
        }
    }

    pub const fn is_wildcard(&self) -> bool {
        matches!(self.matcher, Matcher::Any)
    }

    pub const fn is_malformed(&self) -> bool {
        matches!(self.matcher, Matcher::Never)
    }
}
