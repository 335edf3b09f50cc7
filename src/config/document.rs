//! Config document abstraction layer.
//!
//! `ConfigDocument`, `ConfigSection`, and `ParseNode` wrap the `kdl` crate
//! types so the rest of the config module never touches KDL directly.

use super::ConfigError;

/// Parsed KDL document paired with its source text.
pub(super) struct ConfigDocument {
    doc: kdl::KdlDocument,
    source: String,
}

impl ConfigDocument {
    /// Parse a KDL source string into a document.
    pub(super) fn parse(source: &str) -> Result<Self, ConfigError> {
        let doc: kdl::KdlDocument = source
            .parse()
            .map_err(|e: kdl::KdlError| ConfigError::ParseError(e.to_string()))?;
        Ok(Self {
            doc,
            source: source.to_string(),
        })
    }

    /// Load and parse a KDL config file.
    pub(super) fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::ReadError(e)
            }
        })?;
        Self::parse(&content)
    }

    /// Get a named top-level section's children, e.g. the `hook { … }` block.
    pub(super) fn section(&self, name: &str) -> Option<ConfigSection<'_>> {
        self.doc
            .get(name)
            .and_then(|n| n.children())
            .map(|doc| ConfigSection {
                doc,
                source: &self.source,
            })
    }
}

/// Borrowed view into a KDL section (children block of a top-level node).
pub(super) struct ConfigSection<'a> {
    doc: &'a kdl::KdlDocument,
    source: &'a str,
}

impl<'a> ConfigSection<'a> {
    /// The first child node named `name`.
    pub(super) fn node(&self, name: &str) -> Option<ParseNode<'a>> {
        self.doc
            .nodes()
            .iter()
            .find(|n| n.name().value() == name)
            .map(|node| ParseNode {
                node,
                source: self.source,
            })
    }

    pub(super) fn nodes(&self) -> Vec<ParseNode<'a>> {
        self.doc
            .nodes()
            .iter()
            .map(|node| ParseNode {
                node,
                source: self.source,
            })
            .collect()
    }
}

/// Single KDL node with source context for line-number reporting.
pub(super) struct ParseNode<'a> {
    node: &'a kdl::KdlNode,
    source: &'a str,
}

impl<'a> ParseNode<'a> {
    pub(super) fn name(&self) -> &'a str {
        self.node.name().value()
    }

    fn arguments(&self) -> impl Iterator<Item = &'a kdl::KdlValue> {
        self.node
            .entries()
            .iter()
            .filter(|e| e.name().is_none())
            .map(|e| e.value())
    }

    /// All positional string arguments; errors on any non-string argument.
    pub(super) fn strings(&self) -> Result<Vec<&'a str>, ConfigError> {
        self.arguments()
            .map(|v| v.as_string().ok_or_else(|| self.invalid("string")))
            .collect()
    }

    /// Exactly one positional string argument.
    pub(super) fn string(&self) -> Result<&'a str, ConfigError> {
        match self.strings()?.as_slice() {
            [single] => Ok(*single),
            _ => Err(self.invalid("single string")),
        }
    }

    /// Exactly one positional boolean argument (`#true` / `#false`).
    pub(super) fn boolean(&self) -> Result<bool, ConfigError> {
        let values: Vec<_> = self.arguments().collect();
        match values.as_slice() {
            [value] => value.as_bool().ok_or_else(|| self.invalid("boolean")),
            _ => Err(self.invalid("single boolean")),
        }
    }

    /// Exactly one positional non-negative integer argument.
    pub(super) fn unsigned(&self) -> Result<u64, ConfigError> {
        let values: Vec<_> = self.arguments().collect();
        match values.as_slice() {
            [value] => value
                .as_integer()
                .and_then(|i| u64::try_from(i).ok())
                .ok_or_else(|| self.invalid("non-negative integer")),
            _ => Err(self.invalid("single non-negative integer")),
        }
    }

    /// Named property `key=<integer>`, if present.
    pub(super) fn unsigned_property(&self, key: &str) -> Result<Option<u64>, ConfigError> {
        let entry = self
            .node
            .entries()
            .iter()
            .find(|e| e.name().is_some_and(|n| n.value() == key));
        match entry {
            None => Ok(None),
            Some(e) => e
                .value()
                .as_integer()
                .and_then(|i| u64::try_from(i).ok())
                .map(Some)
                .ok_or_else(|| self.invalid(&format!("non-negative integer for {key}="))),
        }
    }

    /// 1-based line number of this node in the source text.
    pub(super) fn line(&self) -> usize {
        let offset = self.node.span().offset();
        self.source[..offset.min(self.source.len())]
            .bytes()
            .filter(|&b| b == b'\n')
            .count()
            + 1
    }

    fn invalid(&self, expected: &str) -> ConfigError {
        ConfigError::ValidationError(format!(
            "line {}: '{}' expects a {expected}",
            self.line(),
            self.name()
        ))
    }
}
