//! The [Document] is the unit of ownership for a JSON tree: it owns the [Arena] holding every
//! node and string, the id of the root node, and the outcome of the most recent parse.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use tracing::{debug, trace};

use crate::arena::{Arena, ArenaStats, Node, NodeId};
use crate::errors::{DomResult, ParserError};
use crate::parser::{Parser, ParserConfig};
use crate::value::{build, IntoNode, ValueMut, ValueRef};
use crate::JsonValue;

/// An in-memory JSON tree, parsed from text or built up through mutation
#[derive(Debug)]
pub struct Document {
    arena: Arena,
    root: NodeId,
    parser: Parser,
    parse_error: Option<ParserError>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document whose root is null
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create an empty document that parses using the given configuration
    pub fn with_config(config: ParserConfig) -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(Node::Null);
        trace!("created document");
        Document {
            arena,
            root,
            parser: Parser::with_config(config),
            parse_error: None,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        self.parser.config()
    }

    /// Parse `text`, replacing the current tree. Malformed input doesn't produce an error
    /// here; it is recorded and can be checked with [Document::has_parse_error], in which case
    /// the root is left as null
    pub fn parse(&mut self, text: &str) -> &mut Self {
        trace!(length = text.len(), "parsing document text");
        let result = self.parser.parse_str(&mut self.arena, text);
        self.complete_parse(result)
    }

    /// Parse raw bytes in the configured encoding, replacing the current tree
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        trace!(length = bytes.len(), encoding = ?self.config().encoding, "parsing document bytes");
        let result = self.parser.parse_bytes(&mut self.arena, bytes);
        self.complete_parse(result)
    }

    fn complete_parse(&mut self, result: Result<NodeId, ParserError>) -> &mut Self {
        match result {
            Ok(root) => {
                self.root = root;
                self.parse_error = None;
                trace!(stats = %self.arena.stats(), "parse complete");
            }
            Err(err) => {
                debug!(error = %err, "parse failed");
                self.root = self.arena.alloc(Node::Null);
                self.parse_error = Some(err);
            }
        }
        self
    }

    /// Whether the most recent parse detected malformed input
    pub fn has_parse_error(&self) -> bool {
        self.parse_error.is_some()
    }

    /// Details of the most recent parse failure, if any
    pub fn parse_error(&self) -> Option<&ParserError> {
        self.parse_error.as_ref()
    }

    /// A view onto the root value
    pub fn value(&self) -> ValueRef<'_> {
        ValueRef::new(&self.arena, self.root)
    }

    /// A mutable view onto the root value
    pub fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::new(&mut self.arena, self.root)
    }

    /// Allocate a new null node within this document, detached from the tree. It can be filled
    /// in through [Document::get_mut] and then copied into the tree
    pub fn create_value(&mut self) -> NodeId {
        self.arena.alloc(Node::Null)
    }

    pub fn create_object(&mut self) -> NodeId {
        self.arena.alloc(Node::Object(vec![]))
    }

    pub fn create_array(&mut self) -> NodeId {
        self.arena.alloc(Node::Array(vec![]))
    }

    /// Copy a freestanding value into this document as a detached node
    pub fn import(&mut self, value: &JsonValue) -> NodeId {
        let node = build(&mut self.arena, value);
        self.arena.alloc(node)
    }

    pub fn get(&self, id: NodeId) -> DomResult<ValueRef<'_>> {
        let id = self.arena.check(id)?;
        Ok(ValueRef::new(&self.arena, id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> DomResult<ValueMut<'_>> {
        let id = self.arena.check(id)?;
        Ok(ValueMut::new(&mut self.arena, id))
    }

    /// Replace the whole tree with a deep copy of `source`
    pub fn set_root(&mut self, source: impl IntoNode) -> DomResult<()> {
        self.value_mut().set_value(source)
    }

    /// Serialize the tree into a new string
    pub fn to_json_string(&self) -> String {
        self.value().to_json_string()
    }

    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// Release the document along with every node and string it owns
    pub fn free(self) {
        trace!(stats = %self.arena.stats(), "freeing document");
    }
}

impl FromStr for Document {
    type Err = ParserError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut document = Document::new();
        document.parse(text);
        match document.parse_error.take() {
            Some(err) => Err(err),
            None => Ok(document),
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{DomError, ParserErrorDetails};
    use crate::Document;

    #[test]
    fn a_new_document_should_be_null() {
        let doc = Document::new();
        assert!(doc.value().is_null());
        assert!(!doc.has_parse_error());
        assert_eq!(doc.to_json_string(), "null");
    }

    #[test]
    fn parse_errors_should_be_recorded_not_returned() {
        let mut doc = Document::new();
        assert!(doc.parse("[1,").has_parse_error());
        assert_eq!(
            doc.parse_error().map(|err| err.details.clone()),
            Some(ParserErrorDetails::EndOfInput)
        );
        assert!(doc.value().is_null());
        assert!(!doc.parse("[1]").has_parse_error());
        assert!(doc.parse_error().is_none());
    }

    #[test]
    fn reparsing_should_replace_the_tree() {
        let mut doc: Document = r#"{"a":1}"#.parse().unwrap();
        let before = doc.arena_stats();
        doc.parse("[true]");
        assert_eq!(doc.to_json_string(), "[true]");
        assert!(doc.arena_stats().nodes > before.nodes);
    }

    #[test]
    fn handles_should_only_resolve_in_their_own_document() {
        let mut first = Document::new();
        let id = first.create_object();
        let second = Document::new();
        assert!(first.get(id).unwrap().is_object());
        assert_eq!(second.get(id).unwrap_err(), DomError::ForeignHandle);
    }

    #[test]
    fn detached_values_should_be_copied_into_the_tree() {
        let mut doc = Document::new();
        doc.value_mut().init_array();
        let item = doc.create_object();
        doc.get_mut(item).unwrap().add_member("k", "v").unwrap();
        doc.value_mut().append(item).unwrap();
        doc.get_mut(item).unwrap().set_null();
        assert_eq!(doc.to_json_string(), r#"[{"k":"v"}]"#);
    }
}
