//! Mapping tree definition.
//!
//! A mapping tree says which input column feeds which record field. Its shape
//! mirrors the target record: a [`Leaf`] binds one column to a scalar field, a
//! [`Branch`] binds a nested record field to its own list of children.
//!
//! Trees are built in code or loaded from JSON:
//!
//! ```json
//! { "branch": { "name": "Customer", "children": [
//!     { "leaf": { "field": "Name", "column": 1 } },
//!     { "leaf": { "field": "Join", "column": 0,
//!                 "options": { "type": "timestamp_format", "format": "%Y-%m-%d" } } },
//!     { "branch": { "name": "Sub", "children": [
//!         { "leaf": { "field": "Name", "column": 3 } }
//!     ] } }
//! ] } }
//! ```

use serde::{Deserialize, Serialize};

/// A node of the mapping tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingNode {
    Leaf(Leaf),
    Branch(Branch),
}

/// Binds one input column to one scalar field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    /// Target field name on the enclosing record
    pub field: String,

    /// 0-based column index into the row
    pub column: usize,

    /// Parse options interpreted by the field's coercion function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ParseOptions>,
}

/// Binds a nested record field to a sub-mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Nested record field name on the enclosing record.
    /// Informational on the root node.
    pub name: String,

    #[serde(default)]
    pub children: Vec<MappingNode>,
}

/// Options consumed by individual coercion functions.
///
/// Each coercion function looks only for the option kind it understands and
/// ignores the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParseOptions {
    /// chrono `strftime` pattern for timestamp fields, e.g. `%Y-%m-%d`.
    ///
    /// Reference-date layouts such as `2006-01-02` are not understood; the
    /// digits are matched literally and every real date fails to parse.
    /// Write `%Y-%m-%d` instead.
    TimestampFormat { format: String },

    /// Custom boolean vocabulary, matched case-insensitively
    BooleanTokens {
        truthy: Vec<String>,
        #[serde(default)]
        falsy: Vec<String>,
    },
}

impl ParseOptions {
    /// Timestamp format option.
    pub fn timestamp(format: &str) -> Self {
        ParseOptions::TimestampFormat {
            format: format.to_string(),
        }
    }

    /// Boolean vocabulary option.
    pub fn boolean_tokens(truthy: &[&str], falsy: &[&str]) -> Self {
        ParseOptions::BooleanTokens {
            truthy: truthy.iter().map(|s| s.to_string()).collect(),
            falsy: falsy.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl MappingNode {
    /// Leaf without options.
    pub fn leaf(field: &str, column: usize) -> Self {
        MappingNode::Leaf(Leaf {
            field: field.to_string(),
            column,
            options: None,
        })
    }

    /// Leaf with parse options.
    pub fn leaf_with(field: &str, column: usize, options: ParseOptions) -> Self {
        MappingNode::Leaf(Leaf {
            field: field.to_string(),
            column,
            options: Some(options),
        })
    }

    /// Branch over a nested record.
    pub fn branch(name: &str, children: Vec<MappingNode>) -> Self {
        MappingNode::Branch(Branch {
            name: name.to_string(),
            children,
        })
    }

    /// Field this node targets on its enclosing record.
    pub fn target(&self) -> &str {
        match self {
            MappingNode::Leaf(leaf) => &leaf.field,
            MappingNode::Branch(branch) => &branch.name,
        }
    }

    /// `"leaf"` or `"branch"`.
    pub fn kind(&self) -> &'static str {
        match self {
            MappingNode::Leaf(_) => "leaf",
            MappingNode::Branch(_) => "branch",
        }
    }

    /// All column indices referenced anywhere in the tree, sorted and deduplicated.
    pub fn columns(&self) -> Vec<usize> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns.sort_unstable();
        columns.dedup();
        columns
    }

    fn collect_columns(&self, out: &mut Vec<usize>) {
        match self {
            MappingNode::Leaf(leaf) => out.push(leaf.column),
            MappingNode::Branch(branch) => {
                for child in &branch.children {
                    child.collect_columns(out);
                }
            }
        }
    }

    /// Highest column index referenced, if any leaf exists.
    pub fn max_column(&self) -> Option<usize> {
        self.columns().last().copied()
    }

    /// Minimum row width that satisfies every leaf.
    pub fn required_width(&self) -> usize {
        self.max_column().map_or(0, |c| c + 1)
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            MappingNode::Leaf(_) => 1,
            MappingNode::Branch(branch) => branch.children.iter().map(Self::leaf_count).sum(),
        }
    }

    /// Parse a mapping tree from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Leaf {
    /// Options, if any.
    pub fn options(&self) -> Option<&ParseOptions> {
        self.options.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MappingNode {
        MappingNode::branch(
            "Customer",
            vec![
                MappingNode::leaf("Name", 1),
                MappingNode::leaf("Id", 2),
                MappingNode::leaf_with("Join", 0, ParseOptions::timestamp("%Y-%m-%d")),
                MappingNode::branch(
                    "Sub",
                    vec![
                        MappingNode::leaf("Id", 2),
                        MappingNode::branch("Sub", vec![MappingNode::leaf("Website", 4)]),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_columns_and_width() {
        let tree = tree();
        assert_eq!(tree.columns(), vec![0, 1, 2, 4]);
        assert_eq!(tree.max_column(), Some(4));
        assert_eq!(tree.required_width(), 5);
        assert_eq!(tree.leaf_count(), 5);

        let empty = MappingNode::branch("Empty", Vec::new());
        assert_eq!(empty.max_column(), None);
        assert_eq!(empty.required_width(), 0);
    }

    #[test]
    fn test_target_and_kind() {
        let tree = tree();
        assert_eq!(tree.target(), "Customer");
        assert_eq!(tree.kind(), "branch");
        assert_eq!(MappingNode::leaf("Id", 0).kind(), "leaf");
    }

    #[test]
    fn test_json_format() {
        let json = r#"{ "branch": { "name": "Customer", "children": [
            { "leaf": { "field": "Name", "column": 1 } },
            { "leaf": { "field": "Join", "column": 0,
                        "options": { "type": "timestamp_format", "format": "%Y-%m-%d" } } }
        ] } }"#;
        let parsed = MappingNode::from_json(json).unwrap();
        let MappingNode::Branch(root) = &parsed else {
            panic!("expected branch root");
        };
        assert_eq!(root.children.len(), 2);
        assert_eq!(
            root.children[1],
            MappingNode::leaf_with("Join", 0, ParseOptions::timestamp("%Y-%m-%d"))
        );

        let again = MappingNode::from_json(&parsed.to_json().unwrap()).unwrap();
        assert_eq!(again, parsed);
    }

    #[test]
    fn test_leaf_without_options_omits_key() {
        let json = MappingNode::leaf("Name", 1).to_json().unwrap();
        assert!(!json.contains("options"));
    }
}
