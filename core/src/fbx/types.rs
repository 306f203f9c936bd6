//! FBX document model shared by the ASCII and binary writers.

/// FBX file format version written by this crate (7.4).
pub const FBX_VERSION: u32 = 7400;

/// A typed node property.
#[derive(Debug, Clone, PartialEq)]
pub enum FbxProperty {
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    /// An object name qualified by its class, e.g. `Geometry::cube`.
    ObjectName { class: String, name: String },
    I32Array(Vec<i32>),
    F64Array(Vec<f64>),
}

impl FbxProperty {
    /// Create a class-qualified object name.
    pub fn object_name(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ObjectName {
            class: class.into(),
            name: name.into(),
        }
    }
}

impl From<bool> for FbxProperty {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for FbxProperty {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<i64> for FbxProperty {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<f64> for FbxProperty {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<&str> for FbxProperty {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FbxProperty {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<i32>> for FbxProperty {
    fn from(value: Vec<i32>) -> Self {
        Self::I32Array(value)
    }
}

impl From<Vec<f64>> for FbxProperty {
    fn from(value: Vec<f64>) -> Self {
        Self::F64Array(value)
    }
}

/// A named node with properties and nested children.
#[derive(Debug, Clone, PartialEq)]
pub struct FbxNode {
    pub name: String,
    pub properties: Vec<FbxProperty>,
    pub children: Vec<FbxNode>,
}

impl FbxNode {
    /// Create a node with no properties or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append a property.
    pub fn with(mut self, property: impl Into<FbxProperty>) -> Self {
        self.properties.push(property.into());
        self
    }

    /// Append a child node.
    pub fn with_child(mut self, child: FbxNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child holding a single property, e.g. `Version: 100`.
    pub fn with_value(self, name: &str, value: impl Into<FbxProperty>) -> Self {
        self.with_child(FbxNode::new(name).with(value))
    }

    /// Find the first child with the given name.
    pub fn child(&self, name: &str) -> Option<&FbxNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Iterate over all children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FbxNode> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// A complete FBX document: top-level node list plus the version written to
/// the header.
#[derive(Debug, Clone, PartialEq)]
pub struct FbxDocument {
    pub version: u32,
    pub nodes: Vec<FbxNode>,
}

impl FbxDocument {
    /// Find the first top-level node with the given name.
    pub fn node(&self, name: &str) -> Option<&FbxNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}
