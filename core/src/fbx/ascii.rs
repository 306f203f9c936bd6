//! FBX 7.x text serialization.

use std::fmt::Write as _;

use super::types::{FbxDocument, FbxNode, FbxProperty};

/// Array values written per `a:` line.
const VALUES_PER_LINE: usize = 16;

/// Serialize a document to FBX ASCII text.
pub fn to_ascii(doc: &FbxDocument, creator: &str) -> String {
    let mut out = String::new();
    let major = doc.version / 1000;
    let minor = (doc.version % 1000) / 100;
    let _ = writeln!(out, "; FBX {major}.{minor}.0 project file");
    let _ = writeln!(out, "; Created by {creator}");
    let _ = writeln!(out, "; ----------------------------------------------------");

    for node in &doc.nodes {
        out.push('\n');
        write_node(&mut out, node, 0);
    }
    out
}

fn write_node(out: &mut String, node: &FbxNode, depth: usize) {
    indent(out, depth);
    out.push_str(&node.name);
    out.push(':');

    // A single array property is written as a `*N { a: ... }` block
    if let [array @ (FbxProperty::I32Array(_) | FbxProperty::F64Array(_))] =
        node.properties.as_slice()
    {
        write_array(out, array, depth);
        return;
    }

    for (i, property) in node.properties.iter().enumerate() {
        out.push_str(if i == 0 { " " } else { ", " });
        write_scalar(out, property);
    }

    if node.children.is_empty() && !node.properties.is_empty() {
        out.push('\n');
        return;
    }

    out.push_str(" {\n");
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
    indent(out, depth);
    out.push_str("}\n");
}

fn write_scalar(out: &mut String, property: &FbxProperty) {
    match property {
        FbxProperty::Bool(v) => out.push(if *v { 'T' } else { 'F' }),
        FbxProperty::I32(v) => {
            let _ = write!(out, "{v}");
        }
        FbxProperty::I64(v) => {
            let _ = write!(out, "{v}");
        }
        FbxProperty::F64(v) => write_f64(out, *v),
        FbxProperty::String(s) => write_string(out, s),
        FbxProperty::ObjectName { class, name } => write_string(out, &format!("{class}::{name}")),
        FbxProperty::I32Array(values) => {
            let _ = write!(out, "*{}", values.len());
        }
        FbxProperty::F64Array(values) => {
            let _ = write!(out, "*{}", values.len());
        }
    }
}

fn write_array(out: &mut String, array: &FbxProperty, depth: usize) {
    let tokens: Vec<String> = match array {
        FbxProperty::I32Array(values) => values.iter().map(|v| v.to_string()).collect(),
        FbxProperty::F64Array(values) => values
            .iter()
            .map(|&v| {
                let mut s = String::new();
                write_f64(&mut s, v);
                s
            })
            .collect(),
        _ => Vec::new(),
    };

    let _ = writeln!(out, " *{} {{", tokens.len());
    indent(out, depth + 1);
    out.push_str("a: ");
    for (i, chunk) in tokens.chunks(VALUES_PER_LINE).enumerate() {
        if i > 0 {
            out.push_str(",\n");
            indent(out, depth + 1);
        }
        out.push_str(&chunk.join(","));
    }
    out.push('\n');
    indent(out, depth);
    out.push_str("}\n");
}

fn write_f64(out: &mut String, v: f64) {
    // Common readers accept these spellings for non-finite values
    if v.is_nan() {
        out.push_str("nan");
    } else if v.is_infinite() {
        out.push_str(if v > 0.0 { "inf" } else { "-inf" });
    } else {
        let _ = write!(out, "{v}");
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    out.push_str(&s.replace('"', "&quot;"));
    out.push('"');
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fbx::types::FBX_VERSION;

    fn doc(nodes: Vec<FbxNode>) -> FbxDocument {
        FbxDocument {
            version: FBX_VERSION,
            nodes,
        }
    }

    #[test]
    fn test_header_comment() {
        let text = to_ascii(&doc(Vec::new()), "csvmesh");
        assert!(text.starts_with("; FBX 7.4.0 project file\n"));
        assert!(text.contains("; Created by csvmesh"));
    }

    #[test]
    fn test_scalar_properties_and_blocks() {
        let node = FbxNode::new("Model")
            .with(7i64)
            .with(FbxProperty::object_name("Model", "cube"))
            .with("Mesh")
            .with_value("Version", 232)
            .with_value("Shading", true);
        let text = to_ascii(&doc(vec![node]), "t");

        assert!(text.contains("Model: 7, \"Model::cube\", \"Mesh\" {\n"));
        assert!(text.contains("\tVersion: 232\n"));
        assert!(text.contains("\tShading: T\n"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_array_block() {
        let node = FbxNode::new("Geometry")
            .with_value("PolygonVertexIndex", vec![0, 1, -3])
            .with_value("Vertices", vec![0.5, 1.0, -2.25]);
        let text = to_ascii(&doc(vec![node]), "t");

        assert!(text.contains("\tPolygonVertexIndex: *3 {\n\t\ta: 0,1,-3\n\t}\n"));
        assert!(text.contains("\tVertices: *3 {\n\t\ta: 0.5,1,-2.25\n\t}\n"));
    }

    #[test]
    fn test_long_arrays_wrap() {
        let values: Vec<i32> = (0..20).collect();
        let node = FbxNode::new("UVIndex").with(values);
        let text = to_ascii(&doc(vec![node]), "t");
        assert!(text.contains("a: 0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,\n\t16,17,18,19\n"));
    }

    #[test]
    fn test_empty_node_has_braces() {
        let text = to_ascii(&doc(vec![FbxNode::new("References")]), "t");
        assert!(text.contains("References: {\n}\n"));
    }

    #[test]
    fn test_string_quotes_escaped() {
        let node = FbxNode::new("Name").with("a\"b");
        let text = to_ascii(&doc(vec![node]), "t");
        assert!(text.contains("Name: \"a&quot;b\"\n"));
    }
}
