//! FBX 7.x binary serialization.
//!
//! Layout for versions below 7500:
//!
//! - 23-byte magic, then the `u32` version
//! - node records: `u32` end offset, `u32` property count, `u32` property
//!   list length, `u8` name length, name, properties, nested records
//! - a 13-byte null record closing every nested list and the top level
//! - the footer
//!
//! Arrays are written uncompressed (encoding 0).

use super::error::ExportError;
use super::types::{FbxDocument, FbxNode, FbxProperty};

/// File magic: `Kaydara FBX Binary`, two spaces, NUL, then `0x1A 0x00`.
pub const MAGIC: &[u8; 23] = b"Kaydara FBX Binary  \x00\x1a\x00";

const NULL_RECORD_LEN: usize = 13;

const FOOTER_ID: [u8; 16] = [
    0xfa, 0xbc, 0xab, 0x09, 0xd0, 0xc8, 0xd4, 0x66, 0xb1, 0x76, 0xfb, 0x83, 0x1c, 0xf7, 0x26, 0x7e,
];

const FOOTER_MAGIC: [u8; 16] = [
    0xf8, 0x5a, 0x8c, 0x6a, 0xde, 0xf5, 0xd9, 0x7e, 0xec, 0xe9, 0x0c, 0xe3, 0x75, 0x8f, 0x29, 0x0b,
];

/// Serialize a document to FBX binary bytes.
pub fn to_binary(doc: &FbxDocument) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::with_capacity(1024);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&doc.version.to_le_bytes());

    for node in &doc.nodes {
        write_node(&mut out, node, doc.version)?;
    }
    out.extend_from_slice(&[0u8; NULL_RECORD_LEN]);

    write_footer(&mut out, doc.version);
    Ok(out)
}

fn write_node(out: &mut Vec<u8>, node: &FbxNode, version: u32) -> Result<(), ExportError> {
    let name = node.name.as_bytes();
    let name_len = u8::try_from(name.len()).map_err(|_| ExportError::NodeName {
        name: node.name.clone(),
    })?;

    let header_at = out.len();
    out.extend_from_slice(&[0u8; 12]);
    out.push(name_len);
    out.extend_from_slice(name);

    let properties_at = out.len();
    for property in &node.properties {
        write_property(out, property)?;
    }
    let property_list_len = out.len() - properties_at;

    for child in &node.children {
        write_node(out, child, version)?;
    }
    if !node.children.is_empty() || node.properties.is_empty() {
        out.extend_from_slice(&[0u8; NULL_RECORD_LEN]);
    }

    let end_offset = to_u32(out.len(), version)?;
    let property_count = to_u32(node.properties.len(), version)?;
    let property_list_len = to_u32(property_list_len, version)?;
    out[header_at..header_at + 4].copy_from_slice(&end_offset.to_le_bytes());
    out[header_at + 4..header_at + 8].copy_from_slice(&property_count.to_le_bytes());
    out[header_at + 8..header_at + 12].copy_from_slice(&property_list_len.to_le_bytes());
    Ok(())
}

fn write_property(out: &mut Vec<u8>, property: &FbxProperty) -> Result<(), ExportError> {
    match property {
        FbxProperty::Bool(v) => {
            out.push(b'C');
            out.push(u8::from(*v));
        }
        FbxProperty::I32(v) => {
            out.push(b'I');
            out.extend_from_slice(&v.to_le_bytes());
        }
        FbxProperty::I64(v) => {
            out.push(b'L');
            out.extend_from_slice(&v.to_le_bytes());
        }
        FbxProperty::F64(v) => {
            out.push(b'D');
            out.extend_from_slice(&v.to_le_bytes());
        }
        FbxProperty::String(s) => write_string(out, s.as_bytes())?,
        FbxProperty::ObjectName { class, name } => {
            // Binary files store `name\0\x01class` instead of `class::name`
            let mut bytes = Vec::with_capacity(name.len() + class.len() + 2);
            bytes.extend_from_slice(name.as_bytes());
            bytes.extend_from_slice(&[0x00, 0x01]);
            bytes.extend_from_slice(class.as_bytes());
            write_string(out, &bytes)?;
        }
        FbxProperty::I32Array(values) => {
            out.push(b'i');
            write_array_header(out, values.len(), 4)?;
            extend_i32(out, values);
        }
        FbxProperty::F64Array(values) => {
            out.push(b'd');
            write_array_header(out, values.len(), 8)?;
            extend_f64(out, values);
        }
    }
    Ok(())
}

fn write_string(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), ExportError> {
    out.push(b'S');
    out.extend_from_slice(&length_u32(bytes.len())?.to_le_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

fn write_array_header(out: &mut Vec<u8>, len: usize, stride: usize) -> Result<(), ExportError> {
    let count = length_u32(len)?;
    let byte_len = length_u32(len * stride)?;
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&byte_len.to_le_bytes());
    Ok(())
}

fn extend_i32(out: &mut Vec<u8>, values: &[i32]) {
    if cfg!(target_endian = "little") {
        out.extend_from_slice(bytemuck::cast_slice(values));
    } else {
        out.extend(values.iter().flat_map(|v| v.to_le_bytes()));
    }
}

fn extend_f64(out: &mut Vec<u8>, values: &[f64]) {
    if cfg!(target_endian = "little") {
        out.extend_from_slice(bytemuck::cast_slice(values));
    } else {
        out.extend(values.iter().flat_map(|v| v.to_le_bytes()));
    }
}

fn to_u32(value: usize, version: u32) -> Result<u32, ExportError> {
    u32::try_from(value).map_err(|_| ExportError::TooLarge { version })
}

fn length_u32(value: usize) -> Result<u32, ExportError> {
    u32::try_from(value).map_err(|_| ExportError::ArrayTooLong { len: value })
}

fn write_footer(out: &mut Vec<u8>, version: u32) {
    out.extend_from_slice(&FOOTER_ID);
    out.extend_from_slice(&[0u8; 4]);

    let pad = match (16 - out.len() % 16) % 16 {
        0 => 16,
        n => n,
    };
    out.extend(std::iter::repeat_n(0u8, pad));

    out.extend_from_slice(&version.to_le_bytes());
    out.extend(std::iter::repeat_n(0u8, 120));
    out.extend_from_slice(&FOOTER_MAGIC);
}
