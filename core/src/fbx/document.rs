//! Builds the FBX node tree for a single mesh.
//!
//! The document holds one `Geometry` object carrying the mesh buffers, one
//! `Model` node of class `Mesh`, and the connections that parent the model
//! under the scene root and attach the geometry to it.

use crate::mesh::{LayerElement, MappingMode, MeshBuffer, ReferenceMode};

use super::types::{FBX_VERSION, FbxDocument, FbxNode, FbxProperty};

/// Object id of the implicit scene root.
const ROOT_ID: i64 = 0;
/// First id handed out to exported objects.
const FIRST_OBJECT_ID: i64 = 1_000_000;

// ---------------------------------------------------------------------------
// Export context
// ---------------------------------------------------------------------------

pub(super) struct ExportContext {
    creator: String,
    next_id: i64,
    objects: Vec<FbxNode>,
    // (child, parent) object-object connections
    connections: Vec<(i64, i64)>,
    model_count: i32,
    geometry_count: i32,
}

impl ExportContext {
    pub(super) fn new(creator: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
            next_id: FIRST_OBJECT_ID,
            objects: Vec::new(),
            connections: Vec::new(),
            model_count: 0,
            geometry_count: 0,
        }
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // -- Step 1: Objects -----------------------------------------------------

    pub(super) fn add_mesh(&mut self, mesh: &MeshBuffer) {
        let model_id = self.allocate_id();
        let geometry_id = self.allocate_id();

        self.objects.push(build_geometry(geometry_id, mesh));
        self.objects.push(build_model(model_id, &mesh.name));
        self.connections.push((model_id, ROOT_ID));
        self.connections.push((geometry_id, model_id));
        self.model_count += 1;
        self.geometry_count += 1;

        log::debug!(
            "fbx: mesh '{}' as model {model_id}, geometry {geometry_id}",
            mesh.name
        );
    }

    // -- Step 2: Document assembly -------------------------------------------

    pub(super) fn finish(self) -> FbxDocument {
        let nodes = vec![
            self.header_extension(),
            global_settings(),
            documents(),
            FbxNode::new("References"),
            self.definitions(),
            FbxNode {
                name: "Objects".into(),
                properties: Vec::new(),
                children: self.objects,
            },
            connections(&self.connections),
        ];

        FbxDocument {
            version: FBX_VERSION,
            nodes,
        }
    }

    fn header_extension(&self) -> FbxNode {
        FbxNode::new("FBXHeaderExtension")
            .with_value("FBXHeaderVersion", 1003)
            .with_value("FBXVersion", FBX_VERSION as i32)
            .with_value("Creator", self.creator.as_str())
    }

    fn definitions(&self) -> FbxNode {
        let object_type = |name: &str, count: i32| {
            FbxNode::new("ObjectType")
                .with(name)
                .with_value("Count", count)
        };
        FbxNode::new("Definitions")
            .with_value("Version", 100)
            .with_value("Count", 1 + self.model_count + self.geometry_count)
            .with_child(object_type("GlobalSettings", 1))
            .with_child(object_type("Model", self.model_count))
            .with_child(object_type("Geometry", self.geometry_count))
    }
}

// ---------------------------------------------------------------------------
// Fixed sections
// ---------------------------------------------------------------------------

/// A `P:` entry inside a `Properties70` block.
fn p(name: &str, type_name: &str, label: &str, value: impl Into<FbxProperty>) -> FbxNode {
    FbxNode::new("P")
        .with(name)
        .with(type_name)
        .with(label)
        .with("")
        .with(value)
}

/// Y-up, right-handed, centimetre units.
fn global_settings() -> FbxNode {
    let properties = FbxNode::new("Properties70")
        .with_child(p("UpAxis", "int", "Integer", 1))
        .with_child(p("UpAxisSign", "int", "Integer", 1))
        .with_child(p("FrontAxis", "int", "Integer", 2))
        .with_child(p("FrontAxisSign", "int", "Integer", 1))
        .with_child(p("CoordAxis", "int", "Integer", 0))
        .with_child(p("CoordAxisSign", "int", "Integer", 1))
        .with_child(p("UnitScaleFactor", "double", "Number", 1.0));

    FbxNode::new("GlobalSettings")
        .with_value("Version", 1000)
        .with_child(properties)
}

fn documents() -> FbxNode {
    let document = FbxNode::new("Document")
        .with(FIRST_OBJECT_ID - 1)
        .with("Scene")
        .with("Scene")
        .with_value("RootNode", ROOT_ID);

    FbxNode::new("Documents")
        .with_value("Count", 1)
        .with_child(document)
}

fn connections(links: &[(i64, i64)]) -> FbxNode {
    links.iter().fold(FbxNode::new("Connections"), |node, &(child, parent)| {
        node.with_child(FbxNode::new("C").with("OO").with(child).with(parent))
    })
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

fn build_model(id: i64, name: &str) -> FbxNode {
    FbxNode::new("Model")
        .with(id)
        .with(FbxProperty::object_name("Model", name))
        .with("Mesh")
        .with_value("Version", 232)
        .with_child(
            FbxNode::new("Properties70").with_child(p(
                "DefaultAttributeIndex",
                "int",
                "Integer",
                0,
            )),
        )
        .with_value("Shading", true)
        .with_value("Culling", "CullingOff")
}

fn build_geometry(id: i64, mesh: &MeshBuffer) -> FbxNode {
    let mut geometry = FbxNode::new("Geometry")
        .with(id)
        .with(FbxProperty::object_name("Geometry", mesh.name.as_str()))
        .with("Mesh")
        .with_value("Vertices", flatten(&mesh.control_points))
        .with_value("PolygonVertexIndex", polygon_vertex_index(&mesh.triangles))
        .with_value("GeometryVersion", 124);

    // Layer 0 collects every non-UV element plus the first UV set; each
    // further UV set gets its own layer.
    let mut base_layer = layer(0);
    let mut extra_layers = Vec::new();

    if let Some(normals) = &mesh.normals {
        geometry = geometry.with_child(
            element_header("LayerElementNormal", 0, 102, normals)
                .with_value("Normals", flatten(&normals.direct)),
        );
        base_layer.children.push(layer_entry("LayerElementNormal", 0));
    }

    if let Some(tangents) = &mesh.tangents {
        let xyz: Vec<f64> = tangents
            .direct
            .iter()
            .flat_map(|t| [t[0], t[1], t[2]])
            .collect();
        let w: Vec<f64> = tangents.direct.iter().map(|t| t[3]).collect();
        geometry = geometry.with_child(
            element_header("LayerElementTangent", 0, 102, tangents)
                .with_value("Tangents", xyz)
                .with_value("TangentsW", w),
        );
        base_layer.children.push(layer_entry("LayerElementTangent", 0));
    }

    if let Some(colors) = &mesh.colors {
        let mut element = element_header("LayerElementColor", 0, 101, colors)
            .with_value("Colors", flatten(&colors.direct));
        if colors.reference == ReferenceMode::IndexToDirect {
            element = element.with_value("ColorIndex", indices(&colors.index));
        }
        geometry = geometry.with_child(element);
        base_layer.children.push(layer_entry("LayerElementColor", 0));
    }

    for (ordinal, uv) in mesh.uv_channels.iter().enumerate() {
        let ordinal = ordinal as i32;
        let mut element = element_header("LayerElementUV", ordinal, 101, &uv.element)
            .with_value("UV", flatten(&uv.element.direct));
        if uv.element.reference == ReferenceMode::IndexToDirect {
            element = element.with_value("UVIndex", indices(&uv.element.index));
        }
        geometry = geometry.with_child(element);

        let entry = layer_entry("LayerElementUV", ordinal);
        if ordinal == 0 {
            base_layer.children.push(entry);
        } else {
            extra_layers.push(layer(ordinal).with_child(entry));
        }
    }

    if base_layer.child("LayerElement").is_some() {
        geometry.children.push(base_layer);
    }
    geometry.children.extend(extra_layers);
    geometry
}

fn element_header<T>(kind: &str, ordinal: i32, version: i32, element: &LayerElement<T>) -> FbxNode {
    FbxNode::new(kind)
        .with(ordinal)
        .with_value("Version", version)
        .with_value("Name", element.name.as_str())
        .with_value("MappingInformationType", mapping_name(element.mapping))
        .with_value("ReferenceInformationType", reference_name(element.reference))
}

fn layer(ordinal: i32) -> FbxNode {
    FbxNode::new("Layer").with(ordinal).with_value("Version", 100)
}

fn layer_entry(kind: &str, typed_index: i32) -> FbxNode {
    FbxNode::new("LayerElement")
        .with_value("Type", kind)
        .with_value("TypedIndex", typed_index)
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn mapping_name(mapping: MappingMode) -> &'static str {
    match mapping {
        MappingMode::ByControlPoint => "ByVertice",
        MappingMode::ByPolygonVertex => "ByPolygonVertex",
    }
}

fn reference_name(reference: ReferenceMode) -> &'static str {
    match reference {
        ReferenceMode::Direct => "Direct",
        ReferenceMode::IndexToDirect => "IndexToDirect",
    }
}

fn flatten<const N: usize>(values: &[[f64; N]]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

fn indices(values: &[u32]) -> Vec<i32> {
    values.iter().map(|&i| i as i32).collect()
}

/// Polygon vertex indices with each polygon's last index stored as `!index`.
pub(super) fn polygon_vertex_index(triangles: &[[u32; 3]]) -> Vec<i32> {
    triangles
        .iter()
        .flat_map(|&[a, b, c]| [a as i32, b as i32, !(c as i32)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{UvChannel, build_triangles};

    fn quad_mesh() -> MeshBuffer {
        let mut mesh = MeshBuffer::new("quad");
        mesh.control_points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        mesh.triangles = build_triangles(6).unwrap().triangles;
        mesh
    }

    fn build(mesh: &MeshBuffer) -> FbxDocument {
        let mut ctx = ExportContext::new("test");
        ctx.add_mesh(mesh);
        ctx.finish()
    }

    fn geometry(doc: &FbxDocument) -> &FbxNode {
        doc.node("Objects").unwrap().child("Geometry").unwrap()
    }

    #[test]
    fn test_polygon_vertex_index_encoding() {
        assert_eq!(
            polygon_vertex_index(&[[0, 1, 2], [3, 4, 5]]),
            vec![0, 1, -3, 3, 4, -6]
        );
    }

    #[test]
    fn test_top_level_sections() {
        let doc = build(&quad_mesh());
        let names: Vec<&str> = doc.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "FBXHeaderExtension",
                "GlobalSettings",
                "Documents",
                "References",
                "Definitions",
                "Objects",
                "Connections",
            ]
        );
        assert_eq!(doc.version, FBX_VERSION);
    }

    #[test]
    fn test_geometry_without_layers() {
        let doc = build(&quad_mesh());
        let geometry = geometry(&doc);

        assert_eq!(
            geometry.properties[1],
            FbxProperty::object_name("Geometry", "quad")
        );
        let vertices = geometry.child("Vertices").unwrap();
        assert!(matches!(&vertices.properties[0], FbxProperty::F64Array(v) if v.len() == 18));
        assert!(geometry.child("Layer").is_none());
    }

    #[test]
    fn test_connections_link_model_and_geometry() {
        let doc = build(&quad_mesh());
        let objects = doc.node("Objects").unwrap();
        let model_id = objects.child("Model").unwrap().properties[0].clone();
        let geometry_id = objects.child("Geometry").unwrap().properties[0].clone();

        let links: Vec<&FbxNode> = doc.node("Connections").unwrap().children_named("C").collect();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].properties[1], model_id);
        assert_eq!(links[0].properties[2], FbxProperty::I64(ROOT_ID));
        assert_eq!(links[1].properties[1], geometry_id);
        assert_eq!(links[1].properties[2], model_id);
    }

    #[test]
    fn test_layers_for_all_elements() {
        let mut mesh = quad_mesh();
        let n = mesh.vertex_count();
        mesh.set_normals(LayerElement::by_control_point(vec![[0.0, 0.0, 1.0]; n]));
        mesh.tangents = Some(LayerElement::by_control_point(vec![[1.0, 0.0, 0.0, 1.0]; n]));
        mesh.colors = Some(LayerElement::by_control_point(vec![[1.0, 0.5, 0.25, 1.0]; n]));
        for channel in 0..2 {
            mesh.add_uv_channel(UvChannel {
                channel,
                element: LayerElement::by_polygon_vertex_identity(
                    format!("uv{channel}"),
                    vec![[0.5, 0.5]; n],
                ),
            });
        }

        let doc = build(&mesh);
        let geometry = geometry(&doc);

        let uvs: Vec<&FbxNode> = geometry.children_named("LayerElementUV").collect();
        assert_eq!(uvs.len(), 2);
        assert_eq!(
            uvs[1].child("Name").unwrap().properties[0],
            FbxProperty::String("uv1".into())
        );
        assert_eq!(
            uvs[0].child("MappingInformationType").unwrap().properties[0],
            FbxProperty::String("ByPolygonVertex".into())
        );
        assert!(uvs[0].child("UVIndex").is_some());

        let tangent = geometry.child("LayerElementTangent").unwrap();
        assert!(
            matches!(&tangent.child("TangentsW").unwrap().properties[0], FbxProperty::F64Array(w) if w.iter().all(|&v| v == 1.0))
        );

        let layers: Vec<&FbxNode> = geometry.children_named("Layer").collect();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].children_named("LayerElement").count(), 4);
        assert_eq!(layers[1].children_named("LayerElement").count(), 1);
    }
}
