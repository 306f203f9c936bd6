//! Mesh buffer data structures.

/// How an attribute array maps onto the mesh surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingMode {
    /// One value per control point, shared by every polygon using it.
    ByControlPoint,
    /// One value per polygon corner.
    ByPolygonVertex,
}

/// How mapped values are looked up in the direct array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceMode {
    /// The n-th mapped element is `direct[n]`.
    Direct,
    /// The n-th mapped element is `direct[index[n]]`.
    IndexToDirect,
}

/// One attribute layer of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerElement<T> {
    /// Layer name (empty for unnamed layers).
    pub name: String,
    /// Mapping mode.
    pub mapping: MappingMode,
    /// Reference mode.
    pub reference: ReferenceMode,
    /// Attribute values.
    pub direct: Vec<T>,
    /// Indices into `direct` (empty unless `reference` is `IndexToDirect`).
    pub index: Vec<u32>,
}

impl<T> LayerElement<T> {
    /// Create an unnamed per-control-point layer with direct reference.
    pub fn by_control_point(direct: Vec<T>) -> Self {
        Self {
            name: String::new(),
            mapping: MappingMode::ByControlPoint,
            reference: ReferenceMode::Direct,
            direct,
            index: Vec::new(),
        }
    }

    /// Create a named per-polygon-vertex layer whose index array is the
    /// identity over `direct`.
    pub fn by_polygon_vertex_identity(name: impl Into<String>, direct: Vec<T>) -> Self {
        let index = (0..direct.len() as u32).collect();
        Self {
            name: name.into(),
            mapping: MappingMode::ByPolygonVertex,
            reference: ReferenceMode::IndexToDirect,
            direct,
            index,
        }
    }

    /// Number of mapped elements.
    pub fn len(&self) -> usize {
        match self.reference {
            ReferenceMode::Direct => self.direct.len(),
            ReferenceMode::IndexToDirect => self.index.len(),
        }
    }

    /// Check if the layer maps no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the n-th mapped element through the reference mode.
    pub fn get(&self, n: usize) -> Option<&T> {
        match self.reference {
            ReferenceMode::Direct => self.direct.get(n),
            ReferenceMode::IndexToDirect => {
                let index = *self.index.get(n)? as usize;
                self.direct.get(index)
            }
        }
    }
}

/// A named UV channel.
#[derive(Debug, Clone, PartialEq)]
pub struct UvChannel {
    /// Channel index (0 or 1).
    pub channel: u32,
    /// Texture coordinates; the layer name is the channel name.
    pub element: LayerElement<[f64; 2]>,
}

impl UvChannel {
    /// Channel name, e.g. `"uv0"`.
    pub fn name(&self) -> &str {
        &self.element.name
    }
}

/// Write-once mesh description handed to the exporter.
///
/// Control point `i` comes from data row `i`. Triangles reference control
/// points by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    /// Mesh and node name.
    pub name: String,
    /// Vertex positions.
    pub control_points: Vec<[f64; 3]>,
    /// Triangle topology.
    pub triangles: Vec<[u32; 3]>,
    /// Per-control-point normals.
    pub normals: Option<LayerElement<[f64; 3]>>,
    /// Per-control-point tangents; `w` carries handedness.
    pub tangents: Option<LayerElement<[f64; 4]>>,
    /// Per-control-point RGBA colors.
    pub colors: Option<LayerElement<[f64; 4]>>,
    /// UV channels in the order they were added.
    pub uv_channels: Vec<UvChannel>,
    /// Trailing rows excluded from topology.
    pub dropped_rows: usize,
}

impl MeshBuffer {
    /// Create an empty buffer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Number of control points.
    pub fn vertex_count(&self) -> usize {
        self.control_points.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Assign the normal layer. The mesh keeps a single normal layer, so any
    /// previous one is discarded.
    pub fn set_normals(&mut self, normals: LayerElement<[f64; 3]>) {
        if self.normals.replace(normals).is_some() {
            log::debug!("mesh '{}': replaced existing normal layer", self.name);
        }
    }

    /// Add a UV channel, replacing an existing channel with the same index.
    pub fn add_uv_channel(&mut self, uv: UvChannel) {
        match self
            .uv_channels
            .iter_mut()
            .find(|existing| existing.channel == uv.channel)
        {
            Some(existing) => *existing = uv,
            None => self.uv_channels.push(uv),
        }
    }

    /// Find a UV channel by name.
    pub fn uv_channel(&self, name: &str) -> Option<&UvChannel> {
        self.uv_channels.iter().find(|uv| uv.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_layer_resolves_in_row_order() {
        let layer = LayerElement::by_polygon_vertex_identity("uv0", vec![[0.0, 0.0], [1.0, 0.5]]);
        assert_eq!(layer.index, vec![0, 1]);
        assert_eq!(layer.get(1), Some(&[1.0, 0.5]));
        assert_eq!(layer.get(2), None);
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn test_set_normals_keeps_one_layer() {
        let mut mesh = MeshBuffer::new("m");
        mesh.set_normals(LayerElement::by_control_point(vec![[0.0, 1.0, 0.0]]));
        mesh.set_normals(LayerElement::by_control_point(vec![[1.0, 0.0, 0.0]]));

        let normals = mesh.normals.as_ref().unwrap();
        assert_eq!(normals.direct, vec![[1.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_add_uv_channel_replaces_same_index() {
        let mut mesh = MeshBuffer::new("m");
        let uv = |channel, name: &str, u| UvChannel {
            channel,
            element: LayerElement::by_polygon_vertex_identity(name, vec![[u, 0.0]]),
        };
        mesh.add_uv_channel(uv(0, "uv0", 0.0));
        mesh.add_uv_channel(uv(1, "uv1", 1.0));
        mesh.add_uv_channel(uv(0, "uv0", 2.0));

        assert_eq!(mesh.uv_channels.len(), 2);
        assert_eq!(mesh.uv_channel("uv0").unwrap().element.direct, vec![[2.0, 0.0]]);
    }
}
