use glam::{EulerRot, Mat4, Quat, Vec3};

use super::material::{GeometryId, MaterialId};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mesh {
    pub geometry: GeometryId,
    pub material: MaterialId,
}

/// A node of the scene tree. Each node owns its children.
#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    pub name: Option<String>,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Default::default()
        }
    }

    pub fn mesh(geometry: GeometryId, material: MaterialId) -> Self {
        Self {
            mesh: Some(Mesh { geometry, material }),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Detaches and returns the child at `index` with its whole subtree.
    pub fn remove_child(&mut self, index: usize) -> Option<SceneNode> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    /// Depth-first search, the node itself included.
    pub fn find_by_name(&self, name: &str) -> Option<&SceneNode> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_by_name(name))
    }

    /// Calls `visit` with every node of the subtree and its world matrix.
    pub fn traverse(&self, parent: Mat4, visit: &mut impl FnMut(&SceneNode, Mat4)) {
        let world = parent * self.transform.to_matrix();
        visit(self, world);
        self.children
            .iter()
            .for_each(|child| child.traverse(world, visit));
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn marker(position: Vec3) -> SceneNode {
        SceneNode::mesh(GeometryId(0), MaterialId(0)).with_position(position)
    }

    #[test]
    fn finds_nested_nodes() {
        let mut surface = SceneNode::group("surface");
        surface.add_child(marker(Vec3::X).with_name("etna"));
        let mut planet = SceneNode::group("planet");
        planet.add_child(surface);

        assert!(planet.find_by_name("planet").is_some());
        assert_eq!(
            planet.find_by_name("etna").map(|n| n.transform.position),
            Some(Vec3::X)
        );
        assert!(planet.find_by_name("vesuvius").is_none());
    }

    #[test]
    fn removing_a_child_detaches_its_subtree() {
        let mut surface = SceneNode::group("surface");
        surface.add_child(marker(Vec3::Y));
        let mut planet = SceneNode::group("planet");
        planet.add_child(surface);

        let removed = planet.remove_child(0).unwrap();

        assert!(planet.children().is_empty());
        assert_eq!(removed.children().len(), 1);
        assert!(planet.remove_child(0).is_none());
    }

    #[test]
    fn children_inherit_parent_rotation() {
        let mut surface = SceneNode::group("surface");
        surface.transform.rotation.y = FRAC_PI_2;
        surface.add_child(marker(Vec3::X));

        let mut positions = Vec::new();
        surface.traverse(Mat4::IDENTITY, &mut |node, world| {
            if node.mesh.is_some() {
                positions.push(world.transform_point3(Vec3::ZERO));
            }
        });

        assert_eq!(positions.len(), 1);
        assert_abs_diff_eq!(positions[0].x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(positions[0].z, -1.0, epsilon = 1e-6);
    }
}
