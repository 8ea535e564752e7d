//! Rendering surface seen by the synchronizer.

use std::collections::BTreeMap;
use std::fmt;

use crate::physics::BodySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

/// On-screen transform of an item: translate to the top-left of its box, then rotate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemTransform {
    pub translate: [f32; 2],
    pub rotation: f32,
}

impl ItemTransform {
    /// Place a `radius_px` disc so its center sits on the body's origin.
    pub fn project(snapshot: &BodySnapshot, radius_px: f32) -> Self {
        let [x, y] = snapshot.position_px();
        Self {
            translate: [x - radius_px, y - radius_px],
            rotation: snapshot.rotation,
        }
    }

    /// Static placement centered on `center`, unrotated.
    pub fn centered(center: [f32; 2], radius_px: f32) -> Self {
        Self {
            translate: [center[0] - radius_px, center[1] - radius_px],
            rotation: 0.0,
        }
    }

    pub fn center(&self, radius_px: f32) -> [f32; 2] {
        [self.translate[0] + radius_px, self.translate[1] + radius_px]
    }
}

impl fmt::Display for ItemTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) rotate({}rad)",
            self.translate[0], self.translate[1], self.rotation
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("element {0:?} is no longer mounted")]
pub struct ElementGone(pub ElementId);

pub trait RenderSurface {
    fn mount(&mut self, label: &str) -> ElementId;
    fn unmount(&mut self, id: ElementId) -> bool;
    fn write_transform(&mut self, id: ElementId, transform: ItemTransform) -> Result<(), ElementGone>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MountedElement {
    pub label: String,
    pub transform: Option<ItemTransform>,
    pub writes: u64,
}

/// In-memory surface: the headless host, and the state a windowed host draws from.
#[derive(Debug, Default)]
pub struct ElementTable {
    next_id: u64,
    elements: BTreeMap<ElementId, MountedElement>,
}

impl ElementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ElementId) -> Option<&MountedElement> {
        self.elements.get(&id)
    }

    pub fn transform(&self, id: ElementId) -> Option<ItemTransform> {
        self.elements.get(&id).and_then(|element| element.transform)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &MountedElement)> {
        self.elements.iter().map(|(id, element)| (*id, element))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl RenderSurface for ElementTable {
    fn mount(&mut self, label: &str) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(
            id,
            MountedElement {
                label: label.to_string(),
                transform: None,
                writes: 0,
            },
        );
        id
    }

    fn unmount(&mut self, id: ElementId) -> bool {
        self.elements.remove(&id).is_some()
    }

    fn write_transform(&mut self, id: ElementId, transform: ItemTransform) -> Result<(), ElementGone> {
        let element = self.elements.get_mut(&id).ok_or(ElementGone(id))?;
        element.transform = Some(transform);
        element.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(position: [f32; 2], rotation: f32) -> BodySnapshot {
        BodySnapshot {
            position,
            velocity: [0.0, 0.0],
            rotation,
            angular_velocity: 0.0,
            is_static: false,
        }
    }

    #[test]
    fn test_projection_centers_disc_on_body() {
        let transform = ItemTransform::project(&snapshot([2.0, 3.0], 0.5), 40.0);
        assert_eq!(transform.translate, [160.0, 260.0]);
        assert_eq!(transform.center(40.0), [200.0, 300.0]);
        assert_eq!(transform.rotation, 0.5);
    }

    #[test]
    fn test_css_rendering() {
        let transform = ItemTransform { translate: [10.0, -20.5], rotation: 1.25 };
        assert_eq!(transform.to_string(), "translate(10px, -20.5px) rotate(1.25rad)");
    }

    #[test]
    fn test_writes_to_unmounted_element_fail() {
        let mut table = ElementTable::new();
        let id = table.mount("cookie-1");
        let transform = ItemTransform::centered([50.0, 50.0], 10.0);
        assert!(table.write_transform(id, transform).is_ok());
        assert_eq!(table.transform(id), Some(transform));
        assert!(table.unmount(id));
        assert_eq!(table.write_transform(id, transform), Err(ElementGone(id)));
    }
}
