use bevy::prelude::*;

use crate::{
    geojson::BuildOutput,
    picking::{BorderPaint, HitIndex, HoverTracker},
    types::CentroidTable,
};

#[derive(States, Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum GlobeState {
    #[default]
    Loading,
    Ready,
}

/// Everything known about the loaded countries. Built once when the geodata
/// arrives; until then it stays empty and `GlobeState` is `Loading`.
#[derive(Resource, Default)]
pub struct GlobeViewer {
    pub centroids: CentroidTable,
    pub hit_index: HitIndex,
    pub hover: HoverTracker,
    /// One material per border ring, indexed like `hit_index`.
    pub ring_materials: Vec<Handle<StandardMaterial>>,
    pub label_count: usize,
}

impl GlobeViewer {
    pub fn new(
        output: BuildOutput,
        ring_materials: Vec<Handle<StandardMaterial>>,
        pick_threshold: f32,
    ) -> Self {
        Self {
            hit_index: HitIndex::from_borders(&output.borders, pick_threshold),
            centroids: output.centroids,
            hover: HoverTracker::default(),
            ring_materials,
            label_count: output.labels.len(),
        }
    }

    pub fn border_count(&self) -> usize {
        self.hit_index.len()
    }
}

/// Recolors border rings by swapping the base color of their materials.
pub struct MaterialPainter<'a> {
    pub materials: &'a mut Assets<StandardMaterial>,
    pub handles: &'a [Handle<StandardMaterial>],
    pub base: Color,
    pub highlight: Color,
}

impl BorderPaint for MaterialPainter<'_> {
    fn paint(&mut self, ring: usize, highlighted: bool) {
        let Some(handle) = self.handles.get(ring) else {
            return;
        };
        if let Some(material) = self.materials.get_mut(handle) {
            material.base_color = if highlighted { self.highlight } else { self.base };
        }
    }

    fn ring_count(&self) -> usize {
        self.handles.len()
    }
}
