use std::collections::HashMap;
use std::sync::Arc;

use foundation::ids::{LevelIndex, RegionId};

use crate::geometry::LevelGeometry;
use crate::symbology::NO_DATA_COLOR;

/// One of the two height slots used to crossfade statistics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// `height1`, fully shown at blend 0.
    A,
    /// `height2`, fully shown at blend 1.
    B,
}

impl Channel {
    pub fn other(self) -> Channel {
        match self {
            Channel::A => Channel::B,
            Channel::B => Channel::A,
        }
    }

    /// Blend factor at which this channel is fully shown.
    pub fn blend_target(self) -> f64 {
        match self {
            Channel::A => 0.0,
            Channel::B => 1.0,
        }
    }

    pub fn attribute_name(self) -> &'static str {
        match self {
            Channel::A => "height1",
            Channel::B => "height2",
        }
    }
}

/// Per-region visual attributes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegionAttributes {
    pub height1: f32,
    pub height2: f32,
    pub selected: bool,
    pub color: [u8; 4],
}

impl Default for RegionAttributes {
    fn default() -> Self {
        Self {
            height1: 0.0,
            height2: 0.0,
            selected: false,
            color: NO_DATA_COLOR,
        }
    }
}

impl RegionAttributes {
    pub fn height(&self, channel: Channel) -> f32 {
        match channel {
            Channel::A => self.height1,
            Channel::B => self.height2,
        }
    }

    pub fn set_height(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::A => self.height1 = value,
            Channel::B => self.height2 = value,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub u64);

/// The active renderable: one level's geometry plus one attribute slot per
/// region id.
///
/// Setters return `false` for ids outside the level and leave everything
/// untouched.
#[derive(Debug, Clone)]
pub struct RenderBatch {
    id: BatchId,
    geometry: Arc<LevelGeometry>,
    slots: Vec<RegionAttributes>,
    index: HashMap<RegionId, usize>,
    dirty: bool,
}

impl RenderBatch {
    pub fn new(id: BatchId, geometry: Arc<LevelGeometry>) -> Self {
        let index = geometry
            .region_ids()
            .enumerate()
            .map(|(slot, id)| (id.clone(), slot))
            .collect();
        let slots = vec![RegionAttributes::default(); geometry.len()];
        Self {
            id,
            geometry,
            slots,
            index,
            dirty: false,
        }
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn level(&self) -> LevelIndex {
        self.geometry.level
    }

    pub fn geometry(&self) -> &LevelGeometry {
        &self.geometry
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn region_ids(&self) -> impl Iterator<Item = &RegionId> + '_ {
        self.geometry.region_ids()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegionId, &RegionAttributes)> + '_ {
        self.geometry.region_ids().zip(self.slots.iter())
    }

    pub fn get(&self, id: &str) -> Option<&RegionAttributes> {
        self.index.get(id).map(|slot| &self.slots[*slot])
    }

    /// Mutable slot; marks the batch as changed.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut RegionAttributes> {
        let slot = *self.index.get(id)?;
        self.dirty = true;
        Some(&mut self.slots[slot])
    }

    pub fn set_height(&mut self, id: &str, channel: Channel, value: f32) -> bool {
        match self.get_mut(id) {
            Some(attrs) => {
                attrs.set_height(channel, value);
                true
            }
            None => false,
        }
    }

    pub fn set_selected(&mut self, id: &str, selected: bool) -> bool {
        match self.get_mut(id) {
            Some(attrs) => {
                attrs.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn set_color(&mut self, id: &str, color: [u8; 4]) -> bool {
        match self.get_mut(id) {
            Some(attrs) => {
                attrs.color = color;
                true
            }
            None => false,
        }
    }

    /// Returns whether attributes changed since the last call, and resets.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
