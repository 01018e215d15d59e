//! Marker styling
//!
//! Styling is opaque to the outline pipeline: it hands every synchronized
//! marker to a caller-supplied callback. This module holds the default
//! callback, which labels a marker after its owner and colors it after the
//! owner's group when there is one.

use serde::{Deserialize, Serialize};

use crate::source::OwnerTerritory;

/// Fill and line appearance of an area marker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaStyle {
    /// 0xRRGGBB
    pub fill_color: u32,
    pub fill_opacity: f64,
    /// 0xRRGGBB
    pub line_color: u32,
    pub line_opacity: f64,
    /// Line thickness in pixels
    pub line_weight: u32,
}

impl Default for AreaStyle {
    fn default() -> Self {
        Self {
            fill_color: 0x0000FF,
            fill_opacity: 0.2,
            line_color: 0x0000FF,
            line_opacity: 0.5,
            line_weight: 3,
        }
    }
}

impl AreaStyle {
    /// Same opacities and weight, fill and line in one color.
    pub fn with_color(self, rgb: u32) -> Self {
        Self {
            fill_color: rgb,
            line_color: rgb,
            ..self
        }
    }
}

/// A marker that accepts a label and an [`AreaStyle`].
pub trait StyleTarget {
    fn set_label(&mut self, label: String);
    fn set_area_style(&mut self, style: AreaStyle);
}

/// Display label for an owner: its name, followed by its group in parentheses.
pub fn owner_label(owner: &OwnerTerritory) -> String {
    match &owner.group {
        Some(group) => format!("{} ({})", owner.name, group.name),
        None => owner.name.clone(),
    }
}

/// Default style callback: label after the owner, color after its group.
pub fn apply_owner_style<M: StyleTarget>(defaults: &AreaStyle, owner: &OwnerTerritory, marker: &mut M) {
    marker.set_label(owner_label(owner));

    let style = match &owner.group {
        Some(group) => defaults.with_color(group.color),
        None => *defaults,
    };
    marker.set_area_style(style);
}
