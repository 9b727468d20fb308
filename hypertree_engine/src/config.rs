// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed engine configuration and field-by-field overrides.

use hypertree_filter::FilterConfig;
use hypertree_gesture::GestureConfig;
use hypertree_layout::{LayoutConfig, LayoutWeightSource};
use hypertree_tween::TweenConfig;
use serde::{Deserialize, Serialize};

/// Which view transformation the engine drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Möbius pan and rotation in the Poincaré disk.
    #[default]
    Hyperbolic,
    /// Euclidean pan without distortion.
    Pan,
    /// The hyperbolic view mirrored through the disk center.
    Negated,
}

/// Complete engine configuration with named defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// λ at start-up.
    pub initial_lambda: f64,
    /// View transformation.
    pub transform: TransformKind,
    /// Disk radius of a node circle drawn at the center.
    pub node_radius: f64,
    /// Animate to a clicked node.
    pub click_to_center: bool,
    /// Separator between labels in the breadcrumb.
    pub breadcrumb_separator: String,
    /// Layout parameters.
    pub layout: LayoutConfig,
    /// Culling and label parameters.
    pub filter: FilterConfig,
    /// Gesture parameters.
    pub gesture: GestureConfig,
    /// Transition durations.
    pub tween: TweenConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_lambda: 0.1,
            transform: TransformKind::Hyperbolic,
            node_radius: 0.02,
            click_to_center: true,
            breadcrumb_separator: " / ".to_owned(),
            layout: LayoutConfig::default(),
            filter: FilterConfig::default(),
            gesture: GestureConfig::default(),
            tween: TweenConfig::default(),
        }
    }
}

/// A partial configuration; every `Some` field replaces the default.
///
/// ```
/// use hypertree_engine::{ConfigOverride, EngineConfig};
///
/// let config = EngineConfig::default().merged(&ConfigOverride {
///     max_labels: Some(12),
///     ..ConfigOverride::default()
/// });
/// assert_eq!(config.filter.max_labels, 12);
/// assert_eq!(config.filter.culling_radius, 0.99);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverride {
    /// See [`EngineConfig::initial_lambda`].
    pub initial_lambda: Option<f64>,
    /// See [`EngineConfig::transform`].
    pub transform: Option<TransformKind>,
    /// See [`EngineConfig::node_radius`].
    pub node_radius: Option<f64>,
    /// See [`EngineConfig::click_to_center`].
    pub click_to_center: Option<bool>,
    /// See [`EngineConfig::breadcrumb_separator`].
    pub breadcrumb_separator: Option<String>,
    /// See [`LayoutConfig::root_alpha`].
    pub root_alpha: Option<f64>,
    /// See [`LayoutConfig::root_width`].
    pub root_width: Option<f64>,
    /// See [`LayoutConfig::base_offset`].
    pub base_offset: Option<f64>,
    /// See [`LayoutConfig::root_child_offset`].
    pub root_child_offset: Option<f64>,
    /// See [`LayoutConfig::row_offset`].
    pub row_offset: Option<f64>,
    /// See [`LayoutConfig::weight_source`].
    pub weight_source: Option<LayoutWeightSource>,
    /// See [`FilterConfig::culling_radius`].
    pub culling_radius: Option<f64>,
    /// See [`FilterConfig::focus_extension`].
    pub focus_extension: Option<f64>,
    /// See [`FilterConfig::alpha`].
    pub magic_alpha: Option<f64>,
    /// See [`FilterConfig::target_min`].
    pub target_min: Option<usize>,
    /// See [`FilterConfig::target_max`].
    pub target_max: Option<usize>,
    /// See [`FilterConfig::max_labels`].
    pub max_labels: Option<usize>,
    /// See [`GestureConfig::lambda_min`].
    pub lambda_min: Option<f64>,
    /// See [`GestureConfig::lambda_max`].
    pub lambda_max: Option<f64>,
    /// See [`GestureConfig::wheel_factor`].
    pub wheel_factor: Option<f64>,
    /// See [`GestureConfig::max_mouse_r`].
    pub max_mouse_r: Option<f64>,
    /// See [`GestureConfig::hover_debounce_ms`].
    pub hover_debounce_ms: Option<u64>,
    /// See [`TweenConfig::default_duration_ms`].
    pub duration_ms: Option<u64>,
}

impl EngineConfig {
    /// Apply `o` field by field.
    pub fn merged(mut self, o: &ConfigOverride) -> Self {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        set(&mut self.initial_lambda, &o.initial_lambda);
        set(&mut self.transform, &o.transform);
        set(&mut self.node_radius, &o.node_radius);
        set(&mut self.click_to_center, &o.click_to_center);
        set(&mut self.breadcrumb_separator, &o.breadcrumb_separator);

        set(&mut self.layout.root_alpha, &o.root_alpha);
        set(&mut self.layout.root_width, &o.root_width);
        set(&mut self.layout.base_offset, &o.base_offset);
        set(&mut self.layout.root_child_offset, &o.root_child_offset);
        set(&mut self.layout.row_offset, &o.row_offset);
        set(&mut self.layout.weight_source, &o.weight_source);

        set(&mut self.filter.culling_radius, &o.culling_radius);
        set(&mut self.filter.focus_extension, &o.focus_extension);
        set(&mut self.filter.alpha, &o.magic_alpha);
        set(&mut self.filter.target_min, &o.target_min);
        set(&mut self.filter.target_max, &o.target_max);
        set(&mut self.filter.max_labels, &o.max_labels);

        set(&mut self.gesture.lambda_min, &o.lambda_min);
        set(&mut self.gesture.lambda_max, &o.lambda_max);
        set(&mut self.gesture.wheel_factor, &o.wheel_factor);
        set(&mut self.gesture.max_mouse_r, &o.max_mouse_r);
        set(&mut self.gesture.hover_debounce_ms, &o.hover_debounce_ms);

        set(&mut self.tween.default_duration_ms, &o.duration_ms);
        self
    }
}
