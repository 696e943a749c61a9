use serde_json::{Map, Value};

use crate::feature::Feature;
use crate::layer::LayerRef;

/// Layer index of results whose layer is not in the map anymore.
pub const UNKNOWN_LAYER_INDEX: usize = 999;

/// Information text shown for a result.
#[derive(Debug, Clone, PartialEq)]
pub enum Information {
    /// Text produced from the layer's information template.
    Text(String),
    /// Raw attributes of the feature, used when the layer has no template.
    Attributes(Map<String, Value>),
}

/// Presentation data of a result.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfo {
    /// Caption of the layer the feature belongs to.
    pub caption: String,
    /// Position of the layer in draw order, [`UNKNOWN_LAYER_INDEX`] if it could not be determined.
    pub layer_index: usize,
    /// Information text or attributes.
    pub information: Information,
    /// Icon of the feature (`iconUrl` attribute), empty if not set.
    pub icon_url: String,
}

/// Where a result comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceGroup {
    /// Feature found on the client in a rendered vector layer.
    Local,
    /// Feature returned by a remote feature info request.
    Remote,
}

/// Position of a result in the order the probes were dispatched: local hits first, in the order the map reports
/// them (topmost layer first), then remote layers from the topmost one down.
///
/// Used to break ties when results are ordered for display, so the final order never depends on which network
/// request completed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceOrder {
    /// Group of the source.
    pub group: SourceGroup,
    /// Position within the group.
    pub rank: usize,
}

/// A single feature found by a click.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoResult {
    /// The feature.
    pub feature: Feature,
    /// The layer that produced the feature.
    pub layer: LayerRef,
    /// Presentation data.
    pub information: FeatureInfo,
    /// Dispatch position of the probe that found the feature.
    pub source_order: SourceOrder,
}

/// Results of the last click with at most one selected entry.
#[derive(Debug, Default, Clone)]
pub struct ResultCollection {
    results: Vec<FeatureInfoResult>,
    selected: Option<usize>,
}

impl ResultCollection {
    /// Removes all results and the selection.
    pub fn reset(&mut self) {
        self.results.clear();
        self.selected = None;
    }

    /// Adds a result. The first result added to an empty collection becomes selected.
    pub fn push(&mut self, result: FeatureInfoResult) {
        self.results.push(result);
        if self.results.len() == 1 {
            self.selected = Some(0);
        }
    }

    /// Replaces the contents of the collection, selecting the first of the new results if there are any.
    pub fn replace(&mut self, results: impl IntoIterator<Item = FeatureInfoResult>) {
        self.reset();
        for result in results {
            self.push(result);
        }
    }

    /// Selects the result at `index`. Returns `false` if there is no such result.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.results.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Index of the selected result.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Selected result.
    pub fn selected(&self) -> Option<&FeatureInfoResult> {
        self.results.get(self.selected?)
    }

    /// All results in insertion order.
    pub fn results(&self) -> &[FeatureInfoResult] {
        &self.results
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if there are no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results in display order: by layer index, topmost layer first. Results of the same layer keep their source
    /// order.
    pub fn display_order(&self) -> Vec<&FeatureInfoResult> {
        let mut ordered: Vec<_> = self.results.iter().collect();
        ordered.sort_by(|a, b| {
            b.information
                .layer_index
                .cmp(&a.information.layer_index)
                .then(a.source_order.cmp(&b.source_order))
        });
        ordered
    }
}
