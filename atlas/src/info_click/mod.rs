//! Feature information of a map click.
//!
//! A click is handled in two phases:
//! 1. [`InfoClick::query`] synchronously collects the features of local vector layers under the clicked pixel and
//!    starts a feature info request for every visible queryable remote layer. It returns a [`ClickQuery`] owning all
//!    of these probes.
//! 2. [`ClickQuery::run`] waits for all probes to settle, stores the results and selects the first one.
//!
//! A failing remote layer contributes nothing to the results and never fails the whole click. If a newer click is
//! started before an older one finishes, the results of the older one are dropped when it completes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use atlas_types::cartesian::CartesianPoint2d;
use futures::future::{self, join_all};
use parking_lot::Mutex;

use crate::config::InfoClickConfig;
use crate::feature::Feature;
use crate::layer::{FeatureInfoRequest, LayerInfo, LayerKind, LayerRef};
use crate::map::{LayerCollection, Map};

mod events;
pub mod highlight;
mod results;
mod template;

pub use events::{EventListener, InfoClickEvent, Subscription};
pub use highlight::{HighlightLayer, HighlightManager, MarkerIcon};
pub use results::{
    FeatureInfo, FeatureInfoResult, Information, ResultCollection, SourceGroup, SourceOrder,
    UNKNOWN_LAYER_INDEX,
};
pub use template::expand_template;

use events::Listeners;

#[cfg(not(target_arch = "wasm32"))]
type Probe = future::BoxFuture<'static, Option<FeatureInfoResult>>;
#[cfg(target_arch = "wasm32")]
type Probe = future::LocalBoxFuture<'static, Option<FeatureInfoResult>>;

/// Result of running a [`ClickQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Results of the click were stored.
    Completed {
        /// Number of stored results.
        count: usize,
    },
    /// A newer click was started before this one completed. Its results were dropped.
    Superseded,
}

struct Shared {
    generation: AtomicU64,
    results: Mutex<ResultCollection>,
    listeners: Listeners,
}

/// Feature info tool: finds the features under a clicked pixel and keeps the selected one highlighted.
pub struct InfoClick {
    shared: Arc<Shared>,
    highlight: HighlightManager,
    hit_tolerance: f64,
    default_caption: String,
}

impl Default for InfoClick {
    fn default() -> Self {
        Self::from_config(&InfoClickConfig::default())
    }
}

impl InfoClick {
    /// Creates a new tool with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new tool with the given settings.
    pub fn from_config(config: &InfoClickConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                results: Mutex::new(ResultCollection::default()),
                listeners: Listeners::default(),
            }),
            highlight: HighlightManager::new(MarkerIcon::new(&config.marker_img)),
            hit_tolerance: config.hit_tolerance,
            default_caption: config.default_caption.clone(),
        }
    }

    /// Sets the marker image used to decorate selected points.
    pub fn with_marker(mut self, marker: MarkerIcon) -> Self {
        self.highlight = HighlightManager::new(marker);
        self
    }

    /// Sets the hit radius of a click, in pixels.
    pub fn with_hit_tolerance(mut self, tolerance: f64) -> Self {
        self.hit_tolerance = tolerance;
        self
    }

    /// Sets the caption of results from layers without a configured caption.
    pub fn with_default_caption(mut self, caption: impl Into<String>) -> Self {
        self.default_caption = caption.into();
        self
    }

    /// Highlight manager of the tool.
    pub fn highlight(&self) -> &HighlightManager {
        &self.highlight
    }

    /// Registers a listener of the tool's events.
    pub fn subscribe(&self, listener: impl EventListener + 'static) -> Subscription {
        self.shared.listeners.subscribe(listener)
    }

    /// Starts a query of the features at the given pixel of the map.
    ///
    /// Previous results and highlight are removed immediately. Local hits are collected before the method returns,
    /// remote layers are requested when the returned query is run.
    pub fn query(&self, map: &Map, pixel: impl CartesianPoint2d<Num = f64>) -> ClickQuery {
        let view = map.view();
        let request = FeatureInfoRequest {
            coordinate: view.screen_to_map(&pixel),
            resolution: view.resolution(),
            crs: view.crs().clone(),
        };

        let local_hits: Vec<_> = map
            .features_at_pixel(&pixel, self.hit_tolerance)
            .into_iter()
            .filter(|(_, layer)| layer.kind() != LayerKind::Overlay && layer.is_queryable())
            .collect();

        let generation = {
            let mut results = self.shared.results.lock();
            results.reset();
            self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        self.highlight.clear();
        self.shared.listeners.emit(InfoClickEvent::BusyChanged(true));

        let layers = map.layers();
        let mut probes: Vec<Probe> = vec![];

        for (rank, (feature, layer)) in local_hits.into_iter().enumerate() {
            let information =
                describe(&feature, layer_index(layers, &layer), layer.info(), &self.default_caption);
            let result = FeatureInfoResult {
                feature,
                layer,
                information,
                source_order: SourceOrder {
                    group: SourceGroup::Local,
                    rank,
                },
            };
            probes.push(Box::pin(future::ready(Some(result))));
        }

        let remote_layers = layers.iter_visible().rev().filter(|layer| {
            layer.kind() == LayerKind::RemoteRaster && layer.is_queryable()
        });
        for (rank, layer) in remote_layers.enumerate() {
            let Some(provider) = layer.feature_info_provider() else {
                continue;
            };

            let layer = layer.clone();
            let request = request.clone();
            let index = layer_index(layers, &layer);
            let default_caption = self.default_caption.clone();

            probes.push(Box::pin(async move {
                let features = match provider.feature_info(&request).await {
                    Ok(features) => features,
                    Err(err) => {
                        log::debug!("Feature info request to layer {} failed: {err}", layer.name());
                        return None;
                    }
                };

                let feature = features.into_iter().next()?;
                let information = describe(&feature, index, layer.info(), &default_caption);
                Some(FeatureInfoResult {
                    feature,
                    layer,
                    information,
                    source_order: SourceOrder {
                        group: SourceGroup::Remote,
                        rank,
                    },
                })
            }));
        }

        ClickQuery {
            generation,
            probes,
            shared: self.shared.clone(),
        }
    }

    /// Queries the features at the pixel and highlights the first of them.
    pub async fn handle_click(
        &self,
        map: &mut Map,
        pixel: impl CartesianPoint2d<Num = f64>,
    ) -> ClickOutcome {
        let outcome = self.query(map, pixel).run().await;
        if let ClickOutcome::Completed { .. } = outcome {
            self.highlight_selected(map.layers_mut());
        }

        outcome
    }

    /// Updates the highlight to show the currently selected result.
    pub fn highlight_selected(&self, layers: &mut LayerCollection) {
        let selected = self.selected();
        self.highlight.select(selected.as_ref(), layers);
    }

    /// Selects the result at `index` and highlights it. Returns `false` if there is no such result.
    pub fn select(&self, index: usize, layers: &mut LayerCollection) -> bool {
        if !self.shared.results.lock().select(index) {
            return false;
        }

        self.highlight_selected(layers);
        self.shared
            .listeners
            .emit(InfoClickEvent::SelectionChanged(Some(index)));
        true
    }

    /// Removes all results and the highlight.
    pub fn reset(&self) {
        self.shared.results.lock().reset();
        self.highlight.clear();
        self.shared
            .listeners
            .emit(InfoClickEvent::SelectionChanged(None));
    }

    /// Results of the last completed click in the order they were collected.
    pub fn results(&self) -> Vec<FeatureInfoResult> {
        self.shared.results.lock().results().to_vec()
    }

    /// Results of the last completed click in display order, see [`ResultCollection::display_order`].
    pub fn display_order(&self) -> Vec<FeatureInfoResult> {
        self.shared
            .results
            .lock()
            .display_order()
            .into_iter()
            .cloned()
            .collect()
    }

    /// The selected result.
    pub fn selected(&self) -> Option<FeatureInfoResult> {
        self.shared.results.lock().selected().cloned()
    }
}

/// Probes of a single click, created by [`InfoClick::query`].
#[must_use = "the click results are stored only when the query is run"]
pub struct ClickQuery {
    generation: u64,
    probes: Vec<Probe>,
    shared: Arc<Shared>,
}

impl ClickQuery {
    /// Number of probes (local hits and remote requests) of the click.
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Waits for every probe to settle and stores the results, unless a newer click was started in the meantime.
    ///
    /// The highlight is not touched: call [`InfoClick::highlight_selected`] after a completed run to show the new
    /// selection, or use [`InfoClick::handle_click`] which does both.
    pub async fn run(self) -> ClickOutcome {
        let results: Vec<_> = join_all(self.probes).await.into_iter().flatten().collect();

        let (count, selected) = {
            let mut collection = self.shared.results.lock();
            if self.shared.generation.load(Ordering::SeqCst) != self.generation {
                log::debug!(
                    "Dropping {} feature info results of a superseded click",
                    results.len()
                );
                return ClickOutcome::Superseded;
            }

            collection.replace(results);
            (collection.len(), collection.selected_index())
        };

        let listeners = &self.shared.listeners;
        listeners.emit(InfoClickEvent::LoadFinished { count });
        listeners.emit(InfoClickEvent::SelectionChanged(selected));
        listeners.emit(InfoClickEvent::BusyChanged(false));

        ClickOutcome::Completed { count }
    }
}

fn layer_index(layers: &LayerCollection, layer: &LayerRef) -> usize {
    layers.position(layer).unwrap_or(UNKNOWN_LAYER_INDEX)
}

fn describe(
    feature: &Feature,
    layer_index: usize,
    info: Option<LayerInfo>,
    default_caption: &str,
) -> FeatureInfo {
    let info = info.unwrap_or_default();
    let attributes = feature.attributes();

    let information = match info.information {
        Some(template) => {
            let text = expand_template(&template, attributes);
            if text.is_empty() {
                Information::Attributes(attributes.clone())
            } else {
                Information::Text(text)
            }
        }
        None => Information::Attributes(attributes.clone()),
    };

    FeatureInfo {
        caption: info.caption.unwrap_or_else(|| default_caption.to_string()),
        layer_index,
        information,
        icon_url: feature.str_attribute("iconUrl").unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use atlas_types::cartesian::Point2d;
    use atlas_types::geo::Crs;
    use atlas_types::{ClosedContour, Polygon};
    use futures::channel::oneshot;
    use serde_json::json;

    use super::*;
    use crate::error::AtlasError;
    use crate::layer::{FeatureInfoProvider, VectorLayer, WmsLayer};
    use crate::view::{MapView, Size};

    enum Response {
        Features(Vec<Feature>),
        Error,
        Wait(Mutex<Option<oneshot::Receiver<Vec<Feature>>>>),
    }

    struct TestProvider(Response);

    #[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
    #[cfg_attr(not(target_arch = "wasm32"), async_trait)]
    impl FeatureInfoProvider for TestProvider {
        async fn feature_info(
            &self,
            _request: &FeatureInfoRequest,
        ) -> Result<Vec<Feature>, AtlasError> {
            match &self.0 {
                Response::Features(features) => Ok(features.clone()),
                Response::Error => Err(AtlasError::Http(500)),
                Response::Wait(receiver) => {
                    let receiver = receiver.lock().take().ok_or(AtlasError::NotFound)?;
                    receiver.await.map_err(|_| AtlasError::NotFound)
                }
            }
        }
    }

    fn wms(name: &str, response: Response) -> WmsLayer {
        WmsLayer::new(name, "http://localhost/wms", vec![name.to_string()])
            .with_feature_info_provider(Arc::new(TestProvider(response)))
    }

    fn map() -> Map {
        let view = MapView::new(Point2d::new(0.0, 0.0), 1.0, Crs::EPSG3857)
            .with_size(Size::new(100.0, 100.0));
        Map::new(view, LayerCollection::default())
    }

    fn parcel() -> Feature {
        Feature::with_attributes(
            Polygon::from(ClosedContour::new(vec![
                Point2d::new(-10.0, -10.0),
                Point2d::new(10.0, -10.0),
                Point2d::new(10.0, 10.0),
                Point2d::new(-10.0, 10.0),
            ])),
            json!({"owner": {"name": "Lot 7"}, "id": 42})
                .as_object()
                .cloned()
                .unwrap(),
        )
    }

    fn remote_feature(name: &str) -> Feature {
        Feature::without_geometry(Default::default()).with_attribute("name", name)
    }

    fn center() -> Point2d {
        Point2d::new(50.0, 50.0)
    }

    #[test]
    fn result_count_law() {
        let mut map = map();
        map.layers_mut().push(
            VectorLayer::new("parcels", vec![parcel(), parcel()])
                .with_info(LayerInfo::new("Parcels").with_information("{owner.name} ({id})")),
        );
        map.layers_mut().push(wms(
            "roads",
            Response::Features(vec![remote_feature("a"), remote_feature("b")]),
        ));
        map.layers_mut().push(wms("empty", Response::Features(vec![])));
        map.layers_mut().push(wms("broken", Response::Error));
        map.layers_mut()
            .push(wms("hidden", Response::Features(vec![remote_feature("c")])).with_visible(false));

        let info_click = InfoClick::new();
        let query = info_click.query(&map, center());
        assert_eq!(query.probe_count(), 5);

        let outcome = tokio_test::block_on(query.run());
        assert_eq!(outcome, ClickOutcome::Completed { count: 3 });

        let results = info_click.results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].information.caption, "Parcels");
        assert_eq!(
            results[0].information.information,
            Information::Text("Lot 7 (42)".into())
        );
        assert_eq!(results[2].layer.name(), "roads");
        assert_eq!(results[2].information.caption, "Search result");
        assert_eq!(results[2].information.layer_index, 1);
        assert_matches!(
            &results[2].information.information,
            Information::Attributes(attributes) if attributes["name"] == "a"
        );
    }

    #[test]
    fn first_result_is_selected_and_highlighted() {
        let mut map = map();
        let parcels = map
            .layers_mut()
            .push(VectorLayer::new("parcels", vec![parcel()]));
        map.layers_mut().push(VectorLayer::new("labels", vec![]));

        let info_click = InfoClick::new();
        let outcome = tokio_test::block_on(info_click.handle_click(&mut map, center()));
        assert_eq!(outcome, ClickOutcome::Completed { count: 1 });

        let selected = info_click.selected().unwrap();
        assert_eq!(selected.layer, parcels);
        assert_eq!(info_click.highlight().overlay().feature(), Some(parcel()));

        let names: Vec<_> = map.layers().iter().map(|l| l.name().to_string()).collect();
        assert_eq!(names, vec!["parcels", highlight::HIGHLIGHT_LAYER_NAME, "labels"]);
    }

    #[test]
    fn run_leaves_highlight_to_caller() {
        let mut map = map();
        map.layers_mut()
            .push(VectorLayer::new("parcels", vec![parcel()]));

        let info_click = InfoClick::new();
        let outcome = tokio_test::block_on(info_click.query(&map, center()).run());
        assert_eq!(outcome, ClickOutcome::Completed { count: 1 });
        assert!(info_click.selected().is_some());
        assert!(info_click.highlight().is_empty());
        assert_eq!(map.layers().len(), 1);

        info_click.highlight_selected(map.layers_mut());
        assert_eq!(info_click.highlight().overlay().feature(), Some(parcel()));
        assert_eq!(map.layers().len(), 2);
    }

    #[test]
    fn overlays_are_not_queried() {
        let mut map = map();
        let parcels = map
            .layers_mut()
            .push(VectorLayer::new("parcels", vec![parcel()]));

        let info_click = InfoClick::new();
        tokio_test::block_on(info_click.handle_click(&mut map, center()));
        assert!(map.layers().position(&info_click.highlight().overlay_ref()).is_some());

        // The highlight overlay now holds the same polygon above the parcels layer.
        let outcome = tokio_test::block_on(info_click.handle_click(&mut map, center()));
        assert_eq!(outcome, ClickOutcome::Completed { count: 1 });
        assert_eq!(info_click.results()[0].layer, parcels);
    }

    #[test]
    fn empty_click() {
        let mut map = map();
        map.layers_mut().push(VectorLayer::new("parcels", vec![]));
        map.layers_mut()
            .push(wms("roads", Response::Features(vec![])).with_queryable(false));

        let info_click = InfoClick::new();
        let events = Arc::new(Mutex::new(vec![]));
        let events_clone = events.clone();
        let _subscription = info_click.subscribe(move |event: &InfoClickEvent| {
            events_clone.lock().push(*event);
        });

        let outcome = tokio_test::block_on(info_click.handle_click(&mut map, center()));
        assert_eq!(outcome, ClickOutcome::Completed { count: 0 });
        assert!(info_click.results().is_empty());
        assert!(info_click.selected().is_none());
        assert!(info_click.highlight().is_empty());
        assert_eq!(
            *events.lock(),
            vec![
                InfoClickEvent::BusyChanged(true),
                InfoClickEvent::LoadFinished { count: 0 },
                InfoClickEvent::SelectionChanged(None),
                InfoClickEvent::BusyChanged(false),
            ]
        );
    }

    #[test]
    fn stale_click_is_discarded() {
        let (sender, receiver) = oneshot::channel();
        let mut map = map();
        map.layers_mut().push(wms(
            "slow",
            Response::Wait(Mutex::new(Some(receiver))),
        ));

        let info_click = InfoClick::new();
        let older = info_click.query(&map, center());

        map.layers_mut().clear();
        map.layers_mut().push(wms(
            "fast",
            Response::Features(vec![remote_feature("new")]),
        ));
        let newer = info_click.query(&map, center());

        assert_eq!(
            tokio_test::block_on(newer.run()),
            ClickOutcome::Completed { count: 1 }
        );

        sender.send(vec![remote_feature("old")]).unwrap();
        assert_eq!(tokio_test::block_on(older.run()), ClickOutcome::Superseded);

        let results = info_click.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].layer.name(), "fast");
        assert_eq!(info_click.selected().unwrap().layer.name(), "fast");
    }

    #[test]
    fn display_order_uses_layer_index() {
        let mut map = map();
        map.layers_mut()
            .push(VectorLayer::new("parcels", vec![parcel()]));
        map.layers_mut()
            .push(wms("bottom", Response::Features(vec![remote_feature("b")])));
        map.layers_mut()
            .push(wms("top", Response::Features(vec![remote_feature("t")])));

        let info_click = InfoClick::new();
        tokio_test::block_on(info_click.query(&map, center()).run());

        let inserted: Vec<_> = info_click
            .results()
            .into_iter()
            .map(|r| r.layer.name().to_string())
            .collect();
        assert_eq!(inserted, vec!["parcels", "top", "bottom"]);

        let displayed: Vec<_> = info_click
            .display_order()
            .into_iter()
            .map(|r| r.layer.name().to_string())
            .collect();
        assert_eq!(displayed, vec!["top", "bottom", "parcels"]);
    }

    #[test]
    fn explicit_selection() {
        let mut map = map();
        map.layers_mut()
            .push(VectorLayer::new("parcels", vec![parcel()]));
        map.layers_mut()
            .push(wms("roads", Response::Features(vec![remote_feature("r")])));

        let info_click = InfoClick::new();
        tokio_test::block_on(info_click.handle_click(&mut map, center()));

        assert!(info_click.select(1, map.layers_mut()));
        assert_eq!(info_click.selected().unwrap().layer.name(), "roads");
        assert!(!info_click.select(5, map.layers_mut()));

        info_click.reset();
        assert!(info_click.selected().is_none());
        assert!(info_click.highlight().is_empty());
    }

    #[test]
    fn icon_url_and_empty_template() {
        let feature = parcel().with_attribute("iconUrl", "icons/parcel.png");
        let info = describe(
            &feature,
            3,
            Some(LayerInfo::new("Parcels").with_information("{missing}")),
            "Search result",
        );

        assert_eq!(info.icon_url, "icons/parcel.png");
        assert_eq!(info.layer_index, 3);
        assert_eq!(
            info.information,
            Information::Attributes(feature.attributes().clone())
        );
    }
}
