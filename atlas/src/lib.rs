//! Atlas provides the interactive tools of a web map viewer, independent of any rendering: feature information of
//! map clicks, highlighting of the selected feature, drawing with KML import and export, and printing.
//!
//! # Quick start
//!
//! Finding out what is under the clicked point of a map with a local vector layer and a remote WMS layer:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use atlas::layer::{LayerInfo, VectorLayer, WmsFeatureInfoProvider, WmsLayer};
//! use atlas::info_click::InfoClick;
//! use atlas::{Map, MapView};
//! use atlas_types::cartesian::Point2d;
//! use atlas_types::geo::Crs;
//!
//! # tokio_test::block_on(async {
//! let parcels = WmsLayer::new("parcels", "https://maps.example.com/wms", vec!["parcels".into()])
//!     .with_info(LayerInfo::new("Parcels").with_information("{owner.name} ({id})"))
//!     .with_feature_info_provider(Arc::new(WmsFeatureInfoProvider::new(
//!         "https://maps.example.com/wms",
//!         vec!["parcels".into()],
//!     )));
//!
//! let mut map = Map::new(
//!     MapView::new(Point2d::new(1_333_000.0, 7_910_000.0), 2.0, Crs::EPSG3857),
//!     vec![atlas::layer::LayerRef::new(parcels)],
//! );
//!
//! let info_click = InfoClick::new();
//! let _subscription = info_click.subscribe(|event: &atlas::info_click::InfoClickEvent| println!("{event:?}"));
//! info_click.handle_click(&mut map, Point2d::new(200.0, 150.0)).await;
//!
//! for result in info_click.display_order() {
//!     println!("{}: {:?}", result.information.caption, result.information.information);
//! }
//! # });
//! ```
//!
//! # Main components
//!
//! * [`Map`] holds the current [`MapView`] and the [`layers`](layer) in their drawing order. Layers are shared
//!   trait objects, so the tools can keep references to them and add their own overlay layers to the map.
//! * [`info_click::InfoClick`] collects features under a clicked pixel from local layers and remote services
//!   concurrently, keeps the results of the latest click and highlights the selected one with the
//!   [`info_click::HighlightManager`].
//! * [`draw::DrawTool`] keeps the shapes drawn by the user with their styles and converts them to and from KML
//!   documents with the [`draw::kml`] codec.
//! * [`export::PrintTool`] previews the printed area and builds the print job for the print service.
//!
//! Tool settings are loaded with [`config::ToolsConfig`]. Network access goes through the platform specific
//! [`PlatformService`](platform::PlatformService).

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod color;
pub mod config;
pub mod draw;
pub mod error;
pub mod export;
mod feature;
pub mod info_click;
pub mod layer;
mod map;
pub mod platform;
mod view;

pub use color::Color;
pub use error::AtlasError;
pub use feature::Feature;
pub use map::{LayerCollection, Map};
pub use view::{MapView, Size};

// Reexport atlas_types
pub use atlas_types;
