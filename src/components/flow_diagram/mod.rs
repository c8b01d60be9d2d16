//! Temporal flow diagram: entities per time slice joined by weighted
//! transitions, laid out in columns and drawn to a canvas.

mod active;
mod component;
pub mod config;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod layout;
pub mod path;
#[cfg(feature = "raster")]
pub mod raster;
mod render;
pub mod state;
pub mod svg;
mod types;

pub use active::{ActiveColumns, active_entities, resolve as resolve_active};
pub use component::FlowDiagramCanvas;
pub use config::FlowConfig;
pub use error::{LayoutError, NoDataReason};
pub use layout::{FlowLayout, FlowOutcome, compute_layout};
pub use types::{EntityId, EntityLabels, FlowLink, NodeKey, SliceIndex, Transition, TransitionGraph};
