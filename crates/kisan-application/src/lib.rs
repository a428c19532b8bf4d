//! Application layer: the query controller, history cache, rendering and the
//! reveal effect.

pub mod controller;
pub mod events;
pub mod history_cache;
pub mod render;
pub mod reveal;

pub use controller::{
    AppState, CompletedQuery, ControllerSettings, Exchange, LocationRequest, PendingQuery,
    QueryController, SubmitOutcome,
};
pub use events::{AppEvent, EventSink};
pub use history_cache::HistoryCache;
pub use reveal::{RevealEffect, RevealOutcome};
