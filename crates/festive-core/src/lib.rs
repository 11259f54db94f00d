//! festive-core: the engine behind the festive sales and social analytics
//! dashboard.
//!
//! ```text
//!   FilterPatch ──► FilterStore ──watch──► WindowPanel ×5 ──┐
//!                      ▲                                    │ prepare()
//!              FestivalRegistry          LagPanel ──────────┤
//!                      ▲                                    ▼
//!   reseed() ──► AnalyticsBackend ◄──── tokio::spawn(request)
//!                                               │
//!                           mpsc<Completion> ◄──┘
//!                                  │
//!                   next_completion() / settle()
//!                                  │
//!                    Orchestrator::resolve (key + generation)
//! ```
//!
//! [`Dashboard`] owns all state and is its only writer. Requests run on
//! spawned tasks against an [`AnalyticsBackend`]; their results are applied
//! when the caller drains completions. A response is applied only if its
//! panel still wants that key in the current generation.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod io;
pub mod metrics;
pub mod orchestrator;
pub mod panel;
pub mod registry;
pub mod reseed;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{AnalyticsBackend, LagQuery, RequestKey, WindowQuery, LAG_RANGE};
pub use config::{ConfigWarning, DashboardConfig, WarnLevel, DEFAULT_CONFIG_FILE};
pub use dashboard::{CompletionReport, ControlsView, Dashboard};
pub use error::{DashboardError, ErrorInfo, FailureKind, Result};
pub use filter::{FilterChange, FilterPatch, FilterState, FilterStore};
pub use orchestrator::{PanelDataset, PanelStatus, Resolution};
pub use panel::{Factor, PanelId};
pub use registry::FestivalRegistry;
pub use reseed::ReseedReport;
pub use types::{DateWindow, Festival, Metric, Selection};
