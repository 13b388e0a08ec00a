//! Live dashboard for a metrics server.
//!
//! Polls three JSON endpoints on a metrics server (job summary, aggregate
//! rates, per-node rates) and keeps one chart per metric id up to date.
//!
//! ## Architecture
//!
//! 1. **Pollers** (`poller` module) - one fixed-delay loop per endpoint,
//!    restarted whenever the server address changes.
//!
//! 2. **Dashboard** (`dashboard` module) - owns the page and the id-keyed
//!    chart caches (`cache` module); turns each decoded response into panel
//!    updates.
//!
//! 3. **Rendering** (`render` module) - the `Surface`/`Renderer` seams. The
//!    in-process `PageView` (`page` module) records the latest frame per
//!    panel and is served over HTTP by the `server` module.
//!
//! ## Usage
//!
//! ```bash
//! metrics-dashboard --server http://localhost:8090 --port 8060
//! ```

pub mod cache;
pub mod chart;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod page;
pub mod poller;
pub mod render;
pub mod server;
pub mod table;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, SharedDashboard};
pub use page::PageView;
