//! Data layer: loading, reshaping, analysis and export of the RAIS tables.
//!
//! Architecture:
//! ```text
//!  data/*.xlsx
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  first sheet → strip rows → transpose → TimeTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ registry  │  DatasetKey → file + labels → LabeledTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────┐   ┌──────────┐
//!   │  filter   │   │ analysis  │   │  export   │  read-only consumers
//!   └──────────┘   └──────────┘   └──────────┘
//! ```

pub mod analysis;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod registry;
pub mod sample;

pub use error::{DataError, Result};
pub use model::{DatasetKey, LabeledTable, TimeTable};
pub use registry::Registry;
