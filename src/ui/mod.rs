//! Presentation layer.
//!
//! - `selector`: country dropdown, baseline display, three sliders, Run/Reset
//! - `results`: prediction, confidence interval, contributions, metrics, exports
//! - `page`: wires the two together around a `SimulationRunner`
//! - `pages`: top-level route table
//!
//! Components render into plain view structs (and `Display` text) so they
//! can be golden-tested and embedded into server-rendered pages.

pub mod format;
pub mod page;
pub mod pages;
pub mod results;
pub mod selector;

pub use page::SimulationPage;
pub use pages::Page;
pub use results::{present, ResultsView};
pub use selector::{CountrySelector, SelectorView};
