//! Heuristic README analysis: illustrative images, keyword-adjacent links and
//! the most descriptive section of a project's README.
//!
//! ```
//! use readme_lens::{analyze, RepoCoordinate};
//!
//! let result = analyze("![logo](./img/logo.png)", &RepoCoordinate::new("foo/bar"));
//! assert_eq!(
//!     result.main_image.as_deref(),
//!     Some("https://raw.githubusercontent.com/foo/bar/master/img/logo.png")
//! );
//! ```

pub mod db;
pub mod ingest;
pub mod parser;
pub mod repo;
pub mod scan;

pub use ingest::Document;
pub use parser::{analyze, AnalysisResult, BestSection, LinkMatch};
pub use repo::RepoCoordinate;
