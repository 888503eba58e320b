//! Source scanner host for the wirecode expansion pipeline.
//!
//! This crate scans your source files for `#[codable]`, `#[decodable]`,
//! `#[encodable]`, `#[one_of]` and `#[all_of]` items, runs the same planner
//! the attribute macros use, and reports the expansions and diagnostics.
//! Hand-written `impl Decode`/`impl Encode` blocks in the same file count as
//! existing conformances. It backs the `wirecode` CLI.
//!
//! # Example
//!
//! In your `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     wirecode_build::expand()
//!         .scan_path("src/")
//!         .output_file("target/wirecode-expansion.rs")
//!         .deny_warnings(true)
//!         .run()
//!         .expect("wirecode expansion failed");
//!
//!     println!("cargo:rerun-if-changed=src/");
//! }
//! ```

mod config;
mod expander;
mod scanner;

pub use config::{CONFIG_FILE, ExpandSettings, WirecodeConfig};
pub use expander::{ExpandedItem, ExpansionReport, Finding, SourceExpander};
pub use scanner::{AnnotatedItem, Scanner};

/// Create a new source expander with default settings.
pub fn expand() -> SourceExpander {
    SourceExpander::new()
}
