//! Comments out unavailable dependencies in a Maven POM so a build can go
//! ahead without them, and puts them back later.
//!
//! The rewrite is textual: each rule finds a `<dependency>` block (or a whole
//! section such as `<dependencyManagement>`) with a regex and surrounds it
//! with `<!--` / `-->`, leaving every other byte of the file as it was.
pub mod builders;
pub mod core;
pub mod utils;
