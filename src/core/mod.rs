// This file is the module declaration file for the `core` module.
// It declares the submodules contained within `src/core/` and exposes them
// to the rest of the crate.
//
// `config` module:
// Loads and saves the `pom-toggle.toml` rule file (`ToggleConfig`), falling
// back to the built-in rules when no file exists, and handles `init`,
// `list`, `validate` and `export`.
pub mod config;

// `document` module:
// The in-memory text of the POM and the comment-span scan used to tell
// whether a fragment is already disabled.
pub mod document;

// `engine` module:
// The `BlockToggler`: load, apply rules in order, save. Also the reverse
// `restore` pass.
pub mod engine;

// `error` module:
// The typed `ToggleError` returned by the engine.
pub mod error;
