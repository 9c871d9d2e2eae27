// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules within the `src/builders`
// directory. These modules describe what gets toggled and how results are
// checked and reported.

// The `pub mod reporter;` declaration exposes the `reporter` module.
//
// `reporter` module:
// This module turns the outcome of a run into human-readable output. It
// defines the `RuleOutcome` and `RunReport` types and the `StatusReporter`
// trait with its `ConsoleReporter` implementation.
pub mod reporter;

// The `pub mod rules;` declaration exposes the `rules` module.
//
// `rules` module:
// This is the fundamental module of the crate. It defines `ToggleRule` and
// `RuleTarget`, the `RuleMatcher` trait that locates and wraps fragments,
// and the built-in default rule set.
pub mod rules;

// The `pub mod validator;` declaration exposes the `validator` module.
//
// `validator` module:
// This module checks a rule configuration before it is used. It defines the
// `ConfigValidator` trait and a `StandardValidator` implementation that
// flags duplicate rules, malformed anchors and a missing target file.
pub mod validator;
