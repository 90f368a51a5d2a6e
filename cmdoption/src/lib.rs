//! Declarative command-line option binding.
//!
//! Options are declared as metadata bound to fields of a model type. The
//! table is built once into an immutable [`OptionModel`], checked up front
//! for duplicate names, missing handlers and dangling constraints. Each
//! parse then scans the tokens, applies them to a model instance through
//! pluggable [`Handler`]s and checks multiplicity, `requires` and
//! `conflicts_with` rules afterwards.
//!
//! ```
//! use cmdoption::{Opt, OptionTable, Outcome, Parser};
//!
//! #[derive(Default)]
//! struct Greet {
//!     name: String,
//!     verbose: bool,
//!     help: bool,
//! }
//!
//! let parser = Parser::builder("greet")
//!     .options(
//!         OptionTable::new()
//!             .option(Opt::text(&["--name", "-n"], "NAME", |g: &mut Greet| &mut g.name).required())
//!             .option(Opt::flag(&["--verbose", "-v"], |g: &mut Greet| &mut g.verbose))
//!             .option(Opt::flag(&["--help", "-h"], |g: &mut Greet| &mut g.help).help()),
//!     )
//!     .build()?;
//!
//! let mut greet = Greet::default();
//! let outcome = parser.parse(&mut greet, &["--name", "ann", "-v"])?;
//! assert!(matches!(outcome, Outcome::Parsed(_)));
//! assert_eq!(greet.name, "ann");
//! assert!(greet.verbose);
//! # Ok::<(), cmdoption::Error>(())
//! ```
//!
//! Commands delegate the rest of the tokens to a nested table over their
//! own type; see [`Cmd::new`].

mod binding;
mod command;
mod config;
mod dispatch;
pub mod error;
mod handler;
pub mod help;
mod model;
mod parser;
mod table;
mod validate;

pub use binding::{Binding, Slot, Target, TargetFn, TargetKind};
pub use config::ParserConfig;
pub use dispatch::{HelpRequest, Ledger, Occurrence, Outcome};
pub use error::{
    BuildError, Error, HandlerError, ParseError, Result, ScanError, Violation, Violations,
};
pub use handler::{
    AccumulateHandler, BooleanHandler, CallbackHandler, FlagHandler, Handler, HandlerRegistry,
    MapHandler, ValueHandler,
};
pub use help::{HelpPage, HelpRecord};
pub use model::{Command, Descriptor, OptionModel};
pub use parser::{Parser, ParserBuilder};
pub use table::{Cmd, Opt, OptionTable};
