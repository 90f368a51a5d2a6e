//! Command delegation.
//!
//! A command owns a nested model over its own type. The outer model only
//! sees it through [`Delegate`], so option models of different types can
//! be nested to any depth.

use tracing::debug;

use crate::dispatch::{self, Outcome, Scope};
use crate::error::{BuildError, ParseError};
use crate::handler::HandlerRegistry;
use crate::help::{self, HelpPage};
use crate::model::OptionModel;
use crate::table::OptionTable;

/// An unbuilt command, turned into a [`Delegate`] when the outer table is
/// built.
pub(crate) trait CommandTemplate<T> {
    fn build(self: Box<Self>, registry: &HandlerRegistry) -> Result<Box<dyn Delegate<T>>, BuildError>;
}

pub(crate) struct NestedTemplate<T, C> {
    pub(crate) table: OptionTable<C>,
    pub(crate) factory: fn() -> C,
    pub(crate) attach: fn(&mut T, C),
}

impl<T: 'static, C: 'static> CommandTemplate<T> for NestedTemplate<T, C> {
    fn build(self: Box<Self>, registry: &HandlerRegistry) -> Result<Box<dyn Delegate<T>>, BuildError> {
        let model = OptionModel::build(self.table, registry)?;
        Ok(Box::new(Nested {
            model,
            factory: self.factory,
            attach: self.attach,
        }))
    }
}

pub(crate) trait Delegate<T>: Send + Sync {
    /// Parse `tail` with the nested model. With an outer target, a fresh
    /// nested instance is populated and attached once the nested parse
    /// succeeds; without one, nothing is created.
    fn delegate(
        &self,
        outer: Option<&mut T>,
        tail: &[String],
        scope: &Scope<'_>,
    ) -> Result<Outcome, ParseError>;

    fn help_page(&self, program: &str, about: Option<&str>) -> HelpPage;
}

struct Nested<T, C> {
    model: OptionModel<C>,
    factory: fn() -> C,
    attach: fn(&mut T, C),
}

impl<T, C> Delegate<T> for Nested<T, C> {
    fn delegate(
        &self,
        outer: Option<&mut T>,
        tail: &[String],
        scope: &Scope<'_>,
    ) -> Result<Outcome, ParseError> {
        let Some(outer) = outer else {
            return dispatch::run(&self.model, None, tail, scope);
        };

        let mut inner = (self.factory)();
        let outcome = dispatch::run(&self.model, Some(&mut inner), tail, scope)?;
        if let Outcome::Parsed(_) = outcome {
            (self.attach)(outer, inner);
            debug!(program = %scope.program, "attached command instance");
        }
        Ok(outcome)
    }

    fn help_page(&self, program: &str, about: Option<&str>) -> HelpPage {
        help::page(&self.model, program, about, None)
    }
}
