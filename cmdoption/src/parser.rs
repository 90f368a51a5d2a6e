//! The entry point tying a built model to its configuration.

use crate::config::ParserConfig;
use crate::dispatch::Outcome;
use crate::error::{BuildError, ParseError};
use crate::handler::{Handler, HandlerRegistry};
use crate::help::HelpPage;
use crate::model::OptionModel;
use crate::table::OptionTable;

pub struct ParserBuilder<T> {
    config: ParserConfig,
    registry: HandlerRegistry,
    options: OptionTable<T>,
}

impl<T> ParserBuilder<T> {
    pub fn new(program_name: &str) -> Self {
        ParserBuilder {
            config: ParserConfig::new(program_name),
            registry: HandlerRegistry::default(),
            options: OptionTable::new(),
        }
    }

    pub fn about(mut self, text: &str) -> Self {
        self.config.about = Some(text.to_string());
        self
    }

    pub fn epilogue(mut self, text: &str) -> Self {
        self.config.epilogue = Some(text.to_string());
        self
    }

    pub fn option_prefix(mut self, prefix: &str) -> Self {
        self.config.option_prefix = prefix.to_string();
        self
    }

    /// `None` turns the end-of-options separator off.
    pub fn separator(mut self, separator: Option<&str>) -> Self {
        self.config.separator = separator.map(str::to_string);
        self
    }

    pub fn abbreviations(mut self, on: bool) -> Self {
        self.config.abbreviations = on;
        self
    }

    pub fn aggregate_short_options(mut self, on: bool) -> Self {
        self.config.aggregate_short_options = on;
        self
    }

    pub fn stop_at_first_parameter(mut self, on: bool) -> Self {
        self.config.stop_at_first_parameter = on;
        self
    }

    pub fn help_width(mut self, width: usize) -> Self {
        self.config.help_width = width;
        self
    }

    /// Register an extra handler; it takes priority over the built-ins.
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.registry.register(handler);
        self
    }

    /// Replace the whole registry, built-ins included.
    pub fn registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(mut self, table: OptionTable<T>) -> Self {
        self.options = table;
        self
    }

    pub fn build(self) -> Result<Parser<T>, BuildError> {
        let model = OptionModel::build(self.options, &self.registry)?;
        Ok(Parser {
            config: self.config,
            model,
        })
    }
}

/// A built model plus the settings it is parsed with. Immutable; any
/// number of parses may run against it.
pub struct Parser<T> {
    config: ParserConfig,
    model: OptionModel<T>,
}

impl<T> Parser<T> {
    pub fn builder(program_name: &str) -> ParserBuilder<T> {
        ParserBuilder::new(program_name)
    }

    /// Parse `args` (program name excluded) into `target`.
    pub fn parse<S: AsRef<str>>(&self, target: &mut T, args: &[S]) -> Result<Outcome, ParseError> {
        self.model.parse(target, args, &self.config)
    }

    /// Scan and validate `args` without a target.
    pub fn check<S: AsRef<str>>(&self, args: &[S]) -> Result<Outcome, ParseError> {
        self.model.check(args, &self.config)
    }

    pub fn model(&self) -> &OptionModel<T> {
        &self.model
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn help(&self) -> HelpPage {
        self.model.help(&self.config)
    }

    pub fn render_help(&self) -> String {
        self.help().render(self.config.help_width)
    }
}
