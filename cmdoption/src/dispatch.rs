//! Token scanning: matches tokens against the model, consumes option
//! arguments, invokes handlers and hands command tails to the delegator.

use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::error::{ParseError, ScanError};
use crate::help::{self, HelpPage};
use crate::model::{Command, Descriptor, OptionModel};
use crate::validate;

/// How often, and with which arguments, each option of one parse level
/// matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<Occurrence>,
    command: Option<Box<(String, Ledger)>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    names: Vec<String>,
    display: String,
    count: usize,
    values: Vec<String>,
}

impl Occurrence {
    /// First alias, or the slot name of a positional parameter.
    pub fn name(&self) -> &str {
        &self.display
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Raw arguments of every occurrence, in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Ledger {
    pub(crate) fn for_model<T>(model: &OptionModel<T>) -> Self {
        Ledger {
            entries: model
                .options()
                .iter()
                .map(|o| Occurrence {
                    names: o.names().to_vec(),
                    display: o.display_name().to_string(),
                    count: 0,
                    values: Vec::new(),
                })
                .collect(),
            command: None,
        }
    }

    pub(crate) fn record(&mut self, idx: usize, args: &[String]) {
        let entry = &mut self.entries[idx];
        entry.count += 1;
        entry.values.extend(args.iter().cloned());
    }

    pub(crate) fn count_at(&self, idx: usize) -> usize {
        self.entries[idx].count
    }

    fn select(&mut self, command: &str, nested: Ledger) {
        self.command = Some(Box::new((command.to_string(), nested)));
    }

    fn entry(&self, name: &str) -> Option<&Occurrence> {
        self.entries
            .iter()
            .find(|e| e.display == name || e.names.iter().any(|n| n == name))
    }

    /// Occurrences of the option with this alias (or parameter slot name).
    pub fn count(&self, name: &str) -> usize {
        self.entry(name).map_or(0, |e| e.count)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.entry(name).map_or(&[], |e| e.values.as_slice())
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.entries
    }

    /// Name of the selected command, if any.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref().map(|(name, _)| name.as_str())
    }

    /// Ledger of the nested parse of the selected command.
    pub fn command_ledger(&self) -> Option<&Ledger> {
        self.command.as_deref().map(|(_, ledger)| ledger)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpRequest {
    /// Commands entered before help was requested, outermost first.
    pub command_path: Vec<String>,
    /// Help of the innermost model reached.
    pub page: HelpPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every token was consumed and all constraints hold.
    Parsed(Ledger),
    /// A help option matched; constraints were not checked.
    Help(HelpRequest),
}

impl Outcome {
    pub fn is_help(&self) -> bool {
        matches!(self, Outcome::Help(_))
    }

    pub fn ledger(&self) -> Option<&Ledger> {
        match self {
            Outcome::Parsed(ledger) => Some(ledger),
            Outcome::Help(_) => None,
        }
    }
}

/// Per-level context: the shared config plus what help needs to know about
/// the level being parsed.
pub(crate) struct Scope<'a> {
    pub(crate) config: &'a ParserConfig,
    pub(crate) program: String,
    pub(crate) about: Option<String>,
    pub(crate) epilogue: Option<String>,
}

impl<'a> Scope<'a> {
    pub(crate) fn root(config: &'a ParserConfig) -> Self {
        Scope {
            config,
            program: config.program_name.clone(),
            about: config.about.clone(),
            epilogue: config.epilogue.clone(),
        }
    }

    fn nested<T>(&self, command: &Command<T>) -> Scope<'a> {
        let program = if self.program.is_empty() {
            command.name().to_string()
        } else {
            format!("{} {}", self.program, command.name())
        };
        Scope {
            config: self.config,
            program,
            about: command.description().map(str::to_string),
            epilogue: None,
        }
    }

    fn help_page<T>(&self, model: &OptionModel<T>) -> HelpPage {
        help::page(
            model,
            &self.program,
            self.about.as_deref(),
            self.epilogue.as_deref(),
        )
    }
}

/// Parse one level. Handlers only run when `target` is given.
pub(crate) fn run<T>(
    model: &OptionModel<T>,
    mut target: Option<&mut T>,
    tokens: &[String],
    scope: &Scope<'_>,
) -> Result<Outcome, ParseError> {
    let config = scope.config;
    let mut ledger = Ledger::for_model(model);
    let mut help = false;
    let mut positional_only = false;
    let mut pos = 0;

    while pos < tokens.len() {
        let token = tokens[pos].as_str();
        pos += 1;

        if !positional_only {
            if config.is_separator(token) {
                trace!(position = pos - 1, "end of options");
                positional_only = true;
                continue;
            }

            if let Some(idx) = match_option(model, token, config)? {
                pos = consume(model, idx, tokens, pos, target.as_deref_mut(), &mut ledger)?;
                help |= model.options()[idx].is_help();
                continue;
            }

            if let Some(indices) = match_aggregate(model, token, config) {
                for idx in indices {
                    pos = consume(model, idx, tokens, pos, target.as_deref_mut(), &mut ledger)?;
                    help |= model.options()[idx].is_help();
                }
                continue;
            }

            if let Some(cidx) = model.find_command(token) {
                return delegate(model, cidx, target, &tokens[pos..], scope, ledger, help);
            }

            if config.looks_like_option(token) {
                return Err(ScanError::UnknownOption(token.to_string()).into());
            }
        }

        bind_positional(model, token, target.as_deref_mut(), &mut ledger)?;
        if config.stop_at_first_parameter {
            positional_only = true;
        }
    }

    if !help {
        if let Some(cidx) = model.default_command() {
            return delegate(model, cidx, target, &[], scope, ledger, help);
        }
    }

    finish(model, ledger, help, scope)
}

fn finish<T>(
    model: &OptionModel<T>,
    ledger: Ledger,
    help: bool,
    scope: &Scope<'_>,
) -> Result<Outcome, ParseError> {
    if help {
        debug!(program = %scope.program, "help requested");
        return Ok(Outcome::Help(HelpRequest {
            command_path: Vec::new(),
            page: scope.help_page(model),
        }));
    }
    validate::validate(model, &ledger)?;
    Ok(Outcome::Parsed(ledger))
}

fn delegate<T>(
    model: &OptionModel<T>,
    cidx: usize,
    target: Option<&mut T>,
    tail: &[String],
    scope: &Scope<'_>,
    mut ledger: Ledger,
    help: bool,
) -> Result<Outcome, ParseError> {
    let command = &model.commands()[cidx];
    debug!(command = command.name(), tokens = tail.len(), "delegating to command");
    let nested = scope.nested(command);
    match command.delegate.delegate(target, tail, &nested) {
        Ok(Outcome::Parsed(inner)) => {
            ledger.select(command.name(), inner);
            finish(model, ledger, help, scope)
        }
        Ok(Outcome::Help(mut request)) => {
            request.command_path.insert(0, command.name().to_string());
            Ok(Outcome::Help(request))
        }
        // outer help still suppresses validation failures below it
        Err(ParseError::Invalid(_)) if help => finish(model, ledger, help, scope),
        Err(e) => Err(e),
    }
}

/// Exact alias first, then an unambiguous prefix.
fn match_option<T>(
    model: &OptionModel<T>,
    token: &str,
    config: &ParserConfig,
) -> Result<Option<usize>, ScanError> {
    if let Some(idx) = model.find(token) {
        return Ok(Some(idx));
    }
    if !config.abbreviations || !config.looks_like_option(token) {
        return Ok(None);
    }
    // a bare run of prefix characters abbreviates nothing
    if token.trim_start_matches(config.option_prefix.as_str()).is_empty() {
        return Ok(None);
    }

    let hits: Vec<(usize, &str)> = model
        .options()
        .iter()
        .enumerate()
        .filter_map(|(idx, opt)| {
            opt.names()
                .iter()
                .find(|n| n.starts_with(token))
                .map(|n| (idx, n.as_str()))
        })
        .collect();

    match hits.as_slice() {
        [] => Ok(None),
        [(idx, name)] => {
            trace!(token, option = name, "abbreviated option");
            Ok(Some(*idx))
        }
        _ => Err(ScanError::AmbiguousOption {
            token: token.to_string(),
            candidates: hits.iter().map(|(_, n)| n.to_string()).collect(),
        }),
    }
}

/// Split `-abc` into `-a -b -c`. Only the last letter may take arguments.
fn match_aggregate<T>(
    model: &OptionModel<T>,
    token: &str,
    config: &ParserConfig,
) -> Option<Vec<usize>> {
    if !config.aggregate_short_options || !config.looks_like_option(token) {
        return None;
    }
    let prefix = config.option_prefix.as_str();
    let letters = &token[prefix.len()..];
    if letters.starts_with(prefix) || letters.chars().count() < 2 {
        return None;
    }

    let mut indices = Vec::new();
    let mut chars = letters.chars().peekable();
    while let Some(c) = chars.next() {
        let idx = model.find(&format!("{}{}", prefix, c))?;
        if chars.peek().is_some() && model.options()[idx].arity() > 0 {
            return None;
        }
        indices.push(idx);
    }
    Some(indices)
}

/// Take the option's arguments from `tokens[pos..]` and apply them.
/// Returns the position after the consumed arguments.
fn consume<T>(
    model: &OptionModel<T>,
    idx: usize,
    tokens: &[String],
    pos: usize,
    target: Option<&mut T>,
    ledger: &mut Ledger,
) -> Result<usize, ScanError> {
    let opt = &model.options()[idx];
    let arity = opt.arity();
    let available = tokens.len() - pos;
    if available < arity {
        return Err(ScanError::MissingArgument {
            option: opt.display_name().to_string(),
            expected: arity,
            found: available,
        });
    }
    let args = &tokens[pos..pos + arity];
    invoke(opt, target, args)?;
    ledger.record(idx, args);
    trace!(option = opt.display_name(), ?args, "matched option");
    Ok(pos + arity)
}

fn bind_positional<T>(
    model: &OptionModel<T>,
    token: &str,
    target: Option<&mut T>,
    ledger: &mut Ledger,
) -> Result<(), ScanError> {
    let slot = model.options().iter().enumerate().find(|(idx, o)| {
        o.is_positional() && o.max_count().map_or(true, |max| ledger.count_at(*idx) < max)
    });
    let Some((idx, opt)) = slot else {
        return Err(ScanError::UnexpectedArgument(token.to_string()));
    };
    let args = [token.to_string()];
    invoke(opt, target, &args)?;
    ledger.record(idx, &args);
    trace!(parameter = opt.display_name(), token, "bound parameter");
    Ok(())
}

fn invoke<T>(opt: &Descriptor<T>, target: Option<&mut T>, args: &[String]) -> Result<(), ScanError> {
    if let Some(model) = target {
        opt.handler
            .apply(opt.binding.project(model), args)
            .map_err(|e| ScanError::InvalidValue {
                option: opt.display_name().to_string(),
                message: e.0,
            })?;
    }
    Ok(())
}
