//! The immutable option model built from an [`OptionTable`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::binding::Binding;
use crate::command::Delegate;
use crate::config::ParserConfig;
use crate::dispatch::{self, Outcome, Scope};
use crate::error::{BuildError, ParseError};
use crate::handler::{Handler, HandlerRegistry};
use crate::help::{self, HelpPage};
use crate::table::{flatten_table, Cmd, Opt, OptionTable};

/// A resolved option or positional parameter.
pub struct Descriptor<T> {
    names: Vec<String>,
    arg_slots: Vec<String>,
    description: Option<String>,
    min_count: usize,
    max_count: Option<usize>,
    pub(crate) requires: Vec<(String, usize)>,
    pub(crate) conflicts_with: Vec<(String, usize)>,
    is_help: bool,
    hidden: bool,
    positional: bool,
    group: Option<String>,
    pub(crate) binding: Binding<T>,
    pub(crate) handler: Arc<dyn Handler>,
}

impl<T> Descriptor<T> {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// First alias, or the slot name of a positional parameter.
    pub fn display_name(&self) -> &str {
        self.names
            .first()
            .or_else(|| self.arg_slots.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn arg_slots(&self) -> &[String] {
        &self.arg_slots
    }

    pub fn arity(&self) -> usize {
        self.arg_slots.len()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// `None` means unbounded.
    pub fn max_count(&self) -> Option<usize> {
        self.max_count
    }

    pub fn is_help(&self) -> bool {
        self.is_help
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn requires(&self) -> impl Iterator<Item = &str> {
        self.requires.iter().map(|(name, _)| name.as_str())
    }

    pub fn conflicts_with(&self) -> impl Iterator<Item = &str> {
        self.conflicts_with.iter().map(|(name, _)| name.as_str())
    }

    pub fn handler_name(&self) -> &'static str {
        self.handler.name()
    }
}

/// A command and the nested model it delegates to.
pub struct Command<T> {
    names: Vec<String>,
    description: Option<String>,
    hidden: bool,
    pub(crate) delegate: Box<dyn Delegate<T>>,
}

impl<T> Command<T> {
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Help page of the nested model.
    pub fn help(&self, program: &str) -> HelpPage {
        self.delegate.help_page(program, self.description.as_deref())
    }
}

pub struct OptionModel<T> {
    options: Vec<Descriptor<T>>,
    commands: Vec<Command<T>>,
    default_command: Option<usize>,
}

impl<T> OptionModel<T> {
    /// Validate the table and resolve a handler for every option.
    ///
    /// Nested command tables are built as well, with the same registry.
    pub fn build(table: OptionTable<T>, registry: &HandlerRegistry) -> Result<Self, BuildError> {
        let mut flat = Vec::new();
        let mut cmds = Vec::new();
        let mut default_name = None;
        flatten_table(table, None, &mut flat, &mut cmds, &mut default_name);

        let mut seen = HashSet::new();
        let mut options = Vec::with_capacity(flat.len());
        let mut constraints = Vec::with_capacity(flat.len());
        for (opt, group) in flat {
            let (descriptor, requires, conflicts) =
                build_descriptor(opt, group, registry, &mut seen)?;
            options.push(descriptor);
            constraints.push((requires, conflicts));
        }

        for (idx, (requires, conflicts)) in constraints.into_iter().enumerate() {
            let requires = resolve_targets(&options, idx, requires)?;
            let conflicts = resolve_targets(&options, idx, conflicts)?;
            options[idx].requires = requires;
            options[idx].conflicts_with = conflicts;
        }

        let mut commands = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            commands.push(build_command(cmd, registry, &mut seen)?);
        }

        let default_command = match default_name {
            Some(name) => Some(
                commands
                    .iter()
                    .position(|c| c.names.contains(&name))
                    .ok_or(BuildError::UnknownCommand(name))?,
            ),
            None => None,
        };

        Ok(OptionModel {
            options,
            commands,
            default_command,
        })
    }

    pub fn options(&self) -> &[Descriptor<T>] {
        &self.options
    }

    pub fn commands(&self) -> &[Command<T>] {
        &self.commands
    }

    pub(crate) fn default_command(&self) -> Option<usize> {
        self.default_command
    }

    /// Index of the option with exactly this alias.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.options
            .iter()
            .position(|o| o.names.iter().any(|n| n == name))
    }

    pub fn find_command(&self, name: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|c| c.names.iter().any(|n| n == name))
    }

    /// Parse `args` into `target`.
    pub fn parse<S: AsRef<str>>(
        &self,
        target: &mut T,
        args: &[S],
        config: &ParserConfig,
    ) -> Result<Outcome, ParseError> {
        let tokens = owned(args);
        dispatch::run(self, Some(target), &tokens, &Scope::root(config))
    }

    /// Scan and validate `args` without touching any model instance.
    pub fn check<S: AsRef<str>>(
        &self,
        args: &[S],
        config: &ParserConfig,
    ) -> Result<Outcome, ParseError> {
        let tokens = owned(args);
        dispatch::run(self, None, &tokens, &Scope::root(config))
    }

    pub fn help(&self, config: &ParserConfig) -> HelpPage {
        help::page(
            self,
            &config.program_name,
            config.about.as_deref(),
            config.epilogue.as_deref(),
        )
    }
}

fn owned<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter().map(|s| s.as_ref().to_string()).collect()
}

type Constraints = Vec<String>;

fn build_descriptor<T>(
    opt: Opt<T>,
    group: Option<String>,
    registry: &HandlerRegistry,
    seen: &mut HashSet<String>,
) -> Result<(Descriptor<T>, Constraints, Constraints), BuildError> {
    if opt.names.is_empty() && !opt.positional {
        return Err(BuildError::MissingOptionName {
            binding: opt.binding.kind().name(),
        });
    }
    claim_names(&opt.names, seen)?;

    let label = opt
        .names
        .first()
        .or_else(|| opt.arg_slots.first())
        .cloned()
        .unwrap_or_default();
    if let Some(max) = opt.max_count {
        if max < opt.min_count {
            return Err(BuildError::InvalidMultiplicity {
                option: label,
                min: opt.min_count,
                max,
            });
        }
    }

    let kind = opt.binding.kind();
    let arity = opt.arg_slots.len();
    let handler = registry.resolve(&label, kind, arity, opt.handler.as_ref())?;
    debug!(
        option = %label,
        handler = handler.name(),
        arity,
        "resolved option handler"
    );

    let descriptor = Descriptor {
        names: opt.names,
        arg_slots: opt.arg_slots,
        description: opt.description,
        min_count: opt.min_count,
        max_count: opt.max_count,
        requires: Vec::new(),
        conflicts_with: Vec::new(),
        is_help: opt.is_help,
        hidden: opt.hidden,
        positional: opt.positional,
        group,
        binding: opt.binding,
        handler,
    };

    Ok((descriptor, opt.requires, opt.conflicts_with))
}

fn claim_names(names: &[String], seen: &mut HashSet<String>) -> Result<(), BuildError> {
    for name in names {
        if name.is_empty() {
            return Err(BuildError::EmptyOptionName);
        }
        if !seen.insert(name.clone()) {
            return Err(BuildError::DuplicateOptionName(name.clone()));
        }
    }
    Ok(())
}

/// Map constraint names onto the index of another option of the model.
fn resolve_targets<T>(
    options: &[Descriptor<T>],
    owner: usize,
    names: Vec<String>,
) -> Result<Vec<(String, usize)>, BuildError> {
    names
        .into_iter()
        .map(|name| {
            match options
                .iter()
                .position(|o| o.names.iter().any(|n| *n == name))
            {
                Some(idx) if idx != owner => Ok((name, idx)),
                _ => Err(BuildError::UnknownConstraintTarget {
                    option: options[owner].display_name().to_string(),
                    target: name,
                }),
            }
        })
        .collect()
}

fn build_command<T>(
    cmd: Cmd<T>,
    registry: &HandlerRegistry,
    seen: &mut HashSet<String>,
) -> Result<Command<T>, BuildError> {
    if cmd.names.is_empty() {
        return Err(BuildError::MissingOptionName { binding: "command" });
    }
    claim_names(&cmd.names, seen)?;
    let name = cmd.names[0].clone();
    let delegate = cmd
        .template
        .build(registry)
        .map_err(|e| BuildError::Command {
            command: name.clone(),
            source: Box::new(e),
        })?;
    debug!(command = %name, "built command model");
    Ok(Command {
        names: cmd.names,
        description: cmd.description,
        hidden: cmd.hidden,
        delegate,
    })
}
