//! Declarative option metadata.
//!
//! An [`OptionTable`] lists the options, parameters and commands of one
//! model type. It is plain data; nothing is checked until the table is
//! built into an [`OptionModel`](crate::OptionModel).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::binding::{Binding, Slot};
use crate::command::{CommandTemplate, NestedTemplate};
use crate::error::HandlerError;
use crate::handler::Handler;

// ============================================================================
// Opt: one option or positional parameter
// ============================================================================

pub struct Opt<T> {
    pub(crate) names: Vec<String>,
    pub(crate) arg_slots: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) min_count: usize,
    pub(crate) max_count: Option<usize>,
    pub(crate) requires: Vec<String>,
    pub(crate) conflicts_with: Vec<String>,
    pub(crate) is_help: bool,
    pub(crate) hidden: bool,
    pub(crate) positional: bool,
    pub(crate) handler: Option<Arc<dyn Handler>>,
    pub(crate) binding: Binding<T>,
}

impl<T> Opt<T> {
    /// An option without arguments until [`Opt::arg`] adds slots.
    ///
    /// Defaults: optional (`min_count` 0), at most one occurrence.
    pub fn new(names: &[&str], binding: Binding<T>) -> Self {
        Opt {
            names: names.iter().map(|s| s.to_string()).collect(),
            arg_slots: Vec::new(),
            description: None,
            min_count: 0,
            max_count: Some(1),
            requires: Vec::new(),
            conflicts_with: Vec::new(),
            is_help: false,
            hidden: false,
            positional: false,
            handler: None,
            binding,
        }
    }

    pub fn flag(names: &[&str], slot: Slot<T, bool>) -> Self {
        Opt::new(names, Binding::Flag(slot))
    }

    pub fn text(names: &[&str], arg: &str, slot: Slot<T, String>) -> Self {
        Opt::new(names, Binding::Text(slot)).arg(arg)
    }

    pub fn optional_text(names: &[&str], arg: &str, slot: Slot<T, Option<String>>) -> Self {
        Opt::new(names, Binding::OptionalText(slot)).arg(arg)
    }

    pub fn integer(names: &[&str], arg: &str, slot: Slot<T, i64>) -> Self {
        Opt::new(names, Binding::Integer(slot)).arg(arg)
    }

    /// Accumulating option; may be repeated without limit.
    pub fn list(names: &[&str], arg: &str, slot: Slot<T, Vec<String>>) -> Self {
        Opt::new(names, Binding::List(slot)).arg(arg).unbounded()
    }

    /// `KEY VALUE` pairs collected into a map; may be repeated without limit.
    pub fn map(
        names: &[&str],
        key: &str,
        value: &str,
        slot: Slot<T, BTreeMap<String, String>>,
    ) -> Self {
        Opt::new(names, Binding::Map(slot))
            .arg(key)
            .arg(value)
            .unbounded()
    }

    /// A positional parameter bound to bare tokens, displayed as `slot`.
    pub fn parameter(slot: &str, binding: Binding<T>) -> Self {
        let mut opt = Opt::new(&[], binding).arg(slot);
        opt.positional = true;
        opt
    }

    pub fn arg(mut self, slot: &str) -> Self {
        self.arg_slots.push(slot.to_string());
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn min_count(mut self, n: usize) -> Self {
        self.min_count = n;
        self
    }

    pub fn max_count(mut self, n: usize) -> Self {
        self.max_count = Some(n);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.max_count = None;
        self
    }

    /// Shorthand for `min_count(1)`.
    pub fn required(self) -> Self {
        self.min_count(1)
    }

    pub fn requires(mut self, name: &str) -> Self {
        self.requires.push(name.to_string());
        self
    }

    pub fn conflicts_with(mut self, name: &str) -> Self {
        self.conflicts_with.push(name.to_string());
        self
    }

    /// Matching this option turns the parse into a help request.
    pub fn help(mut self) -> Self {
        self.is_help = true;
        self
    }

    /// Leave the option out of help output.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Use `handler` instead of searching the registry.
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }
}

impl<T: 'static> Opt<T> {
    /// A single-argument option converted with `FromStr`.
    pub fn value<V>(names: &[&str], arg: &str, slot: Slot<T, V>) -> Self
    where
        V: FromStr + 'static,
        V::Err: fmt::Display,
    {
        Opt::new(names, Binding::parsed(slot)).arg(arg)
    }

    pub fn action<F>(names: &[&str], f: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        Opt::new(names, Binding::action(f))
    }

    pub fn callback<F>(names: &[&str], arg: &str, f: F) -> Self
    where
        F: Fn(&mut T, &str) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Opt::new(names, Binding::callback(f)).arg(arg)
    }
}

// ============================================================================
// Cmd: a command delegating to a nested model
// ============================================================================

pub struct Cmd<T> {
    pub(crate) names: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) template: Box<dyn CommandTemplate<T>>,
}

impl<T: 'static> Cmd<T> {
    /// A command whose remaining tokens are parsed into a fresh `C` made by
    /// `factory`; the parsed value is handed to `attach`.
    pub fn new<C: 'static>(
        names: &[&str],
        options: OptionTable<C>,
        factory: fn() -> C,
        attach: fn(&mut T, C),
    ) -> Self {
        Cmd {
            names: names.iter().map(|s| s.to_string()).collect(),
            description: None,
            hidden: false,
            template: Box::new(NestedTemplate {
                table: options,
                factory,
                attach,
            }),
        }
    }
}

impl<T> Cmd<T> {
    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

// ============================================================================
// OptionTable
// ============================================================================

pub(crate) enum TableEntry<T> {
    Option(Opt<T>),
    Group(String, OptionTable<T>),
    Command(Cmd<T>),
}

pub struct OptionTable<T> {
    pub(crate) entries: Vec<TableEntry<T>>,
    pub(crate) default_command: Option<String>,
}

impl<T> OptionTable<T> {
    pub fn new() -> Self {
        OptionTable {
            entries: Vec::new(),
            default_command: None,
        }
    }

    pub fn option(mut self, opt: Opt<T>) -> Self {
        self.entries.push(TableEntry::Option(opt));
        self
    }

    /// Include another table; its options are shown under `label` in help.
    pub fn group(mut self, label: &str, table: OptionTable<T>) -> Self {
        self.entries
            .push(TableEntry::Group(label.to_string(), table));
        self
    }

    pub fn command(mut self, cmd: Cmd<T>) -> Self {
        self.entries.push(TableEntry::Command(cmd));
        self
    }

    /// Command delegated to with no tokens when none is given.
    pub fn default_command(mut self, name: &str) -> Self {
        self.default_command = Some(name.to_string());
        self
    }
}

impl<T> Default for OptionTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten nested groups, labelling each option with its group.
pub(crate) fn flatten_table<T>(
    table: OptionTable<T>,
    group: Option<&str>,
    options: &mut Vec<(Opt<T>, Option<String>)>,
    commands: &mut Vec<Cmd<T>>,
    default_command: &mut Option<String>,
) {
    if table.default_command.is_some() {
        *default_command = table.default_command;
    }
    for entry in table.entries {
        match entry {
            TableEntry::Option(opt) => options.push((opt, group.map(|s| s.to_string()))),
            TableEntry::Group(label, sub_table) => {
                flatten_table(sub_table, Some(&label), options, commands, default_command)
            }
            TableEntry::Command(cmd) => commands.push(cmd),
        }
    }
}
