//! Help output.
//!
//! [`page`] collects display records from a model; [`HelpPage::render`]
//! lays them out as two-column plain text.

use std::fmt::Write;

use crate::model::OptionModel;

/// Display data for one visible option, parameter or command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpRecord {
    pub aliases: Vec<String>,
    pub argument_slots: Vec<String>,
    pub description: Option<String>,
    pub group: Option<String>,
}

impl HelpRecord {
    /// `--name, -n NAME`
    pub fn left_column(&self) -> String {
        let mut left = self.aliases.join(", ");
        for slot in &self.argument_slots {
            if !left.is_empty() {
                left.push(' ');
            }
            left.push_str(slot);
        }
        left
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpPage {
    pub program: String,
    pub usage: String,
    pub about: Option<String>,
    pub epilogue: Option<String>,
    pub options: Vec<HelpRecord>,
    pub parameters: Vec<HelpRecord>,
    pub commands: Vec<HelpRecord>,
}

/// Collect the visible entries of `model` in declaration order.
pub fn page<T>(
    model: &OptionModel<T>,
    program: &str,
    about: Option<&str>,
    epilogue: Option<&str>,
) -> HelpPage {
    let mut options = Vec::new();
    let mut parameters = Vec::new();
    let mut usage = format!("Usage: {}", program);

    if model.options().iter().any(|o| !o.is_positional() && !o.is_hidden()) {
        usage.push_str(" [OPTION...]");
    }

    for opt in model.options() {
        if opt.is_hidden() {
            continue;
        }
        let record = HelpRecord {
            aliases: opt.names().to_vec(),
            argument_slots: opt.arg_slots().to_vec(),
            description: opt.description().map(str::to_string),
            group: opt.group().map(str::to_string),
        };
        if opt.is_positional() {
            let slot = opt.display_name();
            let repeat = if opt.max_count().map_or(true, |m| m > 1) { "..." } else { "" };
            if opt.min_count() > 0 {
                let _ = write!(usage, " {}{}", slot, repeat);
            } else {
                let _ = write!(usage, " [{}{}]", slot, repeat);
            }
            parameters.push(record);
        } else {
            options.push(record);
        }
    }

    let commands: Vec<HelpRecord> = model
        .commands()
        .iter()
        .filter(|c| !c.is_hidden())
        .map(|c| HelpRecord {
            aliases: c.names().to_vec(),
            argument_slots: Vec::new(),
            description: c.description().map(str::to_string),
            group: None,
        })
        .collect();
    if !commands.is_empty() {
        usage.push_str(" COMMAND [ARG...]");
    }

    HelpPage {
        program: program.to_string(),
        usage,
        about: about.map(str::to_string),
        epilogue: epilogue.map(str::to_string),
        options,
        parameters,
        commands,
    }
}

impl HelpPage {
    /// Options split by group: ungrouped ones first, then each group in
    /// order of first appearance.
    pub fn groups(&self) -> Vec<(Option<&str>, Vec<&HelpRecord>)> {
        let mut groups: Vec<(Option<&str>, Vec<&HelpRecord>)> = Vec::new();
        let ungrouped: Vec<&HelpRecord> =
            self.options.iter().filter(|r| r.group.is_none()).collect();
        if !ungrouped.is_empty() {
            groups.push((None, ungrouped));
        }
        for record in self.options.iter().filter(|r| r.group.is_some()) {
            let label = record.group.as_deref();
            match groups.iter_mut().find(|(l, _)| *l == label) {
                Some((_, records)) => records.push(record),
                None => groups.push((label, vec![record])),
            }
        }
        groups
    }

    pub fn render(&self, width: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.usage);
        if let Some(about) = &self.about {
            let _ = write!(out, "\n");
            write_wrapped_text(&mut out, about, 0, width.max(20));
        }

        let max_left_col = self
            .options
            .iter()
            .chain(&self.parameters)
            .chain(&self.commands)
            .map(|r| r.left_column().chars().count())
            .max()
            .unwrap_or(0);
        let indent_length = max_left_col + 5; // 2 prefix + column + 3 separator
        let line_length = if width > indent_length {
            width - indent_length
        } else {
            20
        };
        let layout = Layout {
            max_left_col,
            indent_length,
            line_length,
        };

        for (label, records) in self.groups() {
            let _ = write!(out, "\n{}\n", label.unwrap_or("Options:"));
            for record in records {
                layout.write_record(&mut out, record);
            }
        }
        if !self.parameters.is_empty() {
            let _ = write!(out, "\nParameters:\n");
            for record in &self.parameters {
                layout.write_record(&mut out, record);
            }
        }
        if !self.commands.is_empty() {
            let _ = write!(out, "\nCommands:\n");
            for record in &self.commands {
                layout.write_record(&mut out, record);
            }
        }

        if let Some(epilogue) = &self.epilogue {
            let _ = write!(out, "\n");
            write_wrapped_text(&mut out, epilogue, 0, width.max(20));
        }
        out
    }
}

struct Layout {
    max_left_col: usize,
    indent_length: usize,
    line_length: usize,
}

impl Layout {
    fn write_record(&self, out: &mut String, record: &HelpRecord) {
        let left = record.left_column();
        match &record.description {
            Some(desc) => {
                let _ = write!(out, "  {:<width$}   ", left, width = self.max_left_col);
                write_wrapped_text(out, desc, self.indent_length, self.line_length);
            }
            None => {
                let _ = writeln!(out, "  {}", left);
            }
        }
    }
}

/// Word-wrap text at spaces, indenting continuation lines.
fn write_wrapped_text(out: &mut String, text: &str, indent_length: usize, line_length: usize) {
    let mut help = text;
    while help.len() > line_length {
        let mut cut = line_length;
        while !help.is_char_boundary(cut) {
            cut -= 1;
        }
        let break_pos = match help[..cut].rfind(' ') {
            Some(pos) if pos > 0 => pos,
            _ => break, // a single overlong word stays on its line
        };
        let _ = write!(out, "{}\n{:indent$}", &help[..break_pos], "", indent = indent_length);
        help = help[break_pos..].trim_start_matches(' ');
    }
    if !help.is_empty() {
        let _ = writeln!(out, "{}", help);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Binding;
    use crate::handler::HandlerRegistry;
    use crate::table::{Cmd, Opt, OptionTable};

    #[derive(Default)]
    struct Config {
        name: String,
        verbose: bool,
        secret: bool,
        quiet: bool,
        files: Vec<String>,
        sub: Option<Sub>,
    }

    #[derive(Default)]
    struct Sub {
        all: bool,
    }

    fn model() -> OptionModel<Config> {
        let table = OptionTable::new()
            .option(
                Opt::text(&["--name", "-n"], "NAME", |c: &mut Config| &mut c.name)
                    .description("Name to greet."),
            )
            .option(Opt::flag(&["--verbose"], |c: &mut Config| &mut c.verbose))
            .option(Opt::flag(&["--secret"], |c: &mut Config| &mut c.secret).hidden())
            .group(
                "Output options:",
                OptionTable::new().option(
                    Opt::flag(&["--quiet", "-q"], |c: &mut Config| &mut c.quiet)
                        .description("Say less."),
                ),
            )
            .option(
                Opt::parameter("FILE", Binding::List(|c: &mut Config| &mut c.files))
                    .unbounded()
                    .description("Input files."),
            )
            .command(
                Cmd::new(
                    &["list", "ls"],
                    OptionTable::new().option(Opt::flag(&["--all"], |s: &mut Sub| &mut s.all)),
                    Sub::default,
                    |c: &mut Config, s: Sub| c.sub = Some(s),
                )
                .description("List things."),
            );
        OptionModel::build(table, &HandlerRegistry::default()).unwrap()
    }

    #[test]
    fn hidden_entries_are_omitted() {
        let page = page(&model(), "prog", None, None);
        let aliases: Vec<String> = page.options.iter().map(|r| r.left_column()).collect();
        assert_eq!(aliases, vec!["--name, -n NAME", "--verbose", "--quiet, -q"]);
        assert_eq!(page.parameters[0].left_column(), "FILE");
        assert_eq!(page.commands[0].left_column(), "list, ls");
    }

    #[test]
    fn usage_line() {
        let page = page(&model(), "prog", None, None);
        assert_eq!(page.usage, "Usage: prog [OPTION...] [FILE...] COMMAND [ARG...]");
    }

    #[test]
    fn groups_keep_ungrouped_first() {
        let page = page(&model(), "prog", None, None);
        let groups = page.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, None);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, Some("Output options:"));
    }

    #[test]
    fn render_layout() {
        let text = page(&model(), "prog", Some("Greets people."), Some("See also: man prog"))
            .render(79);
        let expected = "\
Usage: prog [OPTION...] [FILE...] COMMAND [ARG...]

Greets people.

Options:
  --name, -n NAME   Name to greet.
  --verbose

Output options:
  --quiet, -q       Say less.

Parameters:
  FILE              Input files.

Commands:
  list, ls          List things.

See also: man prog
";
        assert_eq!(text, expected);
    }

    #[test]
    fn wraps_long_descriptions() {
        let mut out = String::new();
        write_wrapped_text(&mut out, "aaa bbb ccc ddd", 4, 8);
        assert_eq!(out, "aaa bbb\n    ccc ddd\n");
    }

    #[test]
    fn overlong_word_is_not_split() {
        let mut out = String::new();
        write_wrapped_text(&mut out, "abcdefghijkl", 2, 5);
        assert_eq!(out, "abcdefghijkl\n");
    }

    #[test]
    fn wrapping_respects_char_boundaries() {
        let mut out = String::new();
        write_wrapped_text(&mut out, "ééé ééé", 0, 8);
        assert_eq!(out, "ééé\nééé\n");
    }
}
