use core::fmt::Display;
use std::io;

use indent_write::io::IndentWriter;
use joinery::JoinableIterator;
use lazy_format::lazy_format;

use crate::{
    help::{HelpFormatter, HelpPage},
    schema::ArgumentSpec,
    ty::Nargs,
};

/**
The default [`HelpFormatter`]: unstyled text in the layout

```text
Usage: prog sub [OPTIONS] COMMAND POS

Description

Subcommands:
  ...

Arguments:
  ...

Options:
  ...

<one section per option group>

Epilog

Error:
  ...
```

Hidden fields are never shown. Options a subcommand inherited from its parent
are only shown if `show_forwarded_options` is set.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainFormatter {
    /// The width that help text is wrapped to
    pub wrap_width: usize,
    pub show_forwarded_options: bool,
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self {
            wrap_width: 80,
            show_forwarded_options: false,
        }
    }
}

/// A help text column never gets narrower than this, however long the names
const MIN_HELP_WIDTH: usize = 20;

/// `POS`, `[POS]`, `FILES...`, or `[FILES...]`
fn positional_usage(spec: &ArgumentSpec) -> impl Display + '_ {
    let name = spec.name().to_uppercase();
    let repeated = !matches!(spec.nargs(), Nargs::Exactly(1));
    let optional = !spec.is_required() || spec.parser().accepts_null();

    lazy_format!(match ((optional, repeated)) {
        (false, false) => "{name}",
        (false, true) => "{name}...",
        (true, false) => "[{name}]",
        (true, true) => "[{name}...]",
    })
}

/// `-f, --flag`, or `--output <PATH>`
fn option_usage(spec: &ArgumentSpec) -> impl Display + '_ {
    let tags = lazy_format!(match (spec.short_display_name()) {
        Some(short) => ("{short}, {long}", long = spec.display_name()),
        None => ("{long}", long = spec.display_name()),
    });

    lazy_format!(match (spec.nargs()) {
        Nargs::Exactly(0) => "{tags}",
        _ => ("{tags} <{ty}>", ty = spec.ty().to_string().to_uppercase()),
    })
}

impl PlainFormatter {
    fn shows_option(&self, spec: &ArgumentSpec) -> bool {
        !spec.is_hidden() && (self.show_forwarded_options || !spec.is_inherited())
    }

    fn wrap<'t>(&self, text: &'t str, width: usize) -> Vec<std::borrow::Cow<'t, str>> {
        textwrap::wrap(text, width.max(MIN_HELP_WIDTH))
    }

    fn paragraph(&self, out: &mut dyn io::Write, text: &str) -> io::Result<()> {
        self.wrap(text, self.wrap_width)
            .iter()
            .try_for_each(|line| writeln!(out, "{line}"))
    }

    /// Write a two-column table. The left column is padded to its widest
    /// entry; the right column is wrapped and continued under itself.
    fn rows(&self, out: &mut dyn io::Write, rows: &[(String, String)]) -> io::Result<()> {
        let width = rows
            .iter()
            .map(|(left, _)| left.chars().count())
            .max()
            .unwrap_or(0);
        let help_width = self.wrap_width.saturating_sub(width + 4);

        rows.iter().try_for_each(|(left, right)| {
            if right.is_empty() {
                return writeln!(out, "{left}");
            }

            let lines = self.wrap(right, help_width);
            lines.iter().enumerate().try_for_each(|(index, line)| match index {
                0 => writeln!(out, "{left:<width$}  {line}"),
                _ => writeln!(out, "{:width$}  {line}", ""),
            })
        })
    }

    fn section(
        &self,
        out: &mut dyn io::Write,
        header: &str,
        rows: &[(String, String)],
    ) -> io::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        writeln!(out, "\n{header}:")?;
        let mut out = IndentWriter::new("  ", out);
        self.rows(&mut out, rows)
    }
}

fn option_row(spec: &ArgumentSpec) -> (String, String) {
    (
        option_usage(spec).to_string(),
        spec.help().unwrap_or_default().to_owned(),
    )
}

impl HelpFormatter for PlainFormatter {
    fn write_help(&self, out: &mut dyn io::Write, page: &HelpPage<'_>) -> io::Result<()> {
        let options: Vec<&ArgumentSpec> = page
            .options
            .iter()
            .copied()
            .filter(|spec| self.shows_option(spec))
            .collect();

        let positionals: Vec<&ArgumentSpec> = page
            .positionals
            .iter()
            .copied()
            .filter(|spec| !spec.is_hidden())
            .collect();

        let usage_options = match options.is_empty() {
            true => "",
            false => " [OPTIONS]",
        };
        let usage_command = match (page.subcommands.is_empty(), page.subcommand_optional) {
            (true, _) => "",
            (false, false) => " COMMAND",
            (false, true) => " [COMMAND]",
        };
        let usage_positionals: String = positionals
            .iter()
            .map(|spec| format!(" {}", positional_usage(spec)))
            .collect();

        writeln!(
            out,
            "Usage: {}{usage_options}{usage_command}{usage_positionals}",
            page.full_command.iter().join_with(" "),
        )?;

        if let Some(description) = page.description {
            writeln!(out)?;
            self.paragraph(out, description)?;
        }

        let subcommands: Vec<(String, String)> = page
            .subcommands
            .iter()
            .map(|schema| {
                (
                    schema.prog().to_owned(),
                    schema.description().unwrap_or_default().to_owned(),
                )
            })
            .collect();
        self.section(out, "Subcommands", &subcommands)?;

        let arguments: Vec<(String, String)> = positionals
            .iter()
            .map(|spec| {
                (
                    positional_usage(spec).to_string(),
                    spec.help().unwrap_or_default().to_owned(),
                )
            })
            .collect();
        self.section(out, "Arguments", &arguments)?;

        let ungrouped: Vec<(String, String)> = options
            .iter()
            .filter(|spec| spec.group().is_none())
            .map(|spec| option_row(spec))
            .collect();
        self.section(out, "Options", &ungrouped)?;

        // One section per group, in order of first appearance
        let mut groups: Vec<&str> = Vec::new();
        for group in options.iter().filter_map(|spec| spec.group()) {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }

        groups.iter().try_for_each(|&group| {
            let grouped: Vec<(String, String)> = options
                .iter()
                .filter(|spec| spec.group() == Some(group))
                .map(|spec| option_row(spec))
                .collect();
            self.section(out, group, &grouped)
        })?;

        if let Some(epilog) = page.epilog {
            writeln!(out)?;
            self.paragraph(out, epilog)?;
        }

        if let Some(error) = page.error {
            writeln!(out, "\nError:")?;
            let mut out = IndentWriter::new("  ", &mut *out);
            self.paragraph(&mut out, &error.to_string())?;
        }

        Ok(())
    }
}
