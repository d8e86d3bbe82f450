/*!
The argument schema model. A [`CommandSchema`] is the compiled, static
description of one command: its fields in declaration order, each resolved
into an [`ArgumentSpec`] with a compiled parser, plus the subcommands it can
dispatch to. Schemas are built once per command type through a
[`SchemaBuilder`], and every problem with a command definition is reported
from [`SchemaBuilder::build`], before any arguments are read.
*/

use core::fmt;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use parley_parser::snake_to_dash;
use tracing::debug;

use crate::{
    errors::SchemaError,
    parser::{ParserFn, compile},
    ty::{Nargs, Ty},
    value::Value,
};

/// The field name reserved for subcommand selection
pub const SUBCOMMAND_FIELD: &str = "subcommand";

/// The default number of attempts an interactive prompt gets
pub const MAX_ATTEMPTS: u32 = 20;

/// Where a field's value comes from when nothing else supplies one
#[derive(Clone, Default)]
pub enum DefaultValue {
    /// The field is required
    #[default]
    None,

    Value(Value),

    /// Called fresh every time a default is needed
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn factory(factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Factory(Arc::new(factory))
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Produce the default value, if there is one
    #[must_use]
    pub fn get(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Value(value) => Some(value.clone()),
            Self::Factory(factory) => Some(factory()),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/**
Per-field overrides: everything about a field that isn't implied by its type.
Any parser given here replaces the one that would be compiled from the type.
*/
#[derive(Debug, Clone, Default)]
pub struct ArgConfig {
    parser: Option<ParserFn>,
    default: DefaultValue,
    help: Option<String>,
    short: Option<String>,
    prompt: Option<String>,
    hide_input: bool,
    max_attempts: Option<u32>,
    deferred: bool,
    forwarded: bool,
    hidden: bool,
    group: Option<String>,
}

impl ArgConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn parser(mut self, parser: ParserFn) -> Self {
        self.parser = Some(parser);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = DefaultValue::Value(value);
        self
    }

    #[must_use]
    pub fn default_factory(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = DefaultValue::factory(factory);
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn hide_input(mut self, hide_input: bool) -> Self {
        self.hide_input = hide_input;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Put off the prompt until the value is first read, rather than asking
    /// while parsing. Requires a prompt.
    #[must_use]
    pub fn defer(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    /// Share this field with the parent command
    #[must_use]
    pub fn forwarded(mut self, forwarded: bool) -> Self {
        self.forwarded = forwarded;
        self
    }

    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// One declared field, before it's resolved into an [`ArgumentSpec`]
#[derive(Debug, Clone)]
pub struct FieldDecl {
    name: String,
    ty: Ty,
    config: ArgConfig,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            config: ArgConfig::default(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: ArgConfig) -> Self {
        self.config = config;
        self
    }
}

/// A fully resolved field of a command
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    name: String,
    ty: Ty,
    parser: ParserFn,
    default: DefaultValue,
    help: Option<String>,
    short: Option<String>,
    prompt: Option<String>,
    hide_input: bool,
    max_attempts: u32,
    deferred: bool,
    forwarded: bool,
    hidden: bool,
    group: Option<String>,
    position: usize,
    inherited: bool,
}

impl ArgumentSpec {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    #[inline]
    #[must_use]
    pub fn parser(&self) -> &ParserFn {
        &self.parser
    }

    #[inline]
    #[must_use]
    pub fn default(&self) -> &DefaultValue {
        &self.default
    }

    #[must_use]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    #[must_use]
    pub fn short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    #[must_use]
    pub fn hide_input(&self) -> bool {
        self.hide_input
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// True if a missing value is prompted for on first use, rather than
    /// during parsing
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    #[must_use]
    pub fn is_forwarded(&self) -> bool {
        self.forwarded
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The index of this field among all of its command's fields
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// True if this spec was copied from a parent command during forwarding
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    #[must_use]
    pub fn nargs(&self) -> Nargs {
        self.ty.nargs()
    }

    #[must_use]
    pub fn is_positional(&self) -> bool {
        self.ty.is_positional()
    }

    /// A positional that absorbs every otherwise unclaimed positional value
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.is_positional() && self.nargs() == Nargs::ZeroOrMore
    }

    /// True if there is no default, so the field must be supplied somehow
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// `--dry-run` for an option; the bare name for a positional
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.is_positional() {
            true => self.name.clone(),
            false => format!("--{}", snake_to_dash(&self.name)),
        }
    }

    #[must_use]
    pub fn short_display_name(&self) -> Option<String> {
        self.short.as_ref().map(|short| format!("-{short}"))
    }

    /// Build a copy of a parent's spec for use in a subcommand. The child's
    /// position and display group win over the parent's.
    pub(crate) fn inherit_from(&self, parent: &ArgumentSpec) -> ArgumentSpec {
        ArgumentSpec {
            forwarded: true,
            inherited: true,
            position: self.position,
            group: self.group.clone().or_else(|| parent.group.clone()),
            ..parent.clone()
        }
    }
}

/// The subcommands a command can dispatch to
#[derive(Debug, Clone)]
pub struct SubcommandSlot {
    variants: Vec<Arc<CommandSchema>>,
    optional: bool,
}

impl SubcommandSlot {
    #[must_use]
    pub fn variants(&self) -> &[Arc<CommandSchema>] {
        &self.variants
    }

    /// True if "no subcommand" is a valid outcome
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    #[must_use]
    pub fn get(&self, prog: &str) -> Option<&Arc<CommandSchema>> {
        self.variants.iter().find(|variant| variant.prog() == prog)
    }
}

/// The compiled description of a single command
#[derive(Debug, Clone)]
pub struct CommandSchema {
    prog: String,
    description: Option<String>,
    epilog: Option<String>,
    field_names: Vec<String>,
    fields: Vec<Arc<ArgumentSpec>>,
    subcommand: Option<SubcommandSlot>,
    parents: Vec<String>,
}

impl CommandSchema {
    pub fn builder(prog: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            prog: prog.into(),
            description: None,
            epilog: None,
            fields: Vec::new(),
            subcommand: None,
        }
    }

    #[must_use]
    pub fn prog(&self) -> &str {
        &self.prog
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn epilog(&self) -> Option<&str> {
        self.epilog.as_deref()
    }

    /// Every field name in declaration order, including the subcommand
    /// selector if there is one
    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Every field except the subcommand selector, in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &Arc<ArgumentSpec>> + '_ {
        self.fields.iter()
    }

    pub fn options(&self) -> impl Iterator<Item = &Arc<ArgumentSpec>> + Clone + '_ {
        self.fields.iter().filter(|spec| !spec.is_positional())
    }

    pub fn positionals(&self) -> impl Iterator<Item = &Arc<ArgumentSpec>> + Clone + '_ {
        self.fields.iter().filter(|spec| spec.is_positional())
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<ArgumentSpec>> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    #[must_use]
    pub fn option(&self, name: &str) -> Option<&Arc<ArgumentSpec>> {
        self.options().find(|spec| spec.name == name)
    }

    /// Find the option that owns a short alias
    #[must_use]
    pub fn option_by_short(&self, short: &str) -> Option<&Arc<ArgumentSpec>> {
        self.options().find(|spec| spec.short() == Some(short))
    }

    #[must_use]
    pub fn subcommand(&self) -> Option<&SubcommandSlot> {
        self.subcommand.as_ref()
    }

    /// The names of the commands enclosing this one, outermost first
    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// The parent chain followed by this command's own name
    #[must_use]
    pub fn full_command(&self) -> Vec<&str> {
        self.parents
            .iter()
            .map(String::as_str)
            .chain([self.prog.as_str()])
            .collect()
    }

    pub(crate) fn set_parents(&mut self, parents: Vec<String>) {
        self.parents = parents;
    }

    pub(crate) fn replace_field(&mut self, spec: ArgumentSpec) {
        if let Some(slot) = self.fields.iter_mut().find(|slot| slot.name == spec.name) {
            *slot = Arc::new(spec);
        }
    }
}

/// Builds a [`CommandSchema`]. See [`CommandSchema::builder`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    prog: String,
    description: Option<String>,
    epilog: Option<String>,
    fields: Vec<FieldDecl>,
    subcommand: Option<(usize, SubcommandSlot)>,
}

impl SchemaBuilder {
    /// Set the description. Line breaks are collapsed into spaces.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        let description = description.split_whitespace().collect::<Vec<_>>().join(" ");
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    #[must_use]
    pub fn epilog(mut self, epilog: impl Into<String>) -> Self {
        self.epilog = Some(epilog.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare the subcommand selector at the current position in the field
    /// order. If `optional` is set, parsing may finish without choosing one.
    #[must_use]
    pub fn subcommands(
        mut self,
        variants: impl IntoIterator<Item = Arc<CommandSchema>>,
        optional: bool,
    ) -> Self {
        let slot = SubcommandSlot {
            variants: variants.into_iter().collect(),
            optional,
        };

        self.subcommand = Some((self.fields.len(), slot));
        self
    }

    pub fn build(self) -> Result<CommandSchema, SchemaError> {
        let Self {
            prog,
            description,
            epilog,
            fields: decls,
            subcommand,
        } = self;

        let mut seen = HashSet::new();
        let mut shorts: HashMap<String, String> = HashMap::new();
        let mut fields = Vec::with_capacity(decls.len());

        for (position, FieldDecl { name, ty, config }) in decls.into_iter().enumerate() {
            if name == SUBCOMMAND_FIELD {
                return Err(SchemaError::ReservedName {
                    command: prog,
                    field: name,
                });
            }

            if !seen.insert(name.clone()) {
                return Err(SchemaError::DuplicateField {
                    command: prog,
                    field: name,
                });
            }

            if let Some(short) = &config.short {
                if short.is_empty() || short.starts_with('-') || short.contains(char::is_whitespace)
                {
                    return Err(SchemaError::InvalidShort {
                        command: prog,
                        field: name,
                        short: short.clone(),
                    });
                }

                if !ty.is_positional() {
                    if let Some(first) = shorts.insert(short.clone(), name.clone()) {
                        return Err(SchemaError::DuplicateShort {
                            command: prog,
                            short: short.clone(),
                            first,
                            second: name,
                        });
                    }
                }
            }

            if config.deferred && config.prompt.is_none() {
                return Err(SchemaError::DeferWithoutPrompt {
                    command: prog,
                    field: name,
                });
            }

            let parser = match config.parser {
                Some(parser) => parser,
                None => match compile(&ty) {
                    Ok(parser) => parser,
                    Err(source) => {
                        return Err(SchemaError::UnsupportedType {
                            command: prog,
                            field: name,
                            source,
                        });
                    }
                },
            };

            fields.push(Arc::new(ArgumentSpec {
                name,
                ty,
                parser,
                default: config.default,
                help: config.help,
                short: config.short,
                prompt: config.prompt,
                hide_input: config.hide_input,
                max_attempts: config.max_attempts.unwrap_or(MAX_ATTEMPTS),
                deferred: config.deferred,
                forwarded: config.forwarded,
                hidden: config.hidden,
                group: config.group,
                position,
                inherited: false,
            }));
        }

        let mut field_names: Vec<String> = fields.iter().map(|spec| spec.name.clone()).collect();

        let subcommand = match subcommand {
            None => None,
            Some((position, slot)) => {
                let mut progs = HashSet::new();
                if let Some(duplicate) = slot
                    .variants
                    .iter()
                    .find(|variant| !progs.insert(variant.prog()))
                {
                    return Err(SchemaError::DuplicateSubcommand {
                        command: prog,
                        name: duplicate.prog().to_owned(),
                    });
                }

                field_names.insert(position, SUBCOMMAND_FIELD.to_owned());
                Some(slot)
            }
        };

        debug!(
            prog = %prog,
            fields = fields.len(),
            subcommands = subcommand.as_ref().map_or(0, |slot| slot.variants.len()),
            "registered command schema"
        );

        Ok(CommandSchema {
            prog,
            description,
            epilog,
            field_names,
            fields,
            subcommand,
            parents: Vec::new(),
        })
    }
}
