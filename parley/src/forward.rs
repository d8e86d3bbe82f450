/*!
Sharing fields between a command and its subcommands. A subcommand field
marked `forwarded` that also exists on the parent is replaced by a copy of the
parent's spec, so that `--verbose` means the same thing (short alias, parser,
default, prompt) at every level. The subcommand resolves the value and the
parent takes it back afterwards.
*/

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::{errors::SchemaError, schema::CommandSchema, value::Value};

/// Build the effective schema for `child` when it runs beneath `parent`,
/// returning it along with the names of the fields it inherited.
///
/// An inherited spec brings its short alias along, so the effective schema is
/// checked again for short collisions.
pub(crate) fn inherit(
    parent: &CommandSchema,
    child: &CommandSchema,
) -> Result<(CommandSchema, Vec<String>), SchemaError> {
    let mut effective = child.clone();
    let mut inherited = Vec::new();

    for spec in child.fields().filter(|spec| spec.is_forwarded()) {
        if let Some(parent_spec) = parent.field(spec.name()) {
            effective.replace_field(spec.inherit_from(parent_spec));
            inherited.push(spec.name().to_owned());
        }
    }

    let mut shorts: HashMap<&str, &str> = HashMap::new();
    for spec in effective.options() {
        if let Some(short) = spec.short() {
            if let Some(first) = shorts.insert(short, spec.name()) {
                return Err(SchemaError::DuplicateShort {
                    command: child.prog().to_owned(),
                    short: short.to_owned(),
                    first: first.to_owned(),
                    second: spec.name().to_owned(),
                });
            }
        }
    }

    effective.set_parents(
        parent
            .full_command()
            .into_iter()
            .map(str::to_owned)
            .collect(),
    );

    if !inherited.is_empty() {
        debug!(
            parent = parent.prog(),
            child = child.prog(),
            ?inherited,
            "inherited forwarded fields"
        );
    }

    Ok((effective, inherited))
}

/// Copy the subcommand's resolution of each inherited field back onto the
/// parent. The subcommand's value always wins.
pub(crate) fn copy_back(
    parent_values: &mut BTreeMap<String, Value>,
    child_values: &BTreeMap<String, Value>,
    inherited: &[String],
) {
    for name in inherited {
        if let Some(value) = child_values.get(name) {
            parent_values.insert(name.clone(), value.clone());
        }
    }
}
