mod choice;
mod command;
mod common;
mod generics;
mod main_func;
mod subcommand;

use proc_macro::TokenStream;

/// Register a struct as a command: its fields become options and
/// positionals, its doc comment becomes the description.
#[proc_macro_derive(Command, attributes(parley))]
pub fn derive_command(item: TokenStream) -> TokenStream {
    match command::derive_command_result(item.into()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Turn an enum of commands into a subcommand selector
#[proc_macro_derive(Subcommand, attributes(parley))]
pub fn derive_subcommand(item: TokenStream) -> TokenStream {
    match subcommand::derive_subcommand_result(item.into()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Make an enum of unit variants usable as a field type
#[proc_macro_derive(Choice, attributes(parley))]
pub fn derive_choice(item: TokenStream) -> TokenStream {
    match choice::derive_choice_result(item.into()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parse the process arguments into `main`'s argument, printing help or an
/// error and exiting if that fails.
#[proc_macro_attribute]
pub fn main(attrs: TokenStream, item: TokenStream) -> TokenStream {
    match main_func::decorate_fn_main(attrs.into(), item.into()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
