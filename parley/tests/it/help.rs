use std::path::PathBuf;

use expect_test::expect;
use parley::{Command, Either, Interrupt, Subcommand, Variadic, arguments::render_interrupt};

use crate::config;

/// Some sample docs
#[derive(Command, Debug)]
struct ExampleSubCommand;

#[derive(Subcommand, Debug)]
enum Commands {
    Sub(ExampleSubCommand),
}

/// Some sample documentation for the main command
#[derive(Command, Debug)]
#[parley(prog = "example", epilog = "Some text to display after...")]
struct ExampleCommand {
    #[parley(subcommand)]
    subcommand: Commands,

    #[parley(positional)]
    positional: Variadic<Either<String, PathBuf>>,

    #[parley(default)]
    flag: bool,

    #[parley(default, help = "A list of strings please")]
    option: Vec<String>,

    #[parley(default, hidden)]
    debug_internals: bool,
}

fn interrupt(args: &[&str]) -> Interrupt {
    ExampleCommand::try_parse_from_with(args, &config()).unwrap_err()
}

#[test]
fn command_help() {
    let interrupt = interrupt(&["--help"]);
    assert!(interrupt.is_help());

    expect![[r#"
        Usage: example [OPTIONS] COMMAND POSITIONAL...

        Some sample documentation for the main command

        Subcommands:
          example-sub-command  Some sample docs

        Arguments:
          POSITIONAL...

        Options:
          --flag
          --option <LIST[STR]>  A list of strings please

        Some text to display after...
    "#]]
    .assert_eq(&render_interrupt(&interrupt, &config()));
}

#[test]
fn subcommand_help_shows_the_full_command() {
    let interrupt = interrupt(&["a", "example-sub-command", "-h"]);
    assert!(interrupt.is_help());

    expect![[r#"
        Usage: example example-sub-command

        Some sample docs
    "#]]
    .assert_eq(&render_interrupt(&interrupt, &config()));
}

#[test]
fn errors_render_with_the_failing_command_help() {
    let interrupt = interrupt(&["a", "example-sub-command", "--bogus"]);
    assert_eq!(interrupt.exit_code(), 1);

    expect![[r#"
        Usage: example example-sub-command

        Some sample docs

        Error:
          Unknown option "--bogus"
    "#]]
    .assert_eq(&render_interrupt(&interrupt, &config()));
}

#[test]
fn errors_alone_without_help_on_fail() {
    let interrupt = interrupt(&["a", "--flagg"]);
    let quiet = config().help_on_fail(false);

    expect![[r#"
        Error: Unknown option "--flagg". Did you mean "--flag"?
    "#]]
    .assert_eq(&render_interrupt(&interrupt, &quiet));
}

#[test]
fn missing_subcommand() {
    let interrupt = interrupt(&["a"]);

    expect![[r#"Missing required subcommand for "example""#]].assert_eq(&interrupt.to_string());
}
