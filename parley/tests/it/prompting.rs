use std::{io, sync::Arc};

use expect_test::expect;
use parley::{
    ArgConfig, Command, CommandSchema, Deferred, FieldDecl, ParseConfig, SchemaError,
    TerminalPrompter, Ty, Value, arguments::parse_from,
};

use crate::{ScriptedPrompter, config, config_with};

fn greeter() -> Arc<CommandSchema> {
    let sub = CommandSchema::builder("sub").build().unwrap();

    let schema = CommandSchema::builder("greet")
        .field(
            FieldDecl::new("name", Ty::Str).config(ArgConfig::new().prompt("What's your name?")),
        )
        .field(FieldDecl::new("times", Ty::Int).config(ArgConfig::new().max_attempts(3)))
        .subcommands([Arc::new(sub)], true)
        .build()
        .unwrap();

    Arc::new(schema)
}

#[test]
fn missing_prompted_field_asks() {
    let prompter = ScriptedPrompter::new([Value::Str("Alice".to_owned())]);
    let instance = parse_from(greeter(), ["--times", "2"], &config_with(&prompter)).unwrap();

    assert_eq!(prompter.asked(), ["name"]);
    assert_eq!(instance.get("name"), Some(&Value::Str("Alice".to_owned())));
}

#[test]
fn given_fields_are_not_prompted_for() {
    let prompter = ScriptedPrompter::default();
    let instance = parse_from(
        greeter(),
        ["--name", "Bob", "--times", "2"],
        &config_with(&prompter),
    )
    .unwrap();

    assert!(prompter.asked().is_empty());
    assert_eq!(instance.get("name"), Some(&Value::Str("Bob".to_owned())));
}

#[test]
fn missing_field_without_prompt_is_an_error() {
    let prompter = ScriptedPrompter::new([Value::Str("Alice".to_owned())]);
    let interrupt = parse_from(greeter(), [""; 0], &config_with(&prompter)).unwrap_err();

    assert_eq!(prompter.asked(), ["name"]);
    expect![[r#"Missing required argument times for "greet""#]].assert_eq(&interrupt.to_string());
}

#[test]
fn exhausted_prompts_fail() {
    let interrupt = parse_from(greeter(), ["--times", "1"], &config()).unwrap_err();

    expect![[r#"Failed to get a valid value after 20 attempts."#]]
        .assert_eq(&interrupt.to_string());
}

#[test]
fn help_below_never_prompts() {
    let prompter = ScriptedPrompter::default();
    let interrupt = parse_from(greeter(), ["sub", "--help"], &config_with(&prompter)).unwrap_err();

    assert!(interrupt.is_help());
    assert_eq!(interrupt.schema().unwrap().full_command(), ["greet", "sub"]);
    assert!(prompter.asked().is_empty());
}

#[test]
fn terminal_prompter_retries_until_valid() {
    let schema = Arc::new(
        CommandSchema::builder("count")
            .field(
                FieldDecl::new("count", Ty::Int)
                    .config(ArgConfig::new().prompt("How many?").max_attempts(3)),
            )
            .build()
            .unwrap(),
    );

    let answers = io::Cursor::new("many\n\n12\n");
    let config = ParseConfig::default().prompter(TerminalPrompter::new(answers, io::sink()));
    let instance = parse_from(Arc::clone(&schema), [""; 0], &config).unwrap();
    assert_eq!(instance.get("count"), Some(&Value::Int(12)));

    let answers = io::Cursor::new("many\nmore\nlots\n12\n");
    let config = ParseConfig::default().prompter(TerminalPrompter::new(answers, io::sink()));
    let interrupt = parse_from(schema, [""; 0], &config).unwrap_err();
    expect![[r#"Failed to get a valid value after 3 attempts."#]]
        .assert_eq(&interrupt.to_string());
}

/// Tracks running habits
#[derive(Command, Debug)]
#[parley(prog = "runner")]
struct Runner {
    #[parley(prompt = "Do you run?", default = false)]
    runner: bool,

    #[parley(prompt = "How many days a week do you run?", defer)]
    often: Deferred<u8>,

    #[parley(prompt = "Where do you run?", default = "outside".to_owned(), defer)]
    place: Deferred<String>,
}

#[test]
fn deferred_prompts_wait_until_the_value_is_read() {
    let prompter = ScriptedPrompter::new([Value::Bool(true), Value::Int(3)]);
    let runner = Runner::try_parse_from_with([""; 0], &config_with(&prompter)).unwrap();

    assert!(runner.runner);
    assert_eq!(prompter.asked(), ["runner"]);
    assert!(!runner.often.is_resolved());

    assert_eq!(runner.often.get(), Ok(&3));
    assert_eq!(runner.often.get(), Ok(&3));
    assert_eq!(prompter.asked(), ["runner", "often"]);
}

#[test]
fn deferred_values_given_on_the_command_line_never_prompt() {
    let prompter = ScriptedPrompter::default();
    let runner =
        Runner::try_parse_from_with(["--runner", "--often", "5"], &config_with(&prompter)).unwrap();

    assert!(runner.often.is_resolved());
    assert_eq!(runner.often.into_inner(), Ok(5));
    assert!(!runner.place.is_resolved());
    assert!(prompter.asked().is_empty());
}

#[test]
fn deferred_values_keep_their_defaults_for_the_prompt() {
    let schema = Runner::schema().unwrap();
    let place = schema.field("place").unwrap();

    assert!(place.is_deferred());
    assert_eq!(place.default().get(), Some(Value::Str("outside".to_owned())));
}

#[test]
fn unread_deferred_values_are_never_prompted_for() {
    let prompter = ScriptedPrompter::default();
    let runner = Runner::try_parse_from_with(["--runner"], &config_with(&prompter)).unwrap();

    assert!(runner.runner);
    drop(runner);
    assert!(prompter.asked().is_empty());
}

#[test]
fn deferring_requires_a_prompt() {
    let error = CommandSchema::builder("runner")
        .field(FieldDecl::new("often", Ty::Int).config(ArgConfig::new().defer(true)))
        .build()
        .unwrap_err();

    assert_eq!(
        error,
        SchemaError::DeferWithoutPrompt {
            command: "runner".to_owned(),
            field: "often".to_owned(),
        }
    );
}
