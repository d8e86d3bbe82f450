use std::{path::PathBuf, time::Duration};

use expect_test::expect;
use parley::{
    Choice, Command, ConversionError, Either, Nargs, ParsedInstance, Raw, Subcommand, Ty, Value,
    Variadic,
};

use crate::config;

/// Some sample docs
#[derive(Command, Debug, PartialEq)]
struct ExampleSubCommand;

#[derive(Subcommand, Debug, PartialEq)]
enum ExampleCommands {
    Sub(ExampleSubCommand),
}

/// Some sample documentation
/// for the main command
#[derive(Command, Debug, PartialEq)]
#[parley(prog = "example", epilog = "Some text to display after...")]
struct ExampleCommand {
    #[parley(subcommand)]
    subcommand: ExampleCommands,

    #[parley(positional)]
    positional: Variadic<Either<String, PathBuf>>,

    #[parley(default)]
    flag: bool,

    #[parley(default, help = "A list of strings please")]
    option: Vec<String>,
}

#[test]
fn registration() {
    let schema = ExampleCommand::schema().unwrap();

    assert_eq!(ExampleCommand::prog(), "example");
    assert_eq!(
        schema.description(),
        Some("Some sample documentation for the main command")
    );
    assert_eq!(schema.epilog(), Some("Some text to display after..."));
    assert_eq!(
        schema.field_names(),
        ["subcommand", "positional", "flag", "option"]
    );
}

#[test]
fn registered_options() {
    let schema = ExampleCommand::schema().unwrap();
    let options: Vec<_> = schema.options().collect();

    assert_eq!(options.len(), 2);

    assert_eq!(options[0].name(), "flag");
    assert_eq!(*options[0].ty(), Ty::Bool);
    assert_eq!(options[0].nargs(), Nargs::Exactly(0));

    assert_eq!(options[1].name(), "option");
    assert_eq!(*options[1].ty(), Ty::list(Ty::Str));
    assert_eq!(options[1].nargs(), Nargs::ZeroOrMore);
    assert_eq!(options[1].help(), Some("A list of strings please"));
}

#[test]
fn registered_positionals() {
    let schema = ExampleCommand::schema().unwrap();
    let positionals: Vec<_> = schema.positionals().collect();

    assert_eq!(positionals.len(), 1);
    assert_eq!(positionals[0].name(), "positional");
    assert_eq!(
        *positionals[0].ty().unmarked(),
        Ty::variadic(Ty::union([Ty::Str, Ty::path()]))
    );
    assert_eq!(positionals[0].nargs(), Nargs::OneOrMore);
}

#[test]
fn registered_subcommands() {
    let schema = ExampleCommand::schema().unwrap();
    let slot = schema.subcommand().unwrap();

    assert!(!slot.is_optional());

    let sub = slot.get("example-sub-command").unwrap();
    assert_eq!(sub.description(), Some("Some sample docs"));
}

#[test]
fn schemas_are_built_once() {
    let first = ExampleCommand::schema().unwrap();
    let second = ExampleCommand::schema().unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[derive(Command, Debug, PartialEq)]
struct ExampleSub {
    #[parley(positional)]
    pos2: Variadic<Either<String, PathBuf>>,

    #[parley(default)]
    flag2: bool,

    #[parley(default)]
    option2: Vec<String>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ExampleSubs {
    Sub(ExampleSub),
}

#[derive(Command, Debug, PartialEq)]
struct Example {
    #[parley(positional)]
    pos: PathBuf,

    #[parley(short, default)]
    flag: bool,

    #[parley(subcommand)]
    subcommand: Option<ExampleSubs>,

    #[parley(short, default)]
    option: Vec<String>,
}

fn example(args: &[&str]) -> Example {
    Example::try_parse_from_with(args, &config()).unwrap()
}

#[test]
fn typed_parse_without_subcommand() {
    assert_eq!(
        example(&["./some-path", "-o", "a", "b", "-f"]),
        Example {
            pos: PathBuf::from("./some-path"),
            flag: true,
            subcommand: None,
            option: vec!["a".to_owned(), "b".to_owned()],
        }
    );
}

#[test]
fn typed_parse_with_subcommand() {
    assert_eq!(
        example(&["./some-path", "example-sub", "x", "y", "--flag2"]),
        Example {
            pos: PathBuf::from("./some-path"),
            flag: false,
            subcommand: Some(ExampleSubs::Sub(ExampleSub {
                pos2: Variadic(vec![
                    Either::Left("x".to_owned()),
                    Either::Left("y".to_owned()),
                ]),
                flag2: true,
                option2: Vec::new(),
            })),
            option: Vec::new(),
        }
    );
}

#[test]
fn subcommand_typo() {
    let interrupt = Example::try_parse_from_with(["./p", "example-sbu"], &config()).unwrap_err();

    expect![[r#"Unknown argument "example-sbu". Did you mean "example-sub"?"#]]
        .assert_eq(&interrupt.to_string());
}

#[derive(Choice, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Pretty,
    PlainText,
}

#[derive(Choice, Debug, Clone, Copy, PartialEq, Eq)]
#[parley(literal)]
enum Level {
    #[parley(rename = "LOW")]
    Low,
    High,
}

fn parse_percent(raw: &Raw) -> Result<Value, ConversionError> {
    let Raw::Scalar(raw) = raw else {
        return Err(ConversionError::custom("expected a single percentage"));
    };

    let number = raw.strip_suffix('%').unwrap_or(raw);
    match number.parse::<i64>() {
        Ok(percent @ 0..=100) => Ok(Value::Int(percent)),
        _ => Err(ConversionError::custom(format!("{raw} isn't a percentage"))),
    }
}

/// Exercises every kind of field the derive supports
#[derive(Command, Debug, PartialEq)]
#[parley(prog = "kitchen")]
struct Kitchen {
    #[parley(default = Format::Pretty)]
    format: Format,

    #[parley(default = Level::High)]
    level: Level,

    #[parley(default = Duration::from_secs(30))]
    timeout: Duration,

    limit: Option<u32>,

    #[parley(default = "guest".to_owned())]
    r#user: String,

    #[parley(default_factory = "default_tags")]
    tags: Vec<String>,

    #[parley(parser = "parse_percent", default = 50)]
    ratio: u8,

    #[parley(short = 'x', default)]
    exclude: Option<(u16, u16)>,

    target: Either<u32, String>,
}

fn default_tags() -> Vec<String> {
    vec!["kitchen".to_owned()]
}

#[test]
fn field_defaults() {
    let kitchen = Kitchen::try_parse_from_with(["--target", "7"], &config()).unwrap();

    assert_eq!(
        kitchen,
        Kitchen {
            format: Format::Pretty,
            level: Level::High,
            timeout: Duration::from_secs(30),
            limit: None,
            user: "guest".to_owned(),
            tags: vec!["kitchen".to_owned()],
            ratio: 50,
            exclude: None,
            target: Either::Left(7),
        }
    );
}

#[test]
fn field_values() {
    let kitchen = Kitchen::try_parse_from_with(
        [
            "--format",
            "PLAIN-TEXT",
            "--level=LOW",
            "--timeout",
            "2 minutes",
            "--limit",
            "3",
            "--user",
            "admin",
            "--tags",
            "a",
            "b",
            "--ratio",
            "75%",
            "-x",
            "1,2",
            "--target",
            "main",
        ],
        &config(),
    )
    .unwrap();

    assert_eq!(
        kitchen,
        Kitchen {
            format: Format::PlainText,
            level: Level::Low,
            timeout: Duration::from_secs(120),
            limit: Some(3),
            user: "admin".to_owned(),
            tags: vec!["a".to_owned(), "b".to_owned()],
            ratio: 75,
            exclude: Some((1, 2)),
            target: Either::Right("main".to_owned()),
        }
    );
}

#[test]
fn literal_choices_are_exact() {
    let interrupt =
        Kitchen::try_parse_from_with(["--target", "7", "--level", "low"], &config()).unwrap_err();

    expect![[r#"Invalid value for --level: "low" is not one of: LOW, high"#]]
        .assert_eq(&interrupt.to_string());
}

#[test]
fn custom_parser_errors() {
    let interrupt =
        Kitchen::try_parse_from_with(["--target", "7", "--ratio", "150%"], &config()).unwrap_err();

    expect![[r#"Invalid value for --ratio: 150% isn't a percentage"#]]
        .assert_eq(&interrupt.to_string());
}

#[test]
fn required_fields_without_defaults() {
    let interrupt = Kitchen::try_parse_from_with([""; 0], &config()).unwrap_err();

    expect![[r#"Missing required argument target for "kitchen""#]]
        .assert_eq(&interrupt.to_string());
}

#[test]
fn built_instances_convert_too() {
    let schema = Example::schema().unwrap();
    let instance = ParsedInstance::builder(&schema)
        .positional(Value::Path(PathBuf::from("in.txt")))
        .named("flag", Value::Bool(true))
        .build()
        .unwrap();

    assert_eq!(
        Example::from_instance(instance).unwrap(),
        Example {
            pos: PathBuf::from("in.txt"),
            flag: true,
            subcommand: None,
            option: Vec::new(),
        }
    );
}
