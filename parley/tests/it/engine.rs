use std::{path::PathBuf, sync::Arc};

use expect_test::expect;
use parley::{
    ArgConfig, CommandSchema, FieldDecl, Interrupt, ParseError, ParsedInstance, Ty, Value,
    arguments::parse_from,
};

use crate::config;

fn example() -> Arc<CommandSchema> {
    let schema = CommandSchema::builder("example")
        .field(FieldDecl::new("pos", Ty::positional(Ty::path())))
        .field(
            FieldDecl::new("flag", Ty::Bool)
                .config(ArgConfig::new().short("f").default_value(Value::Bool(false))),
        )
        .field(
            FieldDecl::new("option", Ty::list(Ty::Str)).config(
                ArgConfig::new()
                    .short("o")
                    .default_factory(|| Value::List(Vec::new())),
            ),
        )
        .build()
        .unwrap();

    Arc::new(schema)
}

fn parse(args: &[&str]) -> Result<ParsedInstance, Interrupt> {
    parse_from(example(), args, &config())
}

fn strings(values: &[&str]) -> Value {
    Value::List(values.iter().map(|&value| Value::Str(value.to_owned())).collect())
}

fn error_message(args: &[&str]) -> String {
    parse(args).unwrap_err().to_string()
}

#[test]
fn positional_alone() {
    let instance = parse(&["./some-path"]).unwrap();

    assert_eq!(
        instance.get("pos"),
        Some(&Value::Path(PathBuf::from("./some-path")))
    );
    assert_eq!(instance.get("flag"), Some(&Value::Bool(false)));
    assert_eq!(instance.get("option"), Some(&strings(&[])));
}

#[test]
fn flag_anywhere() {
    for args in [
        ["-f", "./some-path"],
        ["--flag", "./some-path"],
        ["./some-path", "--flag"],
    ] {
        let instance = parse(&args).unwrap();

        assert_eq!(instance.get("flag"), Some(&Value::Bool(true)), "{args:?}");
        assert_eq!(
            instance.get("pos"),
            Some(&Value::Path(PathBuf::from("./some-path"))),
            "{args:?}"
        );
    }
}

#[test]
fn list_option_collects_until_the_next_option() {
    let cases: [(&[&str], &[&str], bool); 5] = [
        (&["./some-path", "--option", "a"], &["a"], false),
        (&["./some-path", "-o", "a"], &["a"], false),
        (&["./some-path", "--flag", "--option", "a", "b"], &["a", "b"], true),
        (&["./some-path", "--option", "a", "b", "--flag"], &["a", "b"], true),
        (&["./some-path", "-o", "a", "b", "-f"], &["a", "b"], true),
    ];

    for (args, option, flag) in cases {
        let instance = parse(args).unwrap();

        assert_eq!(instance.get("option"), Some(&strings(option)), "{args:?}");
        assert_eq!(instance.get("flag"), Some(&Value::Bool(flag)), "{args:?}");
    }
}

#[test]
fn equals_form() {
    let interrupt = parse(&["--option=a", "-f=yes", "./p"]).unwrap_err();

    // `-f` is a flag, so its `=yes` half is the positional, and `./p` after
    // it is one too many.
    assert!(matches!(
        interrupt.parse_error(),
        Some(ParseError::UnknownArgument { .. })
    ));

    let instance = parse(&["./p", "--option=a"]).unwrap();
    assert_eq!(instance.get("option"), Some(&strings(&["a"])));
}

#[test]
fn repeated_list_options_accumulate() {
    let instance = parse(&["./p", "-o", "a", "-f", "-o", "b", "c"]).unwrap();
    assert_eq!(instance.get("option"), Some(&strings(&["a", "b", "c"])));
}

#[test]
fn missing_positional() {
    expect![[r#"Missing required argument pos for "example""#]].assert_eq(&error_message(&[]));
}

#[test]
fn close_typos_get_suggestions() {
    expect![[r#"Unknown option "--flg". Did you mean "--flag"?"#]]
        .assert_eq(&error_message(&["./p", "--flg"]));
    expect![[r#"Unknown option "--optoin". Did you mean "--option"?"#]]
        .assert_eq(&error_message(&["./p", "--optoin"]));
    expect![[r#"Unknown option "-F". Did you mean "-f"?"#]]
        .assert_eq(&error_message(&["./p", "-F"]));
}

#[test]
fn distant_typos_get_no_suggestion() {
    expect![[r#"Unknown option "--zzzzzz""#]].assert_eq(&error_message(&["./p", "--zzzzzz"]));
    expect![[r#"Unknown argument "./q""#]].assert_eq(&error_message(&["./p", "./q"]));
}

#[test]
fn help_triggers() {
    let cases: [&[&str]; 4] = [&["--help"], &["./p", "-h"], &["HELP"], &["-o", "a", "help"]];

    for args in cases {
        let interrupt = parse(args).unwrap_err();

        assert!(interrupt.is_help(), "{args:?}");
        assert_eq!(interrupt.exit_code(), 0);
        assert_eq!(interrupt.schema().unwrap().prog(), "example");
    }
}

fn pair() -> Arc<CommandSchema> {
    let schema = CommandSchema::builder("pair")
        .field(FieldDecl::new("pair", Ty::tuple([Ty::Int, Ty::Int])))
        .build()
        .unwrap();

    Arc::new(schema)
}

#[test]
fn tuple_takes_exactly_its_arity() {
    let instance = parse_from(pair(), ["--pair", "1", "2"], &config()).unwrap();
    assert_eq!(
        instance.get("pair"),
        Some(&Value::Tuple(vec![Value::Int(1), Value::Int(2)]))
    );

    let interrupt = parse_from(pair(), ["--pair", "1"], &config()).unwrap_err();
    expect![[r#"Not enough values for --pair"#]].assert_eq(&interrupt.to_string());
    assert_eq!(interrupt.exit_code(), 1);

    let interrupt = parse_from(pair(), ["--pair", "1", "2", "3"], &config()).unwrap_err();
    expect![[r#"Unknown argument "3""#]].assert_eq(&interrupt.to_string());
}

#[test]
fn tuple_conversion_errors_name_the_field() {
    let interrupt = parse_from(pair(), ["--pair", "1", "x"], &config()).unwrap_err();

    expect![[r#"Invalid value for --pair: The value "x" is not a valid integer."#]]
        .assert_eq(&interrupt.to_string());
}

#[test]
fn negative_flags() {
    let schema = Arc::new(
        CommandSchema::builder("main")
            .field(
                FieldDecl::new("cache", Ty::Bool)
                    .config(ArgConfig::new().default_value(Value::Bool(true))),
            )
            .build()
            .unwrap(),
    );

    let enabled = config().negative_flags(true);
    let instance = parse_from(Arc::clone(&schema), ["--no-cache"], &enabled).unwrap();
    assert_eq!(instance.get("cache"), Some(&Value::Bool(false)));

    let instance = parse_from(Arc::clone(&schema), ["--no-cache", "--cache"], &enabled).unwrap();
    assert_eq!(instance.get("cache"), Some(&Value::Bool(true)));

    let interrupt = parse_from(schema, ["--no-cache"], &config()).unwrap_err();
    expect![[r#"Unknown option "--no-cache""#]].assert_eq(&interrupt.to_string());
}

#[test]
fn nullable_fields_resolve_to_none() {
    let schema = Arc::new(
        CommandSchema::builder("main")
            .field(FieldDecl::new("limit", Ty::optional(Ty::Int)))
            .build()
            .unwrap(),
    );

    let instance = parse_from(Arc::clone(&schema), [""; 0], &config()).unwrap();
    assert_eq!(instance.get("limit"), Some(&Value::None));

    let instance = parse_from(schema, ["--limit", "5"], &config()).unwrap();
    assert_eq!(instance.get("limit"), Some(&Value::Int(5)));
}

#[test]
fn end_of_options() {
    let instance = parse(&["--", "--flag"]).unwrap();

    assert_eq!(
        instance.get("pos"),
        Some(&Value::Path(PathBuf::from("--flag")))
    );
    assert_eq!(instance.get("flag"), Some(&Value::Bool(false)));
}

#[test]
fn help_after_end_of_options_is_data() {
    let schema = CommandSchema::builder("cat")
        .field(FieldDecl::new("files", Ty::positional(Ty::list(Ty::Str))))
        .build()
        .unwrap();

    let instance = parse_from(Arc::new(schema), ["--", "--help", "-h"], &config()).unwrap();

    assert_eq!(instance.get("files"), Some(&strings(&["--help", "-h"])));
}
