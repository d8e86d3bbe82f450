use expect_test::expect;
use parley::{Command, PlainFormatter, Subcommand, Value, arguments::render_interrupt};

use crate::config;

#[derive(Command, Debug, PartialEq)]
struct Leaf {
    #[parley(forwarded)]
    verbose: bool,

    #[parley(default)]
    dry_run: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Leaves {
    Leaf(Leaf),
}

/// Does intermediate things
#[derive(Command, Debug, PartialEq)]
struct Middle {
    #[parley(subcommand)]
    leaf: Option<Leaves>,

    #[parley(forwarded)]
    verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Middles {
    Middle(Middle),
}

#[derive(Command, Debug, PartialEq)]
#[parley(prog = "root")]
struct Root {
    #[parley(subcommand)]
    middle: Option<Middles>,

    #[parley(short, default, help = "Show more output")]
    verbose: bool,
}

fn root(args: &[&str]) -> Root {
    Root::try_parse_from_with(args, &config()).unwrap()
}

fn middle(verbose: bool, leaf: Option<Leaf>) -> Option<Middles> {
    Some(Middles::Middle(Middle {
        leaf: leaf.map(Leaves::Leaf),
        verbose,
    }))
}

#[test]
fn subcommand_value_is_shared_with_the_parent() {
    assert_eq!(
        root(&["middle", "--verbose"]),
        Root {
            middle: middle(true, None),
            verbose: true,
        }
    );
}

#[test]
fn parent_value_flows_down() {
    assert_eq!(
        root(&["-v", "middle"]),
        Root {
            middle: middle(true, None),
            verbose: true,
        }
    );
}

#[test]
fn inherited_short_alias_works_in_the_subcommand() {
    assert_eq!(
        root(&["middle", "-v"]),
        Root {
            middle: middle(true, None),
            verbose: true,
        }
    );
}

#[test]
fn default_comes_from_the_parent() {
    assert_eq!(
        root(&["middle"]),
        Root {
            middle: middle(false, None),
            verbose: false,
        }
    );
}

#[test]
fn forwarding_cascades_through_every_level() {
    let leaf = Leaf {
        verbose: true,
        dry_run: true,
    };

    assert_eq!(
        root(&["middle", "leaf", "--dry-run", "--verbose"]),
        Root {
            middle: middle(true, Some(leaf)),
            verbose: true,
        }
    );
}

#[test]
fn instances_record_their_parents() {
    let schema = Root::schema().unwrap();
    let instance =
        parley::arguments::parse_from(schema, ["middle", "leaf", "-v"], &config()).unwrap();

    let middle = instance.subcommand().unwrap();
    let leaf = middle.subcommand().unwrap();

    assert_eq!(instance.get("verbose"), Some(&Value::Bool(true)));
    assert_eq!(middle.get("verbose"), Some(&Value::Bool(true)));
    assert_eq!(leaf.full_command(), ["root", "middle", "leaf"]);
    assert_eq!(middle.parents(), ["root"]);
}

#[test]
fn inherited_options_are_hidden_from_help_by_default() {
    let interrupt = Root::try_parse_from_with(["middle", "--help"], &config()).unwrap_err();
    assert!(interrupt.is_help());

    let hidden = render_interrupt(&interrupt, &config());
    assert_eq!(
        hidden,
        "Usage: root middle [COMMAND]\n\
        \n\
        Does intermediate things\n\
        \n\
        Subcommands:\n  leaf\n"
    );

    let shown = config().formatter(PlainFormatter {
        show_forwarded_options: true,
        ..PlainFormatter::default()
    });
    let rendered = render_interrupt(&interrupt, &shown);
    assert!(rendered.contains("\nOptions:\n  -v, --verbose  Show more output\n"));
}

#[derive(Command, Debug)]
struct Release {
    #[parley(short = 'v', default)]
    version: bool,

    #[parley(forwarded)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Releases {
    Release(Release),
}

#[derive(Command, Debug)]
#[parley(prog = "shipit")]
struct Shipit {
    #[parley(subcommand)]
    command: Releases,

    #[parley(short, default)]
    verbose: bool,
}

#[test]
fn inherited_short_aliases_cannot_shadow_the_subcommands_own() {
    let interrupt = Shipit::try_parse_from_with(["release", "-v"], &config()).unwrap_err();

    assert!(matches!(interrupt, parley::Interrupt::Definition(_)));
    expect![[r#"short option -v in "release" is used by both "version" and "verbose""#]]
        .assert_eq(&interrupt.to_string());
}
