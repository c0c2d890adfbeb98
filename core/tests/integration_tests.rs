use std::cell::Cell;
use std::sync::Arc;
use std::thread;

use argspec_core::*;

fn record() -> ParseOptions<'static> {
    ParseOptions::new().on_error(OnError::Record)
}

fn strings(values: &[Value]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn normalization_is_idempotent() {
    let inputs: [&[&str]; 4] = [
        &["-abc", "--foo=bar", "x"],
        &["--", "-abc", "--foo=bar"],
        &["-", "-1", "--long", "--k=-v"],
        &[],
    ];
    for raw in inputs {
        let once = normalize(raw).unwrap();
        assert_eq!(normalize(&once).unwrap(), once, "{raw:?}");
    }
}

#[test]
fn normalization_examples() {
    assert_eq!(normalize(["-abc"]).unwrap(), ["-a", "-b", "-c"]);
    assert_eq!(normalize(["--foo=bar"]).unwrap(), ["--foo", "bar"]);
    assert_eq!(
        normalize(["--foo=a=b"]).unwrap_err(),
        ParseError::MalformedToken("--foo=a=b".to_string())
    );
}

// ---------------------------------------------------------------------------
// Result keys
// ---------------------------------------------------------------------------

#[test]
fn every_synonym_gets_a_key() {
    let spec =
        Spec::new(OptionGroup::new().with(ValueOption::new(["-n", "--num-workers"]))).unwrap();
    let args = spec.parse(["-n", "3"]).unwrap();

    assert_eq!(args.get_str("n"), Some("3"));
    assert_eq!(args.get_str("num_workers"), Some("3"));
    assert_eq!(args.values().len(), 2);
}

#[test]
fn flag_and_negator_are_always_complementary() {
    let spec = Spec::new(
        OptionGroup::new().with(
            FlagOption::new(["-c", "--color"]).with_negators(["-C", "--no-color"]),
        ),
    )
    .unwrap();

    let cases: [&[&str]; 5] = [&[], &["-c"], &["--no-color"], &["-c", "-C"], &["-Cc"]];
    for input in cases {
        let args = spec.parse(input).unwrap();
        for primary in ["c", "color"] {
            for negator in ["C", "no_color"] {
                assert_eq!(args.flag(primary), !args.flag(negator), "{input:?}");
            }
        }
    }
    assert!(spec.parse(["-Cc"]).unwrap().flag("color"));
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

#[test]
fn width_8_counter_overflows_on_128th_use() {
    let spec =
        Spec::new(OptionGroup::new().with(CounterOption::new(["-v"]).with_width::<i8>())).unwrap();

    let ok = vec!["-v"; 127];
    assert_eq!(spec.parse(&ok).unwrap().get_int("v"), Some(127));

    let too_many = vec!["-v"; 128];
    let args = spec.parse_with(&too_many, record()).unwrap();
    assert_eq!(
        args.errors(),
        &[ParseError::CounterOverflow {
            option: "-v".to_string(),
            token: "-v".to_string(),
        }]
    );
    assert_eq!(args.get_int("v"), Some(127));
}

#[test]
fn clustered_counter_counts_each_letter() {
    let spec = Spec::new(
        OptionGroup::new().with(
            CounterOption::new(["-v", "--verbose"])
                .with_decrementers(["-q"])
                .with_default(1),
        ),
    )
    .unwrap();
    let args = spec.parse(["-vvv", "--verbose", "-qq"]).unwrap();
    assert_eq!(args.get_int("verbose"), Some(3));
    assert_eq!(args.get_int("q"), Some(3));
}

// ---------------------------------------------------------------------------
// Mutex groups
// ---------------------------------------------------------------------------

#[test]
fn mutex_of_three_requires_exactly_one() {
    let spec = Spec::new(
        OptionGroup::new().with(
            MutexGroup::new()
                .with(ValueOption::new(["--a"]))
                .with(ValueOption::new(["--b"]))
                .with(ValueOption::new(["--c"])),
        ),
    )
    .unwrap();
    let violation = ParseError::MutexViolation("--a or --b or --c".to_string());

    let none = spec.parse_with(Vec::<String>::new(), record()).unwrap();
    assert_eq!(none.errors(), &[violation.clone()]);

    let two = spec.parse_with(["--a", "1", "--c", "3"], record()).unwrap();
    assert_eq!(two.errors(), &[violation]);

    let one = spec.parse_with(["--b", "2"], record()).unwrap();
    assert!(one.is_clean());
    assert_eq!(one.get_str("b"), Some("2"));
}

// ---------------------------------------------------------------------------
// Positionals
// ---------------------------------------------------------------------------

#[test]
fn required_positional_reports_missing() {
    let spec = Spec::new(OptionGroup::new().with(Positional::new("file"))).unwrap();
    let args = spec.parse_with(Vec::<&str>::new(), record()).unwrap();
    assert_eq!(args.error_messages(), ["file must be specified"]);
}

#[test]
fn negative_number_is_a_positional_value() {
    let spec = Spec::new(OptionGroup::new().with(Positional::new("offset").of::<i32>())).unwrap();
    let args = spec.parse(["-1"]).unwrap();
    assert_eq!(args.get_int("offset"), Some(-1));
}

#[test]
fn declared_numeric_name_wins_over_positional() {
    let spec = Spec::new(
        OptionGroup::new()
            .with(FlagOption::new(["-1"]))
            .with(Positional::new("offset").optional()),
    )
    .unwrap();
    let args = spec.parse(["-1"]).unwrap();
    assert!(args.flag("1"));
    assert!(!args.contains("offset"));
}

#[test]
fn multiple_positional_appends_across_options() {
    let spec = Spec::new(
        OptionGroup::new()
            .with(FlagOption::new(["-x"]))
            .with(Positional::new("files").allow_multiple()),
    )
    .unwrap();
    let args = spec.parse(["a", "b", "-x", "c"]).unwrap();
    assert_eq!(strings(args.get_list("files").unwrap()), ["a", "b", "c"]);
}

// ---------------------------------------------------------------------------
// Remainders and until-collections
// ---------------------------------------------------------------------------

#[test]
fn remainder_captures_everything_verbatim() {
    let spec = Spec::new(
        OptionGroup::new()
            .with(FlagOption::new(["-a"]))
            .with(Remainder::new()),
    )
    .unwrap();
    let args = spec.parse(["--", "a", "-7", "--c"]).unwrap();
    assert_eq!(strings(args.get_list(REMAINDER_KEY).unwrap()), ["a", "-7", "--c"]);
    assert!(!args.flag("a"));
}

#[test]
fn remainder_suffix_is_not_normalized() {
    let spec = Spec::new(OptionGroup::new().with(Remainder::new())).unwrap();
    let args = spec.parse(["--", "-abc", "--x=y=z"]).unwrap();
    assert_eq!(strings(args.get_list("--").unwrap()), ["-abc", "--x=y=z"]);
}

#[test]
fn until_collection_leaves_terminator_for_siblings() {
    let spec = Spec::new(
        OptionGroup::new()
            .with(ValueOption::new(["--exec"]).until(["-p"]).optional())
            .with(FlagOption::new(["-p"])),
    )
    .unwrap();
    let args = spec.parse(["--exec", "rm", "-rf", "-p"]).unwrap();
    assert_eq!(strings(args.get_list("exec").unwrap()), ["rm", "-r", "-f"]);
    assert!(args.flag("p"));
}

#[test]
fn until_terminator_without_consumer_is_unrecognized() {
    let spec =
        Spec::new(OptionGroup::new().with(ValueOption::new(["--exec"]).until([";"]))).unwrap();
    let args = spec.parse_with(["--exec", "rm", ";"], record()).unwrap();
    assert_eq!(strings(args.get_list("exec").unwrap()), ["rm"]);
    assert_eq!(args.error_messages(), ["unrecognized argument ';'"]);
}

#[test]
fn until_collection_without_terminator() {
    let spec =
        Spec::new(OptionGroup::new().with(ValueOption::new(["--exec"]).until([";"]))).unwrap();
    let args = spec.parse_with(["--exec", "ls"], record()).unwrap();
    assert_eq!(
        args.error_messages(),
        [
            "option --exec needs an end-mark (;)",
            "unrecognized argument 'ls'",
            "--exec must be specified",
        ]
    );
}

// ---------------------------------------------------------------------------
// Error policies
// ---------------------------------------------------------------------------

#[test]
fn collect_mode_reports_errors_in_order() {
    let spec = Spec::new(
        OptionGroup::new().with(
            ValueOption::new(["-n"])
                .optional()
                .with_requirement(Requirement::one_of(["1", "2", "3"])),
        ),
    )
    .unwrap();
    let args = spec.parse_with(["-n", "a", "-x"], record()).unwrap();
    assert_eq!(
        args.errors(),
        &[
            ParseError::Validation {
                token: "a".to_string(),
                option: "-n".to_string(),
                type_name: None,
                reason: "must be one of 1, 2, 3".to_string(),
            },
            ParseError::Unrecognized("a".to_string()),
            ParseError::Unrecognized("-x".to_string()),
        ]
    );
}

#[test]
fn float_option_accepts_integer_enumeration() {
    let spec = Spec::new(OptionGroup::new().with(
        ValueOption::new(["--ratio"]).of::<f64>().with_requirement(Requirement::one_of([1, 2])),
    ))
    .unwrap();
    let args = spec.parse_with(["--ratio", "1"], record()).unwrap();
    assert!(args.is_clean(), "{:?}", args.error_messages());
    assert_eq!(args.get("ratio"), Some(&Value::Float(1.0)));
}

#[test]
fn collect_mode_with_unconvertible_value() {
    let spec = Spec::new(
        OptionGroup::new().with(ValueOption::new(["-n"]).of::<i64>().with_default(1)),
    )
    .unwrap();
    let args = spec.parse_with(["-n", "a"], record()).unwrap();
    assert_eq!(
        args.errors(),
        &[
            ParseError::Conversion {
                token: "a".to_string(),
                option: "-n".to_string(),
                type_name: "i64",
            },
            ParseError::Unrecognized("a".to_string()),
        ]
    );
    assert_eq!(args.get_int("n"), Some(1));
}

#[test]
fn collect_mode_with_invalid_enumeration_value() {
    let spec = Spec::new(
        OptionGroup::new().with(
            ValueOption::new(["-n"])
                .of::<i64>()
                .optional()
                .with_requirement(Requirement::one_of([1, 2, 3])),
        ),
    )
    .unwrap();
    let args = spec.parse_with(["-n", "7", "-x"], record()).unwrap();
    assert_eq!(
        args.error_messages(),
        [
            "invalid value '7' for -n (i64): must be one of 1, 2, 3",
            "unrecognized argument '7'",
            "unrecognized argument '-x'",
        ]
    );
}

#[test]
fn default_policy_exits_with_one() {
    let spec = Spec::new(OptionGroup::new().with(FlagOption::new(["-v"]))).unwrap();
    let code = Cell::new(None);
    let halt = spec
        .parse_with(["-w"], ParseOptions::new().with_exit(|c| code.set(Some(c))))
        .unwrap_err();
    assert_eq!(code.get(), Some(1));
    assert_eq!(halt.code(), Some(1));
}

#[test]
fn custom_exit_codes() {
    let spec = Spec::new(OptionGroup::new().with(Positional::new("file"))).unwrap();
    let code = Cell::new(None);

    let options = ParseOptions::new()
        .on_error(OnError::Exit(64))
        .with_exit(|c| code.set(Some(c)));
    let halt = spec.parse_with(Vec::<&str>::new(), options).unwrap_err();
    assert_eq!(code.get(), Some(64));
    assert_eq!(halt.error(), Some(&ParseError::MissingRequired("file".to_string())));

    let options = ParseOptions::new()
        .on_help(OnHelp::Exit(3))
        .with_exit(|c| code.set(Some(c)));
    spec.parse_with(["x", "--help"], options).unwrap_err();
    assert_eq!(code.get(), Some(3));
}

#[test]
fn help_wins_over_errors_in_the_scan() {
    let spec = Spec::new(OptionGroup::new().with(Positional::new("file"))).unwrap();
    let code = Cell::new(None);
    let halt = spec
        .parse_with(["--bogus", "-h"], ParseOptions::new().with_exit(|c| code.set(Some(c))))
        .unwrap_err();
    assert_eq!(halt, Halt::Help { code: Some(0) });
    assert_eq!(code.get(), Some(0));
}

// ---------------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------------

#[test]
fn one_spec_parses_on_many_threads() {
    let spec = Arc::new(
        Spec::new(
            OptionGroup::new()
                .with(ValueOption::new(["-n"]).of::<u32>())
                .with(Positional::new("name")),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..4u32)
        .map(|i| {
            let spec = Arc::clone(&spec);
            thread::spawn(move || {
                let n = i.to_string();
                let args = spec.parse(["-n", n.as_str(), "worker"]).unwrap();
                args.get_int("n")
            })
        })
        .collect();

    let mut seen: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    seen.sort();
    assert_eq!(seen, vec![Some(0), Some(1), Some(2), Some(3)]);
}
