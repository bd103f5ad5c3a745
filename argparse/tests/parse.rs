use argparse::{Error, Flow, Opt, Parser, Ternary};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn long_option_with_inline_value() {
    let mut parser = Parser::new(vec![Opt::new::<i32>("num")]);
    let rest = parser.parse(args(&["prog", "--num=42"])).unwrap();
    assert_eq!(parser.get::<i32>("num").unwrap(), 42);
    assert_eq!(rest, args(&["prog"]));
}

#[test]
fn long_option_with_separate_value() {
    let mut parser = Parser::new(vec![Opt::new::<String>("path")]);
    parser.parse(args(&["prog", "--path", "/tmp/x"])).unwrap();
    assert_eq!(parser.get::<String>("path").unwrap(), "/tmp/x");
}

#[test]
fn short_option_value_forms() {
    // Trailing cluster characters are the inline value; otherwise the next
    // token is consumed.
    let mut parser = Parser::new(vec![Opt::with_short::<i32>('n', Some("num"))]);
    parser.parse(args(&["prog", "-n5"])).unwrap();
    assert_eq!(parser.get::<i32>("num").unwrap(), 5);

    let mut parser = Parser::new(vec![Opt::with_short::<i32>('n', Some("num"))]);
    parser.parse(args(&["prog", "-n", "7"])).unwrap();
    assert_eq!(parser.get::<i32>("num").unwrap(), 7);
}

#[test]
fn float_round_trip() {
    let mut parser = Parser::new(vec![Opt::new::<f64>("ratio")]);
    parser.parse(args(&["prog", "--ratio=2.5"])).unwrap();
    assert_eq!(parser.get::<f64>("ratio").unwrap(), 2.5);
}

#[test]
fn malformed_float_is_rejected() {
    let mut parser = Parser::new(vec![Opt::new::<f64>("ratio")]);
    let err = parser.parse(args(&["prog", "--ratio=fast"])).unwrap_err();
    assert!(matches!(err, Error::BadFloat(_)));
}

#[test]
fn char_round_trip_and_length_check() {
    let mut parser = Parser::new(vec![Opt::with_short::<char>('c', Some("char"))]);
    parser.parse(args(&["prog", "-c", "x"])).unwrap();
    assert_eq!(parser.get::<char>("char").unwrap(), 'x');

    let mut parser = Parser::new(vec![Opt::with_short::<char>('c', Some("char"))]);
    let err = parser.parse(args(&["prog", "--char=ab"])).unwrap_err();
    assert!(matches!(err, Error::BadChar(_)));

    let mut parser = Parser::new(vec![Opt::with_short::<char>('c', Some("char"))]);
    let err = parser.parse(args(&["prog", "--char="])).unwrap_err();
    assert!(matches!(err, Error::BadChar(_)));
}

#[test]
fn hex_and_octal_prefixes() {
    let mut parser = Parser::new(vec![Opt::new::<i32>("num")]);
    parser.parse(args(&["prog", "--num=0x10"])).unwrap();
    assert_eq!(parser.get::<i32>("num").unwrap(), 16);

    let mut parser = Parser::new(vec![Opt::new::<i32>("num")]);
    parser.parse(args(&["prog", "--num=010"])).unwrap();
    assert_eq!(parser.get::<i32>("num").unwrap(), 8);
}

#[test]
fn unsigned_overflow_clamps_to_max() {
    let mut parser = Parser::new(vec![Opt::new::<u8>("count")]);
    let err = parser.parse(args(&["prog", "--count=300"])).unwrap_err();
    assert!(matches!(err, Error::OutOfRange(_)));
    // The clamped extreme is stored before the error returns.
    assert_eq!(parser.get::<u8>("count").unwrap(), 255);
}

#[test]
fn signed_underflow_clamps_to_min() {
    let mut parser = Parser::new(vec![Opt::new::<i8>("level")]);
    let err = parser.parse(args(&["prog", "--level=-300"])).unwrap_err();
    assert!(matches!(err, Error::OutOfRange(_)));
    assert_eq!(parser.get::<i8>("level").unwrap(), -128);
}

#[test]
fn negative_value_for_unsigned_clamps_to_max() {
    let mut parser = Parser::new(vec![Opt::new::<u16>("count")]);
    let err = parser.parse(args(&["prog", "--count=-1"])).unwrap_err();
    assert!(matches!(err, Error::OutOfRange(_)));
    assert_eq!(parser.get::<u16>("count").unwrap(), u16::MAX);
}

#[test]
fn trailing_garbage_after_numeral() {
    let mut parser = Parser::new(vec![Opt::new::<i32>("num")]);
    let err = parser.parse(args(&["prog", "--num=12abc"])).unwrap_err();
    assert!(matches!(err, Error::BadInteger(_)));
}

#[test]
fn missing_required_value() {
    let mut parser = Parser::new(vec![Opt::new::<i32>("num")]);
    let err = parser.parse(args(&["prog", "--num"])).unwrap_err();
    assert!(matches!(err, Error::MissingValue(_)));
}

#[test]
fn short_cluster_sets_all_flags() {
    let mut parser = Parser::new(vec![
        Opt::with_short::<bool>('a', None),
        Opt::with_short::<bool>('b', None),
        Opt::with_short::<bool>('c', None),
    ]);
    parser.parse(args(&["prog", "-abc"])).unwrap();
    assert_eq!(parser.get::<bool>("a").unwrap(), true);
    assert_eq!(parser.get::<bool>("b").unwrap(), true);
    assert_eq!(parser.get::<bool>("c").unwrap(), true);
}

#[test]
fn mixed_cluster_of_flags_and_value_option() {
    // Boolean matches must leave the cluster suffix intact; the value-taking
    // option then consumes what remains of the token.
    let mut parser = Parser::new(vec![
        Opt::with_short::<bool>('f', Some("force")),
        Opt::with_short::<i32>('n', Some("num")),
    ]);
    parser.parse(args(&["prog", "-fn5"])).unwrap();
    assert!(parser.get::<bool>("force").unwrap());
    assert_eq!(parser.get::<i32>("num").unwrap(), 5);

    let mut parser = Parser::new(vec![
        Opt::with_short::<bool>('f', Some("force")),
        Opt::with_short::<i32>('n', Some("num")),
    ]);
    parser.parse(args(&["prog", "-fn", "5"])).unwrap();
    assert!(parser.get::<bool>("force").unwrap());
    assert_eq!(parser.get::<i32>("num").unwrap(), 5);
}

#[test]
fn ternary_flag_in_cluster_keeps_following_options() {
    let mut parser = Parser::new(vec![
        Opt::with_short::<Ternary>('r', Some("tern")),
        Opt::with_short::<bool>('v', Some("verbose")),
    ]);
    parser.parse(args(&["prog", "-rv"])).unwrap();
    assert_eq!(parser.get::<Ternary>("tern").unwrap(), Ternary::Yes);
    assert!(parser.get::<bool>("verbose").unwrap());
}

#[test]
fn negation_of_boolean_long_option() {
    let mut parser = Parser::new(vec![Opt::new::<bool>("verbose")]);
    parser.parse(args(&["prog", "--verbose"])).unwrap();
    assert_eq!(parser.get::<bool>("verbose").unwrap(), true);

    let mut parser = Parser::new(vec![Opt::new::<bool>("verbose")]);
    parser.parse(args(&["prog", "--no-verbose"])).unwrap();
    assert_eq!(parser.get::<bool>("verbose").unwrap(), false);
}

#[test]
fn negation_disabled_makes_no_form_unknown() {
    let mut parser = Parser::new(vec![Opt::new::<bool>("verbose").no_negation()]);
    let err = parser.parse(args(&["prog", "--no-verbose"])).unwrap_err();
    assert!(matches!(err, Error::UnknownOption(ref t) if t == "--no-verbose"));
}

#[test]
fn ternary_states() {
    let tern = || Opt::with_short::<Ternary>('r', Some("tern")).default_val(Ternary::Unset);

    let mut parser = Parser::new(vec![tern()]);
    parser.parse(args(&["prog"])).unwrap();
    assert_eq!(parser.get::<Ternary>("tern").unwrap(), Ternary::Unset);

    let mut parser = Parser::new(vec![tern()]);
    parser.parse(args(&["prog", "--tern"])).unwrap();
    assert_eq!(parser.get::<Ternary>("tern").unwrap(), Ternary::Yes);

    let mut parser = Parser::new(vec![tern()]);
    parser.parse(args(&["prog", "--no-tern"])).unwrap();
    assert_eq!(parser.get::<Ternary>("tern").unwrap(), Ternary::No);
}

#[test]
fn unknown_long_option_reports_full_token() {
    let mut parser = Parser::new(vec![Opt::new::<bool>("verbose")]);
    let err = parser.parse(args(&["prog", "--bogus"])).unwrap_err();
    assert!(matches!(err, Error::UnknownOption(ref t) if t == "--bogus"));
}

#[test]
fn unknown_short_option_reports_full_token() {
    let mut parser = Parser::new(vec![Opt::with_short::<bool>('a', None)]);
    let err = parser.parse(args(&["prog", "-ax"])).unwrap_err();
    assert!(matches!(err, Error::UnknownOption(ref t) if t == "-ax"));
}

#[test]
fn double_dash_terminates_option_scanning() {
    let mut parser = Parser::new(vec![]);
    let rest = parser.parse(args(&["prog", "--", "-x", "-y"])).unwrap();
    assert_eq!(rest, args(&["prog", "-x", "-y"]));
}

#[test]
fn plain_arguments_are_compacted_in_order() {
    let mut parser = Parser::new(vec![Opt::with_short::<bool>('v', Some("verbose"))]);
    let rest = parser.parse(args(&["prog", "a", "-v", "b"])).unwrap();
    assert_eq!(rest, args(&["prog", "a", "b"]));
    assert_eq!(parser.get::<bool>("verbose").unwrap(), true);
}

#[test]
fn stop_at_first_non_option() {
    let mut parser = Parser::new(vec![Opt::new::<bool>("flag")]).stop_at_non_option();
    let rest = parser.parse(args(&["cmd", "sub", "--flag"])).unwrap();
    assert_eq!(rest, args(&["cmd", "sub", "--flag"]));
    assert!(!parser.is_present("flag"));
}

#[test]
fn bare_dash_is_a_plain_argument() {
    let mut parser = Parser::new(vec![]);
    let rest = parser.parse(args(&["prog", "-", "x"])).unwrap();
    assert_eq!(rest, args(&["prog", "-", "x"]));
}

#[test]
fn defaults_and_presence() {
    let mut parser = Parser::new(vec![Opt::new::<i32>("num").default_val(9)]);
    parser.parse(args(&["prog"])).unwrap();
    assert_eq!(parser.get::<i32>("num").unwrap(), 9);
    assert!(!parser.is_present("num"));

    let mut parser = Parser::new(vec![Opt::new::<i32>("num").default_val(9)]);
    parser.parse(args(&["prog", "--num=3"])).unwrap();
    assert_eq!(parser.get::<i32>("num").unwrap(), 3);
    assert!(parser.is_present("num"));
}

#[test]
fn mismatched_default_kind_is_a_descriptor_error() {
    let mut parser = Parser::new(vec![Opt::new::<i32>("num").default_val("nine")]);
    let err = parser.parse(args(&["prog"])).unwrap_err();
    assert!(matches!(err, Error::BadDescriptor(_)));
}

#[test]
fn callback_can_stop_cluster_processing() {
    let mut parser = Parser::new(vec![
        Opt::with_short::<bool>('a', None).callback(|_, _| Ok(Flow::Stop)),
        Opt::with_short::<bool>('b', None),
    ]);
    parser.parse(args(&["prog", "-ab"])).unwrap();
    assert!(parser.is_present("a"));
    assert!(!parser.is_present("b"));
}

#[test]
fn callback_sees_stored_value() {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    let seen = Arc::new(AtomicI64::new(0));
    let seen_by_cb = seen.clone();
    let mut parser = Parser::new(vec![Opt::new::<i64>("num").callback(move |parser, opt| {
        assert_eq!(opt.long_name(), Some("num"));
        seen_by_cb.store(parser.get::<i64>("num")?, Ordering::SeqCst);
        Ok(Flow::Continue)
    })]);
    parser.parse(args(&["prog", "--num=11"])).unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 11);
}

#[test]
fn usage_aligns_help_text_across_name_lengths() {
    let parser = Parser::new(vec![
        Opt::group("Basic options"),
        Opt::with_short::<bool>('f', Some("force")).description("first help"),
        Opt::new::<String>("much-longer-name").description("second help"),
    ])
    .usages(&["prog [options]"])
    .description("a demo");

    let mut buf = Vec::new();
    parser.write_usage(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.starts_with("Usage: prog [options]\n"));
    assert!(text.contains("\n\nBasic options\n"));

    let lines: Vec<&str> = text.lines().collect();
    let first = lines
        .iter()
        .find(|l| l.contains("first help"))
        .expect("missing option line");
    let second = lines
        .iter()
        .find(|l| l.contains("second help"))
        .expect("missing option line");
    assert_eq!(first.find("first help"), second.find("second help"));
}

#[test]
fn usage_lists_extra_usage_lines_with_or_prefix() {
    let parser = Parser::new(vec![])
        .usages(&["prog [options]", "prog --other"])
        .epilogue("closing words");

    let mut buf = Vec::new();
    parser.write_usage(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.contains("Usage: prog [options]\n"));
    assert!(text.contains("   or: prog --other\n"));
    assert!(text.trim_end().ends_with("closing words"));
}
