// Demonstration binary: declares a handful of typed options, parses the
// process arguments, and prints the resulting values and trailing arguments.

use argparse::{Opt, Parser, Ternary};

fn main() {
    let options = vec![
        Opt::help(),
        Opt::group("Basic options"),
        Opt::with_short::<char>('c', Some("char")),
        Opt::with_short::<Ternary>('r', Some("tern")),
        Opt::with_short::<bool>('f', Some("force"))
            .description("force to do")
            .default_val(true),
        Opt::group("More options"),
        Opt::with_short::<String>('p', Some("path")).description("path to read"),
        Opt::new::<f64>("float").description("num"),
        Opt::new::<i64>("num").description("selected num"),
    ];

    let mut parser = Parser::new(options)
        .usages(&[
            "test-argparse [options] [[--] args]",
            "test-argparse [options]",
        ])
        .description("description")
        .epilogue("more description");

    let rest = parser.parse_or_exit(std::env::args().collect());

    println!(
        "ternary: {}",
        parser.get::<Ternary>("tern").unwrap_or_default()
    );
    println!("force: {}", parser.get::<bool>("force").unwrap_or(false));
    println!(
        "path: {}",
        parser
            .get::<String>("path")
            .unwrap_or_else(|_| "(null)".to_string())
    );
    println!("num: {}", parser.get::<i64>("num").unwrap_or(0));
    println!("flt: {}", parser.get::<f64>("float").unwrap_or(0.0));
    println!(
        "char: {}",
        parser
            .get::<char>("char")
            .map(String::from)
            .unwrap_or_else(|_| "(none)".to_string())
    );

    println!("argc: {}", rest.len());
    for (i, arg) in rest.iter().enumerate() {
        println!("argv[{}]: {}", i, arg);
    }
}
