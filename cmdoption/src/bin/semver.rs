// Jar compatibility checker front end: one mode flag, two required jars.

use std::collections::BTreeSet;
use std::process::ExitCode;

use cmdoption::{HandlerError, Opt, OptionTable, Outcome, Parser};
use tracing::Level;

#[derive(Debug, Default)]
struct Config {
    help: bool,
    debug: bool,
    diff: bool,
    check: bool,
    infer: bool,
    validate: bool,
    base_jar: String,
    new_jar: String,
    includes: BTreeSet<String>,
    excludes: BTreeSet<String>,
    base_version: Option<String>,
    new_version: Option<String>,
}

fn split_into(set: &mut BTreeSet<String>, arg: &str) -> Result<(), HandlerError> {
    set.extend(arg.split(';').filter(|s| !s.is_empty()).map(str::to_string));
    Ok(())
}

fn options() -> OptionTable<Config> {
    let modes = OptionTable::new()
        .option(
            Opt::flag(&["--diff", "-d"], |c: &mut Config| &mut c.diff)
                .conflicts_with("--check")
                .conflicts_with("--infer")
                .conflicts_with("--validate")
                .description("Show the differences between two jars."),
        )
        .option(
            Opt::flag(&["--check", "-c"], |c: &mut Config| &mut c.check)
                .conflicts_with("--diff")
                .conflicts_with("--infer")
                .conflicts_with("--validate")
                .description("Check the compatibility of two jars."),
        )
        .option(
            Opt::flag(&["--infer", "-i"], |c: &mut Config| &mut c.infer)
                .requires("--base-version")
                .conflicts_with("--diff")
                .conflicts_with("--check")
                .conflicts_with("--validate")
                .description("Infer the version of the new jar based on the previous jar."),
        )
        .option(
            Opt::flag(&["--validate", "-v"], |c: &mut Config| &mut c.validate)
                .requires("--base-version")
                .requires("--new-version")
                .conflicts_with("--diff")
                .conflicts_with("--check")
                .conflicts_with("--infer")
                .description("Validate that the versions of two jars fulfil the semver rules."),
        );

    OptionTable::new()
        .option(
            Opt::flag(&["--help", "-h"], |c: &mut Config| &mut c.help)
                .help()
                .description("Show this help and exit."),
        )
        .option(
            Opt::flag(&["--debug"], |c: &mut Config| &mut c.debug)
                .description("Log option matching to stderr."),
        )
        .group("Modes:", modes)
        .option(
            Opt::text(&["--base-jar"], "JAR", |c: &mut Config| &mut c.base_jar)
                .required()
                .description("The base jar."),
        )
        .option(
            Opt::text(&["--new-jar"], "JAR", |c: &mut Config| &mut c.new_jar)
                .required()
                .description("The new jar."),
        )
        .option(
            Opt::callback(&["--includes"], "INCLUDE;...", |c: &mut Config, arg: &str| {
                split_into(&mut c.includes, arg)
            })
            .unbounded()
            .description("Semicolon separated list of class names to include."),
        )
        .option(
            Opt::callback(&["--excludes"], "EXCLUDE;...", |c: &mut Config, arg: &str| {
                split_into(&mut c.excludes, arg)
            })
            .unbounded()
            .description("Semicolon separated list of class names to exclude."),
        )
        .option(
            Opt::optional_text(&["--base-version"], "VERSION", |c: &mut Config| &mut c.base_version)
                .description("Version of the base jar (given with --base-jar)."),
        )
        .option(
            Opt::optional_text(&["--new-version"], "VERSION", |c: &mut Config| &mut c.new_version)
                .description("Version of the new jar (given with --new-jar)."),
        )
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let parser = match Parser::builder("semver")
        .about("Semantic version validator.")
        .options(options())
        .build()
    {
        Ok(p) => p,
        Err(e) => {
            eprintln!("semver: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // a dry run decides the log level, so `--debug` counts only where the
    // parser matches it as an option
    let debug = matches!(
        parser.check(args.as_slice()),
        Ok(Outcome::Parsed(ref ledger)) if ledger.is_present("--debug")
    );
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if debug { Level::TRACE } else { Level::WARN })
        .init();

    let mut config = Config::default();
    match parser.parse(&mut config, args.as_slice()) {
        Ok(Outcome::Help(_)) => {
            print!("{}", parser.render_help());
            ExitCode::SUCCESS
        }
        Ok(Outcome::Parsed(_)) => {
            println!("{:#?}", config);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("semver: {}", e);
            eprintln!("Try 'semver --help' for more information.");
            ExitCode::FAILURE
        }
    }
}
