// Version-control style front end with commands.

use std::collections::BTreeMap;
use std::process::ExitCode;

use cmdoption::{Binding, Cmd, Opt, OptionTable, Outcome, Parser};
use tracing::Level;

#[derive(Debug, Default)]
struct Vcs {
    help: bool,
    debug: bool,
    verbose: bool,
    quiet: bool,
    work_dir: Option<String>,
    settings: BTreeMap<String, String>,
    push: Option<Push>,
    status: Option<Status>,
    commit: Option<Commit>,
}

#[derive(Debug, Default)]
struct Push {
    help: bool,
    remote: String,
    force: bool,
    refs: Vec<String>,
}

#[derive(Debug, Default)]
struct Status {
    short: bool,
}

#[derive(Debug, Default)]
struct Commit {
    help: bool,
    message: Vec<String>,
    all: bool,
    depth: u32,
    paths: Vec<String>,
}

fn push_options() -> OptionTable<Push> {
    OptionTable::new()
        .option(Opt::flag(&["--help", "-h"], |p: &mut Push| &mut p.help).help())
        .option(
            Opt::text(&["--remote"], "REMOTE", |p: &mut Push| &mut p.remote)
                .required()
                .description("Remote to push to."),
        )
        .option(
            Opt::flag(&["--force", "-f"], |p: &mut Push| &mut p.force)
                .description("Overwrite remote refs."),
        )
        .option(
            Opt::parameter("REF", Binding::List(|p: &mut Push| &mut p.refs))
                .unbounded()
                .description("Refs to push."),
        )
}

fn commit_options() -> OptionTable<Commit> {
    OptionTable::new()
        .option(Opt::flag(&["--help", "-h"], |c: &mut Commit| &mut c.help).help())
        .option(
            Opt::list(&["--message", "-m"], "MSG", |c: &mut Commit| &mut c.message)
                .required()
                .description("Message paragraph; may be repeated."),
        )
        .option(
            Opt::flag(&["--all", "-a"], |c: &mut Commit| &mut c.all)
                .description("Commit every modified file."),
        )
        .option(
            Opt::value(&["--depth"], "N", |c: &mut Commit| &mut c.depth)
                .hidden(),
        )
        .option(
            Opt::parameter("PATH", Binding::List(|c: &mut Commit| &mut c.paths))
                .unbounded()
                .description("Files to commit."),
        )
}

fn options() -> OptionTable<Vcs> {
    OptionTable::new()
        .option(
            Opt::flag(&["--help", "-h"], |v: &mut Vcs| &mut v.help)
                .help()
                .description("Show this help and exit."),
        )
        .option(Opt::flag(&["--debug"], |v: &mut Vcs| &mut v.debug).hidden())
        .option(
            Opt::flag(&["--verbose", "-v"], |v: &mut Vcs| &mut v.verbose)
                .conflicts_with("--quiet")
                .description("Say more."),
        )
        .option(
            Opt::flag(&["--quiet", "-q"], |v: &mut Vcs| &mut v.quiet)
                .description("Say less."),
        )
        .option(
            Opt::optional_text(&["-C"], "DIR", |v: &mut Vcs| &mut v.work_dir)
                .description("Run as if started in DIR."),
        )
        .option(
            Opt::map(&["--set"], "KEY", "VALUE", |v: &mut Vcs| &mut v.settings)
                .description("Override a setting for this run."),
        )
        .command(
            Cmd::new(&["push"], push_options(), Push::default, |v: &mut Vcs, p: Push| {
                v.push = Some(p)
            })
            .description("Update remote refs."),
        )
        .command(
            Cmd::new(&["commit", "ci"], commit_options(), Commit::default, |v: &mut Vcs, c: Commit| {
                v.commit = Some(c)
            })
            .description("Record changes."),
        )
        .command(
            Cmd::new(
                &["status", "st"],
                OptionTable::new().option(
                    Opt::flag(&["--short", "-s"], |s: &mut Status| &mut s.short)
                        .description("Give the output in short format."),
                ),
                Status::default,
                |v: &mut Vcs, s: Status| v.status = Some(s),
            )
            .description("Show the working tree status."),
        )
        .default_command("status")
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let parser = match Parser::builder("vcs")
        .about("A tiny version control front end.")
        .epilogue("Commands accept --help for their own options.")
        .aggregate_short_options(true)
        .options(options())
        .build()
    {
        Ok(p) => p,
        Err(e) => {
            eprintln!("vcs: {}", e);
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

    let mut vcs = Vcs::default();
    match parser.parse(&mut vcs, args.as_slice()) {
        Ok(Outcome::Help(request)) => {
            if request.command_path.is_empty() {
                print!("{}", parser.render_help());
            } else {
                print!("{}", request.page.render(parser.config().help_width));
            }
            ExitCode::SUCCESS
        }
        Ok(Outcome::Parsed(ledger)) => {
            if let Some(command) = ledger.command() {
                println!("command: {}", command);
            }
            println!("{:#?}", vcs);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("vcs: {}", e);
            ExitCode::FAILURE
        }
    }
}
