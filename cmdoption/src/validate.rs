//! Post-scan constraint checks over a [`Ledger`].

use tracing::debug;

use crate::dispatch::Ledger;
use crate::error::{Violation, Violations};
use crate::model::OptionModel;

/// Check multiplicity, dependencies and conflicts of every option.
///
/// All violations are collected, in declaration order.
pub(crate) fn validate<T>(model: &OptionModel<T>, ledger: &Ledger) -> Result<(), Violations> {
    let mut found = Vec::new();

    for (idx, opt) in model.options().iter().enumerate() {
        let count = ledger.count_at(idx);
        let option = opt.display_name();

        if count < opt.min_count() {
            found.push(Violation::MissingRequiredOption {
                option: option.to_string(),
                min: opt.min_count(),
                found: count,
            });
        }
        if let Some(max) = opt.max_count() {
            if count > max {
                found.push(Violation::TooManyOccurrences {
                    option: option.to_string(),
                    max,
                    found: count,
                });
            }
        }
        if count == 0 {
            continue;
        }

        for (name, target) in &opt.requires {
            if ledger.count_at(*target) == 0 {
                found.push(Violation::MissingRequiredDependency {
                    option: option.to_string(),
                    required: name.clone(),
                });
            }
        }
        for (name, target) in &opt.conflicts_with {
            if ledger.count_at(*target) > 0 {
                found.push(Violation::ConflictingOptions {
                    option: option.to_string(),
                    conflicting: name.clone(),
                });
            }
        }
    }

    match Violations::new(found) {
        Some(violations) => {
            debug!(count = violations.len(), "constraint check failed");
            Err(violations)
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::error::{ParseError, Violation};
    use crate::handler::HandlerRegistry;
    use crate::model::OptionModel;
    use crate::table::{Opt, OptionTable};

    #[derive(Default)]
    struct Check {
        diff: bool,
        check: bool,
        infer: bool,
        base: Option<String>,
        new: Option<String>,
    }

    fn model() -> OptionModel<Check> {
        let table = OptionTable::new()
            .option(
                Opt::flag(&["--diff", "-d"], |c: &mut Check| &mut c.diff)
                    .conflicts_with("--check")
                    .conflicts_with("--infer"),
            )
            .option(
                Opt::flag(&["--check", "-c"], |c: &mut Check| &mut c.check)
                    .conflicts_with("--diff")
                    .conflicts_with("--infer"),
            )
            .option(
                Opt::flag(&["--infer", "-i"], |c: &mut Check| &mut c.infer)
                    .requires("--base-version")
                    .conflicts_with("--diff")
                    .conflicts_with("--check"),
            )
            .option(Opt::optional_text(&["--base-version"], "VERSION", |c: &mut Check| &mut c.base))
            .option(Opt::optional_text(&["--new-version"], "VERSION", |c: &mut Check| &mut c.new));
        OptionModel::build(table, &HandlerRegistry::default()).unwrap()
    }

    fn check(args: &[&str]) -> Result<(), Vec<Violation>> {
        model()
            .check(args, &ParserConfig::new("semver"))
            .map(|_| ())
            .map_err(|e| match e {
                ParseError::Invalid(v) => v.into_vec(),
                other => panic!("unexpected scan error {:?}", other),
            })
    }

    #[test]
    fn requires_holds_when_target_present() {
        assert_eq!(check(&["--infer", "--base-version", "1.0.0"]), Ok(()));
    }

    #[test]
    fn missing_dependency() {
        assert_eq!(
            check(&["-i"]),
            Err(vec![Violation::MissingRequiredDependency {
                option: "--infer".into(),
                required: "--base-version".into(),
            }])
        );
    }

    #[test]
    fn dependency_only_checked_when_present() {
        assert_eq!(check(&["--new-version", "2.0.0"]), Ok(()));
    }

    #[test]
    fn conflicts_reported_from_both_sides() {
        assert_eq!(
            check(&["--diff", "--check"]),
            Err(vec![
                Violation::ConflictingOptions {
                    option: "--diff".into(),
                    conflicting: "--check".into(),
                },
                Violation::ConflictingOptions {
                    option: "--check".into(),
                    conflicting: "--diff".into(),
                },
            ])
        );
    }

    #[test]
    fn all_violations_are_collected() {
        let found = check(&["-d", "-i", "-i"]).unwrap_err();
        assert_eq!(
            found,
            vec![
                Violation::ConflictingOptions {
                    option: "--diff".into(),
                    conflicting: "--infer".into(),
                },
                Violation::TooManyOccurrences {
                    option: "--infer".into(),
                    max: 1,
                    found: 2,
                },
                Violation::MissingRequiredDependency {
                    option: "--infer".into(),
                    required: "--base-version".into(),
                },
                Violation::ConflictingOptions {
                    option: "--infer".into(),
                    conflicting: "--diff".into(),
                },
            ]
        );
    }
}
