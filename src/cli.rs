//! Flags every deployment script accepts

use clap::{Arg, ArgAction, ArgMatches, Command};

/// Optional flags a caller can opt into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFlag {
    /// `--do_it`: without it the run is a dry run
    DoIt,
}

/// Add `--help`, `--production_aws` and any requested optional flags to `command`.
///
/// `--help` prints `about` (when non-empty) and the usage, then exits 0.
pub fn standard_args(command: Command, include: &[StandardFlag], about: &str) -> Command {
    let mut command = command.disable_help_flag(true);

    if !about.is_empty() {
        command = command.about(about.to_string());
    }

    command = command
        .arg(
            Arg::new("help")
                .long("help")
                .help("show this help")
                .action(ArgAction::Help),
        )
        .arg(
            Arg::new("production_aws")
                .long("production_aws")
                .help("use production (non-sandbox) AWS account")
                .action(ArgAction::SetTrue)
                .global(true),
        );

    if include.contains(&StandardFlag::DoIt) {
        command = command.arg(
            Arg::new("do_it")
                .long("do_it")
                .help("when missing, does a dry run")
                .action(ArgAction::SetTrue)
                .global(true),
        );
    }

    command
}

/// Values of the standard flags after parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardFlags {
    pub production_aws: bool,
    pub do_it: bool,
}

impl StandardFlags {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            production_aws: flag(matches, "production_aws"),
            do_it: flag(matches, "do_it"),
        }
    }

    pub fn dry_run(&self) -> bool {
        !self.do_it
    }
}

// Flags the caller did not opt into read as false
fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches
        .try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}
