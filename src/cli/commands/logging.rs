use clap::{Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .action(ArgAction::Count)
            .help("Verbosity level: ERROR (default), -v WARN, -vv INFO, -vvv DEBUG, -vvvv TRACE")
            .global(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Command {
        with_args(Command::new("test"))
    }

    #[test]
    fn test_verbosity_count() {
        let matches = base().try_get_matches_from(["test", "-vvv"]).unwrap();
        assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(3));
    }

    #[test]
    fn test_verbosity_default() {
        let matches = base().try_get_matches_from(["test"]).unwrap();
        assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(0));
    }
}
