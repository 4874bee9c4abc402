//! Command-Line Argument Parsing (clap).

use crate::common::plot::{plot_clap, plot_subcommand, PlotConf};
use crate::common::*;

/// Clap result.
pub enum Clap {
    /// Plot mode.
    Plot(PlotConf),
    /// Conf mode. Second parameter is the file to dump the example
    /// configuration to.
    Conf(GConf, String),
}

/// Helpers for argument validation and parsing.
pub mod utils {
    /// Boolean of a string. Update `consts::clap::bool_format` if you change
    /// this.
    pub fn bool_of_str(s: &str) -> Option<bool> {
        match s {
            "on" | "true" => Some(true),
            "off" | "false" => Some(false),
            _ => None,
        }
    }

    /// Boolean validator.
    pub fn bool_validator(s: String) -> Result<(), String> {
        if bool_of_str(&s).is_some() {
            Ok(())
        } else {
            Err(format!(
                "expected `{}`, got `{}`",
                crate::consts::clap::bool_format,
                s
            ))
        }
    }

    /// Regex validator.
    pub fn regex_validator(s: String) -> Result<(), String> {
        ::regex::Regex::new(&s)
            .map(|_| ())
            .map_err(|e| format!("illegal regex `{}`: {}", s, e))
    }
}

/// The conf subcommand.
fn conf_subcommand<'a, 'b>() -> ::clap_lib::App<'a, 'b> {
    use clap_lib::*;

    SubCommand::with_name("conf")
        .about("Dumps an example figure configuration file.")
        .arg(
            Arg::with_name("FILE")
                .help("File to write the example configuration to")
                .value_name("file")
                .required(true)
                .index(1),
        )
}

/// The whole application.
fn main_app<'a, 'b>() -> ::clap_lib::App<'a, 'b> {
    use self::utils::*;
    use crate::consts::clap::*;
    use clap_lib::*;

    App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(
            "Aggregates SLOPE solver benchmark results and plots duality gap \
             convergence, faceted by parameter and dataset.",
        )
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Quiet output")
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .help("Verbose output"),
        )
        .arg(
            Arg::with_name("color")
                .long("--color")
                .help("(De)activates colored output")
                .takes_value(true)
                .validator(bool_validator)
                .value_name(bool_format),
        )
        .arg(
            Arg::with_name("ow_files")
                .short("f")
                .help("Overwrite existing files"),
        )
        .subcommand(plot_subcommand())
        .subcommand(conf_subcommand())
}

/// Global configuration from the top-level arguments.
fn gconf_of(matches: &::clap_lib::ArgMatches) -> Res<GConf> {
    let verb = if matches.is_present("quiet") {
        Verb::Quiet
    } else if matches.is_present("verbose") {
        Verb::Verbose
    } else {
        Verb::Normal
    };
    let colored = if let Some(color) = matches.value_of("color") {
        utils::bool_of_str(color)
            .ok_or_else(|| clap_err("color", format!("unexpected value `{}`", color)))?
    } else {
        ::atty::is(::atty::Stream::Stdout)
    };
    let ow_files = matches.is_present("ow_files");
    Ok(GConf::new(verb, colored, ow_files))
}

/// Parses the command-line arguments.
pub fn work() -> Res<Clap> {
    let matches = main_app().get_matches();
    let gconf = gconf_of(&matches)?;

    match matches.subcommand() {
        ("plot", Some(sub)) => plot_clap(gconf, sub).map(Clap::Plot),
        ("conf", Some(sub)) => {
            let file = sub
                .value_of("FILE")
                .ok_or_else(|| clap_err("FILE", "argument is mandatory"))?;
            Ok(Clap::Conf(gconf, file.path_subst()))
        }
        (name, _) => Err(clap_err(
            "subcommand",
            format!("unknown subcommand `{}`", name),
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bools() {
        assert_eq!(utils::bool_of_str("on"), Some(true));
        assert_eq!(utils::bool_of_str("off"), Some(false));
        assert_eq!(utils::bool_of_str("maybe"), None);
        assert!(utils::bool_validator("maybe".into()).is_err())
    }

    #[test]
    fn plot_arguments() {
        let matches = main_app()
            .get_matches_from_safe(vec![
                "slopeplot",
                "-q",
                "plot",
                "--metric",
                "max_relative",
                "--param",
                "path_length",
                "--order",
                "asc",
                "--to",
                "svg",
                "--run_gp",
                "off",
                "results",
                "out/bench.plot",
            ])
            .unwrap();
        let gconf = gconf_of(&matches).unwrap();
        assert!(gconf.quiet());
        let conf = match matches.subcommand() {
            ("plot", Some(sub)) => plot_clap(gconf, sub).unwrap(),
            _ => panic!("expected plot subcommand"),
        };
        assert_eq!(conf.results, "results");
        assert_eq!(conf.file, "out/bench.plot");
        assert!(!conf.run_gp);
        assert_eq!(conf.fmt, crate::common::plot::PlotFmt::Svg);
        assert_eq!(conf.figure.metric, crate::common::plot::Metric::MaxRelative);
        assert_eq!(conf.figure.order, crate::common::plot::Order::Asc);
        assert_eq!(conf.figure.extract.param.key, "path_length");
        assert_eq!(conf.figure.column_title, "Path length")
    }

    #[test]
    fn bad_arguments() {
        assert!(main_app()
            .get_matches_from_safe(vec!["slopeplot", "plot", "--metric", "nope", "a", "b"])
            .is_err());
        assert!(main_app()
            .get_matches_from_safe(vec!["slopeplot", "plot", "--filter", "(", "a", "b"])
            .is_err())
    }
}
