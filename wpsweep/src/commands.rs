use crate::CLAP_STYLING;
use clap::arg;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("wpsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wpsweep")
        .about("Probe a WordPress site for common misconfigurations")
        .styles(CLAP_STYLING)
        .arg(
            arg!([URL])
                .help("Base URL of the site to scan (http:// is assumed when no scheme is given)")
                .required_unless_present("list-checks"),
        )
        .arg(
            arg!(-c --"checks" <CHECKS>)
                .required(false)
                .help("Comma-separated probe names to run (default: all)"),
        )
        .arg(
            arg!(--"list-checks")
                .required(false)
                .help("List the available probes and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-A --"user-agent" <AGENT>)
                .required(false)
                .help("User-Agent header sent with every request"),
        )
        .arg(
            arg!(-r --"retries" <ATTEMPTS>)
                .required(false)
                .help("Attempts per request for server errors and network failures")
                .value_parser(clap::value_parser!(u32).range(1..))
                .default_value("5"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Per-attempt request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(--"backoff-ms" <MILLIS>)
                .required(false)
                .help("Delay between retry attempts in milliseconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("2000"),
        )
        .arg(
            arg!(-d --"deadline" <SECONDS>)
                .required(false)
                .help("Overall scan deadline in seconds; unfinished probes time out")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            arg!(-t --"concurrency" <NUM>)
                .required(false)
                .help("Concurrent requests inside multi-path probes and the sitemap crawler")
                .value_parser(clap::value_parser!(usize))
                .default_value("8"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save report to file (default: display to screen)"),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .required(false),
        )
}
