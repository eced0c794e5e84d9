use chrono::Local;
use clap::{CommandFactory, Parser};
use std::process;
use zipcrack::cli::print_options_and_examples;
use zipcrack::{
    Cli, OutputFormatter, OutputMode, SearchSpec, SearchStatus, ZipCrack, ZipcrackError,
};

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.options {
        print_options_and_examples();
        return 0;
    }

    // No archive: show help, like invoking with no arguments at all.
    let Some(archive) = cli.archive.clone() else {
        let _ = Cli::command().print_help();
        println!();
        return 0;
    };

    let app = match ZipCrack::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    let phases = match build_phases(&cli) {
        Ok(phases) => phases,
        Err(e) => {
            app.handle_error(&e);
            return 1;
        }
    };

    let started_at = Local::now();
    match app.recover(&archive, &cli.dest, &phases) {
        Ok(result) => {
            app.output_formatter().print_search_result(&result, started_at);
            match result.status {
                SearchStatus::Found => 0,
                SearchStatus::Exhausted => 2,
                SearchStatus::Cancelled => 130,
            }
        }
        Err(e) => {
            app.handle_error(&e);
            1
        }
    }
}

/// Wordlist phase first when given, then brute force. Both absent is a
/// configuration error; so is a requested brute force with an empty
/// charset.
fn build_phases(cli: &Cli) -> Result<Vec<SearchSpec>, ZipcrackError> {
    let mut phases = Vec::new();

    if let Some(ref wordlist) = cli.wordlist {
        phases.push(SearchSpec::Wordlist {
            path: wordlist.clone(),
        });
    }

    if cli.brute_force_requested() {
        phases.push(SearchSpec::brute_force(cli.charset(), cli.length as usize)?);
    }

    if phases.is_empty() {
        return Err(ZipcrackError::Config {
            message: "no attack configured: provide a wordlist (-W) and/or select a brute-force \
                      charset (--lower, --upper, --numbers, --special, --custom)"
                .to_string(),
        });
    }

    Ok(phases)
}

fn print_startup_error(error: &ZipcrackError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
