//! Command-line checker for `.lng` translation bundles.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use lng_i18n::{
    ParseOutput,
    TransHeader,
    parse,
};
use serde::Serialize;

/// Machine-readable success summary for `--json`.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    header: &'a TransHeader,
    singular_entries: usize,
    plural_entries: usize,
    untranslated: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|arg| arg == "--json");
    let Some(path) = args.iter().find(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: lng-i18n <file.lng> [--json]");
        return ExitCode::from(2);
    };

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{path}: {err}");
            return ExitCode::from(2);
        }
    };

    match parse(&bytes) {
        Ok(output) => {
            report_success(path, &output, json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            if json {
                if let Ok(rendered) = serde_json::to_string(&err) {
                    println!("{rendered}");
                }
            } else {
                // 1-based for terminal display; the API itself is 0-based.
                eprintln!("{path}:{}:{}: {}", err.row + 1, err.col + 1, err.message);
            }
            ExitCode::FAILURE
        }
    }
}

fn report_success(path: &str, output: &ParseOutput, json: bool) {
    let untranslated = output.singular.values().filter(|translation| translation.is_empty()).count()
        + output.plural.values().filter(|forms| forms.is_empty()).count();

    if json {
        let summary = Summary {
            header: &output.header,
            singular_entries: output.singular.len(),
            plural_entries: output.plural.len(),
            untranslated,
        };
        if let Ok(rendered) = serde_json::to_string(&summary) {
            println!("{rendered}");
        }
    } else {
        println!(
            "{path}: {} [{}] ok: {} singular, {} plural, {} untranslated",
            output.header.language_name,
            output.header.locale,
            output.singular.len(),
            output.plural.len(),
            untranslated,
        );
    }
}
