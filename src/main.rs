use std::io::IsTerminal;
use std::process;

use clap::Parser;
use chart_lint::cli::Cli;
use chart_lint::formatter::{format_results, format_rules};
use chart_lint::lint::lint_charts;
use chart_lint::rules::RULES;

fn main() {
    let cli = Cli::parse();
    cli.init_logging();

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    if cli.list_rules {
        println!("{}", format_rules(RULES));
        return Ok(0);
    }

    let config = cli.lint_config()?;

    let results = lint_charts(&cli.charts, &config);

    let color = !cli.no_color && std::io::stdout().is_terminal();
    println!("{}", format_results(&results, cli.format, color));

    let failed = results.iter().any(|r| r.should_fail(&config));
    Ok(if failed { 1 } else { 0 })
}
