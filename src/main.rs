use clap::Parser;
use std::process;
use text2flat::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    match commands::run(command) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("text2flat - Customer Data to Symphony Flat Users");
    println!("================================================");
    println!();
    println!("Work out which column of unlabeled customer data holds which field, and");
    println!("write the records in the flat user format loaded by loadflatuser.");
    println!();
    println!("USAGE:");
    println!("    text2flat <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    convert     Convert customer data into flat user records");
    println!("    detect      Report which column holds which field");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Convert with the default configuration, writing to stdout:");
    println!("    text2flat convert -i customers.csv > users.flat");
    println!();
    println!("    # Convert a pipe-delimited file, refusing ill-formed input:");
    println!("    text2flat convert -i customers.txt -c t2f.json -d '|' -o users.flat --strict");
    println!();
    println!("    # Inspect the column assignment as JSON:");
    println!("    text2flat detect -i customers.csv --format json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    text2flat <COMMAND> --help");
}
