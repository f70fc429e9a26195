//! patientdb CLI Client
//!
//! Interactive command line for a patientdb server.

use std::io::{self, BufRead, Write};

use clap::Parser;
use patientdb::client::{parse_input, render_reply, Client, ShellAction, HELP_TEXT};

/// patientdb CLI
#[derive(Parser, Debug)]
#[command(name = "patientdb-cli")]
#[command(about = "Interactive client for the patientdb server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9999")]
    server: String,
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Connection error: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Connected to {}", client.server());
    println!("Type 'HELP' for available commands or 'EXIT' to quit\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let input = match lines.next() {
            Some(Ok(input)) => input,
            // End of input behaves like EXIT
            _ => "EXIT".to_string(),
        };

        match parse_input(&input) {
            ShellAction::Empty => continue,
            ShellAction::Help => println!("{}", HELP_TEXT),
            ShellAction::Exit => {
                if let Err(e) = client.close() {
                    eprintln!("✗ Error while disconnecting: {}", e);
                }
                println!("✓ Disconnected");
                println!("Goodbye!");
                return;
            }
            ShellAction::Usage(hint) => println!("✗ {}", hint),
            ShellAction::Unknown(keyword) => {
                println!("✗ Unknown command: {}", keyword);
                println!("  Type 'HELP' for available commands");
            }
            ShellAction::Send { command, line } => match client.request(&line) {
                Ok(reply) => println!("{}", render_reply(command, &reply)),
                Err(e) => {
                    println!("✗ Connection error: {}", e);
                    return;
                }
            },
        }
    }
}
