//! Generates the bcrypt `auth.password_hash` value for the settings file.

use std::io::{BufRead, Write};

use clap::Parser;

#[derive(Parser)]
#[command(name = "hash-password")]
#[command(about = "Hash an admin password for the console settings file")]
struct Cli {
    /// Bcrypt cost factor.
    #[arg(long, default_value_t = bcrypt::DEFAULT_COST)]
    cost: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    print!("Password: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin().lock().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);

    if password.is_empty() {
        return Err("password must not be empty".into());
    }

    let hash = bcrypt::hash(password, cli.cost)?;
    println!("{}", hash);
    Ok(())
}
