use std::{error::Error, io, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use school_finance::{
    PasswordHash, ValidatedPassword, initialize_db,
    user::{NewUser, Role, count_users, create_user},
};

/// A utility for adding a user who can log in to the school finance app.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: String,

    /// The email address the user logs in with.
    #[arg(long)]
    email: String,

    /// The user's display name.
    #[arg(long)]
    name: String,

    /// What the user is allowed to do, either ADMIN or STAFF.
    #[arg(long, default_value = "STAFF")]
    role: Role,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    println!("Creating {} user {}", args.role, args.email);

    let password_hash = match get_new_password_hash(&[&args.email, &args.name]) {
        Some(password_hash) => password_hash,
        None => return Ok(()),
    };

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    let user = match create_user(
        NewUser {
            email: args.email,
            name: args.name,
            password_hash,
            role: args.role,
        },
        &connection,
    ) {
        Ok(user) => user,
        Err(error) => {
            print_error(error);
            exit(1);
        }
    };

    println!("Created user {} with ID {}.", user.email, user.id);
    println!("The database now has {} user(s).", count_users(&connection)?);

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            print_error("Database path must include a file extension (e.g., 'school.db').");
            exit(1);
        }
    }
}

fn get_new_password_hash(user_inputs: &[&str]) -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = prompt_password("Enter a password: ")?;

        let validated_password = match ValidatedPassword::new(&first_password, user_inputs) {
            Ok(password) => password,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        let second_password = prompt_password("Enter the same password again: ")?;

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("Could not hash password: {error}. Try again."));
            }
        }
    }
}

/// Read a password from the terminal, or `None` if stdin was closed or unreadable.
fn prompt_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(string) => Some(string),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
