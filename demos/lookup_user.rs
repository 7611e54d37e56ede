use std::error::Error;
use std::fmt;
use xerror::{Identity, Report, Result, XError, init_process_rng};

#[derive(Debug, PartialEq)]
struct NoRowsFound;

impl fmt::Display for NoRowsFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("No rows found.")
    }
}

impl Error for NoRowsFound {}

#[derive(Debug)]
struct MissingUser {
    source: NoRowsFound,
}

impl fmt::Display for MissingUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No userid found in users table: {}", self.source)
    }
}

impl Error for MissingUser {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

fn find_user(_id: u32) -> Result<String> {
    let cause = MissingUser {
        source: NoRowsFound,
    };
    Err(XError::new(cause, Identity::Generate, "invalid userid"))
}

fn main() {
    // Seed the token generator once, before any error is built.
    init_process_rng();

    println!("--- Lookup User Example ---\n");

    match find_user(7) {
        Ok(name) => println!("found {}", name),
        Err(err) => {
            if err.has_cause(&NoRowsFound) {
                println!("1. [RENDERED] Generated codes render verbose:");
                print!("{}", err);

                println!("\n2. [EXTERNAL] What a client would see:");
                println!("   {}", err.render_compact());

                println!("\n3. [LOG] Written to stderr:");
                err.log();
            }
        }
    }
}
