//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `profilebook_core` linkage end to end: open, register, list, login.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `profilebook_cli [db_path]`. Without a path the store is in memory.
//! The store is reset on every run. Set `PROFILEBOOK_LOG_DIR` to an absolute
//! directory to write core logs at the build's default level.

use profilebook_core::db::{open_db, open_db_in_memory};
use profilebook_core::{
    default_log_level, init_logging, AddressInput, AuthService, PersonInput, PersonService,
    SqlitePersonRepository,
};
use std::error::Error;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "PROFILEBOOK_LOG_DIR";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("profilebook_cli logging disabled: {err}");
        }
    }

    println!("profilebook_core ping={}", profilebook_core::ping());
    println!(
        "profilebook_core version={}",
        profilebook_core::core_version()
    );

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("profilebook_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), Box<dyn Error>> {
    let mut conn = match db_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => open_db(path)?,
        _ => open_db_in_memory()?,
    };

    let person = PersonInput {
        name: "Ann".to_string(),
        email: "Ann@X.com".to_string(),
        phone: "9876543210".to_string(),
        age: "30".to_string(),
        permanent_address: "123 Long Street Name".to_string(),
        password: "Abc123!".to_string(),
    };
    let address = AddressInput {
        communication_address: "456 Other Street Name".to_string(),
    };

    {
        let mut service = PersonService::new(SqlitePersonRepository::try_new(&mut conn)?);
        let id = service.create(&person, &address)?;
        println!("created person_id={id}");

        for listing in service.list_all()? {
            println!(
                "record id={} email={} phone={} communication_address={}",
                listing.person.id,
                listing.person.email,
                listing.person.phone,
                listing.communication_address.as_deref().unwrap_or("")
            );
        }
    }

    let auth = AuthService::new(SqlitePersonRepository::try_new(&mut conn)?);
    let matched = auth.authenticate("9876543210", "Abc123!")?;
    println!(
        "authenticate matched={}",
        matched.map_or_else(|| "none".to_string(), |view| view.id.to_string())
    );
    Ok(())
}
