//! Deployment-readiness checks.
//!
//! Reports on the pieces a deployment needs: the CSV inputs (for `load`),
//! the built database file, and the API credential. Exits non-zero when a
//! piece required for serving is missing.

use crate::config::DatabaseConfig;

pub fn run_doctor_command(config: &DatabaseConfig) -> anyhow::Result<()> {
    println!("ridelens deployment check");
    println!("=========================");

    println!("\nCSV inputs (used by `ridelens load`):");
    for path in [
        config.demographics_csv(),
        config.riders_csv(),
        config.trips_csv(),
    ] {
        if path.exists() {
            println!("  ok      {}", path.display());
        } else {
            println!("  missing {}", path.display());
        }
    }

    let mut ready = true;

    println!("\nServing requirements:");
    if config.path.exists() {
        println!("  ok      database at {}", config.path.display());
    } else {
        println!(
            "  missing database at {} - run `ridelens load` first",
            config.path.display()
        );
        ready = false;
    }

    match std::env::var("OPENAI_API_KEY") {
        Ok(v) if !v.trim().is_empty() => println!("  ok      OPENAI_API_KEY is set"),
        _ => {
            println!("  missing OPENAI_API_KEY - set it in the environment or a .env file");
            ready = false;
        }
    }

    println!();
    if ready {
        println!("Ready to serve. Start with `ridelens run`.");
        Ok(())
    } else {
        anyhow::bail!("not ready to serve; fix the missing pieces above")
    }
}
