//! Dumps the game API's OpenAPI document.
//!
//! `openapi [PATH]` writes the pretty-printed JSON to `PATH`, or to stdout
//! when no path is given, so it can be piped into client generators.

use guessing_api::web::rest::openapi_json;
use std::io::Write;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document = openapi_json()?;
    match std::env::args_os().nth(1) {
        Some(path) => {
            std::fs::write(&path, document)?;
            eprintln!("Wrote OpenAPI document to {}", path.to_string_lossy());
        }
        None => writeln!(std::io::stdout().lock(), "{document}")?,
    }
    Ok(())
}
