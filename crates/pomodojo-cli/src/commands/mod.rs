pub mod config;
pub mod history;
pub mod preferences;
pub mod session;

use serde::Serialize;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
