//! # Balance Demo
//!
//! Opens a window with the pros/cons balance and a few starting items.
//!
//! ## Usage:
//! ```bash
//! cargo run --example balance
//! cargo run --example balance -- path/to/scale.toml
//! ```
//!
//! ## Keys:
//! - `1`-`9`, `0`: weight of the next item (`0` is 10)
//! - `P` / `C`: add a pro / a con
//! - `Z` / `X`: remove the last pro / con
//! - `Delete`: clear both lists
//! - `Esc`: quit

use libra::{LibraApp, ScaleConfig, Side};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ScaleConfig::load(path)?,
        None => ScaleConfig::default(),
    };

    let mut app = LibraApp::new(config)?;
    let ledger = app.ledger_mut();
    ledger.add(Side::Pro, "Shorter commute", 8)?;
    ledger.add(Side::Pro, "Bigger team", 4)?;
    ledger.add(Side::Con, "Lower salary", 6)?;

    app.run()
}
