//! Line-oriented terminal input.

use std::io::{self, BufRead, Write};

use anyhow::{Result, bail};

use portal_signin::state::{Toast, ToastLevel};

/// Print `label`, read one line, strip the newline.
///
/// Fails on end of input so a closed stdin ends the session.
pub fn ask(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

pub fn show_toasts(toasts: Vec<Toast>) {
    for toast in toasts {
        match toast.level {
            ToastLevel::Success => println!("  ✓ {}", toast.message),
            ToastLevel::Error => eprintln!("  ✗ {}", toast.message),
        }
    }
}
