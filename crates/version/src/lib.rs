//! `build_version!()` expands to a string literal describing the build:
//! `"{branch}-{short hash}[-dirty]@{commit date}"`, or `"{crate version}-nogit"` when the
//! crate is built outside a git checkout.

extern crate proc_macro;
use std::{ops::Not, process::Command, str::FromStr};

use eyre::ensure;
use proc_macro::TokenStream;

fn git(args: &[&str]) -> eyre::Result<String> {
    let output = Command::new("git").args(args).output()?;
    ensure!(output.status.success(), "git {} exited with {}", args.join(" "), output.status);
    Ok(std::str::from_utf8(&output.stdout)?.trim().to_string())
}

fn describe_commit() -> eyre::Result<String> {
    let log = git(&["log", "-1", "--pretty=format:%h,%ad", "--date=format:%Y-%m-%d"])?;
    let (commit, date) = log.split_once(',').ok_or_else(|| eyre::eyre!("unexpected git log output: {log}"))?;

    let dirty = git(&["status", "-s"])?
        .is_empty()
        .not()
        .then(|| "-dirty".to_string())
        .unwrap_or_default();

    let branch = git(&["rev-parse", "--abbrev-ref", "HEAD"])?;

    Ok(format!("{branch}-{commit}{dirty}@{date}"))
}

#[proc_macro]
pub fn build_version(_item: TokenStream) -> TokenStream {
    let version = describe_commit().unwrap_or_else(|_| {
        let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
        format!("{pkg}-nogit")
    });

    // Debug formatting yields a valid, escaped Rust string literal.
    TokenStream::from_str(&format!("{version:?}")).unwrap_or_else(|_| TokenStream::from_str("\"unknown\"").unwrap_or_default())
}
