use std::path::PathBuf;
use std::process::Command;

/// Run `rustfmt` over generated files.
///
/// `MVIGEN_RUSTFMT_BIN` overrides the binary so tests can stub it without
/// touching `PATH`.
///
/// # Errors
///
/// Returns an error if `rustfmt` cannot be started or exits unsuccessfully.
pub fn format_files(files: &[PathBuf]) -> anyhow::Result<()> {
    let rs_files: Vec<&PathBuf> = files
        .iter()
        .filter(|f| f.extension().is_some_and(|e| e == "rs"))
        .collect();
    if rs_files.is_empty() {
        return Ok(());
    }
    let rustfmt_bin = std::env::var("MVIGEN_RUSTFMT_BIN").unwrap_or_else(|_| "rustfmt".to_string());

    let mut cmd = Command::new(rustfmt_bin);
    cmd.arg("--edition").arg("2021").args(rs_files);
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("rustfmt failed");
    }
    Ok(())
}
