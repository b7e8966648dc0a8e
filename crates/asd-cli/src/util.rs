use anyhow::Result;
use std::path::PathBuf;

pub fn validate_tsv_or_csv_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

/// Output paths only need a usable extension; the file is created later.
pub fn validate_output_extension(path: &str, allowed: &[&str]) -> Result<()> {
    let ext = PathBuf::from(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => anyhow::bail!(
            "Output file must have one of the extensions {:?}: {}",
            allowed,
            path
        ),
    }
}
