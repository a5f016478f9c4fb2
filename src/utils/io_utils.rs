use crate::utils::Result;

/// Runs `f` on the path `<output_prefix>.<output_suffix>`.
pub fn create_writer<T, F>(output_prefix: &str, output_suffix: &str, f: F) -> Result<T>
where
    F: FnOnce(&str) -> Result<T>,
{
    let output_path = format!("{}.{}", output_prefix, output_suffix);
    log::debug!("Writing {}", output_path);
    f(&output_path)
}
