//! Hand-off to the Dart toolchain for producing kernel binaries from source.

use anyhow::{Context, Result, ensure};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Compiles `source` into a kernel snapshot next to it and returns the
/// snapshot's path.
pub fn compile_to_kernel(dart: &Path, source: &Path) -> Result<PathBuf> {
    let output = source.with_extension("dill");
    log::info!("compiling {} -> {}", source.display(), output.display());

    let status = Command::new(dart)
        .arg(format!("--snapshot={}", output.display()))
        .arg("--snapshot-kind=kernel")
        .arg(source)
        .status()
        .with_context(|| format!("failed to run `{}`", dart.display()))?;
    ensure!(
        status.success(),
        "`{}` exited with {status} while compiling {}",
        dart.display(),
        source.display()
    );
    ensure!(
        output.exists(),
        "toolchain reported success but {} was not written",
        output.display()
    );
    Ok(output)
}
