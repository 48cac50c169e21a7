//! `mesa seed` - write the demo restaurant to a snapshot file.

use anyhow::{Context, Result};
use chrono::Utc;
use mesa_store::seed::demo_snapshot;
use std::path::Path;

pub fn run_seed_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    let snapshot = demo_snapshot(Utc::now());
    snapshot
        .save(path)
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;

    println!("Seeded {}", path.display());
    println!("  Categories: {}", snapshot.categories.len());
    println!("  Products:   {}", snapshot.products.len());
    println!("  Banners:    {}", snapshot.banners.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesa_store::Snapshot;

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("mesa.json");

        run_seed_command(&path, false).unwrap();
        assert_eq!(Snapshot::load(&path).unwrap().categories.len(), 4);

        assert!(run_seed_command(&path, false).is_err());
        run_seed_command(&path, true).unwrap();
    }
}
