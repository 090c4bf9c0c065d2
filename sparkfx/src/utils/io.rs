//! Effect file loading and saving

use anyhow::{Context, Result};
use fx_data::{BinaryValueReader, BinaryValueWriter};
use fx_particles::Effect;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read an effect definition from disk
pub fn load_effect(path: &Path) -> Result<Effect> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BinaryValueReader::new(BufReader::new(file))
        .with_context(|| format!("Failed to read effect header: {}", path.display()))?;
    let effect = Effect::read(&mut reader)
        .with_context(|| format!("Failed to read effect: {}", path.display()))?;

    log::debug!(
        "Loaded effect '{}' with {} emitters from {}",
        effect.name(),
        effect.emitters().len(),
        path.display()
    );
    Ok(effect)
}

/// Write an effect definition to disk, replacing any existing file
pub fn save_effect(effect: &Effect, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BinaryValueWriter::new(BufWriter::new(file))?;
    effect
        .write(&mut writer)
        .with_context(|| format!("Failed to write effect: {}", path.display()))?;
    writer.finish()?.flush()?;

    log::debug!("Saved effect '{}' to {}", effect.name(), path.display());
    Ok(())
}

/// Encode an effect into an in-memory buffer
pub fn encode_effect(effect: &Effect) -> Result<Vec<u8>> {
    let mut writer = BinaryValueWriter::new(Vec::new())?;
    effect.write(&mut writer)?;
    Ok(writer.finish()?)
}

/// Decode an effect from an in-memory buffer
pub fn decode_effect(bytes: &[u8]) -> Result<Effect> {
    let mut reader = BinaryValueReader::new(bytes)?;
    Ok(Effect::read(&mut reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_particles::{ConeShape, RectShape};
    use tempfile::TempDir;

    fn sample_effect() -> Effect {
        let mut effect = Effect::new("Sample");
        effect
            .create_emitter("Sparks", ConeShape::default())
            .unwrap();
        effect
            .create_emitter("Ground", RectShape::new(40, 10, true).unwrap())
            .unwrap();
        effect
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.fx");

        save_effect(&sample_effect(), &path).unwrap();
        let loaded = load_effect(&path).unwrap();

        assert_eq!(loaded.name(), "Sample");
        assert_eq!(loaded.emitters().len(), 2);
        assert_eq!(loaded.emitters()[1].name(), "Ground");
    }

    #[test]
    fn test_encode_decode() {
        let bytes = encode_effect(&sample_effect()).unwrap();
        let decoded = decode_effect(&bytes).unwrap();
        assert_eq!(encode_effect(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_effect(&dir.path().join("missing.fx")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
