//! Reading and writing the flat JSON files every store is backed by.
//!
//! There is deliberately nothing clever here: a write replaces the whole file
//! and the last writer wins.

use {
	color_eyre::{eyre::WrapErr, Result},
	serde::{de::DeserializeOwned, Serialize},
	std::path::Path,
};

/// Reads and deserializes a whole JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
	let raw = std::fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read `{}`.", path.display()))?;

	serde_json::from_str(&raw).wrap_err_with(|| format!("Failed to parse `{}`.", path.display()))
}

/// Serializes `value` and replaces the file at `path` with it (pretty-printed,
/// UTF-8). Missing parent directories are created.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
	if let Some(dir) = path.parent() {
		std::fs::create_dir_all(dir)
			.wrap_err_with(|| format!("Failed to create `{}`.", dir.display()))?;
	}

	let raw = serde_json::to_string_pretty(value)?;

	std::fs::write(path, raw).wrap_err_with(|| format!("Failed to write `{}`.", path.display()))
}

#[cfg(test)]
mod tests {
	use {super::*, std::collections::BTreeMap};

	#[test]
	fn json_roundtrip() {
		let path = std::env::temp_dir().join("owbot-storage-roundtrip.json");
		let value = BTreeMap::from([(String::from("u1"), 30), (String::from("u2"), 50)]);

		write_json(&path, &value).unwrap();
		let loaded: BTreeMap<String, u64> = read_json(&path).unwrap();

		assert_eq!(loaded, value);
		std::fs::remove_file(&path).ok();
	}

	#[test]
	fn read_missing_file_fails() {
		let path = std::env::temp_dir().join("owbot-storage-does-not-exist.json");
		assert!(read_json::<Vec<u64>>(&path).is_err());
	}
}
