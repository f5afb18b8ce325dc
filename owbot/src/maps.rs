//! The Overwatch 2 map catalog.
//!
//! Loaded once at startup from `mapData.json` and immutable for the lifetime
//! of the process. All queries are plain in-memory scans; the collection is a
//! few dozen records at most.

use {
	crate::storage,
	chrono::{Datelike, NaiveDate, Utc},
	fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher},
	serde::{Deserialize, Serialize},
	std::path::Path,
	tracing::warn,
};

/// Game mode of a map. The wire values are the community's own (Spanish)
/// labels, which is what `mapData.json` has always stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
	Control,

	#[serde(rename = "Escolta")]
	Escort,

	#[serde(rename = "Híbrido")]
	Hybrid,

	#[serde(rename = "Empuje")]
	Push,

	Clash,

	#[serde(rename = "Estadio")]
	Stadium,

	#[serde(rename = "Duelo")]
	Duel,

	Arcade,
}

impl MapKind {
	/// Embed color for this kind of map.
	pub const fn color(&self) -> (u8, u8, u8) {
		match self {
			Self::Control => (255, 153, 0),
			Self::Escort => (0, 153, 255),
			Self::Hybrid => (153, 0, 255),
			Self::Push => (0, 204, 102),
			Self::Clash => (255, 102, 0),
			Self::Stadium => (255, 204, 0),
			Self::Duel => (255, 51, 102),
			Self::Arcade => (102, 204, 255),
		}
	}
}

impl std::fmt::Display for MapKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Control => "Control",
			Self::Escort => "Escolta",
			Self::Hybrid => "Híbrido",
			Self::Push => "Empuje",
			Self::Clash => "Clash",
			Self::Stadium => "Estadio",
			Self::Duel => "Duelo",
			Self::Arcade => "Arcade",
		})
	}
}

/// How hard a map is to play well, as judged by the community.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MapDifficulty {
	#[serde(rename = "Baja")]
	Low,

	#[default]
	#[serde(rename = "Media")]
	Medium,

	#[serde(rename = "Media-Alta")]
	MediumHigh,

	#[serde(rename = "Alta")]
	High,
}

impl MapDifficulty {
	pub const fn stars(&self) -> &'static str {
		match self {
			Self::Low => "⭐",
			Self::Medium => "⭐⭐",
			Self::MediumHigh => "⭐⭐⭐",
			Self::High => "⭐⭐⭐⭐",
		}
	}
}

/// A single map record from `mapData.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInfo {
	pub id: u32,
	pub name: String,

	#[serde(rename = "type")]
	pub kind: MapKind,

	pub location: String,
	pub description: String,

	#[serde(default)]
	pub best_heroes: Vec<String>,

	#[serde(default)]
	pub worst_heroes: Vec<String>,

	#[serde(default)]
	pub difficulty: MapDifficulty,

	#[serde(default)]
	pub release_date: Option<NaiveDate>,

	#[serde(default)]
	pub additional_info: String,

	#[serde(default)]
	pub image_url: Option<String>,
}

impl MapInfo {
	pub fn release_year(&self) -> Option<i32> {
		self.release_date.map(|date| date.year())
	}

	pub fn best_heroes_list(&self) -> String {
		self.best_heroes.join(", ")
	}

	pub fn worst_heroes_list(&self) -> String {
		self.worst_heroes.join(", ")
	}
}

/// In-memory index over all maps. Rebuilt from `mapData.json` at startup.
#[derive(Debug)]
pub struct MapCatalog {
	maps: Vec<MapInfo>,
}

impl MapCatalog {
	/// Reads the backing file once. A missing or corrupt file yields an empty
	/// catalog instead of taking the process down.
	pub fn load(path: &Path) -> Self {
		match storage::read_json(path) {
			Ok(maps) => Self { maps },
			Err(why) => {
				warn!("Failed to load map data: {why:?}");
				Self { maps: Vec::new() }
			}
		}
	}

	pub const fn from_maps(maps: Vec<MapInfo>) -> Self {
		Self { maps }
	}

	pub fn all(&self) -> &[MapInfo] {
		&self.maps
	}

	pub fn is_empty(&self) -> bool {
		self.maps.is_empty()
	}

	pub fn get(&self, map_id: u32) -> Option<&MapInfo> {
		self.maps.iter().find(|map| map.id == map_id)
	}

	pub fn by_kind(&self, kind: MapKind) -> Vec<&MapInfo> {
		self.maps.iter().filter(|map| map.kind == kind).collect()
	}

	pub fn by_difficulty(&self, difficulty: MapDifficulty) -> Vec<&MapInfo> {
		self.maps
			.iter()
			.filter(|map| map.difficulty == difficulty)
			.collect()
	}

	pub fn by_best_hero(&self, hero: &str) -> Vec<&MapInfo> {
		let hero = hero.to_lowercase();
		self.maps
			.iter()
			.filter(|map| {
				map.best_heroes
					.iter()
					.any(|best| best.to_lowercase().contains(&hero))
			})
			.collect()
	}

	pub fn by_location(&self, term: &str) -> Vec<&MapInfo> {
		let term = term.to_lowercase();
		self.maps
			.iter()
			.filter(|map| map.location.to_lowercase().contains(&term))
			.collect()
	}

	pub fn by_release_year(&self, year: i32) -> Vec<&MapInfo> {
		self.maps
			.iter()
			.filter(|map| map.release_year() == Some(year))
			.collect()
	}

	/// Maps released in the current calendar year.
	pub fn recent(&self) -> Vec<&MapInfo> {
		self.by_release_year(Utc::now().year())
	}

	/// All distinct kinds, in the order they first appear.
	pub fn kinds(&self) -> Vec<MapKind> {
		let mut kinds = Vec::new();
		for map in &self.maps {
			if !kinds.contains(&map.kind) {
				kinds.push(map.kind);
			}
		}
		kinds
	}

	/// All distinct difficulties, in the order they first appear.
	pub fn difficulties(&self) -> Vec<MapDifficulty> {
		let mut difficulties = Vec::new();
		for map in &self.maps {
			if !difficulties.contains(&map.difficulty) {
				difficulties.push(map.difficulty);
			}
		}
		difficulties
	}

	/// Best fuzzy match for a map name, if any scores high enough.
	pub fn fuzzy_find(&self, name: &str) -> Option<&MapInfo> {
		let fzf = SkimMatcherV2::default();
		let name = name.to_lowercase();
		self.maps
			.iter()
			.filter_map(|map| {
				let score = fzf.fuzzy_match(&map.name.to_lowercase(), &name)?;
				(score > 50 || name.is_empty()).then_some((score, map))
			})
			.max_by(|(a_score, _), (b_score, _)| a_score.cmp(b_score))
			.map(|(_, map)| map)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn map(id: u32, name: &str, kind: MapKind, year: i32) -> MapInfo {
		MapInfo {
			id,
			name: name.to_owned(),
			kind,
			location: String::from("Somewhere"),
			description: String::new(),
			best_heroes: vec![String::from("Tracer"), String::from("D.Va")],
			worst_heroes: Vec::new(),
			difficulty: MapDifficulty::Medium,
			release_date: NaiveDate::from_ymd_opt(year, 6, 1),
			additional_info: String::new(),
			image_url: None,
		}
	}

	fn catalog() -> MapCatalog {
		MapCatalog::from_maps(vec![
			map(1, "Ilios", MapKind::Control, 2016),
			map(2, "Circuit Royal", MapKind::Escort, 2022),
			map(3, "Midtown", MapKind::Hybrid, 2022),
		])
	}

	#[test]
	fn filters_by_kind() {
		let catalog = catalog();
		let control = catalog.by_kind(MapKind::Control);
		assert_eq!(control.len(), 1);
		assert_eq!(control[0].name, "Ilios");
	}

	#[test]
	fn filters_by_best_hero_case_insensitive() {
		let catalog = catalog();
		assert_eq!(catalog.by_best_hero("tracer").len(), 3);
		assert_eq!(catalog.by_best_hero("Hanzo").len(), 0);
	}

	#[test]
	fn filters_by_release_year() {
		let catalog = catalog();
		assert_eq!(catalog.by_release_year(2022).len(), 2);
		assert_eq!(catalog.by_release_year(2016).len(), 1);
	}

	#[test]
	fn fuzzy_find_tolerates_typos() {
		let catalog = catalog();
		assert_eq!(catalog.fuzzy_find("circuit").map(|map| map.id), Some(2));
		assert!(catalog.fuzzy_find("qqqqqq").is_none());
	}

	#[test]
	fn distinct_kinds_and_difficulties_keep_first_seen_order() {
		let catalog = catalog();
		assert_eq!(
			catalog.kinds(),
			vec![MapKind::Control, MapKind::Escort, MapKind::Hybrid]
		);
		assert_eq!(catalog.difficulties(), vec![MapDifficulty::Medium]);
	}

	#[test]
	fn missing_file_yields_empty_catalog() {
		let path = std::env::temp_dir().join("owbot-maps-does-not-exist.json");
		let catalog = MapCatalog::load(&path);
		assert!(catalog.is_empty());
	}

	#[test]
	fn spanish_wire_values_deserialize() {
		let raw = r#"{
			"id": 7,
			"name": "Dorado",
			"type": "Escolta",
			"location": "México",
			"description": "Night-time payload escort.",
			"difficulty": "Media-Alta",
			"releaseDate": "2016-05-24"
		}"#;

		let map: MapInfo = serde_json::from_str(raw).unwrap();
		assert_eq!(map.kind, MapKind::Escort);
		assert_eq!(map.difficulty, MapDifficulty::MediumHigh);
		assert_eq!(map.release_year(), Some(2016));
		assert!(map.best_heroes.is_empty());
	}
}
