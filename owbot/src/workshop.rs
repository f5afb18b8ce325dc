//! The community workshop-code catalog, backed by `workshopData.json`.

use {
	crate::storage,
	chrono::{NaiveDate, Utc},
	color_eyre::{eyre::bail, Result},
	regex::Regex,
	serde::{Deserialize, Serialize},
	std::path::{Path, PathBuf},
	tracing::warn,
};

/// Closed set of catalog categories. Wire values are the community's own
/// (Spanish) labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkshopCategory {
	#[serde(rename = "Entrenamiento")]
	Training,

	#[serde(rename = "Minijuegos")]
	Minigames,

	PvP,
	PvE,
	Parkour,

	#[serde(rename = "Supervivencia")]
	Survival,

	#[serde(rename = "Otros")]
	Other,
}

impl WorkshopCategory {
	/// Embed color for this category.
	pub const fn color(&self) -> (u8, u8, u8) {
		match self {
			Self::Training => (255, 153, 0),
			Self::Minigames => (0, 204, 255),
			Self::PvP => (255, 51, 102),
			Self::PvE => (51, 204, 51),
			Self::Parkour => (153, 51, 255),
			Self::Survival => (255, 102, 0),
			Self::Other => (153, 153, 153),
		}
	}

	const fn label(&self) -> &'static str {
		match self {
			Self::Training => "Entrenamiento",
			Self::Minigames => "Minijuegos",
			Self::PvP => "PvP",
			Self::PvE => "PvE",
			Self::Parkour => "Parkour",
			Self::Survival => "Supervivencia",
			Self::Other => "Otros",
		}
	}
}

impl std::fmt::Display for WorkshopCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.label())
	}
}

/// Running rating average. Only the aggregate is persisted, so individual
/// votes are anonymous and repeat votes cannot be told apart.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Ratings {
	pub average: f64,
	pub count: u32,
}

impl Ratings {
	/// Visual 5-slot star bar for the current average.
	pub fn stars(&self) -> String {
		let full = self.average.floor() as usize;
		let half = self.average - self.average.floor() >= 0.5;

		(0..5)
			.map(|slot| {
				if slot < full {
					'⭐'
				} else if slot == full && half {
					'✨'
				} else {
					'☆'
				}
			})
			.collect()
	}
}

fn default_author() -> String {
	String::from("Unknown")
}

fn default_heroes() -> Vec<String> {
	vec![String::from("All")]
}

fn default_difficulty() -> String {
	String::from("Media")
}

fn default_source() -> String {
	String::from("User Submitted")
}

/// One community-submitted workshop code with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopCode {
	pub id: u32,
	pub code: String,
	pub title: String,

	#[serde(default = "default_author")]
	pub author: String,

	#[serde(default)]
	pub description: String,

	pub category: WorkshopCategory,

	#[serde(default)]
	pub subcategory: String,

	#[serde(default = "default_heroes")]
	pub heroes: Vec<String>,

	#[serde(default = "default_difficulty")]
	pub difficulty: String,

	#[serde(default)]
	pub ratings: Ratings,

	pub date_added: NaiveDate,
	pub last_updated: NaiveDate,

	#[serde(default)]
	pub image_url: Option<String>,

	#[serde(default = "default_source")]
	pub source: String,

	#[serde(default)]
	pub source_url: String,

	#[serde(default)]
	pub tags: Vec<String>,

	#[serde(default)]
	pub popularity: u64,

	#[serde(default)]
	pub submitted_by: Option<String>,
}

impl WorkshopCode {
	/// Folds one vote into the running average and bumps the vote count.
	pub fn add_rating(&mut self, rating: u8) {
		let total = self.ratings.average * f64::from(self.ratings.count);
		self.ratings.count += 1;
		self.ratings.average = (total + f64::from(rating)) / f64::from(self.ratings.count);
		self.last_updated = Utc::now().date_naive();
	}

	/// Description clamped to embed-friendly length.
	pub fn short_description(&self) -> String {
		if self.description.chars().count() > 250 {
			let clipped = self.description.chars().take(247).collect::<String>();
			format!("{clipped}...")
		} else {
			self.description.clone()
		}
	}

	pub fn formatted_heroes(&self) -> String {
		self.heroes.join(", ")
	}

	pub fn formatted_tags(&self) -> String {
		self.tags
			.iter()
			.map(|tag| format!("#{tag}"))
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// Result of a rating mutation, for the confirmation reply.
#[derive(Debug, Clone, Copy)]
pub struct RatingSummary {
	pub average: f64,
	pub count: u32,
}

/// A new submission, before the catalog assigns it an id and timestamps.
#[derive(Debug, Clone)]
pub struct NewCode {
	pub code: String,
	pub title: String,
	pub author: String,
	pub description: String,
	pub category: WorkshopCategory,
	pub heroes: Vec<String>,
	pub tags: Vec<String>,
	pub submitted_by: String,
}

/// Wire shape of `workshopData.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkshopData {
	workshop_codes: Vec<WorkshopCode>,
}

/// Valid share codes are 5 or 6 uppercase alphanumerics.
pub fn validate_code(code: &str) -> bool {
	Regex::new(r"^[A-Z0-9]{5,6}$")
		.unwrap()
		.is_match(code)
}

/// In-memory index over all workshop codes. Mutations persist by rewriting
/// the whole backing file; a failed write leaves the in-memory state as it
/// was before the call.
#[derive(Debug)]
pub struct WorkshopCatalog {
	path: PathBuf,
	codes: Vec<WorkshopCode>,
	next_id: u32,
}

impl WorkshopCatalog {
	/// Reads `workshopData.json` once. A missing or corrupt file yields an
	/// empty catalog instead of taking the process down.
	pub fn load(path: &Path) -> Self {
		let data: WorkshopData = match storage::read_json(path) {
			Ok(data) => data,
			Err(why) => {
				warn!("Failed to load workshop data: {why:?}");
				WorkshopData::default()
			}
		};

		let next_id = data
			.workshop_codes
			.iter()
			.map(|code| code.id)
			.max()
			.map_or(1, |max| max + 1);

		Self {
			path: path.to_owned(),
			codes: data.workshop_codes,
			next_id,
		}
	}

	pub fn all(&self) -> &[WorkshopCode] {
		&self.codes
	}

	pub fn len(&self) -> usize {
		self.codes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.codes.is_empty()
	}

	pub fn get(&self, id: u32) -> Option<&WorkshopCode> {
		self.codes.iter().find(|code| code.id == id)
	}

	pub fn by_code(&self, share_code: &str) -> Option<&WorkshopCode> {
		self.codes
			.iter()
			.find(|code| code.code.eq_ignore_ascii_case(share_code))
	}

	/// Case-insensitive substring match over title, description, code and
	/// tags.
	pub fn search(&self, term: &str) -> Vec<&WorkshopCode> {
		let term = term.to_lowercase();
		if term.is_empty() {
			return Vec::new();
		}

		self.codes
			.iter()
			.filter(|code| {
				code.title.to_lowercase().contains(&term)
					|| code.description.to_lowercase().contains(&term)
					|| code.code.to_lowercase().contains(&term)
					|| code.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
			})
			.collect()
	}

	/// Matches the category itself or a record's free-form subcategory.
	pub fn by_category(&self, category: WorkshopCategory) -> Vec<&WorkshopCode> {
		self.codes
			.iter()
			.filter(|code| {
				code.category == category
					|| code.subcategory.eq_ignore_ascii_case(category.label())
			})
			.collect()
	}

	/// Codes built for the given hero. The `"All"` sentinel on a record
	/// matches every hero.
	pub fn by_hero(&self, hero: &str) -> Vec<&WorkshopCode> {
		self.codes
			.iter()
			.filter(|code| {
				code.heroes
					.iter()
					.any(|entry| entry == "All" || entry.eq_ignore_ascii_case(hero))
			})
			.collect()
	}

	pub fn popular(&self, limit: usize) -> Vec<&WorkshopCode> {
		let mut codes = self.codes.iter().collect::<Vec<_>>();
		codes.sort_by(|a, b| b.popularity.cmp(&a.popularity));
		codes.truncate(limit);
		codes
	}

	pub fn newest(&self, limit: usize) -> Vec<&WorkshopCode> {
		let mut codes = self.codes.iter().collect::<Vec<_>>();
		codes.sort_by(|a, b| b.date_added.cmp(&a.date_added));
		codes.truncate(limit);
		codes
	}

	/// Best rated codes with at least 3 votes.
	pub fn top_rated(&self, limit: usize) -> Vec<&WorkshopCode> {
		let mut codes = self
			.codes
			.iter()
			.filter(|code| code.ratings.count >= 3)
			.collect::<Vec<_>>();
		codes.sort_by(|a, b| b.ratings.average.total_cmp(&a.ratings.average));
		codes.truncate(limit);
		codes
	}

	/// Validates and stores a new submission, assigning the next id and
	/// today's timestamps.
	pub fn add(&mut self, submission: NewCode) -> Result<&WorkshopCode> {
		if !validate_code(&submission.code) {
			bail!("Invalid share code `{}`.", submission.code);
		}

		if self.by_code(&submission.code).is_some() {
			bail!("Share code `{}` already exists.", submission.code);
		}

		let today = Utc::now().date_naive();
		let record = WorkshopCode {
			id: self.next_id,
			code: submission.code,
			title: submission.title,
			author: submission.author,
			description: submission.description,
			category: submission.category,
			subcategory: String::new(),
			heroes: submission.heroes,
			difficulty: default_difficulty(),
			ratings: Ratings::default(),
			date_added: today,
			last_updated: today,
			image_url: None,
			source: default_source(),
			source_url: String::new(),
			tags: submission.tags,
			popularity: 0,
			submitted_by: Some(submission.submitted_by),
		};

		self.codes.push(record);
		if let Err(why) = self.save() {
			self.codes.pop();
			return Err(why);
		}
		self.next_id += 1;

		Ok(self.codes.last().expect("just pushed"))
	}

	/// Folds one 1-5 vote into a code's running average.
	pub fn rate(&mut self, share_code: &str, rating: u8) -> Result<RatingSummary> {
		if !(1..=5).contains(&rating) {
			bail!("Rating must be between 1 and 5.");
		}

		let index = self
			.codes
			.iter()
			.position(|code| code.code.eq_ignore_ascii_case(share_code));
		let Some(index) = index else {
			bail!("No workshop code `{share_code}`.");
		};

		let before = self.codes[index].clone();
		self.codes[index].add_rating(rating);

		if let Err(why) = self.save() {
			self.codes[index] = before;
			return Err(why);
		}

		let ratings = self.codes[index].ratings;
		Ok(RatingSummary { average: ratings.average, count: ratings.count })
	}

	/// Counts one detail view.
	pub fn bump_popularity(&mut self, share_code: &str) -> Result<()> {
		let index = self
			.codes
			.iter()
			.position(|code| code.code.eq_ignore_ascii_case(share_code));
		let Some(index) = index else {
			bail!("No workshop code `{share_code}`.");
		};

		self.codes[index].popularity += 1;
		if let Err(why) = self.save() {
			self.codes[index].popularity -= 1;
			return Err(why);
		}

		Ok(())
	}

	fn save(&self) -> Result<()> {
		let data = WorkshopData { workshop_codes: self.codes.clone() };
		storage::write_json(&self.path, &data)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn catalog(name: &str) -> WorkshopCatalog {
		let path = std::env::temp_dir().join(format!(
			"owbot-workshop-{name}-{}.json",
			std::process::id(),
		));
		std::fs::remove_file(&path).ok();
		WorkshopCatalog::load(&path)
	}

	fn submission(code: &str, title: &str, category: WorkshopCategory) -> NewCode {
		NewCode {
			code: code.to_owned(),
			title: title.to_owned(),
			author: String::from("Author#1234"),
			description: String::from("A custom game mode."),
			category,
			heroes: vec![String::from("All")],
			tags: vec![String::from("aim")],
			submitted_by: String::from("1234567890"),
		}
	}

	#[test]
	fn code_validation_is_exact() {
		assert!(validate_code("ABCDE"));
		assert!(validate_code("AB12C6"));
		assert!(!validate_code("abcde"));
		assert!(!validate_code("AB12"));
		assert!(!validate_code("ABCDEFG"));
		assert!(!validate_code("ABC-D"));
	}

	#[test]
	fn add_assigns_monotonic_ids() {
		let mut catalog = catalog("add-ids");

		let first = catalog.add(submission("ABCDE", "Aim Trainer", WorkshopCategory::Training)).unwrap().id;
		let second = catalog.add(submission("FGHIJ", "Parkour Run", WorkshopCategory::Parkour)).unwrap().id;

		assert_eq!(first, 1);
		assert_eq!(second, 2);
	}

	#[test]
	fn add_rejects_short_code_and_leaves_store_unchanged() {
		let mut catalog = catalog("add-short");
		assert!(catalog.add(submission("AB12", "Bad", WorkshopCategory::Other)).is_err());
		assert_eq!(catalog.len(), 0);
	}

	#[test]
	fn add_rejects_duplicate_code_and_leaves_store_unchanged() {
		let mut catalog = catalog("add-dup");
		catalog.add(submission("ABCDE", "First", WorkshopCategory::PvP)).unwrap();

		assert!(catalog.add(submission("ABCDE", "Second", WorkshopCategory::PvP)).is_err());
		assert_eq!(catalog.len(), 1);
	}

	#[test]
	fn rating_updates_running_average() {
		let mut catalog = catalog("rate");
		catalog.add(submission("ABCDE", "Aim Trainer", WorkshopCategory::Training)).unwrap();

		// avg 4.0 over two votes
		catalog.rate("ABCDE", 4).unwrap();
		catalog.rate("ABCDE", 4).unwrap();

		let summary = catalog.rate("ABCDE", 5).unwrap();
		assert_eq!(summary.count, 3);
		assert!((summary.average - 13.0 / 3.0).abs() < 1e-9);
	}

	#[test]
	fn rating_rejects_out_of_range_and_unknown_codes() {
		let mut catalog = catalog("rate-bad");
		catalog.add(submission("ABCDE", "Aim Trainer", WorkshopCategory::Training)).unwrap();

		assert!(catalog.rate("ABCDE", 0).is_err());
		assert!(catalog.rate("ABCDE", 6).is_err());
		assert!(catalog.rate("ZZZZZ", 3).is_err());
		assert_eq!(catalog.by_code("ABCDE").unwrap().ratings.count, 0);
	}

	#[test]
	fn search_matches_title_code_and_tags() {
		let mut catalog = catalog("search");
		catalog.add(submission("ABCDE", "Aim Trainer", WorkshopCategory::Training)).unwrap();
		catalog.add(submission("FGHIJ", "Parkour Run", WorkshopCategory::Parkour)).unwrap();

		assert_eq!(catalog.search("aim").len(), 2); // title + shared "aim" tag
		assert_eq!(catalog.search("fghij").len(), 1);
		assert_eq!(catalog.search("zombies").len(), 0);
		assert_eq!(catalog.search("").len(), 0);
	}

	#[test]
	fn hero_filter_honors_the_all_sentinel() {
		let mut catalog = catalog("hero");
		catalog.add(submission("ABCDE", "Everyone", WorkshopCategory::Other)).unwrap();
		let mut targeted = submission("FGHIJ", "Widow HS", WorkshopCategory::Training);
		targeted.heroes = vec![String::from("Widowmaker")];
		catalog.add(targeted).unwrap();

		assert_eq!(catalog.by_hero("Widowmaker").len(), 2);
		assert_eq!(catalog.by_hero("Mercy").len(), 1);
	}

	#[test]
	fn popularity_is_monotonic_and_sorts_popular() {
		let mut catalog = catalog("popular");
		catalog.add(submission("ABCDE", "First", WorkshopCategory::Other)).unwrap();
		catalog.add(submission("FGHIJ", "Second", WorkshopCategory::Other)).unwrap();

		catalog.bump_popularity("FGHIJ").unwrap();
		catalog.bump_popularity("FGHIJ").unwrap();
		catalog.bump_popularity("ABCDE").unwrap();

		let popular = catalog.popular(10);
		assert_eq!(popular[0].code, "FGHIJ");
		assert_eq!(popular[0].popularity, 2);
	}

	#[test]
	fn top_rated_requires_three_votes() {
		let mut catalog = catalog("top-rated");
		catalog.add(submission("ABCDE", "First", WorkshopCategory::Other)).unwrap();
		catalog.add(submission("FGHIJ", "Second", WorkshopCategory::Other)).unwrap();

		catalog.rate("ABCDE", 5).unwrap();
		catalog.rate("ABCDE", 5).unwrap();

		assert!(catalog.top_rated(10).is_empty());

		catalog.rate("ABCDE", 4).unwrap();
		let top = catalog.top_rated(10);
		assert_eq!(top.len(), 1);
		assert_eq!(top[0].code, "ABCDE");
	}

	#[test]
	fn next_id_continues_after_reload() {
		let mut catalog = catalog("reload");
		catalog.add(submission("ABCDE", "First", WorkshopCategory::Other)).unwrap();
		catalog.add(submission("FGHIJ", "Second", WorkshopCategory::Other)).unwrap();

		let reloaded = WorkshopCatalog::load(&catalog.path);
		assert_eq!(reloaded.len(), 2);
		assert_eq!(reloaded.next_id, 3);

		std::fs::remove_file(&catalog.path).ok();
	}
}
