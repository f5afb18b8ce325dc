mod info;
pub use info::info;

mod map;
pub use map::map;

mod quiz;
pub use quiz::quiz;

mod quizrank;
pub use quizrank::quizrank;

mod workshop;
pub use workshop::workshop;

mod autocompletion {
	use {
		crate::{Context, State},
		futures::StreamExt,
	};

	/// Every hero a workshop code can target, plus the `All` sentinel.
	pub const HEROES: [&str; 41] = [
		"All",
		"Ana",
		"Ashe",
		"Baptiste",
		"Bastion",
		"Brigitte",
		"Cassidy",
		"D.Va",
		"Doomfist",
		"Echo",
		"Genji",
		"Hanzo",
		"Illari",
		"Junker Queen",
		"Junkrat",
		"Kiriko",
		"Lifeweaver",
		"Lúcio",
		"Mauga",
		"Mei",
		"Mercy",
		"Moira",
		"Orisa",
		"Pharah",
		"Ramattra",
		"Reaper",
		"Reinhardt",
		"Roadhog",
		"Sigma",
		"Sojourn",
		"Soldier: 76",
		"Sombra",
		"Symmetra",
		"Torbjörn",
		"Tracer",
		"Venture",
		"Widowmaker",
		"Winston",
		"Wrecking Ball",
		"Zarya",
		"Zenyatta",
	];

	/// Provides autocompletion for hero names.
	pub async fn autocomplete_hero<'a>(
		_: Context<'a>,
		input: &'a str,
	) -> impl futures::Stream<Item = String> + 'a {
		let input = input.to_lowercase();
		futures::stream::iter(HEROES).filter_map(move |hero| {
			let input = input.clone();
			async move { hero.to_lowercase().contains(&input).then(|| hero.to_owned()) }
		})
	}

	/// Provides autocompletion for the share codes currently in the catalog.
	pub async fn autocomplete_code<'a>(
		ctx: Context<'a>,
		input: &'a str,
	) -> impl futures::Stream<Item = String> + 'a {
		let input = input.to_lowercase();
		let codes = {
			let catalog = ctx.workshop().lock().await;
			catalog
				.all()
				.iter()
				.filter(|code| {
					code.code.to_lowercase().starts_with(&input)
						|| code.title.to_lowercase().contains(&input)
				})
				.map(|code| code.code.clone())
				.take(25)
				.collect::<Vec<_>>()
		};

		futures::stream::iter(codes)
	}
}

mod choices {
	use {owbot::workshop::WorkshopCategory, poise::ChoiceParameter};

	/// Quiz question categories. The values match the `categorias` list in
	/// `quizData.json`.
	#[derive(Debug, Clone, Copy, ChoiceParameter)]
	pub enum CategoryChoice {
		#[name = "Héroes"]
		Heroes,

		#[name = "Habilidades"]
		Abilities,

		#[name = "Mapas"]
		Maps,

		#[name = "Historia"]
		Lore,

		#[name = "Actualizaciones"]
		Updates,

		#[name = "Competitivo"]
		Competitive,
	}

	impl CategoryChoice {
		/// The filter value as stored on questions.
		pub const fn filter(&self) -> &'static str {
			match self {
				Self::Heroes => "héroes",
				Self::Abilities => "habilidades",
				Self::Maps => "mapas",
				Self::Lore => "historia",
				Self::Updates => "actualizaciones",
				Self::Competitive => "competitivo",
			}
		}
	}

	/// Quiz difficulty tiers. The values match the `dificultades` table in
	/// `quizData.json`.
	#[derive(Debug, Clone, Copy, ChoiceParameter)]
	pub enum DifficultyChoice {
		#[name = "Fácil"]
		Easy,

		#[name = "Media"]
		Medium,

		#[name = "Difícil"]
		Hard,

		#[name = "Experto"]
		Expert,
	}

	impl DifficultyChoice {
		/// The filter value as stored on questions.
		pub const fn filter(&self) -> &'static str {
			match self {
				Self::Easy => "fácil",
				Self::Medium => "media",
				Self::Hard => "difícil",
				Self::Expert => "experto",
			}
		}
	}

	/// Workshop catalog categories as a slash-command choice.
	#[derive(Debug, Clone, Copy, ChoiceParameter)]
	pub enum WorkshopCategoryChoice {
		#[name = "Entrenamiento"]
		Training,

		#[name = "Minijuegos"]
		Minigames,

		#[name = "PvP"]
		PvP,

		#[name = "PvE"]
		PvE,

		#[name = "Parkour"]
		Parkour,

		#[name = "Supervivencia"]
		Survival,

		#[name = "Otros"]
		Other,
	}

	impl From<WorkshopCategoryChoice> for WorkshopCategory {
		fn from(value: WorkshopCategoryChoice) -> Self {
			match value {
				WorkshopCategoryChoice::Training => Self::Training,
				WorkshopCategoryChoice::Minigames => Self::Minigames,
				WorkshopCategoryChoice::PvP => Self::PvP,
				WorkshopCategoryChoice::PvE => Self::PvE,
				WorkshopCategoryChoice::Parkour => Self::Parkour,
				WorkshopCategoryChoice::Survival => Self::Survival,
				WorkshopCategoryChoice::Other => Self::Other,
			}
		}
	}

	/// 1-5 stars.
	#[derive(Debug, Clone, Copy, ChoiceParameter)]
	pub enum RatingChoice {
		#[name = "⭐"]
		One = 1,

		#[name = "⭐⭐"]
		Two = 2,

		#[name = "⭐⭐⭐"]
		Three = 3,

		#[name = "⭐⭐⭐⭐"]
		Four = 4,

		#[name = "⭐⭐⭐⭐⭐"]
		Five = 5,
	}

	impl From<RatingChoice> for u8 {
		fn from(value: RatingChoice) -> Self {
			value as u8
		}
	}
}
