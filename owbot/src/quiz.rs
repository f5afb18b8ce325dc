//! The trivia question bank and the per-user session table.
//!
//! `quizData.json` keeps the wire format the community has been shipping for
//! years: `{ categorias, dificultades, preguntas }` with Spanish keys. The
//! Rust side renames everything on the way in.

use {
	crate::{scores::ScoreBoard, storage},
	color_eyre::Result,
	rand::seq::SliceRandom,
	serde::{Deserialize, Serialize},
	std::{
		collections::{BTreeMap, HashMap},
		path::Path,
		time::{Duration, Instant},
	},
	tracing::warn,
};

/// How long the player has to click an answer.
pub const ANSWER_TIMEOUT: Duration = Duration::from_secs(30);

/// How long the "next question" button stays live after a turn resolves.
pub const NEXT_QUESTION_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_CATEGORIES: [&str; 6] = [
	"Héroes",
	"Mapas",
	"Habilidades",
	"Historia",
	"Competitivo",
	"Actualizaciones",
];

fn default_points() -> BTreeMap<String, u64> {
	BTreeMap::from([
		(String::from("fácil"), 1),
		(String::from("media"), 2),
		(String::from("difícil"), 3),
		(String::from("experto"), 5),
	])
}

/// One trivia question with exactly four options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
	pub id: u32,

	#[serde(rename = "categoria")]
	pub category: String,

	#[serde(rename = "dificultad")]
	pub difficulty: String,

	#[serde(rename = "texto")]
	pub text: String,

	#[serde(rename = "opciones")]
	pub options: [String; 4],

	#[serde(rename = "respuestaCorrecta")]
	pub correct_index: usize,

	#[serde(rename = "explicacion", default)]
	pub explanation: Option<String>,

	#[serde(rename = "imagen", default)]
	pub image: Option<String>,
}

impl QuizQuestion {
	pub fn correct_answer(&self) -> &str {
		&self.options[self.correct_index]
	}
}

/// Wire shape of `quizData.json`.
#[derive(Debug, Serialize, Deserialize)]
struct QuizData {
	categorias: Vec<String>,
	dificultades: BTreeMap<String, u64>,
	preguntas: Vec<QuizQuestion>,
}

impl Default for QuizData {
	fn default() -> Self {
		Self {
			categorias: DEFAULT_CATEGORIES.map(String::from).to_vec(),
			dificultades: default_points(),
			preguntas: Vec::new(),
		}
	}
}

/// All quiz questions plus the category list and the per-difficulty point
/// table. Immutable after load.
#[derive(Debug)]
pub struct QuestionBank {
	data: QuizData,
}

impl QuestionBank {
	/// Reads `quizData.json` once. A missing or corrupt file yields the
	/// default (empty) bank instead of taking the process down.
	pub fn load(path: &Path) -> Self {
		match storage::read_json::<QuizData>(path) {
			Ok(mut data) => {
				// A record with an answer index outside the four options can
				// never be answered correctly and would panic on display.
				data.preguntas.retain(|question| {
					let valid = question.correct_index < question.options.len();
					if !valid {
						warn!(
							"Dropping question {}: answer index {} out of range",
							question.id, question.correct_index
						);
					}
					valid
				});

				Self { data }
			}
			Err(why) => {
				warn!("Failed to load quiz data: {why:?}");
				Self { data: QuizData::default() }
			}
		}
	}

	pub fn from_questions(questions: Vec<QuizQuestion>) -> Self {
		Self {
			data: QuizData { preguntas: questions, ..Default::default() },
		}
	}

	pub fn categories(&self) -> &[String] {
		&self.data.categorias
	}

	pub fn is_empty(&self) -> bool {
		self.data.preguntas.is_empty()
	}

	/// Points awarded for a correct answer of the given difficulty.
	pub fn points_for(&self, difficulty: &str) -> u64 {
		self.data
			.dificultades
			.get(&difficulty.to_lowercase())
			.copied()
			.unwrap_or(1)
	}

	/// Picks a uniformly random question matching the given filters.
	///
	/// Returns `None` when nothing matches; it never falls back to the
	/// unfiltered set.
	pub fn random_question(
		&self,
		category: Option<&str>,
		difficulty: Option<&str>,
	) -> Option<&QuizQuestion> {
		let matching = self
			.data
			.preguntas
			.iter()
			.filter(|question| {
				category.map_or(true, |category| {
					question.category.eq_ignore_ascii_case(category)
				})
			})
			.filter(|question| {
				difficulty.map_or(true, |difficulty| {
					question.difficulty.eq_ignore_ascii_case(difficulty)
				})
			})
			.collect::<Vec<_>>();

		matching.choose(&mut rand::thread_rng()).copied()
	}

	pub fn check_answer(&self, question: &QuizQuestion, selected_index: usize) -> bool {
		selected_index == question.correct_index
	}

	/// Resolves a player's answer: checks it, awards difficulty points on a
	/// correct one and reports the resulting total.
	///
	/// A wrong answer never touches the score board, it only reads the
	/// current total for display.
	pub fn resolve_answer(
		&self,
		question: &QuizQuestion,
		selected_index: usize,
		scores: &mut ScoreBoard,
		user_id: &str,
	) -> Result<AnswerOutcome> {
		let correct = self.check_answer(question, selected_index);
		let points_awarded = if correct {
			self.points_for(&question.difficulty)
		} else {
			0
		};

		let total_score = if correct {
			scores.award(user_id, points_awarded)?
		} else {
			scores.score_of(user_id)
		};

		Ok(AnswerOutcome {
			correct,
			correct_answer: question.correct_answer().to_owned(),
			points_awarded,
			total_score,
		})
	}
}

/// What came out of one resolved quiz turn.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
	pub correct: bool,
	pub correct_answer: String,
	pub points_awarded: u64,
	pub total_score: u64,
}

/// Where a user's current turn stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
	/// A question is out; exactly one answer click from the owning user is
	/// accepted before the window closes.
	AwaitingAnswer,

	/// The turn resolved; the "next question" affordance is live.
	Answered,
}

/// One user's live quiz turn.
#[derive(Debug, Clone)]
pub struct QuizSession {
	pub question_id: u32,
	pub phase: QuizPhase,
	expires_at: Instant,
}

/// Per-user turn state, keyed by Discord user id. A user with a live session
/// is refused a new question until the current one reaches a terminal state;
/// expired entries count as absent.
#[derive(Debug, Default)]
pub struct SessionTable {
	sessions: HashMap<u64, QuizSession>,
}

impl SessionTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a turn for `user`. Fails when the user already has a live one.
	pub fn try_begin(&mut self, user: u64, question_id: u32, ttl: Duration) -> bool {
		self.try_begin_at(user, question_id, ttl, Instant::now())
	}

	/// Moves an awaiting turn to [`QuizPhase::Answered`] and re-arms the
	/// expiry for the follow-up window.
	pub fn mark_answered(&mut self, user: u64, ttl: Duration) {
		if let Some(session) = self.sessions.get_mut(&user) {
			session.phase = QuizPhase::Answered;
			session.expires_at = Instant::now() + ttl;
		}
	}

	/// Tears the turn down. Terminal; idempotent.
	pub fn finish(&mut self, user: u64) {
		self.sessions.remove(&user);
	}

	pub fn active(&self, user: u64) -> Option<&QuizSession> {
		self.active_at(user, Instant::now())
	}

	fn try_begin_at(&mut self, user: u64, question_id: u32, ttl: Duration, now: Instant) -> bool {
		if self.active_at(user, now).is_some() {
			return false;
		}

		self.sessions.insert(user, QuizSession {
			question_id,
			phase: QuizPhase::AwaitingAnswer,
			expires_at: now + ttl,
		});

		true
	}

	fn active_at(&self, user: u64, now: Instant) -> Option<&QuizSession> {
		self.sessions
			.get(&user)
			.filter(|session| session.expires_at > now)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn question(id: u32, category: &str, difficulty: &str) -> QuizQuestion {
		QuizQuestion {
			id,
			category: category.to_owned(),
			difficulty: difficulty.to_owned(),
			text: format!("Question {id}?"),
			options: [
				String::from("A"),
				String::from("B"),
				String::from("C"),
				String::from("D"),
			],
			correct_index: 2,
			explanation: None,
			image: None,
		}
	}

	fn bank() -> QuestionBank {
		QuestionBank::from_questions(vec![
			question(1, "Héroes", "fácil"),
			question(2, "Héroes", "experto"),
			question(3, "Mapas", "media"),
		])
	}

	#[test]
	fn empty_filter_result_is_none_not_a_fallback() {
		let bank = bank();
		assert!(bank.random_question(Some("Historia"), None).is_none());
		assert!(bank.random_question(Some("Héroes"), Some("media")).is_none());
	}

	#[test]
	fn filters_are_case_insensitive() {
		let bank = bank();
		let question = bank.random_question(Some("héroes"), Some("EXPERTO")).unwrap();
		assert_eq!(question.id, 2);
	}

	#[test]
	fn unfiltered_pick_comes_from_the_whole_set() {
		let bank = bank();
		let question = bank.random_question(None, None).unwrap();
		assert!((1..=3).contains(&question.id));
	}

	#[test]
	fn points_lookup_defaults_to_one() {
		let bank = bank();
		assert_eq!(bank.points_for("experto"), 5);
		assert_eq!(bank.points_for("EXPERTO"), 5);
		assert_eq!(bank.points_for("nightmare"), 1);
	}

	#[test]
	fn check_answer_matches_correct_index() {
		let bank = bank();
		let question = bank.random_question(Some("Mapas"), None).unwrap();
		assert!(bank.check_answer(question, 2));
		assert!(!bank.check_answer(question, 0));
	}

	#[test]
	fn load_drops_questions_with_out_of_range_answer_index() {
		let path = std::env::temp_dir()
			.join(format!("owbot-quiz-bad-index-{}.json", std::process::id()));
		std::fs::write(
			&path,
			r#"{
				"categorias": ["Héroes"],
				"dificultades": { "fácil": 1 },
				"preguntas": [
					{
						"id": 1,
						"categoria": "Héroes",
						"dificultad": "fácil",
						"texto": "Fine?",
						"opciones": ["A", "B", "C", "D"],
						"respuestaCorrecta": 2
					},
					{
						"id": 2,
						"categoria": "Héroes",
						"dificultad": "fácil",
						"texto": "Broken?",
						"opciones": ["A", "B", "C", "D"],
						"respuestaCorrecta": 7
					}
				]
			}"#,
		)
		.unwrap();

		let bank = QuestionBank::load(&path);
		let question = bank.random_question(None, None).unwrap();
		assert_eq!(question.id, 1);
		assert_eq!(question.correct_answer(), "C");

		std::fs::remove_file(&path).ok();
	}

	#[test]
	fn resolving_an_answer_only_awards_when_correct() {
		let bank = bank();
		let path = std::env::temp_dir()
			.join(format!("owbot-quiz-resolve-{}.json", std::process::id()));
		let mut scores = ScoreBoard::load(&path);

		let question = bank.random_question(Some("Héroes"), Some("experto")).unwrap();

		let wrong = bank.resolve_answer(question, 0, &mut scores, "123").unwrap();
		assert!(!wrong.correct);
		assert_eq!(wrong.points_awarded, 0);
		assert_eq!(wrong.total_score, 0);
		assert_eq!(wrong.correct_answer, "C");

		let right = bank.resolve_answer(question, 2, &mut scores, "123").unwrap();
		assert!(right.correct);
		assert_eq!(right.points_awarded, 5);
		assert_eq!(right.total_score, 5);

		std::fs::remove_file(&path).ok();
	}

	#[test]
	fn second_session_is_refused_while_one_is_live() {
		let mut table = SessionTable::new();
		let ttl = Duration::from_secs(30);

		assert!(table.try_begin(1, 10, ttl));
		assert!(!table.try_begin(1, 11, ttl));
		// a different user is unaffected
		assert!(table.try_begin(2, 10, ttl));
	}

	#[test]
	fn answered_session_still_blocks_a_new_one() {
		let mut table = SessionTable::new();
		let ttl = Duration::from_secs(30);

		assert!(table.try_begin(1, 10, ttl));
		table.mark_answered(1, ttl);
		assert_eq!(table.active(1).map(|session| session.phase), Some(QuizPhase::Answered));
		assert!(!table.try_begin(1, 11, ttl));
	}

	#[test]
	fn finished_session_frees_the_user() {
		let mut table = SessionTable::new();
		let ttl = Duration::from_secs(30);

		assert!(table.try_begin(1, 10, ttl));
		table.finish(1);
		assert!(table.try_begin(1, 11, ttl));
	}

	#[test]
	fn expired_session_counts_as_absent() {
		let mut table = SessionTable::new();
		let now = Instant::now();
		let ttl = Duration::from_secs(30);

		assert!(table.try_begin_at(1, 10, ttl, now));
		let later = now + ttl + Duration::from_secs(1);
		assert!(table.active_at(1, later).is_none());
		assert!(table.try_begin_at(1, 11, ttl, later));
	}

	#[test]
	fn missing_file_yields_default_bank() {
		let path = std::env::temp_dir().join("owbot-quiz-does-not-exist.json");
		let bank = QuestionBank::load(&path);
		assert!(bank.is_empty());
		assert_eq!(bank.categories().len(), 6);
		assert_eq!(bank.points_for("fácil"), 1);
	}
}
