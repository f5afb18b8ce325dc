//! The quiz leaderboard, backed by `quizPoints.json`.
//!
//! A write replaces the whole file; on write failure the in-memory board is
//! left unchanged and the caller gets the error.

use {
	crate::storage,
	color_eyre::Result,
	std::{
		collections::BTreeMap,
		path::{Path, PathBuf},
	},
	tracing::warn,
};

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
	pub user_id: String,
	pub points: u64,
}

/// Aggregate numbers for the leaderboard embed.
#[derive(Debug, Clone, Copy)]
pub struct ScoreStats {
	pub participants: usize,
	pub total_points: u64,
	pub average_points: u64,
}

/// Cumulative points per Discord user id.
#[derive(Debug)]
pub struct ScoreBoard {
	path: PathBuf,
	scores: BTreeMap<String, u64>,
}

impl ScoreBoard {
	/// Reads `quizPoints.json` once. A missing or corrupt file yields an
	/// empty board instead of taking the process down.
	pub fn load(path: &Path) -> Self {
		let scores = match storage::read_json(path) {
			Ok(scores) => scores,
			Err(why) => {
				warn!("Failed to load quiz scores: {why:?}");
				BTreeMap::new()
			}
		};

		Self { path: path.to_owned(), scores }
	}

	pub fn score_of(&self, user_id: &str) -> u64 {
		self.scores.get(user_id).copied().unwrap_or(0)
	}

	/// Adds `points` to the user's total and persists the board. The new
	/// total is committed to memory only after the file write succeeds.
	pub fn award(&mut self, user_id: &str, points: u64) -> Result<u64> {
		let mut next = self.scores.clone();
		let total = next.entry(user_id.to_owned()).or_insert(0);
		*total += points;
		let total = *total;

		storage::write_json(&self.path, &next)?;
		self.scores = next;

		Ok(total)
	}

	/// At most `limit` entries, sorted by points descending. Order among ties
	/// is whatever the sort leaves.
	pub fn ranking(&self, limit: usize) -> Vec<RankingEntry> {
		let mut entries = self
			.scores
			.iter()
			.map(|(user_id, points)| RankingEntry {
				user_id: user_id.clone(),
				points: *points,
			})
			.collect::<Vec<_>>();

		entries.sort_by(|a, b| b.points.cmp(&a.points));
		entries.truncate(limit);
		entries
	}

	/// 1-based rank of the user in the full descending order, or 0 when the
	/// user has never scored.
	pub fn position_of(&self, user_id: &str) -> usize {
		self.ranking(self.scores.len())
			.iter()
			.position(|entry| entry.user_id == user_id)
			.map_or(0, |index| index + 1)
	}

	pub fn stats(&self) -> Option<ScoreStats> {
		if self.scores.is_empty() {
			return None;
		}

		let participants = self.scores.len();
		let total_points = self.scores.values().sum::<u64>();

		Some(ScoreStats {
			participants,
			total_points,
			average_points: total_points / participants as u64,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn board(name: &str, scores: &[(&str, u64)]) -> ScoreBoard {
		let path = std::env::temp_dir().join(format!(
			"owbot-scores-{name}-{}.json",
			std::process::id(),
		));
		std::fs::remove_file(&path).ok();

		let mut board = ScoreBoard::load(&path);
		board.scores = scores
			.iter()
			.map(|(user, points)| ((*user).to_owned(), *points))
			.collect();
		board
	}

	#[test]
	fn ranking_is_descending_and_truncated() {
		let board = board("ranking", &[("u1", 30), ("u2", 50), ("u3", 10)]);
		let top = board.ranking(2);

		assert_eq!(top.len(), 2);
		assert_eq!(top[0], RankingEntry { user_id: String::from("u2"), points: 50 });
		assert_eq!(top[1], RankingEntry { user_id: String::from("u1"), points: 30 });
	}

	#[test]
	fn position_is_one_based_with_unranked_sentinel() {
		let board = board("position", &[("u1", 30), ("u2", 50), ("u3", 10)]);

		assert_eq!(board.position_of("u2"), 1);
		assert_eq!(board.position_of("u3"), 3);
		assert_eq!(board.position_of("nobody"), 0);
	}

	#[test]
	fn award_accumulates_and_persists() {
		let mut board = board("award", &[("u1", 3)]);

		assert_eq!(board.award("u1", 2).unwrap(), 5);
		assert_eq!(board.award("u9", 1).unwrap(), 1);

		// reload from disk and check the write went through
		let reloaded = ScoreBoard::load(&board.path);
		assert_eq!(reloaded.score_of("u1"), 5);
		assert_eq!(reloaded.score_of("u9"), 1);

		std::fs::remove_file(&board.path).ok();
	}

	#[test]
	fn stats_cover_all_participants() {
		let board = board("stats", &[("u1", 30), ("u2", 50), ("u3", 10)]);
		let stats = board.stats().unwrap();

		assert_eq!(stats.participants, 3);
		assert_eq!(stats.total_points, 90);
		assert_eq!(stats.average_points, 30);
	}
}
