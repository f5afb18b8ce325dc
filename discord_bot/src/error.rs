//! The global [`Error`] and [`Result`] types used across the entire crate.
//!
//! Every failure is caught at the handler boundary and turned into a
//! user-facing message; nothing in here is fatal to the process.

use tracing::{error, info, warn};

pub type Result<T> = std::result::Result<T, Error>;

/// Global `Error` type for the entire crate.
#[derive(Debug, Clone)]
pub enum Error {
	/// Some unknown error occurred.
	Unknown,

	/// Some custom edge-case error that doesn't deserve its own enum variant.
	Custom(String),

	/// No map matched the given name.
	MapNotFound,

	/// The map catalog is empty (data file missing or corrupt).
	NoMaps,

	/// No quiz question matched the category/difficulty filters.
	NoQuestions,

	/// The user already has an unresolved quiz question.
	QuizInProgress,

	/// No workshop code matched a query.
	NoResults,

	/// The quiz leaderboard has no entries yet.
	NoScores,

	/// A workshop share code doesn't exist in the catalog.
	CodeNotFound {
		code: String,
	},

	/// A workshop share code already exists in the catalog.
	DuplicateCode {
		code: String,
	},

	/// A share code that doesn't match the 5-6 uppercase alphanumerics
	/// format.
	InvalidCode,

	/// A rating outside of 1-5.
	InvalidRating,

	/// Reading or writing one of the JSON data files failed.
	Storage,

	/// Failed to parse JSON.
	ParseJSON,

	/// User Input was out of range.
	InputOutOfRange,
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::Unknown => f.write_str("Some unknown error occurred."),
			Error::Custom(msg) => f.write_str(msg),
			Error::MapNotFound => f.write_str("I don't know that map."),
			Error::NoMaps => f.write_str("No maps found in the database."),
			Error::NoQuestions => {
				f.write_str("No questions available with those filters. Try other options!")
			}
			Error::QuizInProgress => {
				f.write_str("You already have a quiz in progress. Finish it before starting a new one!")
			}
			Error::NoResults => f.write_str("No workshop codes matched your search."),
			Error::NoScores => {
				f.write_str("Nobody has scored yet. Be the first: play `/quiz`!")
			}
			Error::CodeNotFound { code } => {
				f.write_fmt(format_args!("No workshop code `{code}` in the database."))
			}
			Error::DuplicateCode { code } => {
				f.write_fmt(format_args!("The code `{code}` already exists in the database."))
			}
			Error::InvalidCode => {
				f.write_str("Share codes are 5-6 letters and digits, e.g. `A1B2C`.")
			}
			Error::InvalidRating => f.write_str("Ratings go from 1 to 5 stars."),
			Error::Storage => {
				f.write_str("Failed to save your change. Please try again later.")
			}
			Error::ParseJSON => f.write_str("Failed to parse JSON."),
			Error::InputOutOfRange => {
				f.write_str("Your input was out of range. Please provide some realistic values.")
			}
		}
	}
}

impl std::error::Error for Error {}

impl From<serenity::Error> for Error {
	fn from(value: serenity::Error) -> Self {
		match value {
			serenity::Error::Json(why) => {
				error!("JSON Error {why:?}");
				Self::ParseJSON
			}
			serenity::Error::NotInRange(param, value, min, max) => {
				warn!("User Input (`{value}`) for `{param}` out of range (`{min}` - `{max}`)");
				Self::InputOutOfRange
			}
			why => {
				warn!("Error occurred: {why:?}");
				Self::Unknown
			}
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(value: color_eyre::Report) -> Self {
		// never leak raw I/O faults to the end user
		error!("Storage error: {value:?}");
		Self::Storage
	}
}

impl Error {
	pub async fn handle_command(error: poise::FrameworkError<'_, crate::GlobalState, Error>) {
		error!("Slash Command failed. {error:?}");

		let (content, ephemeral) = match &error {
			poise::FrameworkError::Command { error, .. } => (error.to_string(), true),
			poise::FrameworkError::ArgumentParse { input, .. } => (
				format!(
					"You provided invalid input. {}",
					input.as_deref().unwrap_or_default()
				),
				true,
			),
			poise::FrameworkError::CommandStructureMismatch { description, .. } => {
				error!("{description}");
				(String::from("Incorrect command structure."), true)
			}
			poise::FrameworkError::CooldownHit { remaining_cooldown, .. } => (
				format!(
					"This command is currently on cooldown. Please wait another {:.2} seconds before trying again.",
					remaining_cooldown.as_secs_f64()
				),
				true,
			),
			poise::FrameworkError::MissingBotPermissions { missing_permissions, .. } => {
				error!("{missing_permissions}");
				(
					String::from("The bot is missing permissions for this action. Please contact the server owner and kindly ask them to give the bot the required permissions."),
					false,
				)
			}
			poise::FrameworkError::MissingUserPermissions { missing_permissions, .. } => (
				if let Some(perms) = missing_permissions {
					format!("You are missing the `{perms}` permissions for this command.")
				} else {
					String::from("You are missing the required permissions for this command.")
				},
				true,
			),
			poise::FrameworkError::NotAnOwner { .. } => {
				(String::from("This command requires you to be the owner of the bot."), true)
			}
			why => {
				error!("{why:?}");
				(String::from("Failed to execute command."), true)
			}
		};

		if let Some(ctx) = &error.ctx() {
			if let Err(why) = ctx
				.send(|reply| {
					reply
						.ephemeral(ephemeral)
						.content(&content)
				})
				.await
			{
				error!("Failed to respond to slash command. {why:?}");
			}

			info!("Handled error with `{content}`.");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::Error;

	#[test]
	fn empty_leaderboard_message_talks_about_the_quiz() {
		let message = Error::NoScores.to_string();
		assert!(message.contains("/quiz"));
		assert!(!message.to_lowercase().contains("workshop"));
	}
}
