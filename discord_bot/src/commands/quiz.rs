use {
	super::choices::{CategoryChoice, DifficultyChoice},
	crate::{
		error::{Error, Result},
		Context, State,
	},
	owbot::quiz::{AnswerOutcome, QuizQuestion, ANSWER_TIMEOUT, NEXT_QUESTION_TIMEOUT},
	poise::serenity_prelude::{
		ButtonStyle, CollectComponentInteraction, CreateActionRow, CreateEmbed,
		InteractionResponseType,
	},
	rand::seq::SliceRandom,
	std::time::Instant,
	tracing::trace,
};

const LETTER_EMOJIS: [char; 4] = ['🇦', '🇧', '🇨', '🇩'];
const LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// One quiz turn, decoupled from any particular interaction shape so that
/// the "next question" button and the leaderboard's "play" button re-enter
/// the exact same flow as the slash command.
#[derive(Debug, Clone, Copy)]
pub(super) struct QuizRequest {
	pub category: Option<&'static str>,
	pub difficulty: Option<&'static str>,
	pub user_id: u64,
}

/// Play the Overwatch 2 trivia quiz.
///
/// You get one question with four options and 30 seconds to answer. \
/// Correct answers award points based on the question's difficulty tier; \
/// chain questions with the "next question" button. Your total score feeds \
/// the `/quizrank` leaderboard.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn quiz(
	ctx: Context<'_>,
	#[description = "Question category."] category: Option<CategoryChoice>,
	#[description = "Difficulty tier."] difficulty: Option<DifficultyChoice>,
) -> Result<()> {
	trace!("[/quiz ({})]", ctx.author().tag());
	trace!("> `category`: {category:?}");
	trace!("> `difficulty`: {difficulty:?}");

	let request = QuizRequest {
		category: category.map(|choice| choice.filter()),
		difficulty: difficulty.map(|choice| choice.filter()),
		user_id: ctx.author().id.0,
	};

	play(ctx, request).await
}

/// Drives quiz turns until the player stops asking for another question.
///
/// The difficulty rotates one tier per chained question, the category
/// stays. The rotation is fixed before the turn so the "next question"
/// button can promise the tier it will actually serve.
pub(super) async fn play(ctx: Context<'_>, mut request: QuizRequest) -> Result<()> {
	loop {
		let next = next_difficulty(request.difficulty);
		if !run_turn(ctx, &request, next).await? {
			return Ok(());
		}
		request.difficulty = next;
	}
}

/// Runs a single question from issue to terminal state. Returns whether the
/// player clicked "next question"; `next` is the difficulty that question
/// would get.
async fn run_turn(
	ctx: Context<'_>,
	request: &QuizRequest,
	next: Option<&'static str>,
) -> Result<bool> {
	let question = ctx
		.questions()
		.random_question(request.category, request.difficulty)
		.ok_or(Error::NoQuestions)?;
	let points = ctx.questions().points_for(&question.difficulty);

	{
		let mut sessions = ctx.sessions().lock().await;
		if !sessions.try_begin(request.user_id, question.id, ANSWER_TIMEOUT) {
			return Err(Error::QuizInProgress);
		}
	}

	let answer_prefix = format!("{}-{}-answer-", ctx.id(), question.id);
	let next_id = format!("{}-{}-next", ctx.id(), question.id);

	let reply = ctx
		.send(|reply| {
			reply
				.content(format!(
					"⏱️ **{}**, you have **30 seconds** to answer!",
					ctx.author().name
				))
				.embed(|e| {
					*e = question_embed(question, points);
					e
				})
				.components(|c| {
					c.create_action_row(|row| answer_row(row, &answer_prefix, question, None))
				})
		})
		.await?;

	// One answer click from the owning user ends the window; anybody else
	// gets told off without consuming the turn.
	let deadline = Instant::now() + ANSWER_TIMEOUT;
	let answer = loop {
		let filter_prefix = answer_prefix.clone();
		let interaction = CollectComponentInteraction::new(ctx)
			.filter(move |interaction| interaction.data.custom_id.starts_with(&filter_prefix))
			.timeout(deadline.saturating_duration_since(Instant::now()))
			.await;

		let Some(interaction) = interaction else {
			break None;
		};

		if interaction.user.id.0 != request.user_id {
			interaction
				.create_interaction_response(ctx, |response| {
					response
						.kind(InteractionResponseType::ChannelMessageWithSource)
						.interaction_response_data(|data| {
							data.ephemeral(true).content(format!(
								"Only {} can interact with this quiz.",
								ctx.author().name
							))
						})
				})
				.await?;
			continue;
		}

		let index = interaction
			.data
			.custom_id
			.strip_prefix(&answer_prefix)
			.and_then(|index| index.parse::<usize>().ok());

		match index {
			Some(index) if index < 4 => break Some((interaction, index)),
			_ => continue,
		}
	};

	let Some((interaction, selected)) = answer else {
		// Expired: reveal the answer, no score change, tear down.
		ctx.sessions().lock().await.finish(request.user_id);

		reply
			.edit(ctx, |reply| {
				reply
					.content(format!(
						"⌛ **Time's up, {}!** The correct answer was **{}**.",
						ctx.author().name,
						question.correct_answer()
					))
					.embed(|e| {
						*e = question_embed(question, points);
						e
					})
					.components(|c| {
						c.create_action_row(|row| {
							answer_row(row, &answer_prefix, question, Some(None))
						})
					})
			})
			.await
			.ok();

		return Ok(false);
	};

	let user_key = request.user_id.to_string();
	let outcome = {
		let mut scores = ctx.scores().lock().await;
		ctx.questions()
			.resolve_answer(question, selected, &mut scores, &user_key)?
	};

	ctx.sessions()
		.lock()
		.await
		.mark_answered(request.user_id, NEXT_QUESTION_TIMEOUT);

	let embed = resolved_embed(question, &outcome, points);
	let next_difficulty_label = difficulty_label(next);
	interaction
		.create_interaction_response(ctx, |response| {
			response
				.kind(InteractionResponseType::UpdateMessage)
				.interaction_response_data(|data| {
					data.content("").set_embed(embed).components(|c| {
						c.create_action_row(|row| {
							answer_row(row, &answer_prefix, question, Some(Some(selected)))
						})
						.create_action_row(|row| {
							row.create_button(|b| {
								b.custom_id(&next_id)
									.label(format!("Next question ({next_difficulty_label})"))
									.emoji('▶')
									.style(ButtonStyle::Success)
							})
						})
					})
				})
		})
		.await?;

	// Secondary, shorter window for chaining into the next question.
	let deadline = Instant::now() + NEXT_QUESTION_TIMEOUT;
	loop {
		let filter_id = next_id.clone();
		let interaction = CollectComponentInteraction::new(ctx)
			.filter(move |interaction| interaction.data.custom_id == filter_id)
			.timeout(deadline.saturating_duration_since(Instant::now()))
			.await;

		let Some(interaction) = interaction else {
			ctx.sessions().lock().await.finish(request.user_id);
			reply
				.edit(ctx, |reply| {
					reply.components(|c| {
						c.create_action_row(|row| {
							answer_row(row, &answer_prefix, question, Some(Some(selected)))
						})
					})
				})
				.await
				.ok();

			return Ok(false);
		};

		if interaction.user.id.0 != request.user_id {
			interaction
				.create_interaction_response(ctx, |response| {
					response
						.kind(InteractionResponseType::ChannelMessageWithSource)
						.interaction_response_data(|data| {
							data.ephemeral(true).content(format!(
								"Only {} can interact with this quiz.",
								ctx.author().name
							))
						})
				})
				.await?;
			continue;
		}

		ctx.sessions().lock().await.finish(request.user_id);

		// strip the stale next button before issuing a fresh question
		interaction
			.create_interaction_response(ctx, |response| {
				response
					.kind(InteractionResponseType::UpdateMessage)
					.interaction_response_data(|data| {
						data.components(|c| {
							c.create_action_row(|row| {
								answer_row(row, &answer_prefix, question, Some(Some(selected)))
							})
						})
					})
			})
			.await?;

		return Ok(true);
	}
}

const DIFFICULTY_TIERS: [&str; 4] = ["fácil", "media", "difícil", "experto"];

/// Difficulty rotation for chained questions, matching the tiers in
/// `quizData.json`. Without a current tier (or with one outside the known
/// rotation) the next question gets a random tier.
fn next_difficulty(current: Option<&'static str>) -> Option<&'static str> {
	match current {
		Some("fácil") => Some("media"),
		Some("media") => Some("difícil"),
		Some("difícil") => Some("experto"),
		Some("experto") => Some("fácil"),
		_ => DIFFICULTY_TIERS.choose(&mut rand::thread_rng()).copied(),
	}
}

fn difficulty_label(difficulty: Option<&str>) -> &'static str {
	match difficulty {
		Some("fácil") => "Fácil",
		Some("media") => "Media",
		Some("difícil") => "Difícil",
		Some("experto") => "Experto",
		_ => "any difficulty",
	}
}

fn difficulty_color(difficulty: &str) -> (u8, u8, u8) {
	match difficulty.to_lowercase().as_str() {
		"fácil" => (67, 181, 129),
		"media" => (250, 166, 26),
		"difícil" => (240, 71, 71),
		"experto" => (155, 89, 182),
		_ => (250, 156, 30),
	}
}

/// Fills one action row with the A-D buttons.
///
/// `reveal` is `None` while the question is live. After resolution it holds
/// the player's pick (`Some(None)` on timeout): every button is disabled,
/// the correct one turns green and a wrong pick turns red.
fn answer_row<'row>(
	row: &'row mut CreateActionRow,
	prefix: &str,
	question: &QuizQuestion,
	reveal: Option<Option<usize>>,
) -> &'row mut CreateActionRow {
	for (index, label) in LABELS.iter().enumerate() {
		let style = match reveal {
			None => ButtonStyle::Primary,
			Some(_) if index == question.correct_index => ButtonStyle::Success,
			Some(Some(selected)) if index == selected => ButtonStyle::Danger,
			Some(_) => ButtonStyle::Secondary,
		};

		row.create_button(|b| {
			b.custom_id(format!("{prefix}{index}"))
				.label(label)
				.emoji(LETTER_EMOJIS[index])
				.style(style)
				.disabled(reveal.is_some())
		});
	}

	row
}

fn question_embed(question: &QuizQuestion, points: u64) -> CreateEmbed {
	let mut embed = CreateEmbed::default();
	embed
		.color(difficulty_color(&question.difficulty))
		.title("❓ Overwatch 2 Quiz")
		.description(format!("**{}**", question.text))
		.field(LETTER_EMOJIS[0], &question.options[0], true)
		.field(LETTER_EMOJIS[1], &question.options[1], true)
		.field('\u{200b}', '\u{200b}', false)
		.field(LETTER_EMOJIS[2], &question.options[2], true)
		.field(LETTER_EMOJIS[3], &question.options[3], true)
		.footer(|f| {
			f.text(format!(
				"Difficulty: {} | Category: {} | {points} points",
				question.difficulty, question.category
			))
		});

	if let Some(ref image) = question.image {
		embed.image(image);
	}

	embed
}

fn resolved_embed(question: &QuizQuestion, outcome: &AnswerOutcome, points: u64) -> CreateEmbed {
	let mut embed = question_embed(question, points);

	let mut result = if outcome.correct {
		format!("✅ **Correct!** You earned {} points.", outcome.points_awarded)
	} else {
		format!(
			"❌ **Wrong.** The correct answer was **{}**.",
			outcome.correct_answer
		)
	};

	if let Some(ref explanation) = question.explanation {
		result.push_str(&format!("\n💡 {explanation}"));
	}

	result.push_str(&format!("\nTotal score: **{}** points.", outcome.total_score));
	embed.field("Result", result, false);
	embed
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn difficulty_rotates_one_tier_and_wraps() {
		assert_eq!(next_difficulty(Some("fácil")), Some("media"));
		assert_eq!(next_difficulty(Some("media")), Some("difícil"));
		assert_eq!(next_difficulty(Some("difícil")), Some("experto"));
		assert_eq!(next_difficulty(Some("experto")), Some("fácil"));
	}

	#[test]
	fn unfiltered_chain_gets_a_random_known_tier() {
		for _ in 0..20 {
			let tier = next_difficulty(None).unwrap();
			assert!(DIFFICULTY_TIERS.contains(&tier));
		}
	}
}
