use {
	super::quiz::{self, QuizRequest},
	crate::{
		error::{Error, Result},
		Context, State,
	},
	poise::serenity_prelude::{
		ButtonStyle, CollectComponentInteraction, InteractionResponseType,
	},
	std::time::Duration,
	tracing::trace,
};

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];
const TOP_N: usize = 10;
const PLAY_TIMEOUT: Duration = Duration::from_secs(60);

/// Show the quiz leaderboard.
///
/// Displays the 10 highest scores, your own score and position, and a few \
/// overall stats. Earn points with `/quiz` or straight from the "play" \
/// button below the board.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn quizrank(ctx: Context<'_>) -> Result<()> {
	trace!("[/quizrank ({})]", ctx.author().tag());

	let scores = ctx.scores().lock().await;
	let stats = scores.stats().ok_or(Error::NoScores)?;

	let ranking = scores.ranking(TOP_N);
	let user_key = ctx.author().id.0.to_string();
	let own_points = scores.score_of(&user_key);
	let own_position = scores.position_of(&user_key);
	drop(scores);

	let lines = ranking
		.iter()
		.enumerate()
		.map(|(i, entry)| {
			let medal = MEDALS
				.get(i)
				.map(|medal| String::from(*medal))
				.unwrap_or_else(|| format!("`#{}`", i + 1));

			format!("{medal} <@{}> — **{}** points", entry.user_id, entry.points)
		})
		.collect::<Vec<_>>()
		.join("\n");

	let own_line = match own_position {
		0 => String::from("You haven't scored yet. Play `/quiz` to get on the board!"),
		position => format!("**#{position}** with **{own_points}** points"),
	};

	let play_id = format!("{}-play", ctx.id());

	let reply = ctx
		.send(|reply| {
			reply
				.embed(|e| {
					e.color(ctx.color())
						.title("🏆 Quiz Leaderboard")
						.description(lines)
						.field("Your ranking", own_line, false)
						.field(
							"Stats",
							format!(
								"{} players | {} total points | {} average",
								stats.participants, stats.total_points, stats.average_points
							),
							false,
						)
						.footer(|f| {
							f.text(format!("{} | Play /quiz to climb", ctx.author().tag()))
								.icon_url(ctx.icon())
						})
				})
				.components(|c| {
					c.create_action_row(|row| {
						row.create_button(|b| {
							b.custom_id(&play_id)
								.label("Play quiz")
								.emoji('🎮')
								.style(ButtonStyle::Primary)
						})
					})
				})
		})
		.await?;

	while let Some(interaction) = CollectComponentInteraction::new(ctx)
		.filter({
			let play_id = play_id.clone();
			move |interaction| interaction.data.custom_id == play_id
		})
		.timeout(PLAY_TIMEOUT)
		.await
	{
		if interaction.user.id.0 != ctx.author().id.0 {
			interaction
				.create_interaction_response(ctx, |response| {
					response
						.kind(InteractionResponseType::ChannelMessageWithSource)
						.interaction_response_data(|data| {
							data.ephemeral(true)
								.content("Run `/quizrank` yourself to get a play button.")
						})
				})
				.await?;
			continue;
		}

		// hand the board's button over to the regular quiz flow
		interaction
			.create_interaction_response(ctx, |response| {
				response
					.kind(InteractionResponseType::UpdateMessage)
					.interaction_response_data(|data| data.components(|c| c))
			})
			.await?;

		let request = QuizRequest {
			category: None,
			difficulty: None,
			user_id: ctx.author().id.0,
		};

		return quiz::play(ctx, request).await;
	}

	reply
		.edit(ctx, |reply| reply.components(|c| c))
		.await
		.ok();

	Ok(())
}
