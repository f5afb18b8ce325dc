use {
	crate::{
		error::{Error, Result},
		Context, State,
	},
	tracing::trace,
};

/// Information about the bot and its commands.
///
/// An overview of everything the bot can do: map lookups, the trivia quiz \
/// with its leaderboard, and the community workshop-code catalog.
#[poise::command(slash_command, ephemeral, on_error = "Error::handle_command")]
pub async fn info(ctx: Context<'_>) -> Result<()> {
	trace!("[/info ({})]", ctx.author().tag());

	let (maps, questions, codes) = {
		let workshop = ctx.workshop().lock().await;
		(ctx.maps().all().len(), ctx.questions().categories().len(), workshop.len())
	};

	ctx.send(|reply| {
		reply.embed(|e| {
			e.color(ctx.color())
				.title("🤖 Overwatch 2 Community Bot")
				.description(
					"Your assistant for everything Overwatch 2: detailed map info, trivia \
					quizzes to test your knowledge, and a community-driven workshop-code \
					catalog.",
				)
				.field(
					"📋 Commands",
					"`/map` - Browse Overwatch 2 maps\n\
					`/quiz` - Play a trivia question\n\
					`/quizrank` - Quiz leaderboard and your stats\n\
					`/workshop` - Find, share and rate workshop codes",
					false,
				)
				.field(
					"🗺️ Maps",
					format!(
						"{maps} maps with best/worst hero picks, difficulty and release info."
					),
					false,
				)
				.field(
					"🎮 Quiz",
					format!(
						"Questions across {questions} categories. Harder questions award \
						more points; climb the leaderboard with `/quizrank`."
					),
					false,
				)
				.field(
					"🔧 Workshop",
					format!(
						"{codes} community-submitted codes. Add your own with \
						`/workshop add` and rate what you play."
					),
					false,
				)
				.footer(|f| {
					f.text("Made with 💙 for the Overwatch community")
						.icon_url(ctx.icon())
				})
		})
	})
	.await?;

	Ok(())
}
