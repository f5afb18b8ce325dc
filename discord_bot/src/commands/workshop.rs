use {
	super::{
		autocompletion::{autocomplete_code, autocomplete_hero},
		choices::{RatingChoice, WorkshopCategoryChoice},
	},
	crate::{
		error::{Error, Result},
		Context, State,
	},
	owbot::workshop::{validate_code, NewCode, Ratings, WorkshopCode},
	poise::serenity_prelude::{
		ButtonStyle, CollectComponentInteraction, CreateActionRow, CreateEmbed,
		InteractionResponseType,
	},
	std::time::Duration,
	tracing::{trace, warn},
};

const MENU_TIMEOUT: Duration = Duration::from_secs(60);

/// Browse and share Overwatch 2 workshop codes.
#[poise::command(
	slash_command,
	on_error = "Error::handle_command",
	subcommands("search", "category", "hero", "popular", "new", "add", "rate")
)]
pub async fn workshop(_ctx: Context<'_>) -> Result<()> {
	Ok(())
}

/// Search workshop codes by title, description, share code or tag.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn search(
	ctx: Context<'_>,
	#[description = "What to search for."] term: String,
) -> Result<()> {
	trace!("[/workshop search ({})]", ctx.author().tag());
	trace!("> `term`: {term:?}");

	let results = {
		let catalog = ctx.workshop().lock().await;
		catalog
			.search(&term)
			.into_iter()
			.cloned()
			.collect::<Vec<_>>()
	};

	browse(ctx, results, &format!("🔎 Workshop codes matching \"{term}\"")).await
}

/// Browse workshop codes by category.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn category(
	ctx: Context<'_>,
	#[description = "The category to browse."] category: WorkshopCategoryChoice,
) -> Result<()> {
	trace!("[/workshop category ({})]", ctx.author().tag());
	trace!("> `category`: {category:?}");

	let category = owbot::workshop::WorkshopCategory::from(category);
	let results = {
		let catalog = ctx.workshop().lock().await;
		catalog
			.by_category(category)
			.into_iter()
			.cloned()
			.collect::<Vec<_>>()
	};

	browse(ctx, results, &format!("📂 {category} workshop codes")).await
}

/// Browse workshop codes featuring a specific hero.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn hero(
	ctx: Context<'_>,
	#[description = "The hero to filter by."]
	#[autocomplete = "autocomplete_hero"]
	hero: String,
) -> Result<()> {
	trace!("[/workshop hero ({})]", ctx.author().tag());
	trace!("> `hero`: {hero:?}");

	let results = {
		let catalog = ctx.workshop().lock().await;
		catalog
			.by_hero(&hero)
			.into_iter()
			.cloned()
			.collect::<Vec<_>>()
	};

	browse(ctx, results, &format!("🦸 Workshop codes for {hero}")).await
}

/// Browse the most viewed workshop codes.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn popular(ctx: Context<'_>) -> Result<()> {
	trace!("[/workshop popular ({})]", ctx.author().tag());

	let results = {
		let catalog = ctx.workshop().lock().await;
		catalog
			.popular(25)
			.into_iter()
			.cloned()
			.collect::<Vec<_>>()
	};

	browse(ctx, results, "🔥 Most popular workshop codes").await
}

/// Browse the most recently added workshop codes.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn new(ctx: Context<'_>) -> Result<()> {
	trace!("[/workshop new ({})]", ctx.author().tag());

	let results = {
		let catalog = ctx.workshop().lock().await;
		catalog
			.newest(25)
			.into_iter()
			.cloned()
			.collect::<Vec<_>>()
	};

	browse(ctx, results, "🆕 Newest workshop codes").await
}

/// Submit a workshop code to the catalog.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn add(
	ctx: Context<'_>,
	#[description = "The share code (5-6 letters/digits)."] code: String,
	#[description = "A short title."] title: String,
	#[description = "The category it belongs to."] category: WorkshopCategoryChoice,
	#[description = "What the mode does."] description: String,
	#[description = "The original creator, if it's not you."] author: Option<String>,
	#[description = "Featured heroes, comma-separated."] heroes: Option<String>,
	#[description = "Tags, comma-separated."] tags: Option<String>,
) -> Result<()> {
	trace!("[/workshop add ({})]", ctx.author().tag());
	trace!("> `code`: {code:?}");
	trace!("> `title`: {title:?}");
	trace!("> `category`: {category:?}");

	let code = code.trim().to_uppercase();
	if !validate_code(&code) {
		return Err(Error::InvalidCode);
	}

	let mut catalog = ctx.workshop().lock().await;
	if catalog.by_code(&code).is_some() {
		return Err(Error::DuplicateCode { code });
	}

	let submission = NewCode {
		code,
		title,
		author: author.unwrap_or_else(|| ctx.author().name.clone()),
		description,
		category: category.into(),
		heroes: csv_list(heroes, "All"),
		tags: csv_list(tags, ""),
		submitted_by: ctx.author().tag(),
	};

	let embed = code_embed(catalog.add(submission)?);
	drop(catalog);

	ctx.send(|reply| {
		reply
			.content("✅ Workshop code added to the catalog!")
			.embed(|e| {
				*e = embed;
				e
			})
	})
	.await?;

	Ok(())
}

/// Rate a workshop code from 1 to 5 stars.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn rate(
	ctx: Context<'_>,
	#[description = "The share code to rate."]
	#[autocomplete = "autocomplete_code"]
	code: String,
	#[description = "Your rating."] rating: RatingChoice,
) -> Result<()> {
	trace!("[/workshop rate ({})]", ctx.author().tag());
	trace!("> `code`: {code:?}");
	trace!("> `rating`: {rating:?}");

	let mut catalog = ctx.workshop().lock().await;
	if catalog.by_code(&code).is_none() {
		return Err(Error::CodeNotFound { code });
	}

	let summary = catalog.rate(&code, rating.into())?;
	drop(catalog);

	let ratings = Ratings { average: summary.average, count: summary.count };

	ctx.send(|reply| {
		reply.embed(|e| {
			e.color(ctx.color())
				.title("⭐ Rating saved")
				.description(format!(
					"`{}` is now rated {} **{:.1}** across **{}** votes.",
					code.to_uppercase(),
					ratings.stars(),
					ratings.average,
					ratings.count,
				))
				.footer(|f| f.text(ctx.author().tag()).icon_url(ctx.icon()))
		})
	})
	.await?;

	Ok(())
}

/// Shared result presenter for the browse subcommands.
///
/// Shows a select menu of up to 25 codes. Picking one swaps in the detail
/// embed (counting a view), with a copy button and a rate button; rating
/// opens a row of 1-5 star buttons and folds the vote into the average.
async fn browse(ctx: Context<'_>, results: Vec<WorkshopCode>, title: &str) -> Result<()> {
	if results.is_empty() {
		return Err(Error::NoResults);
	}

	let mut results = results;
	results.truncate(25);

	let ctx_id = ctx.id();
	let menu_id = format!("{ctx_id}-menu");
	let copy_prefix = format!("{ctx_id}-copy-");
	let rate_prefix = format!("{ctx_id}-rate-");
	let star_prefix = format!("{ctx_id}-star-");

	let reply = ctx
		.send(|reply| {
			reply
				.content(format!("**{title}** ({} found)", results.len()))
				.components(|c| c.create_action_row(|row| menu_row(row, &menu_id, &results)))
		})
		.await?;

	while let Some(interaction) = CollectComponentInteraction::new(ctx)
		.filter({
			let prefix = ctx_id.to_string();
			move |interaction| interaction.data.custom_id.starts_with(&prefix)
		})
		.timeout(MENU_TIMEOUT)
		.await
	{
		let custom_id = interaction.data.custom_id.clone();

		if custom_id == menu_id {
			let Some(selected) = interaction.data.values.first() else {
				continue;
			};

			let embed = {
				let mut catalog = ctx.workshop().lock().await;
				// the detail view is still worth showing when the counter
				// couldn't be persisted
				if let Err(why) = catalog.bump_popularity(selected) {
					warn!("Failed to count view for `{selected}`: {why:?}");
				}
				catalog.by_code(selected).map(code_embed)
			};
			let Some(embed) = embed else {
				continue;
			};

			interaction
				.create_interaction_response(ctx, |response| {
					response
						.kind(InteractionResponseType::UpdateMessage)
						.interaction_response_data(|data| {
							data.set_embed(embed).components(|c| {
								c.create_action_row(|row| menu_row(row, &menu_id, &results))
									.create_action_row(|row| {
										detail_row(row, &copy_prefix, &rate_prefix, selected)
									})
							})
						})
				})
				.await?;
		} else if let Some(code) = custom_id.strip_prefix(&copy_prefix) {
			// Raw code in its own message so mobile users can long-press it.
			interaction
				.create_interaction_response(ctx, |response| {
					response
						.kind(InteractionResponseType::ChannelMessageWithSource)
						.interaction_response_data(|data| {
							data.ephemeral(true).content(format!("```\n{code}\n```"))
						})
				})
				.await?;
		} else if let Some(code) = custom_id.strip_prefix(&rate_prefix) {
			let code = code.to_owned();
			interaction
				.create_interaction_response(ctx, |response| {
					response
						.kind(InteractionResponseType::UpdateMessage)
						.interaction_response_data(|data| {
							data.components(|c| {
								c.create_action_row(|row| menu_row(row, &menu_id, &results))
									.create_action_row(|row| star_row(row, &star_prefix, &code))
							})
						})
				})
				.await?;
		} else if let Some(rest) = custom_id.strip_prefix(&star_prefix) {
			// share codes never contain '-', so the last segment is the vote
			let Some((code, stars)) = rest.rsplit_once('-') else {
				continue;
			};
			let Ok(stars) = stars.parse::<u8>() else {
				continue;
			};
			if !(1..=5).contains(&stars) {
				return Err(Error::InvalidRating);
			}

			let embed = {
				let mut catalog = ctx.workshop().lock().await;
				catalog.rate(code, stars)?;
				catalog.by_code(code).map(code_embed)
			};
			let Some(embed) = embed else {
				continue;
			};

			let code = code.to_owned();
			interaction
				.create_interaction_response(ctx, |response| {
					response
						.kind(InteractionResponseType::UpdateMessage)
						.interaction_response_data(|data| {
							data.set_embed(embed).components(|c| {
								c.create_action_row(|row| menu_row(row, &menu_id, &results))
									.create_action_row(|row| {
										detail_row(row, &copy_prefix, &rate_prefix, &code)
									})
							})
						})
				})
				.await?;
		}
	}

	// the message stays, interactive parts go
	reply
		.edit(ctx, |reply| reply.components(|c| c))
		.await
		.ok();

	Ok(())
}

fn menu_row<'row>(
	row: &'row mut CreateActionRow,
	menu_id: &str,
	results: &[WorkshopCode],
) -> &'row mut CreateActionRow {
	row.create_select_menu(|menu| {
		menu.custom_id(menu_id)
			.placeholder("Pick a workshop code...")
			.options(|options| {
				for code in results {
					options.create_option(|option| {
						option
							.label(&code.title)
							.value(&code.code)
							.description(format!(
								"{} | {} {:.1} ({})",
								code.category,
								code.ratings.stars(),
								code.ratings.average,
								code.ratings.count,
							))
					});
				}
				options
			})
	})
}

fn detail_row<'row>(
	row: &'row mut CreateActionRow,
	copy_prefix: &str,
	rate_prefix: &str,
	code: &str,
) -> &'row mut CreateActionRow {
	row.create_button(|b| {
		b.custom_id(format!("{copy_prefix}{code}"))
			.label("Copy code")
			.emoji('📋')
			.style(ButtonStyle::Primary)
	})
	.create_button(|b| {
		b.custom_id(format!("{rate_prefix}{code}"))
			.label("Rate")
			.emoji('⭐')
			.style(ButtonStyle::Secondary)
	})
}

fn star_row<'row>(
	row: &'row mut CreateActionRow,
	star_prefix: &str,
	code: &str,
) -> &'row mut CreateActionRow {
	for stars in 1..=5u8 {
		row.create_button(|b| {
			b.custom_id(format!("{star_prefix}{code}-{stars}"))
				.label(stars.to_string())
				.emoji('⭐')
				.style(ButtonStyle::Secondary)
		});
	}

	row
}

fn code_embed(code: &WorkshopCode) -> CreateEmbed {
	let mut embed = CreateEmbed::default();
	embed
		.color(code.category.color())
		.title(format!("{} `{}`", code.title, code.code))
		.description(code.short_description())
		.field("Category", &code.category, true)
		.field("Author", &code.author, true)
		.field("Difficulty", &code.difficulty, true)
		.field("Heroes", code.formatted_heroes(), true)
		.field(
			"Rating",
			format!(
				"{} {:.1} ({} votes)",
				code.ratings.stars(),
				code.ratings.average,
				code.ratings.count
			),
			true,
		)
		.field("Views", code.popularity, true)
		.footer(|f| {
			f.text(format!(
				"Added {} | Updated {} | Source: {}",
				code.date_added.format("%d/%m/%Y"),
				code.last_updated.format("%d/%m/%Y"),
				code.source,
			))
		});

	if !code.subcategory.is_empty() {
		embed.field("Subcategory", &code.subcategory, true);
	}

	if !code.tags.is_empty() {
		embed.field("Tags", code.formatted_tags(), false);
	}

	if !code.source_url.is_empty() {
		embed.url(&code.source_url);
	}

	if let Some(ref image) = code.image_url {
		embed.image(image);
	}

	embed
}

/// Splits a comma-separated option into trimmed entries, substituting the
/// fallback when nothing usable remains.
fn csv_list(input: Option<String>, fallback: &str) -> Vec<String> {
	let entries = input
		.map(|input| {
			input
				.split(',')
				.map(str::trim)
				.filter(|entry| !entry.is_empty())
				.map(String::from)
				.collect::<Vec<_>>()
		})
		.unwrap_or_default();

	if entries.is_empty() && !fallback.is_empty() {
		return vec![String::from(fallback)];
	}

	entries
}
