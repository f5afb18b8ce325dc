use {
	crate::{
		error::{Error, Result},
		Context, State,
	},
	owbot::maps::MapInfo,
	poise::serenity_prelude::{CollectComponentInteraction, CreateEmbed, InteractionResponseType},
	std::time::Duration,
	tracing::trace,
};

const MENU_TIMEOUT: Duration = Duration::from_secs(60);

/// Detailed information on Overwatch 2 maps.
///
/// Opens a select menu with every map in the database, grouped by game mode. \
/// Picking one shows its location, difficulty, the heroes that shine on it \
/// and the ones you might want to swap off of.
#[poise::command(slash_command, on_error = "Error::handle_command")]
pub async fn map(
	ctx: Context<'_>,
	#[description = "A map name to jump straight to (fuzzy matched)."] name: Option<String>,
) -> Result<()> {
	trace!("[/map ({})]", ctx.author().tag());
	trace!("> `name`: {name:?}");

	let maps = ctx.maps();
	if maps.is_empty() {
		return Err(Error::NoMaps);
	}

	if let Some(ref name) = name {
		let map = maps.fuzzy_find(name).ok_or(Error::MapNotFound)?;
		let embed = map_embed(map);

		ctx.send(|reply| {
			reply.embed(|e| {
				*e = embed;
				e
			})
		})
		.await?;

		return Ok(());
	}

	// Group by mode, alphabetical within each group. Discord caps select
	// menus at 25 options.
	let mut entries = maps.all().iter().collect::<Vec<_>>();
	entries.sort_by(|a, b| {
		a.kind
			.to_string()
			.cmp(&b.kind.to_string())
			.then_with(|| a.name.cmp(&b.name))
	});
	entries.truncate(25);

	let ctx_id = ctx.id();

	let reply = ctx
		.send(|reply| {
			reply
				.content(format!(
					"**{}**, pick a map to look up!",
					ctx.author().name
				))
				.components(|c| {
					c.create_action_row(|row| {
						row.create_select_menu(|menu| {
							menu.custom_id(ctx_id)
								.placeholder("Select a map")
								.options(|o| {
									for map in &entries {
										o.create_option(|option| {
											option
												.label(&map.name)
												.value(map.id)
												.description(format!(
													"{} - {}",
													map.kind, map.location
												))
										});
									}
									o
								})
						})
					})
				})
		})
		.await?;

	while let Some(interaction) = CollectComponentInteraction::new(ctx)
		.filter(move |interaction| interaction.data.custom_id == ctx_id.to_string())
		.timeout(MENU_TIMEOUT)
		.await
	{
		let selected = interaction
			.data
			.values
			.first()
			.and_then(|value| value.parse::<u32>().ok())
			.and_then(|map_id| maps.get(map_id));

		let Some(map) = selected else {
			continue;
		};

		let embed = map_embed(map);
		interaction
			.create_interaction_response(ctx, |response| {
				response
					.kind(InteractionResponseType::UpdateMessage)
					.interaction_response_data(|data| data.set_embed(embed))
			})
			.await?;
	}

	// the menu is stale once the collector times out
	reply
		.edit(ctx, |reply| reply.components(|c| c))
		.await
		.ok();

	Ok(())
}

fn map_embed(map: &MapInfo) -> CreateEmbed {
	let mut embed = CreateEmbed::default();
	embed
		.color(map.kind.color())
		.title(&map.name)
		.description(&map.description)
		.field("Mode", map.kind.to_string(), true)
		.field("📍 Location", &map.location, true)
		.field("Difficulty", map.difficulty.stars(), true);

	if !map.best_heroes.is_empty() {
		embed.field("✅ Strong picks", map.best_heroes_list(), false);
	}

	if !map.worst_heroes.is_empty() {
		embed.field("❌ Weak picks", map.worst_heroes_list(), false);
	}

	if let Some(date) = map.release_date {
		embed.field("📅 Released", date.format("%d/%m/%Y").to_string(), true);
	}

	if !map.additional_info.is_empty() {
		embed.field("ℹ️ Notes", &map.additional_info, false);
	}

	if let Some(ref image) = map.image_url {
		embed.image(image);
	}

	embed.footer(|f| f.text(format!("Map ID: {} | /map to browse again", map.id)));
	embed
}
