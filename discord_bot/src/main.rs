//! Discord bot for an Overwatch 2 community.
//!
//! The bot serves map-info lookups, a trivia quiz with a persistent
//! leaderboard and a community-submitted workshop-code catalog with search
//! and ratings. All state lives in flat JSON files under the configured data
//! directory and is managed by the [`owbot`] crate; this crate is only the
//! Discord-facing layer.

#![warn(missing_debug_implementations, rust_2018_idioms)]
#![warn(clippy::style, clippy::perf, clippy::complexity, clippy::correctness)]

mod commands;
mod error;
mod health;

use {
	crate::error::Error,
	clap::{Parser, ValueEnum},
	color_eyre::Result as Eyre,
	owbot::{
		maps::MapCatalog,
		quiz::{QuestionBank, SessionTable},
		scores::ScoreBoard,
		workshop::WorkshopCatalog,
	},
	poise::{
		serenity_prelude::{GatewayIntents, GuildId, UserId},
		Command, Event, Framework, FrameworkOptions,
	},
	serde::Deserialize,
	std::{collections::HashSet, path::PathBuf},
	time::macros::format_description,
	tokio::sync::Mutex,
	tracing::{debug, info},
	tracing_subscriber::{
		fmt::{format::FmtSpan, time::UtcTime},
		EnvFilter,
	},
};

#[tokio::main]
async fn main() -> Eyre<()> {
	color_eyre::install()?;
	let args = Args::parse();

	let config_file = std::fs::read_to_string(args.config)?;
	let mut config: Config = toml::from_str(&config_file)?;
	if let Some(mode) = args.mode {
		config.mode = mode;
	}

	let cwd = std::env::var("PWD")?;
	let file_logger = tracing_appender::rolling::minutely(cwd + "/logs", "owbot.log");
	let (log_writer, _guard) = tracing_appender::non_blocking(file_logger);

	tracing_subscriber::fmt()
		.compact()
		.with_writer(log_writer)
		.with_timer(UtcTime::new(format_description!(
			"[[[year]-[month]-[day] | [hour]:[minute]:[second]]"
		)))
		.with_line_number(true)
		.with_span_events(FmtSpan::NEW)
		.with_env_filter({
			EnvFilter::new(if args.debug {
				"DEBUG"
			} else if let Some(ref level) = config.log_level {
				level.as_str()
			} else {
				"discord_bot=INFO,owbot=INFO"
			})
		})
		.init();

	let global_state = GlobalState::new(config);

	tokio::spawn(health::run(global_state.config.health_port));

	let framework = Framework::builder()
		.options(FrameworkOptions {
			owners: HashSet::from_iter([UserId(global_state.config.owner_id)]),
			commands: vec![
				commands::info(),
				commands::map(),
				commands::quiz(),
				commands::quizrank(),
				commands::workshop(),
			],
			event_handler: |_, event, _, _| {
				Box::pin(async move {
					debug!("Received event `{}`", event.name());
					if let Event::Ready { data_about_bot } = event {
						info!("Connected to Discord as {}!", data_about_bot.user.tag());
					}
					Ok(())
				})
			},
			..Default::default()
		})
		.token(&global_state.config.discord_token)
		.intents(GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES)
		.setup(move |ctx, _, framework| {
			Box::pin(async move {
				let commands = &framework.options().commands;
				let mode = &global_state.config.mode;
				match mode {
					RegisterMode::Dev => {
						let dev_guild = GuildId(global_state.config.dev_guild);
						poise::builtins::register_in_guild(ctx, commands, dev_guild).await?;
					}
					RegisterMode::Prod => {
						poise::builtins::register_globally(ctx, commands).await?;
					}
				}

				for Command { name, .. } in commands {
					info!("[{mode}] Successfully registered command `/{name}`.");
				}

				Ok(global_state)
			})
		});

	info!("Finished setting up. Connecting to Discord...");
	framework
		.run()
		.await
		.expect("Failed to run framework.");

	Ok(())
}

/// Some convenience CLI arguments to configure the bot quickly without
/// changing the config file. Any of these options will override the values
/// set in the config file.
#[derive(Debug, Clone, Parser)]
struct Args {
	/// The path to the bot's config file.
	#[arg(short, long)]
	#[clap(default_value = "./config.toml")]
	pub config: PathBuf,

	/// Override the register mode from the config file.
	#[arg(short, long)]
	pub mode: Option<RegisterMode>,

	/// Run in debug mode.
	#[arg(long)]
	#[clap(default_value = "false")]
	pub debug: bool,
}

/// Config file for the bot.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Can be one of the following:
	/// - `TRACE`
	/// - `DEBUG`
	/// - `INFO`
	/// - `WARN`
	/// - `ERROR`
	///
	/// This value will default to `INFO`.
	/// The `--debug` flag will always override this value to `DEBUG`.
	pub log_level: Option<String>,

	/// Authentication Token for the Discord API.
	pub discord_token: String,

	/// Which level to register commands on.
	/// - `Dev`: commands will be registered on a single guild only. This is
	///          fast and useful for development.
	/// - `Prod`: commands will be registered globally. This might take a
	///           while to reload and should only be used in production.
	pub mode: RegisterMode,

	/// The `GuildID` of the development server. This will be used for
	/// registering commands when running in `Dev` mode.
	pub dev_guild: u64,

	/// The `UserID` of the bot's owner.
	pub owner_id: u64,

	/// Directory holding the JSON data files (`mapData.json`,
	/// `quizData.json`, `quizPoints.json`, `workshopData.json`).
	pub data_dir: PathBuf,

	/// Port for the liveness HTTP endpoint used by external uptime checks.
	pub health_port: u16,
}

/// Which level to register commands on.
#[derive(Debug, Clone, Deserialize, ValueEnum)]
pub enum RegisterMode {
	/// Commands will be registered on a single guild only. This is fast and
	/// useful for development.
	Dev,

	/// Commands will be registered globally. This might take a while to
	/// reload and should only be used in production.
	Prod,
}

impl std::fmt::Display for RegisterMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Dev => "Dev",
			Self::Prod => "Prod",
		})
	}
}

/// Global State Object used for the entire runtime of the process. The
/// read-only catalogs are loaded once and leaked; the mutable stores sit
/// behind async mutexes since every mutation rewrites a shared JSON file.
#[derive(Debug)]
pub struct GlobalState {
	/// Parsed config file of the bot.
	pub config: Config,

	/// All Overwatch 2 maps, immutable for the process lifetime.
	pub maps: &'static MapCatalog,

	/// All quiz questions plus the per-difficulty point table.
	pub questions: &'static QuestionBank,

	/// The workshop-code catalog. Mutated by `/workshop add|rate` and by
	/// detail views (popularity).
	pub workshop: Mutex<WorkshopCatalog>,

	/// The quiz leaderboard. Mutated on every correct answer.
	pub scores: Mutex<ScoreBoard>,

	/// Per-user quiz turn state.
	pub sessions: Mutex<SessionTable>,

	/// #FA9C1E
	pub color: (u8, u8, u8),

	/// Thumbnail used in embed footers.
	pub icon: String,
}

impl GlobalState {
	fn new(config: Config) -> Self {
		let maps: &'static MapCatalog =
			Box::leak(Box::new(MapCatalog::load(&config.data_dir.join("mapData.json"))));
		let questions: &'static QuestionBank =
			Box::leak(Box::new(QuestionBank::load(&config.data_dir.join("quizData.json"))));
		let workshop =
			Mutex::new(WorkshopCatalog::load(&config.data_dir.join("workshopData.json")));
		let scores = Mutex::new(ScoreBoard::load(&config.data_dir.join("quizPoints.json")));

		info!(
			"Loaded {} maps and {} quiz categories.",
			maps.all().len(),
			questions.categories().len()
		);

		Self {
			config,
			maps,
			questions,
			workshop,
			scores,
			sessions: Mutex::new(SessionTable::new()),
			color: (250, 156, 30),
			icon: String::from(
				"https://blz-contentstack-images.akamaized.net/v3/assets/blt9c12f249ac15c7ec/blt5a7c3dc494771b95/6233336c12894d313443adc2/ow2-logo-small.png",
			),
		}
	}
}

/// Global `Context` type which gets passed to slash commands.
pub type Context<'ctx> = poise::Context<'ctx, GlobalState, Error>;

/// Convenience trait for getter functions on [`Context`] since it's not my
/// own type.
#[allow(missing_docs)]
pub trait State {
	fn config(&self) -> &Config;
	fn maps(&self) -> &'static MapCatalog;
	fn questions(&self) -> &'static QuestionBank;
	fn workshop(&self) -> &Mutex<WorkshopCatalog>;
	fn scores(&self) -> &Mutex<ScoreBoard>;
	fn sessions(&self) -> &Mutex<SessionTable>;
	fn color(&self) -> (u8, u8, u8);
	fn icon(&self) -> &str;
}

impl State for Context<'_> {
	fn config(&self) -> &Config {
		&self.data().config
	}

	fn maps(&self) -> &'static MapCatalog {
		self.data().maps
	}

	fn questions(&self) -> &'static QuestionBank {
		self.data().questions
	}

	fn workshop(&self) -> &Mutex<WorkshopCatalog> {
		&self.data().workshop
	}

	fn scores(&self) -> &Mutex<ScoreBoard> {
		&self.data().scores
	}

	fn sessions(&self) -> &Mutex<SessionTable> {
		&self.data().sessions
	}

	fn color(&self) -> (u8, u8, u8) {
		self.data().color
	}

	fn icon(&self) -> &str {
		&self.data().icon
	}
}
