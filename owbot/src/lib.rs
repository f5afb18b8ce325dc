//! Core library for the Overwatch 2 community bot.
//!
//! Everything in here is transport-free: catalog stores backed by flat JSON
//! files, the quiz session table and the ranking queries. The Discord layer
//! lives in the `discord_bot` crate and only ever talks to these types.

pub mod maps;
pub mod quiz;
pub mod scores;
pub mod storage;
pub mod workshop;
