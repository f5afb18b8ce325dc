//! Minimal liveness HTTP endpoint for external uptime checks.

use {
	axum::{http::StatusCode, routing::get, Router, Server},
	std::net::SocketAddr,
	tracing::info,
};

pub async fn run(port: u16) {
	let router = Router::new().route("/", get(liveness));
	let addr = SocketAddr::from(([0, 0, 0, 0], port));

	info!("Liveness endpoint listening on {addr}.");

	Server::bind(&addr)
		.serve(router.into_make_service())
		.await
		.expect("Failed to run liveness server.");
}

async fn liveness() -> (StatusCode, &'static str) {
	(StatusCode::OK, "Bot is alive")
}
