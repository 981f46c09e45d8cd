use anyhow::Result;
use clap::Parser;
use gamerec_engine::config::CliArgs;
use gamerec_engine::server::RecommendServer;
use gamerec_engine::transport::NdjsonTransport;

fn main() -> Result<()> {
	let args = CliArgs::parse();

	// Logs go to stderr; stdout carries the NDJSON protocol.
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let transport = NdjsonTransport::new();
	let mut server = RecommendServer::new(transport, args.server_config());

	if let Some(path) = &args.catalog {
		match server.load_catalog(path) {
			Ok(engine) => tracing::info!(
				items = engine.catalog().len(),
				vocabulary = engine.vocabulary().len(),
				"Model loaded"
			),
			Err(e) => tracing::error!(
				code = e.code(),
				"Failed to load catalog, recommendations unavailable: {}",
				e
			),
		}
	}

	tracing::info!("gamerec-engine ready");
	server.run()?;
	Ok(())
}
