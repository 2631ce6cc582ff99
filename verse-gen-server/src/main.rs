use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, post, web};
use clap::Parser;
use log::{error, info, warn};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use verse_gen_core::{PoemError, PoemService, PoemTemplate, ServiceConfig};

#[derive(Parser)]
#[command(name = "verse-gen-server")]
#[command(about = "HTTP API generating poems from text corpora")]
struct Args {
	/// JSON service configuration (data folder, dictionary, seed, budgets)
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to bind
	#[arg(short, long, default_value_t = 5000)]
	port: u16,

	/// Seconds a single generation may take before answering 504
	#[arg(long, default_value_t = 30)]
	timeout_secs: u64,
}

struct Limits {
	timeout: Duration,
}

/// Query parameters of `/v1/generate`; a missing key is picked at random.
#[derive(Deserialize)]
struct GenerateParams {
	source: Option<String>,
	style: Option<String>,
}

#[derive(Deserialize)]
struct CustomRequest {
	text: String,
	style: Option<String>,
}

/// Body of `/v1/template`: either a named `source` or submitted `text`.
#[derive(Deserialize)]
struct TemplateRequest {
	source: Option<String>,
	text: Option<String>,
	scheme: String,
	meters: BTreeMap<String, String>,
}

impl TemplateRequest {
	fn template(&self) -> Result<PoemTemplate, String> {
		let mut meters = Vec::with_capacity(self.meters.len());
		for (label, meter) in &self.meters {
			let mut chars = label.chars();
			match (chars.next(), chars.next()) {
				(Some(c), None) => meters.push((c, meter.as_str())),
				_ => return Err(format!("Rhyme labels must be a single character, got '{label}'")),
			}
		}
		PoemTemplate::parse(&self.scheme, meters).map_err(|e| e.user_message())
	}
}

/// Picks `requested`, or a random key when the client sent none.
fn choose_key(requested: &Option<String>, valid: Vec<String>) -> String {
	match requested {
		Some(key) if !key.trim().is_empty() => key.trim().to_owned(),
		_ => valid.choose(&mut rand::rng()).cloned().unwrap_or_default(),
	}
}

/// Runs one generation on the blocking pool under the configured timeout.
///
/// # Notes
/// - Bad keys or templates answer 400, corpora unable to produce the poem
///   answer 422, both with the user-facing message.
/// - A timed out generation keeps its blocking thread until its own retry
///   budget runs out; only the response is abandoned.
async fn run_generation<F>(limits: &Limits, job: F) -> HttpResponse
where
	F: FnOnce() -> Result<String, PoemError> + Send + 'static,
{
	match actix_web::rt::time::timeout(limits.timeout, web::block(job)).await {
		Ok(Ok(Ok(poem))) => HttpResponse::Ok().body(poem),
		Ok(Ok(Err(e))) if e.is_configuration() => HttpResponse::BadRequest().body(e.user_message()),
		Ok(Ok(Err(e @ (PoemError::EmptyCorpusSelection | PoemError::GenerationTimeout { .. })))) => {
			HttpResponse::UnprocessableEntity().body(e.user_message())
		}
		Ok(Ok(Err(e))) => {
			error!("Generation failed: {e}");
			HttpResponse::InternalServerError().body(e.user_message())
		}
		Ok(Err(e)) => {
			error!("Blocking pool failure: {e}");
			HttpResponse::InternalServerError().body("Generation failed")
		}
		Err(_) => {
			warn!("Generation exceeded {:?}", limits.timeout);
			HttpResponse::GatewayTimeout().body("Poem generation took too long, please try again")
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns a poem from a named source in a named style.
#[get("/v1/generate")]
async fn get_generated(
	service: web::Data<PoemService>,
	limits: web::Data<Limits>,
	query: web::Query<GenerateParams>,
) -> impl Responder {
	let source = choose_key(&query.source, service.source_names());
	let style = choose_key(&query.style, service.style_names());
	info!("Generating '{style}' from '{source}'");

	let service = service.into_inner();
	run_generation(&limits, move || service.try_generate(&source, &style)).await
}

#[get("/v1/sources")]
async fn get_sources(service: web::Data<PoemService>) -> impl Responder {
	HttpResponse::Ok().body(service.source_names().join("\n"))
}

#[get("/v1/styles")]
async fn get_styles(service: web::Data<PoemService>) -> impl Responder {
	HttpResponse::Ok().body(service.style_names().join("\n"))
}

/// HTTP POST endpoint `/v1/custom`
///
/// Returns a poem built from the submitted text.
#[post("/v1/custom")]
async fn post_custom(
	service: web::Data<PoemService>,
	limits: web::Data<Limits>,
	body: web::Json<CustomRequest>,
) -> impl Responder {
	let CustomRequest { text, style } = body.into_inner();
	let style = choose_key(&style, service.style_names());

	let service = service.into_inner();
	run_generation(&limits, move || service.try_generate_custom(&text, &style)).await
}

/// HTTP POST endpoint `/v1/template`
///
/// Returns a poem following a caller-defined rhyme scheme and meters.
#[post("/v1/template")]
async fn post_template(
	service: web::Data<PoemService>,
	limits: web::Data<Limits>,
	body: web::Json<TemplateRequest>,
) -> impl Responder {
	let template = match body.template() {
		Ok(template) => template,
		Err(message) => return HttpResponse::BadRequest().body(message),
	};

	let service = service.into_inner();
	match body.into_inner() {
		TemplateRequest { text: Some(text), .. } => {
			run_generation(&limits, move || service.try_generate_custom_with_template(&text, &template)).await
		}
		TemplateRequest { source, .. } => {
			let source = choose_key(&source, service.source_names());
			run_generation(&limits, move || service.try_generate_with_template(&source, &template)).await
		}
	}
}

/// Main entry point for the server.
///
/// Loads every corpus of the configured data folder, then serves the poem API.
///
/// # Notes
/// - `RUST_LOG` controls verbosity (default `info`).
/// - Without `--config`, corpora are read from `./data`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => ServiceConfig::load(path).map_err(|e| std::io::Error::other(e.to_string()))?,
		None => ServiceConfig::default(),
	};
	let service = PoemService::from_config(&config).map_err(|e| {
		error!("Failed to start: {e}");
		std::io::Error::other(e.to_string())
	})?;
	info!(
		"Serving {} sources and {} styles on {}:{}",
		service.source_names().len(),
		service.style_names().len(),
		args.host,
		args.port
	);

	let service = web::Data::new(service);
	let limits = web::Data::new(Limits {
		timeout: Duration::from_secs(args.timeout_secs.max(1)),
	});

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.wrap(middleware::Logger::default())
			.app_data(service.clone())
			.app_data(limits.clone())
			.service(get_generated)
			.service(get_sources)
			.service(get_styles)
			.service(post_custom)
			.service(post_template)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}
