use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod ai;
mod config;
mod controllers;
mod error;
mod farcaster;
mod follow;
mod neynar;
mod reply;
mod webhook;


use ai::OpenAIClient;
use config::Config;
use farcaster::HubCastPoster;
use follow::{FollowEvaluator, FollowQuota};
use neynar::{NeynarClient, SocialGraph};
use webhook::ReplyPipeline;

pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<ReplyPipeline>,
    pub follow_evaluator: Arc<FollowEvaluator>,
    pub graph: Arc<dyn SocialGraph>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    if config.openai_api_key.is_empty() {
        log::warn!("OPENAI_API_KEY not set - completion calls will be rejected");
    }
    if config.neynar_api_key.is_empty() {
        log::warn!("NEYNAR_API_KEY not set - social graph lookups will be rejected");
    }
    if config.signer_private_key.is_none() {
        log::warn!("SIGNER_PRIVATE_KEY not set - replies cannot be posted");
    }
    if let Some(address) = &config.custody_address {
        log::info!("Custody address: {}", address);
    }

    let ai = OpenAIClient::new(
        &config.openai_api_key,
        Some(&config.openai_endpoint),
        Some(&config.openai_model),
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let ai = Arc::new(ai);

    let graph: Arc<dyn SocialGraph> = Arc::new(
        NeynarClient::new(&config.neynar_api_key, &config.neynar_api_base)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?,
    );

    let poster = Arc::new(HubCastPoster::new(
        &config.hub_url,
        Some(&config.neynar_api_key),
    ));

    log::info!("Initializing reply pipeline for fid {} ({})", config.agent_fid, config.agent_handle);
    let pipeline = Arc::new(ReplyPipeline::new(&config, ai.clone(), poster));

    // One quota for the lifetime of the process
    let quota = Arc::new(FollowQuota::default());
    let follow_evaluator = Arc::new(FollowEvaluator::new(
        graph.clone(),
        ai,
        quota,
        config.follow_eval_prompt.clone(),
    ));

    log::info!("Starting agent server on port {}", port);
    if config.follow_api_token.is_none() {
        log::info!("FOLLOW_API_TOKEN not set - follow routes disabled");
    }

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                config: config.clone(),
                pipeline: Arc::clone(&pipeline),
                follow_evaluator: Arc::clone(&follow_evaluator),
                graph: Arc::clone(&graph),
            }))
            .wrap(Logger::default())
            .configure(controllers::health::config_routes)
            .configure(controllers::webhook::config_routes)
            .configure(controllers::follow::config_routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
