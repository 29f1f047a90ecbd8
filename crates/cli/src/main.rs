mod config;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use server::{AppContext, CommonMovies};
use sources::{MongoMovieStore, Neo4jMovieStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up .env before clap reads the environment
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ctx = connect(&args).await?;

    match args.command() {
        Command::Serve => server::serve(ctx, args.listen)
            .await
            .with_context(|| format!("Server on {} failed", args.listen))?,
        Command::Common { json } => handle_common(&ctx, json).await?,
    }

    Ok(())
}

/// Open both stores and build the shared context. Fails if either store is
/// unreachable.
async fn connect(args: &Args) -> Result<AppContext> {
    let start = Instant::now();

    let (documents, graph) = tokio::try_join!(
        async {
            MongoMovieStore::connect(&args.mongo_config())
                .await
                .context("Failed to connect to MongoDB")
        },
        async {
            Neo4jMovieStore::connect(&args.neo4j_config())
                .await
                .context("Failed to connect to Neo4j")
        },
    )?;

    info!("Connected to both stores in {:.2?}", start.elapsed());

    Ok(AppContext::new(
        Arc::new(documents),
        Arc::new(graph),
        args.context_settings(),
    ))
}

/// Handle the 'common' command
async fn handle_common(ctx: &AppContext, json: bool) -> Result<()> {
    let start = Instant::now();
    let common = ctx
        .common_movies()
        .await
        .context("Failed to reconcile movie catalogs")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&common)?);
    } else {
        print_common(ctx, &common);
        println!(
            "{} {} common movies in {:.2?}",
            "✓".green(),
            common.common_movies_count,
            start.elapsed()
        );
    }
    Ok(())
}

fn print_common(ctx: &AppContext, common: &CommonMovies) {
    println!(
        "{}",
        format!(
            "Common movies ({} title match):",
            ctx.settings().title_matching
        )
        .bold()
        .blue()
    );
    for (rank, movie) in common.movies.iter().enumerate() {
        let year = movie
            .field("year")
            .map(|year| year.to_string())
            .unwrap_or_else(|| "????".to_string());
        println!("{}. {} ({})", (rank + 1).to_string().green(), movie.title, year);
    }
}
