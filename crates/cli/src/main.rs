use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::load_dataset;
use rayon::prelude::*;
use reco::{engine, Dataset, MovieId, UserId};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// CineReco - collaborative-filtering movie recommendations
#[derive(Parser)]
#[command(name = "cine-reco")]
#[command(about = "Nearest-neighbor movie recommendations over MovieLens data", long_about = None)]
struct Cli {
    /// Path to MovieLens dataset directory
    #[arg(short, long, default_value = "data/ml-1m")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the movies most similar to a given movie
    SimilarMovies {
        /// Movie ID to compare against
        #[arg(long)]
        movie_id: MovieId,

        /// Number of similar movies to return
        #[arg(short = 'k', long, default_value = "10")]
        k: usize,

        /// Emit the result as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Find the users most similar to a given user
    SimilarUsers {
        /// User ID to compare against
        #[arg(long)]
        user_id: UserId,

        /// Number of similar users to return
        #[arg(short = 'k', long, default_value = "10")]
        k: usize,

        /// Emit the result as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Recommend movies from a movie's neighborhood (item-based)
    RecommendMovie {
        /// Movie ID to start from
        #[arg(long)]
        movie_id: MovieId,

        /// Number of recommendations to return
        #[arg(short = 'k', long, default_value = "10")]
        k: usize,

        /// Size of the similar-movie neighborhood to draw from
        #[arg(long, default_value = "50")]
        neighborhood: usize,

        /// Emit the result as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Recommend movies from a user's neighborhood (user-based)
    RecommendUser {
        /// User ID to recommend for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(short = 'k', long, default_value = "10")]
        k: usize,

        /// Size of the similar-user neighborhood to draw from
        #[arg(long, default_value = "50")]
        neighborhood: usize,

        /// Emit the result as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show a user's rating profile
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run parallel similarity queries and report latencies
    Benchmark {
        /// Number of queries to run
        #[arg(long, default_value = "100")]
        queries: usize,
    },
}

/// A recommendation joined with its display title for output
#[derive(Serialize)]
struct RankedMovie {
    rank: usize,
    movie_id: MovieId,
    title: String,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading MovieLens dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let mut dataset = load_dataset(&cli.data_dir).context("Failed to load MovieLens dataset")?;

    // The aggregation pass runs exactly once, before any query
    dataset
        .aggregate_movie_ratings()
        .context("Failed to aggregate movie ratings")?;
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    match cli.command {
        Commands::SimilarMovies { movie_id, k, json } => {
            handle_similar_movies(&dataset, movie_id, k, json)?
        }
        Commands::SimilarUsers { user_id, k, json } => {
            handle_similar_users(&dataset, user_id, k, json)?
        }
        Commands::RecommendMovie {
            movie_id,
            k,
            neighborhood,
            json,
        } => handle_recommend_movie(&dataset, movie_id, k, neighborhood, json)?,
        Commands::RecommendUser {
            user_id,
            k,
            neighborhood,
            json,
        } => handle_recommend_user(&dataset, user_id, k, neighborhood, json)?,
        Commands::User { user_id } => handle_user(&dataset, user_id)?,
        Commands::Search { title } => handle_search(&dataset, title),
        Commands::Benchmark { queries } => handle_benchmark(&dataset, queries)?,
    }

    Ok(())
}

fn title_of(dataset: &Dataset, movie_id: MovieId) -> &str {
    dataset
        .get_movie(movie_id)
        .map(|m| m.title.as_str())
        .unwrap_or("<unknown>")
}

/// Handle the 'similar-movies' command
fn handle_similar_movies(dataset: &Dataset, movie_id: MovieId, k: usize, json: bool) -> Result<()> {
    let similar = engine::similar_movies(dataset, movie_id, k)
        .with_context(|| format!("Similarity query for movie {} failed", movie_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&similar)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Movies similar to '{}':", title_of(dataset, movie_id))
            .bold()
            .blue()
    );
    for (rank, s) in similar.iter().enumerate() {
        println!(
            "{}. {} (similarity {:.4})",
            (rank + 1).to_string().green(),
            title_of(dataset, s.movie_id),
            s.similarity
        );
    }
    Ok(())
}

/// Handle the 'similar-users' command
fn handle_similar_users(dataset: &Dataset, user_id: UserId, k: usize, json: bool) -> Result<()> {
    let similar = engine::similar_users(dataset, user_id, k)
        .with_context(|| format!("Similarity query for user {} failed", user_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&similar)?);
        return Ok(());
    }

    println!("{}", format!("Users similar to {}:", user_id).bold().blue());
    for (rank, s) in similar.iter().enumerate() {
        println!(
            "{}. User {} (similarity {:.4})",
            (rank + 1).to_string().green(),
            s.user_id,
            s.similarity
        );
    }
    Ok(())
}

/// Handle the 'recommend-movie' command
fn handle_recommend_movie(
    dataset: &Dataset,
    movie_id: MovieId,
    k: usize,
    neighborhood: usize,
    json: bool,
) -> Result<()> {
    let neighbors = engine::similar_movies(dataset, movie_id, neighborhood)?;
    let recommended = engine::recommend_from_movie(dataset, movie_id, &neighbors, k)?;

    print_recommendations(
        dataset,
        &format!("Recommended after '{}':", title_of(dataset, movie_id)),
        &recommended,
        json,
    )
}

/// Handle the 'recommend-user' command
fn handle_recommend_user(
    dataset: &Dataset,
    user_id: UserId,
    k: usize,
    neighborhood: usize,
    json: bool,
) -> Result<()> {
    let neighbors = engine::similar_users(dataset, user_id, neighborhood)?;
    let recommended = engine::recommend_from_user(dataset, user_id, &neighbors, k)?;

    print_recommendations(
        dataset,
        &format!("Recommended for user {}:", user_id),
        &recommended,
        json,
    )
}

fn print_recommendations(
    dataset: &Dataset,
    header: &str,
    recommended: &[MovieId],
    json: bool,
) -> Result<()> {
    let ranked: Vec<RankedMovie> = recommended
        .iter()
        .enumerate()
        .map(|(idx, &movie_id)| RankedMovie {
            rank: idx + 1,
            movie_id,
            title: title_of(dataset, movie_id).to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    println!("{}", header.bold().blue());
    for movie in &ranked {
        println!("{}. {}", movie.rank.to_string().green(), movie.title);
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(dataset: &Dataset, user_id: UserId) -> Result<()> {
    let user = dataset
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    let num_ratings = user.ratings.len();
    let avg_rating = if num_ratings > 0 {
        let total: i64 = user.ratings.values().map(|&r| r as i64).sum();
        total as f64 / num_ratings as f64
    } else {
        0.0
    };
    println!("{}Number of ratings: {}", "• ".cyan(), num_ratings);
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);

    // Top rated movies, highest rating first, lower id on ties
    let mut top_rated: Vec<(MovieId, i32)> = user.ratings.iter().map(|(&m, &r)| (m, r)).collect();
    top_rated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    println!("Top rated movies:");
    for (movie_id, rating) in top_rated.iter().take(5) {
        println!("  - {} (Rating: {})", title_of(dataset, *movie_id), rating);
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(dataset: &Dataset, title: String) {
    let title_lower = title.to_lowercase();

    // (id, title, mean rating, rating count, 0 = exact match)
    let mut matches: Vec<(MovieId, &str, f64, usize, usize)> = Vec::new();
    for movie in dataset.movies() {
        let movie_title_lower = movie.title.to_lowercase();
        let relevance = if movie_title_lower == title_lower {
            0
        } else if movie_title_lower.contains(&title_lower) {
            1
        } else {
            continue;
        };
        matches.push((
            movie.id,
            movie.title.as_str(),
            movie.mean_rating().unwrap_or(0.0),
            movie.ratings.len(),
            relevance,
        ));
    }

    // Sort by relevance (exact match first), then by mean rating
    matches.sort_by(|a, b| {
        a.4.cmp(&b.4)
            .then_with(|| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal))
    });

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for (movie_id, movie_title, avg_rating, rating_count, _) in matches.iter().take(20) {
        println!(
            "{}: {} avg {:.2} ({} ratings)",
            movie_id, movie_title, avg_rating, rating_count
        );
    }
}

/// Handle the 'benchmark' command
///
/// Runs similar-user queries from a rayon worker pool against the one
/// shared dataset snapshot; queries are read-only so no locking is needed.
fn handle_benchmark(dataset: &Dataset, queries: usize) -> Result<()> {
    let user_ids: Vec<UserId> = dataset.users().map(|u| u.id).collect();
    if user_ids.is_empty() {
        return Err(anyhow!("Dataset contains no users"));
    }

    // Random targets, chosen up front so timing covers the queries only
    let targets: Vec<UserId> = (0..queries)
        .map(|_| user_ids[rand::random::<u32>() as usize % user_ids.len()])
        .collect();

    let bench_start = Instant::now();
    let mut timings = targets
        .par_iter()
        .map(|&user_id| {
            let start = Instant::now();
            engine::similar_users(dataset, user_id, 20)?;
            Ok::<_, anyhow::Error>(start.elapsed())
        })
        .collect::<Result<Vec<_>>>()?;
    let wall_time = bench_start.elapsed();

    let total_time: std::time::Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = queries as f32 / wall_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} queries/second", throughput);

    Ok(())
}
