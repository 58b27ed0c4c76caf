use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use engine::{ArtifactPaths, RecommendRequest, Recommendation, Recommender};
use retrieval::{DistanceMetric, PickPolicy, PredictionSource, RatingPrediction};
use std::path::PathBuf;
use std::time::Instant;
use tmdb_client::TmdbClient;

/// MovieScout - movie lookup over precomputed recommendation artifacts
#[derive(Parser)]
#[command(name = "movie-scout")]
#[command(about = "Movie recommendations from a precomputed latent space", long_about = None)]
struct Cli {
    /// Path to the movie catalog CSV
    #[arg(long, default_value = "data/movies.csv")]
    movies: PathBuf,

    /// Path to the latent feature table JSON
    #[arg(long, default_value = "models/latent.json")]
    latent: PathBuf,

    /// Path to the factor model JSON
    #[arg(long, default_value = "models/factors.json")]
    model: PathBuf,

    /// Distance metric the neighbor index was fitted under
    #[arg(long, value_enum, default_value = "cosine")]
    metric: MetricArg,

    /// How genre shelves select from their candidate pool
    #[arg(long, value_enum, default_value = "sample")]
    policy: PolicyArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Cosine,
    Euclidean,
}

impl From<MetricArg> for DistanceMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Cosine => DistanceMetric::Cosine,
            MetricArg::Euclidean => DistanceMetric::Euclidean,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Seeded uniform sample per shelf
    Sample,
    /// Highest feature-row mean first
    TopRated,
}

impl From<PolicyArg> for PickPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Sample => PickPolicy::SeededSample,
            PolicyArg::TopRated => PickPolicy::TopRated,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a movie and show its rating, similar titles, and genre shelves
    Recommend {
        /// Movie title to look up (case-insensitive substring match)
        #[arg(long)]
        title: String,

        /// Rating subject passed to the factor model
        #[arg(long, default_value = "1000")]
        user_id: u32,

        /// Number of similar movies to retrieve
        #[arg(long, default_value = "10")]
        similar: usize,

        /// Number of picks per genre shelf
        #[arg(long, default_value = "5")]
        per_genre: usize,

        /// Number of genre shelves
        #[arg(long, default_value = "3")]
        shelves: usize,

        /// Seed for the sampled shelf policy
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Fetch TMDb display metadata for each result (requires TMDB_API_KEY)
        #[arg(long)]
        tmdb: bool,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Predict a rating for one (user, movie) pair
    Predict {
        /// Movie title to look up (case-insensitive substring match)
        #[arg(long)]
        title: String,

        /// Rating subject passed to the factor model
        #[arg(long, default_value = "1000")]
        user_id: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let paths = ArtifactPaths {
        movies_csv: cli.movies,
        latent_json: cli.latent,
        model_json: cli.model,
    };

    // Load all artifacts up front (this may take a moment)
    println!("Loading artifacts...");
    let start = Instant::now();
    let recommender = Recommender::from_artifacts(&paths, cli.metric.into(), cli.policy.into())
        .context("Failed to load recommendation artifacts")?;
    println!("{} Loaded artifacts in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            title,
            user_id,
            similar,
            per_genre,
            shelves,
            seed,
            tmdb,
        } => {
            let request = RecommendRequest {
                title_query: title,
                user_id,
                similar_count: similar,
                per_genre,
                genre_limit: shelves,
                seed,
            };
            handle_recommend(&recommender, &request, tmdb).await?
        }
        Commands::Search { title } => handle_search(&recommender, &title)?,
        Commands::Predict { title, user_id } => handle_predict(&recommender, &title, user_id)?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    recommender: &Recommender,
    request: &RecommendRequest,
    tmdb: bool,
) -> Result<()> {
    let recommendation = recommender.recommend(request)?;
    print_recommendation(&recommendation);

    if tmdb {
        // The key is only required when metadata was actually asked for
        let api_key = std::env::var("TMDB_API_KEY")
            .context("TMDB_API_KEY must be set when --tmdb is given")?;
        let client = TmdbClient::new(api_key);
        print_metadata(&client, &recommendation).await?;
    }

    Ok(())
}

/// Handle the 'search' command
fn handle_search(recommender: &Recommender, title: &str) -> Result<()> {
    let matches = recommender.catalog().search_by_title(title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for movie in matches.iter().take(20) {
        println!("{}: {} [{}]", movie.id, movie.title, movie.genres.join(", "));
    }
    if matches.len() > 20 {
        println!("... and {} more", matches.len() - 20);
    }

    Ok(())
}

/// Handle the 'predict' command
fn handle_predict(recommender: &Recommender, title: &str, user_id: u32) -> Result<()> {
    let movie = recommender.lookup(title)?;
    let prediction = recommender.predict_for(user_id, movie.id);

    println!("{}", movie.title.bold().blue());
    println!("Predicted rating for user {}: {}", user_id, format_rating(&prediction));

    Ok(())
}

/// Format and print one recommendation
fn print_recommendation(recommendation: &Recommendation) {
    let movie = &recommendation.movie;
    println!("\n{} [{}]", movie.title.bold().blue(), movie.genres.join(", "));
    println!("Predicted rating: {}", format_rating(&recommendation.rating));

    println!("\n{}", "Similar movies:".bold().blue());
    for (rank, similar) in recommendation.similar.iter().enumerate() {
        println!(
            "{}. {} (distance {:.3})",
            (rank + 1).to_string().green(),
            similar.movie.title,
            similar.distance
        );
    }

    for shelf in &recommendation.shelves {
        println!("\n{}", format!("More {}:", shelf.genre).bold().blue());
        for pick in &shelf.picks {
            println!("  - {}", pick.title);
        }
    }
}

/// Fetch and print TMDb details for the resolved movie and each similar
/// title that carries an external id.
///
/// Fetches run one at a time; a gateway failure aborts the listing rather
/// than printing blank details in its place.
async fn print_metadata(client: &TmdbClient, recommendation: &Recommendation) -> Result<()> {
    println!("\n{}", "TMDb details:".bold().blue());

    let mut targets = vec![&recommendation.movie];
    targets.extend(recommendation.similar.iter().map(|s| &s.movie));

    for movie in targets {
        let Some(tmdb_id) = movie.tmdb_id else {
            continue;
        };
        let details = client
            .fetch_movie(tmdb_id)
            .await
            .with_context(|| format!("TMDb fetch failed for '{}'", movie.title))?;

        println!("  {}: {}", details.title.bold(), truncate(&details.overview, 120));
        if let Some(poster) = &details.poster_url {
            println!("    poster: {}", poster);
        }
    }

    Ok(())
}

fn format_rating(prediction: &RatingPrediction) -> String {
    let source = match prediction.source {
        PredictionSource::Model => "model",
        PredictionSource::Fallback => "fallback",
    };
    if prediction.value.is_nan() {
        format!("unavailable ({})", source)
    } else {
        format!("{:.2} ({})", prediction.value, source)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut)
}
