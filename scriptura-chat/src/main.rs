//! Terminal chat front-end for the scriptura retrieval pipeline.
//!
//! First run downloads the corpus and builds the vector index; later runs
//! reopen the persisted index and go straight to the chat loop. Answers
//! stream to the terminal as they arrive.

mod session;
mod setup;

use std::env;
use std::io::Write;
use std::sync::Arc;

use rig::prelude::*;
use rig::providers::gemini;
use scriptura::config::RagConfig;
use scriptura::embeddings::RemoteEmbeddingProvider;
use scriptura::generation::RigAnswerModel;
use scriptura::pipeline::{PipelineOptions, RagPipeline};
use scriptura::stores::{SqliteFragmentStore, reset_index};
use scriptura::types::RagError;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use session::{ChatSession, ChatTurn};

const PROVIDER: &str = "gemini";

const STARTER_QUESTIONS: [&str; 5] = [
    "What does the Bible say about creation?",
    "Tell me about God's love for the world",
    "What is the Lord's Prayer?",
    "How does the Bible describe love?",
    "What does Psalm 23 say about God as shepherd?",
];

#[tokio::main]
async fn main() -> Result<(), RagError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = RagConfig::from_env();
    config.validate()?;
    if env::var("GEMINI_API_KEY").is_err() {
        return Err(RagError::Config(
            "GEMINI_API_KEY must be set (see .env.example)".into(),
        ));
    }
    let client = gemini::Client::from_env();

    let mut pipeline = assemble(&client, &config).await?;

    let stats = pipeline.stats().await?;
    if stats.ready {
        println!("Verse index ready ({} fragments).", stats.fragments);
    } else {
        setup::run_setup(&pipeline, &config).await?;
    }

    println!();
    println!("Ask questions about the Bible and get scripture-based answers.");
    println!("Commands: /help /stats /clear /rebuild /quit");

    let mut session = ChatSession::new();
    print_starters(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt_user();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/stats" => {
                let stats = pipeline.stats().await?;
                println!(
                    "index: {} | fragments: {} | location: {} | turns this session: {}",
                    if stats.ready { "ready" } else { "empty" },
                    stats.fragments,
                    config.index_path.display(),
                    session.len(),
                );
            }
            "/clear" => {
                session.clear();
                println!("Conversation cleared.");
            }
            "/rebuild" => {
                println!("Deleting the index and rebuilding from the corpus...");
                // Release the store handle before deleting its database file.
                drop(pipeline);
                reset_index(&config.index_path).await?;
                pipeline = assemble(&client, &config).await?;
                setup::run_setup(&pipeline, &config).await?;
            }
            question => {
                session.push(ChatTurn::user(question));
                match pipeline.answer_stream(question).await {
                    Ok(mut stream) => {
                        let mut answer = String::new();
                        while let Some(chunk) = stream.next().await {
                            print!("{chunk}");
                            let _ = std::io::stdout().flush();
                            answer.push_str(&chunk);
                        }
                        println!();
                        session.push(ChatTurn::assistant(answer));
                    }
                    Err(err) => println!("Cannot answer right now: {err}"),
                }
            }
        }
        prompt_user();
    }

    println!("Goodbye.");
    Ok(())
}

async fn assemble(client: &gemini::Client, config: &RagConfig) -> Result<RagPipeline, RagError> {
    if let Some(parent) = config.index_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let embedding_model =
        client.embedding_model_with_ndims(&config.embedding_model, config.embedding_dims);
    let store = SqliteFragmentStore::open(&config.index_path, &embedding_model).await?;
    let embedder = RemoteEmbeddingProvider::new(embedding_model, PROVIDER);
    let agent = client.agent(&config.generation_model).build();
    let model = RigAnswerModel::new(agent, PROVIDER);

    Ok(RagPipeline::new(
        Arc::new(embedder),
        Arc::new(store),
        Arc::new(model),
        PipelineOptions {
            retrieval_k: config.retrieval_k,
            splitter: config.splitter()?,
        },
    ))
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn prompt_user() {
    print!("you> ");
    let _ = std::io::stdout().flush();
}

fn print_starters(session: &ChatSession) {
    if !session.is_empty() {
        return;
    }
    println!();
    println!("Try asking about:");
    for question in STARTER_QUESTIONS {
        println!("  - {question}");
    }
    println!();
}

fn print_help() {
    println!("/help     show this help");
    println!("/stats    index readiness, fragment count, and location");
    println!("/clear    clear the conversation (the index is untouched)");
    println!("/rebuild  delete the index wholesale and rebuild it from the corpus");
    println!("/quit     leave the chat");
}
