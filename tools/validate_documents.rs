use std::collections::HashSet;

use anyhow::Context;
use clap::Parser;
use serde::de::DeserializeOwned;
use sqlx::postgres::PgPoolOptions;

use roomielab_api::entities::{collections, Design, FurnitureItem, Project, UserProfile};
use roomielab_api::infrastructure::persistence::PostgresDocumentStore;
use roomielab_api::ports::{Document, DocumentStore, Query};

/// Check stored documents against the entity shapes the API reads
#[derive(Parser)]
struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Delete documents that fail to decode
    #[arg(long)]
    fix: bool,
}

async fn check_collection<T: DeserializeOwned>(
    store: &PostgresDocumentStore,
    collection: &str,
    fix: bool,
) -> anyhow::Result<Vec<Document>> {
    let docs = store
        .query(collection, &Query::new())
        .await
        .with_context(|| format!("reading {}", collection))?;

    let mut valid = Vec::with_capacity(docs.len());
    let mut invalid = 0;
    for doc in docs {
        match doc.clone().into_entity::<T>() {
            Ok(_) => valid.push(doc),
            Err(e) => {
                invalid += 1;
                println!("{}/{}: {}", collection, doc.id, e);
                if fix {
                    store.delete(collection, &doc.id).await?;
                    println!("Deleted: {}/{}", collection, doc.id);
                }
            }
        }
    }

    println!(
        "{}: {} valid, {} invalid",
        collection,
        valid.len(),
        invalid
    );
    Ok(valid)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cli.database_url)
        .await
        .context("connecting to the document database")?;
    let store = PostgresDocumentStore::new(pool);

    check_collection::<UserProfile>(&store, collections::USERS, cli.fix).await?;
    check_collection::<FurnitureItem>(&store, collections::FURNITURE_ITEMS, cli.fix).await?;
    let projects = check_collection::<Project>(&store, collections::PROJECTS, cli.fix).await?;
    let designs = check_collection::<Design>(&store, collections::DESIGNS, cli.fix).await?;

    // Designs survive project deletion; list the ones left behind
    let project_ids: HashSet<&str> = projects.iter().map(|p| p.id.as_str()).collect();
    let orphans: Vec<&Document> = designs
        .iter()
        .filter(|d| {
            d.field("projectId")
                .and_then(|v| v.as_str())
                .is_some_and(|id| !project_ids.contains(id))
        })
        .collect();

    println!("Designs without a project: {}", orphans.len());
    for design in orphans {
        println!("designs/{}", design.id);
    }

    Ok(())
}
