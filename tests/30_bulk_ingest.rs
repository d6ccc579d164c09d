mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn bulk_skips_cards_already_in_the_catalog() -> Result<()> {
    let server = common::ensure_server().await?;
    let key = common::scraper_key().await?;
    let catalog = common::seed_catalog(server, &key).await?;
    let client = reqwest::Client::new();

    let charizard = common::pokemon_card(&catalog.set_id, "charizard", "4/102", json!(120));
    let blastoise = common::pokemon_card(&catalog.set_id, "blastoise", "2/102", json!(100));
    let pikachu = common::pokemon_card(&catalog.set_id, "pikachu", "58/102", json!(40));

    let first = client
        .post(server.url("/cards/bulk"))
        .header("x-api-key", &key)
        .json(&json!([charizard, blastoise]))
        .send()
        .await?;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = first.json::<Value>().await?;
    assert_eq!(first["createdCount"], 2);
    assert_eq!(first["existingCount"], 0);

    let second = client
        .post(server.url("/cards/bulk"))
        .header("x-api-key", &key)
        .json(&json!({ "cards": [charizard, blastoise, pikachu] }))
        .send()
        .await?;
    assert_eq!(second.status(), StatusCode::CREATED);
    let second = second.json::<Value>().await?;
    assert_eq!(second["createdCount"], 1);
    assert_eq!(second["existingCount"], 2);

    let replay = client
        .post(server.url("/cards/bulk"))
        .header("x-api-key", &key)
        .json(&json!([charizard, blastoise, pikachu]))
        .send()
        .await?;
    assert_eq!(replay.status(), StatusCode::OK);
    let replay = replay.json::<Value>().await?;
    assert_eq!(replay["createdCount"], 0);
    assert_eq!(replay["existingCount"], 3);
    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn bulk_with_unknown_set_creates_nothing() -> Result<()> {
    let server = common::ensure_server().await?;
    let key = common::scraper_key().await?;
    let catalog = common::seed_catalog(server, &key).await?;
    let client = reqwest::Client::new();

    let good = common::pokemon_card(&catalog.set_id, "mewtwo", "10/102", json!(60));
    let orphan = common::pokemon_card(&uuid::Uuid::new_v4().to_string(), "mew", "151/102", json!(50));

    let res = client
        .post(server.url("/cards/bulk"))
        .header("x-api-key", &key)
        .json(&json!([good, orphan]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await?["error"], "Error creating cards");

    let cards = reqwest::get(server.url(&format!("/cards?setId={}", catalog.set_id))).await?.json::<Value>().await?;
    assert_eq!(cards["total"], 0);
    Ok(())
}
