use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use std::sync::Arc;
use std::time::Duration;

/// Database holding the role requests and granted roles.
pub const ACCOUNT_DATABASE: &str = "Account";
/// Database holding saved itineraries and bookings.
pub const TRAVELERS_DATABASE: &str = "Travelers";

pub async fn create_mongo_client(uri: &str) -> mongodb::error::Result<Arc<Client>> {
    log::info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    // A failed ping is not fatal; the driver reconnects lazily.
    match ping(&client).await {
        Ok(()) => log::info!("Connected to MongoDB"),
        Err(e) => log::warn!("Connected to MongoDB but ping failed: {}", e),
    }

    Ok(Arc::new(client))
}

pub async fn ping(client: &Client) -> mongodb::error::Result<()> {
    client
        .database(ACCOUNT_DATABASE)
        .run_command(doc! {"ping": 1})
        .await?;
    Ok(())
}
