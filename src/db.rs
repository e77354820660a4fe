use mongodb::{
    bson::{doc, Document},
    error::{Error, ErrorKind, WriteFailure},
    Client, Database, IndexModel,
};
use tracing::info;

pub async fn init_db(uri: &str, db_name: &str) -> Result<Database, Error> {
    let client = Client::with_uri_str(uri).await?;
    let db = client.database(db_name);

    db.run_command(doc! { "ping": 1 }).await?;
    info!(database = db_name, "connected to MongoDB");

    ensure_indexes(&db).await?;
    Ok(db)
}

pub async fn ensure_indexes(db: &Database) -> Result<(), Error> {
    db.collection::<Document>("picks")
        .create_indexes([
            IndexModel::builder().keys(doc! { "user_id": 1, "event_id": 1 }).build(),
            IndexModel::builder().keys(doc! { "event_id": 1 }).build(),
            IndexModel::builder().keys(doc! { "fight_id": 1 }).build(),
        ])
        .await?;
    db.collection::<Document>("fights")
        .create_index(IndexModel::builder().keys(doc! { "event_id": 1 }).build())
        .await?;
    db.collection::<Document>("events")
        .create_indexes([
            IndexModel::builder().keys(doc! { "status": 1, "date": 1 }).build(),
        ])
        .await?;
    Ok(())
}

pub async fn ping(db: &Database) -> bool {
    db.run_command(doc! { "ping": 1 }).await.is_ok()
}

pub fn is_duplicate_key(err: &Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}
