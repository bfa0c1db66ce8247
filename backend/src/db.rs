use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};

pub async fn connect(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;
    tracing::info!("Connected to the database");

    create_schema(&db).await?;

    Ok(db)
}

pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    use sea_orm::schema::Schema;
    use crate::entities::{job_card, trainset};

    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let stmt = schema.create_table_from_entity(trainset::Entity).if_not_exists().to_owned();
    db.execute(builder.build(&stmt)).await?;

    let stmt_cards = schema.create_table_from_entity(job_card::Entity).if_not_exists().to_owned();
    db.execute(builder.build(&stmt_cards)).await?;

    for mut idx in schema.create_index_from_entity(job_card::Entity) {
        idx.if_not_exists();
        db.execute(builder.build(&idx)).await?;
    }

    tracing::info!("Schema initialized (Trainsets & Job Cards tables)");
    Ok(())
}

/// Single-connection in-memory SQLite database with the schema applied.
#[cfg(test)]
pub async fn connect_in_memory() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("open in-memory sqlite");
    create_schema(&db).await.expect("create schema");
    db
}
