use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("{entity} with key `{key}` already exists")]
    DuplicateKey { entity: &'static str, key: String },
    #[error("failed to insert {entity} `{id}`")]
    Insert {
        entity: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to update {entity} `{id}`")]
    Update {
        entity: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load {entity}")]
    Load {
        entity: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to list {entity}")]
    List {
        entity: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete {entity} `{id}`")]
    Delete {
        entity: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
}

/// Whether a driver error is a unique-index violation (server code 11000).
pub fn is_duplicate_key(err: &MongoError) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}
