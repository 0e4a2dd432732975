// ABOUTME: PostgreSQL connection descriptor module
// ABOUTME: Exports the descriptor, connection opening and server administration

pub mod admin;
pub mod connection;
pub mod uri;

pub use connection::connect;
pub use uri::{
    CredentialSource, DbUri, EnvCredentials, MAINTENANCE_DATABASE, PASSWORD_ENV_VAR,
};
