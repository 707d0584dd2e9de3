/// Database management
use crate::connection::ServerConnection;
use crate::error::{ClientError, Result};

/// Database operations of a client.
pub struct DatabaseManager<'a> {
    connection: &'a ServerConnection,
}

impl<'a> DatabaseManager<'a> {
    pub(crate) fn new(connection: &'a ServerConnection) -> Self {
        Self { connection }
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        self.connection.databases_contains(name)
    }

    pub fn create(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.connection.databases_create(name)
    }

    /// Names of all databases on the server.
    pub fn all(&self) -> Result<Vec<String>> {
        self.connection.databases_all()
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.connection.database_delete(name)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ClientError::InvalidArgument(
            "database name must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("social_network").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }
}
