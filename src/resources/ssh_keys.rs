use super::{segment, unwrap_field, NO_QUERY};
use crate::models::{CreateSshKey, SshKey, UpdateSshKey};
use crate::{Client, ResponseShape, Result};
use std::fmt::Display;

// Keys are addressed by numeric id or by fingerprint, so the lookups take
// anything printable.

impl Client {
    /// Lists the SSH keys registered with the account.
    pub async fn list_ssh_keys(&self) -> Result<Vec<SshKey>> {
        let response = self
            .get("account/keys", NO_QUERY, ResponseShape::array("ssh_keys"))
            .await?;
        unwrap_field(response, "ssh_keys")
    }

    /// Registers a public key with the account.
    pub async fn create_ssh_key(
        &self,
        name: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<SshKey> {
        let body = CreateSshKey {
            name: name.into(),
            public_key: public_key.into(),
        };
        let response = self
            .post("account/keys", &body, ResponseShape::object("ssh_key"))
            .await?;
        unwrap_field(response, "ssh_key")
    }

    /// Fetches a key by id or fingerprint.
    pub async fn get_ssh_key(&self, id_or_fingerprint: impl Display) -> Result<SshKey> {
        let response = self
            .get(
                format!("account/keys/{}", segment(id_or_fingerprint)?),
                NO_QUERY,
                ResponseShape::object("ssh_key"),
            )
            .await?;
        unwrap_field(response, "ssh_key")
    }

    /// Renames a key.
    pub async fn update_ssh_key(
        &self,
        id_or_fingerprint: impl Display,
        name: impl Into<String>,
    ) -> Result<SshKey> {
        let body = UpdateSshKey { name: name.into() };
        let response = self
            .put(
                format!("account/keys/{}", segment(id_or_fingerprint)?),
                &body,
                ResponseShape::object("ssh_key"),
            )
            .await?;
        unwrap_field(response, "ssh_key")
    }

    /// Removes a key from the account.
    pub async fn destroy_ssh_key(&self, id_or_fingerprint: impl Display) -> Result<()> {
        self.delete(
            format!("account/keys/{}", segment(id_or_fingerprint)?),
            NO_QUERY,
            ResponseShape::Any,
        )
        .await?;
        Ok(())
    }
}
