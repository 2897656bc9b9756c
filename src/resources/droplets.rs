use super::{unwrap_field, NO_QUERY};
use crate::models::{Action, CreateDroplet, Droplet, DropletAction, Image, ImageRef};
use crate::{Client, ResponseShape, Result};

impl Client {
    /// Lists all droplets.
    pub async fn list_droplets(&self) -> Result<Vec<Droplet>> {
        let response = self
            .get("droplets/", NO_QUERY, ResponseShape::array("droplets"))
            .await?;
        unwrap_field(response, "droplets")
    }

    /// Lists the droplets carrying `tag`.
    pub async fn list_droplets_by_tag(&self, tag: &str) -> Result<Vec<Droplet>> {
        let response = self
            .get(
                "droplets/",
                [("tag_name", tag)],
                ResponseShape::array("droplets"),
            )
            .await?;
        unwrap_field(response, "droplets")
    }

    /// Creates a droplet.
    ///
    /// The droplet is returned in the `new` state; poll
    /// [`get_droplet`](Client::get_droplet) until it is `active`.
    pub async fn create_droplet(&self, droplet: &CreateDroplet) -> Result<Droplet> {
        let response = self
            .post("droplets/", droplet, ResponseShape::object("droplet"))
            .await?;
        unwrap_field(response, "droplet")
    }

    /// Fetches a droplet by id.
    pub async fn get_droplet(&self, id: u64) -> Result<Droplet> {
        let response = self
            .get(
                format!("droplets/{}", id),
                NO_QUERY,
                ResponseShape::object("droplet"),
            )
            .await?;
        unwrap_field(response, "droplet")
    }

    /// Deletes a droplet. The API answers `204 No Content`.
    pub async fn destroy_droplet(&self, id: u64) -> Result<()> {
        self.delete(format!("droplets/{}", id), NO_QUERY, ResponseShape::Any)
            .await?;
        Ok(())
    }

    /// Lists snapshots taken of a droplet.
    pub async fn list_droplet_snapshots(&self, id: u64) -> Result<Vec<Image>> {
        let response = self
            .get(
                format!("droplets/{}/snapshots", id),
                NO_QUERY,
                ResponseShape::array("snapshots"),
            )
            .await?;
        unwrap_field(response, "snapshots")
    }

    /// Lists backups taken of a droplet.
    pub async fn list_droplet_backups(&self, id: u64) -> Result<Vec<Image>> {
        let response = self
            .get(
                format!("droplets/{}/backups", id),
                NO_QUERY,
                ResponseShape::array("backups"),
            )
            .await?;
        unwrap_field(response, "backups")
    }

    /// Lists actions performed on a droplet.
    pub async fn list_droplet_actions(&self, id: u64) -> Result<Vec<Action>> {
        let response = self
            .get(
                format!("droplets/{}/actions", id),
                NO_QUERY,
                ResponseShape::array("actions"),
            )
            .await?;
        unwrap_field(response, "actions")
    }

    /// Starts an action on a droplet.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use digiocean::{Client, DropletAction};
    ///
    /// # async fn example() -> Result<(), digiocean::Error> {
    /// let client = Client::new("my-token")?;
    /// let action = client
    ///     .droplet_action(3164494, &DropletAction::Snapshot { name: "nightly".into() })
    ///     .await?;
    /// println!("{} {}", action.kind, action.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn droplet_action(&self, id: u64, action: &DropletAction) -> Result<Action> {
        let response = self
            .post(
                format!("droplets/{}/actions", id),
                action,
                ResponseShape::object("action"),
            )
            .await?;
        unwrap_field(response, "action")
    }

    /// Reboots a droplet gracefully.
    pub async fn reboot_droplet(&self, id: u64) -> Result<Action> {
        self.droplet_action(id, &DropletAction::Reboot).await
    }

    /// Power cycles a droplet, like pressing the reset button.
    pub async fn power_cycle_droplet(&self, id: u64) -> Result<Action> {
        self.droplet_action(id, &DropletAction::PowerCycle).await
    }

    /// Shuts a droplet down gracefully.
    pub async fn shutdown_droplet(&self, id: u64) -> Result<Action> {
        self.droplet_action(id, &DropletAction::Shutdown).await
    }

    /// Powers on a stopped droplet.
    pub async fn power_on_droplet(&self, id: u64) -> Result<Action> {
        self.droplet_action(id, &DropletAction::PowerOn).await
    }

    /// Cuts power to a droplet, like pulling the plug.
    pub async fn power_off_droplet(&self, id: u64) -> Result<Action> {
        self.droplet_action(id, &DropletAction::PowerOff).await
    }

    /// Resets the root password. The new password is emailed to the account owner.
    pub async fn password_reset_droplet(&self, id: u64) -> Result<Action> {
        self.droplet_action(id, &DropletAction::PasswordReset).await
    }

    /// Resizes a droplet. The droplet must be powered off.
    pub async fn resize_droplet(&self, id: u64, size: impl Into<String>) -> Result<Action> {
        self.droplet_action(id, &DropletAction::Resize { size: size.into() })
            .await
    }

    /// Snapshots a droplet. The droplet must be powered off.
    pub async fn snapshot_droplet(&self, id: u64, name: impl Into<String>) -> Result<Action> {
        self.droplet_action(id, &DropletAction::Snapshot { name: name.into() })
            .await
    }

    /// Restores a droplet from one of its own backups or snapshots.
    pub async fn restore_droplet(&self, id: u64, image: impl Into<ImageRef>) -> Result<Action> {
        self.droplet_action(id, &DropletAction::Restore { image: image.into() })
            .await
    }

    /// Reinstalls a droplet from an image, wiping its disk.
    pub async fn rebuild_droplet(&self, id: u64, image: impl Into<ImageRef>) -> Result<Action> {
        self.droplet_action(id, &DropletAction::Rebuild { image: image.into() })
            .await
    }

    /// Renames a droplet.
    pub async fn rename_droplet(&self, id: u64, name: impl Into<String>) -> Result<Action> {
        self.droplet_action(id, &DropletAction::Rename { name: name.into() })
            .await
    }
}
