use super::{segment, unwrap_field, NO_QUERY};
use crate::models::{Action, Image, ImageRef, ImageType, UpdateImage};
use crate::{Client, ResponseShape, Result};
use serde_json::json;

impl Client {
    /// Lists all images available to the account, public and private.
    pub async fn list_images(&self) -> Result<Vec<Image>> {
        self.list_images_with([]).await
    }

    /// Lists public images of one category.
    pub async fn list_images_by_type(&self, kind: ImageType) -> Result<Vec<Image>> {
        self.list_images_with([("type", kind.as_str())]).await
    }

    /// Lists the account's own snapshots and backups.
    pub async fn list_private_images(&self) -> Result<Vec<Image>> {
        self.list_images_with([("private", "true")]).await
    }

    async fn list_images_with<const N: usize>(
        &self,
        query: [(&str, &str); N],
    ) -> Result<Vec<Image>> {
        let response = self
            .get("images/", query, ResponseShape::array("images"))
            .await?;
        unwrap_field(response, "images")
    }

    /// Fetches an image by id, or a public image by slug.
    pub async fn get_image(&self, image: impl Into<ImageRef>) -> Result<Image> {
        let response = self
            .get(
                format!("images/{}", segment(image.into())?),
                NO_QUERY,
                ResponseShape::object("image"),
            )
            .await?;
        unwrap_field(response, "image")
    }

    /// Renames a private image.
    pub async fn update_image(&self, id: u64, name: impl Into<String>) -> Result<Image> {
        let body = UpdateImage { name: name.into() };
        let response = self
            .put(format!("images/{}", id), &body, ResponseShape::object("image"))
            .await?;
        unwrap_field(response, "image")
    }

    /// Deletes a private image.
    pub async fn destroy_image(&self, id: u64) -> Result<()> {
        self.delete(format!("images/{}", id), NO_QUERY, ResponseShape::Any)
            .await?;
        Ok(())
    }

    /// Copies a private image to another region.
    pub async fn transfer_image(&self, id: u64, region: &str) -> Result<Action> {
        let body = json!({ "type": "transfer", "region": region });
        let response = self
            .post(
                format!("images/{}/actions", id),
                &body,
                ResponseShape::object("action"),
            )
            .await?;
        unwrap_field(response, "action")
    }

    /// Fetches an action performed on an image.
    pub async fn get_image_action(&self, id: u64, action_id: u64) -> Result<Action> {
        let response = self
            .get(
                format!("images/{}/actions/{}", id, action_id),
                NO_QUERY,
                ResponseShape::object("action"),
            )
            .await?;
        unwrap_field(response, "action")
    }
}
