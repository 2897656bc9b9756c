use super::{unwrap_field, NO_QUERY};
use crate::models::Action;
use crate::{Client, ResponseShape, Result};

impl Client {
    /// Lists every action performed on the account's resources.
    pub async fn list_actions(&self) -> Result<Vec<Action>> {
        let response = self
            .get("actions/", NO_QUERY, ResponseShape::array("actions"))
            .await?;
        unwrap_field(response, "actions")
    }

    /// Fetches an action, typically to poll it until it completes.
    pub async fn get_action(&self, id: u64) -> Result<Action> {
        let response = self
            .get(
                format!("actions/{}", id),
                NO_QUERY,
                ResponseShape::object("action"),
            )
            .await?;
        unwrap_field(response, "action")
    }
}
