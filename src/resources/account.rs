use super::{unwrap_field, NO_QUERY};
use crate::models::{Account, Region, Size};
use crate::{Client, ResponseShape, Result};

impl Client {
    /// Fetches the account the token belongs to.
    pub async fn get_account(&self) -> Result<Account> {
        let response = self
            .get("account", NO_QUERY, ResponseShape::object("account"))
            .await?;
        unwrap_field(response, "account")
    }

    /// Lists droplet sizes with their prices.
    pub async fn list_sizes(&self) -> Result<Vec<Size>> {
        let response = self
            .get("sizes/", NO_QUERY, ResponseShape::array("sizes"))
            .await?;
        unwrap_field(response, "sizes")
    }

    /// Lists datacenter regions.
    pub async fn list_regions(&self) -> Result<Vec<Region>> {
        let response = self
            .get("regions/", NO_QUERY, ResponseShape::array("regions"))
            .await?;
        unwrap_field(response, "regions")
    }
}
