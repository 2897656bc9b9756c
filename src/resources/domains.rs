use super::{segment, unwrap_field, NO_QUERY};
use crate::models::{CreateDomain, Domain, DomainRecord, DomainRecordRequest};
use crate::{Client, ResponseShape, Result};

impl Client {
    /// Lists DNS zones.
    pub async fn list_domains(&self) -> Result<Vec<Domain>> {
        let response = self
            .get("domains/", NO_QUERY, ResponseShape::array("domains"))
            .await?;
        unwrap_field(response, "domains")
    }

    /// Creates a zone for `name` with an `A` record at the apex pointing to
    /// `ip_address`.
    pub async fn create_domain(
        &self,
        name: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Result<Domain> {
        let body = CreateDomain {
            name: name.into(),
            ip_address: ip_address.into(),
        };
        let response = self
            .post("domains/", &body, ResponseShape::object("domain"))
            .await?;
        unwrap_field(response, "domain")
    }

    /// Fetches a zone by name.
    pub async fn get_domain(&self, name: &str) -> Result<Domain> {
        let response = self
            .get(
                format!("domains/{}", segment(name)?),
                NO_QUERY,
                ResponseShape::object("domain"),
            )
            .await?;
        unwrap_field(response, "domain")
    }

    /// Deletes a zone and all of its records.
    pub async fn destroy_domain(&self, name: &str) -> Result<()> {
        self.delete(format!("domains/{}", segment(name)?), NO_QUERY, ResponseShape::Any)
            .await?;
        Ok(())
    }

    /// Lists the records of a zone.
    pub async fn list_domain_records(&self, domain: &str) -> Result<Vec<DomainRecord>> {
        let response = self
            .get(
                format!("domains/{}/records", segment(domain)?),
                NO_QUERY,
                ResponseShape::array("domain_records"),
            )
            .await?;
        unwrap_field(response, "domain_records")
    }

    /// Adds a record to a zone.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use digiocean::{Client, DomainRecordRequest};
    ///
    /// # async fn example() -> Result<(), digiocean::Error> {
    /// let client = Client::new("my-token")?;
    /// let record = client
    ///     .create_domain_record("example.com", &DomainRecordRequest::new("A", "www", "162.10.66.0"))
    ///     .await?;
    /// println!("record {}", record.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_domain_record(
        &self,
        domain: &str,
        record: &DomainRecordRequest,
    ) -> Result<DomainRecord> {
        let response = self
            .post(
                format!("domains/{}/records", segment(domain)?),
                record,
                ResponseShape::object("domain_record"),
            )
            .await?;
        unwrap_field(response, "domain_record")
    }

    /// Fetches one record of a zone.
    pub async fn get_domain_record(&self, domain: &str, id: u64) -> Result<DomainRecord> {
        let response = self
            .get(
                format!("domains/{}/records/{}", segment(domain)?, id),
                NO_QUERY,
                ResponseShape::object("domain_record"),
            )
            .await?;
        unwrap_field(response, "domain_record")
    }

    /// Updates a record. Fields left as `None` are not sent.
    pub async fn update_domain_record(
        &self,
        domain: &str,
        id: u64,
        record: &DomainRecordRequest,
    ) -> Result<DomainRecord> {
        let response = self
            .put(
                format!("domains/{}/records/{}", segment(domain)?, id),
                record,
                ResponseShape::object("domain_record"),
            )
            .await?;
        unwrap_field(response, "domain_record")
    }

    /// Deletes a record from a zone.
    pub async fn destroy_domain_record(&self, domain: &str, id: u64) -> Result<()> {
        self.delete(
            format!("domains/{}/records/{}", segment(domain)?, id),
            NO_QUERY,
            ResponseShape::Any,
        )
        .await?;
        Ok(())
    }
}
