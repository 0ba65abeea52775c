use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::NaiveDate;
use reqwest::{header, Client};

use super::types::*;
use crate::config::Config;
use crate::schedule::format_date;

pub struct SalonClient {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl SalonClient {
    pub fn new(config: &Config) -> Result<Self> {
        let key = config.api_key.as_ref().context("API key not configured")?;

        let auth_string = format!("{}:{}", config.email, key);
        let auth_header = format!("Basic {}", STANDARD.encode(auth_string));

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            auth_header,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed: {} - {}", status, body);
        }

        let result = response.json::<T>().await?;
        Ok(result)
    }

    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed: {} - {}", status, body);
        }

        let result = response.json::<T>().await?;
        Ok(result)
    }

    async fn put<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .put(&url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed: {} - {}", status, body);
        }

        let result = response.json::<T>().await?;
        Ok(result)
    }

    /// Appointments whose date falls in `[from, to]`
    pub async fn get_appointments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ApiAppointment>> {
        let endpoint = format!(
            "/appointments?from={}&to={}",
            format_date(from),
            format_date(to)
        );
        let response: AppointmentsResponse = self.get(&endpoint).await?;
        Ok(response.appointments)
    }

    /// The full appointment book, for the list view
    pub async fn get_all_appointments(&self) -> Result<Vec<ApiAppointment>> {
        let response: AppointmentsResponse = self.get("/appointments").await?;
        Ok(response.appointments)
    }

    pub async fn get_staff(&self) -> Result<Vec<Staff>> {
        let response: StaffResponse = self.get("/staff").await?;
        Ok(response.staff)
    }

    pub async fn get_services(&self) -> Result<Vec<Service>> {
        let response: ServicesResponse = self.get("/services").await?;
        Ok(response.services)
    }

    pub async fn get_customers(&self) -> Result<Vec<Customer>> {
        let response: CustomersResponse = self.get("/customers").await?;
        Ok(response.customers)
    }

    pub async fn create_appointment(
        &self,
        request: &SaveAppointmentRequest,
    ) -> Result<ApiAppointment> {
        self.post("/appointments", request).await
    }

    pub async fn update_appointment(
        &self,
        id: &str,
        request: &SaveAppointmentRequest,
    ) -> Result<ApiAppointment> {
        let endpoint = format!("/appointments/{}", id);
        self.put(&endpoint, request).await
    }
}
