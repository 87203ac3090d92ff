// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base URLs, account credentials and the URL builders derived from them.

use std::sync::{PoisonError, RwLock};

use polling_config::PollingConfig;
use polling_core::{PollingError, SurveyId};
use reqwest::Url;

/// The account identity sent with every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub customer_id: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(customer_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Both identifiers are present.
    pub fn is_complete(&self) -> bool {
        !self.customer_id.is_empty() && !self.api_key.is_empty()
    }
}

/// Shared endpoint configuration.
///
/// Credentials can be swapped at runtime; URLs are always built from the
/// values current at the time of the call.
#[derive(Debug)]
pub struct Endpoints {
    app_base: Url,
    api_base: Url,
    credentials: RwLock<Credentials>,
}

impl Endpoints {
    pub fn new(app_base: &str, api_base: &str, credentials: Credentials) -> Result<Self, PollingError> {
        Ok(Self {
            app_base: parse_base(app_base)?,
            api_base: parse_base(api_base)?,
            credentials: RwLock::new(credentials),
        })
    }

    pub fn from_config(config: &PollingConfig) -> Result<Self, PollingError> {
        let credentials = Credentials::new(
            config.account.customer_id.clone().unwrap_or_default(),
            config.account.api_key.clone().unwrap_or_default(),
        );
        Self::new(
            &config.endpoints.app_base_url,
            &config.endpoints.api_base_url,
            credentials,
        )
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_complete()
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        *self.credentials.write().unwrap_or_else(PoisonError::into_inner) = credentials;
    }

    pub fn set_customer_id(&self, customer_id: impl Into<String>) {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .customer_id = customer_id.into();
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .api_key = api_key.into();
    }

    /// `GET {api}/api/sdk/surveys/available?customer_id=&api_key=`
    pub fn available_surveys_url(&self) -> Result<Url, PollingError> {
        let creds = self.credentials();
        let mut url = join(&self.api_base, &["api", "sdk", "surveys", "available"])?;
        customer_query(&mut url, &creds);
        Ok(url)
    }

    /// `GET {api}/api/sdk/surveys/{uuid}?customer_id=&api_key=`
    pub fn survey_details_url(&self, survey_id: &SurveyId) -> Result<Url, PollingError> {
        let creds = self.credentials();
        let mut url = join(&self.api_base, &["api", "sdk", "surveys", survey_id.as_str()])?;
        customer_query(&mut url, &creds);
        Ok(url)
    }

    /// `POST {api}/api/events/collect?user=&api_key=`
    pub fn event_url(&self) -> Result<Url, PollingError> {
        let creds = self.credentials();
        let mut url = join(&self.api_base, &["api", "events", "collect"])?;
        url.query_pairs_mut()
            .append_pair("user", &creds.customer_id)
            .append_pair("api_key", &creds.api_key);
        Ok(url)
    }

    /// Frame URL for a single survey.
    pub fn survey_view_url(&self, survey_id: &SurveyId) -> Result<Url, PollingError> {
        let creds = self.credentials();
        let mut url = join(&self.app_base, &["sdk", "survey", survey_id.as_str()])?;
        customer_query(&mut url, &creds);
        Ok(url)
    }

    /// Frame URL for the account's default embed view.
    pub fn embed_view_url(&self) -> Result<Url, PollingError> {
        let creds = self.credentials();
        let mut url = join(&self.app_base, &["embed", creds.api_key.as_str()])?;
        url.query_pairs_mut()
            .append_pair("customer_id", &creds.customer_id);
        Ok(url)
    }

    /// Frame URL listing every survey currently available to the customer.
    pub fn available_surveys_view_url(&self) -> Result<Url, PollingError> {
        let creds = self.credentials();
        let mut url = join(&self.app_base, &["sdk", "available-surveys"])?;
        customer_query(&mut url, &creds);
        Ok(url)
    }
}

fn parse_base(raw: &str) -> Result<Url, PollingError> {
    let url = Url::parse(raw)
        .map_err(|e| PollingError::Config(format!("invalid base URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(PollingError::Config(format!(
            "base URL '{raw}' cannot carry a path"
        )));
    }
    Ok(url)
}

fn join(base: &Url, segments: &[&str]) -> Result<Url, PollingError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| PollingError::Config(format!("base URL '{base}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn customer_query(url: &mut Url, creds: &Credentials) {
    url.query_pairs_mut()
        .append_pair("customer_id", &creds.customer_id)
        .append_pair("api_key", &creds.api_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new(
            "https://app.polling.com",
            "https://api.polling.com",
            Credentials::new("cust-1", "key-1"),
        )
        .unwrap()
    }

    #[test]
    fn builds_api_urls() {
        let e = endpoints();
        assert_eq!(
            e.available_surveys_url().unwrap().as_str(),
            "https://api.polling.com/api/sdk/surveys/available?customer_id=cust-1&api_key=key-1"
        );
        assert_eq!(
            e.survey_details_url(&SurveyId::from("s-9")).unwrap().as_str(),
            "https://api.polling.com/api/sdk/surveys/s-9?customer_id=cust-1&api_key=key-1"
        );
        assert_eq!(
            e.event_url().unwrap().as_str(),
            "https://api.polling.com/api/events/collect?user=cust-1&api_key=key-1"
        );
    }

    #[test]
    fn builds_frame_urls() {
        let e = endpoints();
        assert_eq!(
            e.survey_view_url(&SurveyId::from("s-9")).unwrap().as_str(),
            "https://app.polling.com/sdk/survey/s-9?customer_id=cust-1&api_key=key-1"
        );
        assert_eq!(
            e.embed_view_url().unwrap().as_str(),
            "https://app.polling.com/embed/key-1?customer_id=cust-1"
        );
        assert_eq!(
            e.available_surveys_view_url().unwrap().as_str(),
            "https://app.polling.com/sdk/available-surveys?customer_id=cust-1&api_key=key-1"
        );
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let e = Endpoints::new(
            "https://app.polling.com/",
            "http://localhost:8080/proxy",
            Credentials::new("c", "k"),
        )
        .unwrap();
        assert_eq!(
            e.event_url().unwrap().as_str(),
            "http://localhost:8080/proxy/api/events/collect?user=c&api_key=k"
        );
        assert!(
            e.survey_view_url(&SurveyId::from("x"))
                .unwrap()
                .as_str()
                .starts_with("https://app.polling.com/sdk/survey/x?")
        );
    }

    #[test]
    fn path_segments_and_query_values_are_escaped() {
        let e = Endpoints::new(
            "https://app.polling.com",
            "https://api.polling.com",
            Credentials::new("a&b", "k y"),
        )
        .unwrap();
        let url = e.survey_details_url(&SurveyId::from("../x")).unwrap();
        assert_eq!(url.path(), "/api/sdk/surveys/..%2Fx");
        assert_eq!(url.query(), Some("customer_id=a%26b&api_key=k+y"));
    }

    #[test]
    fn credential_changes_apply_to_later_urls() {
        let e = endpoints();
        e.set_customer_id("cust-2");
        e.set_api_key("key-2");
        assert_eq!(e.credentials(), Credentials::new("cust-2", "key-2"));
        assert!(
            e.available_surveys_url()
                .unwrap()
                .as_str()
                .ends_with("?customer_id=cust-2&api_key=key-2")
        );
    }

    #[test]
    fn incomplete_credentials_are_not_configured() {
        let e = endpoints();
        assert!(e.is_configured());
        e.set_api_key("");
        assert!(!e.is_configured());
    }

    #[test]
    fn rejects_unparsable_base() {
        let err = Endpoints::new("not a url", "https://api.polling.com", Credentials::default())
            .unwrap_err();
        assert!(matches!(err, PollingError::Config(_)));
    }

    #[test]
    fn from_config_uses_defaults() {
        let mut config = PollingConfig::default();
        config.account.customer_id = Some("c".into());
        let e = Endpoints::from_config(&config).unwrap();
        assert!(!e.is_configured());
        assert!(
            e.embed_view_url()
                .unwrap()
                .as_str()
                .starts_with("https://app.polling.com/embed/")
        );
    }
}
