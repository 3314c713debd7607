use crate::domain::{
    AuthProvider, BackendError, Deposit, DepositStore, NewDeposit, NewPlayer, Player,
    PlayerStore, RecordId, Session, User,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use url::Url;

const PLAYERS_TABLE: &str = "players";
const DEPOSITS_TABLE: &str = "deposits";

// Thin reqwest client for the hosted backend: auth under `auth/v1`, tables
// under `rest/v1`. One instance is built at startup and shared by handlers.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: Url,
    anon_key: String,
}

// Both the table API (`message`) and the auth API (`msg`, `error_description`)
// report errors in a small JSON body.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(alias = "msg", alias = "error_description")]
    message: Option<String>,
}

impl SupabaseClient {
    pub fn new(
        mut base_url: Url,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        // Relative joins drop the last path segment unless it ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            anon_key: anon_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|err| BackendError::Transport(format!("invalid endpoint {path}: {err}")))
    }

    fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{table}"))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    // Send and keep upstream status/message for non-success responses.
    async fn send(builder: RequestBuilder) -> Result<Response, BackendError> {
        let res = builder
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let message = res
            .json::<UpstreamErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        Err(BackendError::Upstream {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, BackendError> {
        res.json::<T>()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        access_token: &str,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(table, query)?;
        let res = Self::send(self.authorized(self.http.get(url), access_token)).await?;
        Self::decode(res).await
    }

    // Inserts are sent as single-row arrays and ask for no representation back.
    async fn insert<T: serde::Serialize + Sync>(
        &self,
        access_token: &str,
        table: &str,
        row: &T,
    ) -> Result<(), BackendError> {
        let url = self.table_url(table, &[])?;
        let builder = self
            .authorized(self.http.post(url), access_token)
            .header("Prefer", "return=minimal")
            .json(&[row]);
        Self::send(builder).await.map(|_| ())
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        let builder = self.authorized(self.http.get(url), access_token);
        let res = match Self::send(builder).await {
            Ok(res) => res,
            // Expired or unknown tokens simply mean there is no session.
            Err(BackendError::Upstream { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let user = Self::decode::<User>(res).await?;
        Ok(Some(Session {
            access_token: access_token.to_string(),
            user,
        }))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/logout")?;
        let builder = self.authorized(self.http.post(url), access_token);
        match Self::send(builder).await {
            Ok(_) => Ok(()),
            Err(BackendError::Upstream { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16() =>
            {
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl PlayerStore for SupabaseClient {
    async fn select_players(&self, access_token: &str) -> Result<Vec<Player>, BackendError> {
        self.select(access_token, PLAYERS_TABLE, &[("select", "*")])
            .await
    }

    async fn insert_player(
        &self,
        access_token: &str,
        player: NewPlayer,
    ) -> Result<(), BackendError> {
        self.insert(access_token, PLAYERS_TABLE, &player).await
    }

    async fn update_balance(
        &self,
        access_token: &str,
        player_id: &RecordId,
        balance: f64,
    ) -> Result<(), BackendError> {
        let filter = format!("eq.{player_id}");
        let url = self.table_url(PLAYERS_TABLE, &[("id", filter.as_str())])?;
        let builder = self
            .authorized(self.http.patch(url), access_token)
            .header("Prefer", "return=minimal")
            .json(&json!({ "balance": balance }));
        Self::send(builder).await.map(|_| ())
    }
}

#[async_trait]
impl DepositStore for SupabaseClient {
    async fn select_deposits(&self, access_token: &str) -> Result<Vec<Deposit>, BackendError> {
        self.select(
            access_token,
            DEPOSITS_TABLE,
            &[("select", "*"), ("order", "timestamp.desc")],
        )
        .await
    }

    async fn insert_deposit(
        &self,
        access_token: &str,
        deposit: NewDeposit,
    ) -> Result<(), BackendError> {
        self.insert(access_token, DEPOSITS_TABLE, &deposit).await
    }
}
