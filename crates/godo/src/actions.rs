//! Action records and the account-wide action history.

use crate::client::Client;
use crate::Result;
use godo_core::query::ListOptions;
use godo_core::{describe, Response, Timestamp};
use serde::{Deserialize, Serialize};

const ACTIONS_BASE_PATH: &str = "v2/actions";

/// Status of an action that is still running
pub const ACTION_IN_PROGRESS: &str = "in-progress";

/// Status of a finished action
pub const ACTION_COMPLETED: &str = "completed";

/// An asynchronous operation run against a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    /// Action identifier
    pub id: u64,
    /// `in-progress`, `completed` or `errored`
    pub status: String,
    /// Action type, e.g. `create` or `power_off`
    #[serde(rename = "type")]
    pub action_type: String,
    /// When the action started
    pub started_at: Option<Timestamp>,
    /// When the action finished
    pub completed_at: Option<Timestamp>,
    /// Identifier of the affected resource
    pub resource_id: u64,
    /// Type of the affected resource, e.g. `droplet`
    pub resource_type: String,
}

impl Action {
    /// True once the action has completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == ACTION_COMPLETED
    }
}

describe!(godo::Action {
    id,
    status,
    action_type,
    started_at,
    completed_at,
    resource_id,
    resource_type,
});

#[derive(Deserialize)]
pub(crate) struct ActionRoot {
    pub(crate) action: Action,
}

#[derive(Deserialize)]
struct ActionsRoot {
    actions: Vec<Action>,
}

/// Action history operations.
#[derive(Debug, Clone, Copy)]
pub struct ActionsService<'a> {
    client: &'a Client,
}

impl<'a> ActionsService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List all actions on the account.
    pub async fn list(&self, opts: &ListOptions) -> Result<(Vec<Action>, Response)> {
        let path = opts.apply(ACTIONS_BASE_PATH);
        let (root, response) = self.client.get_json::<ActionsRoot>(&path).await?;
        Ok((root.actions, response))
    }

    /// Fetch a single action.
    pub async fn get(&self, action_id: u64) -> Result<(Action, Response)> {
        let path = format!("{ACTIONS_BASE_PATH}/{action_id}");
        let (root, response) = self.client.get_json::<ActionRoot>(&path).await?;
        Ok((root.action, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> Client {
        Client::builder().with_base_url(server.uri()).build().unwrap()
    }

    #[tokio::test]
    async fn list_actions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/actions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"actions": [{"id": 1}, {"id": 2}]})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let (actions, _) = client.actions().list(&ListOptions::default()).await.unwrap();

        assert_eq!(
            actions,
            vec![
                Action { id: 1, ..Action::default() },
                Action { id: 2, ..Action::default() },
            ]
        );
    }

    #[tokio::test]
    async fn get_action_with_mixed_timestamps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/actions/12345"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "action": {
                    "id": 12345,
                    "status": "completed",
                    "type": "power_off",
                    "started_at": "2014-05-08T20:36:47Z",
                    "completed_at": 1399581427,
                    "resource_id": 3,
                    "resource_type": "droplet"
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let (action, _) = client.actions().get(12345).await.unwrap();

        assert!(action.is_completed());
        assert_eq!(action.action_type, "power_off");
        let started = Utc.with_ymd_and_hms(2014, 5, 8, 20, 36, 47).unwrap();
        assert_eq!(action.started_at, Some(Timestamp::new(started)));
        assert_eq!(
            action.completed_at.map(Timestamp::into_datetime),
            Some(started + chrono::Duration::seconds(20))
        );
    }

    #[test]
    fn action_stringify() {
        let started = Utc.with_ymd_and_hms(2014, 5, 8, 20, 36, 47).unwrap();
        let action = Action {
            id: 1,
            status: ACTION_IN_PROGRESS.into(),
            started_at: Some(Timestamp::new(started)),
            ..Action::default()
        };

        assert_eq!(
            action.to_string(),
            r#"godo::Action{id:1, status:"in-progress", started_at:2014-05-08T20:36:47Z}"#
        );
    }
}
