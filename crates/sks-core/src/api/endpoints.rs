//! Typed wrappers over the booking API routes.
//!
//! Each group borrows the [`ApiClient`], so every call still goes through the
//! pipeline (credential decoration, envelope unwrapping, 401 invalidation).

use serde_json::{Value, json};

use super::client::{ApiClient, CURRENT_USER_PATH};
use super::error::ApiResult;

/// Query parameters as sent on the wire.
pub type Query<'a> = &'a [(&'a str, String)];

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi(self)
    }

    pub fn scripts(&self) -> ScriptsApi<'_> {
        ScriptsApi(self)
    }

    pub fn schedules(&self) -> SchedulesApi<'_> {
        SchedulesApi(self)
    }

    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi(self)
    }

    pub fn locks(&self) -> LocksApi<'_> {
        LocksApi(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi(self)
    }

    pub fn reports(&self) -> ReportsApi<'_> {
        ReportsApi(self)
    }
}

pub struct AuthApi<'a>(&'a ApiClient);

impl AuthApi<'_> {
    /// `POST /auth/login`; the data carries the token and the user fields.
    ///
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Value> {
        let body = json!({ "username": username, "password": password });
        self.0.post("/auth/login", Some(&body)).await
    }

    /// `POST /auth/register`. `role` defaults to `player` server-side when empty.
    ///
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn register(
        &self,
        username: &str,
        phone: &str,
        password: &str,
        role: &str,
    ) -> ApiResult<Value> {
        let role = if role.is_empty() { "player" } else { role };
        let body = json!({
            "username": username,
            "phone": phone,
            "password": password,
            "role": role,
        });
        self.0.post("/auth/register", Some(&body)).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn current_user(&self) -> ApiResult<Value> {
        self.0.get(CURRENT_USER_PATH, &[]).await
    }
}

pub struct ScriptsApi<'a>(&'a ApiClient);

impl ScriptsApi<'_> {
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn list(&self, status: Option<&str>) -> ApiResult<Value> {
        let query: Vec<(&str, String)> = status
            .map(|s| vec![("status", s.to_string())])
            .unwrap_or_default();
        self.0.get("/scripts", &query).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn hot(&self, limit: u32) -> ApiResult<Value> {
        self.0
            .get("/scripts/hot", &[("limit", limit.to_string())])
            .await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn get(&self, id: &str) -> ApiResult<Value> {
        self.0.get(&format!("/scripts/{id}"), &[]).await
    }
}

pub struct SchedulesApi<'a>(&'a ApiClient);

impl SchedulesApi<'_> {
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn by_script(&self, script_id: &str, player_id: Option<&str>) -> ApiResult<Value> {
        let query: Vec<(&str, String)> = player_id
            .map(|p| vec![("player_id", p.to_string())])
            .unwrap_or_default();
        self.0
            .get(&format!("/scripts/{script_id}/schedules"), &query)
            .await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn list_admin(&self, filters: Query<'_>) -> ApiResult<Value> {
        self.0.get("/admin/schedules", filters).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn create(&self, schedule: &Value) -> ApiResult<Value> {
        self.0.post("/admin/schedules", Some(schedule)).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn update(&self, schedule_id: &str, schedule: &Value) -> ApiResult<Value> {
        self.0
            .put(&format!("/admin/schedules/{schedule_id}"), Some(schedule))
            .await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn cancel(&self, schedule_id: &str) -> ApiResult<Value> {
        self.0
            .post(&format!("/admin/schedules/{schedule_id}/cancel"), None)
            .await
    }
}

pub struct OrdersApi<'a>(&'a ApiClient);

impl OrdersApi<'_> {
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn create(&self, schedule_id: &Value) -> ApiResult<Value> {
        let body = json!({ "schedule_id": schedule_id });
        self.0.post("/orders", Some(&body)).await
    }

    /// Pays an order. Channel `1` is the default payment channel.
    ///
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn pay(&self, order_id: &str, channel: u32) -> ApiResult<Value> {
        let body = json!({ "channel": channel });
        self.0
            .post(&format!("/orders/{order_id}/pay"), Some(&body))
            .await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn cancel(&self, order_id: &str) -> ApiResult<Value> {
        self.0
            .post(&format!("/orders/{order_id}/cancel"), None)
            .await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn mine(&self) -> ApiResult<Value> {
        self.0.get("/my/orders", &[]).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn list_admin(&self, params: Query<'_>) -> ApiResult<Value> {
        self.0.get("/admin/orders", params).await
    }
}

pub struct LocksApi<'a>(&'a ApiClient);

impl LocksApi<'_> {
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn create(&self, schedule_id: &Value) -> ApiResult<Value> {
        let body = json!({ "schedule_id": schedule_id });
        self.0.post("/locks", Some(&body)).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn cancel(&self, lock_id: &str) -> ApiResult<Value> {
        self.0.post(&format!("/locks/{lock_id}/cancel"), None).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn mine(&self) -> ApiResult<Value> {
        self.0.get("/my/locks", &[]).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn list_admin(&self, params: Query<'_>) -> ApiResult<Value> {
        self.0.get("/admin/locks", params).await
    }
}

pub struct AdminApi<'a>(&'a ApiClient);

impl AdminApi<'_> {
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn dms(&self) -> ApiResult<Value> {
        self.0.get("/admin/dms", &[]).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn rooms(&self) -> ApiResult<Value> {
        self.0.get("/admin/rooms", &[]).await
    }

    /// Database object self-check (triggers, views, procedures, indexes).
    ///
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn db_objects(&self) -> ApiResult<Value> {
        self.0.get("/admin/db-objects", &[]).await
    }
}

pub struct ReportsApi<'a>(&'a ApiClient);

impl ReportsApi<'_> {
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn dashboard(&self, params: Query<'_>) -> ApiResult<Value> {
        self.0.get("/admin/dashboard", params).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn top_scripts(&self, params: Query<'_>) -> ApiResult<Value> {
        self.0.get("/admin/reports/top-scripts", params).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn room_utilization(&self, params: Query<'_>) -> ApiResult<Value> {
        self.0.get("/admin/reports/room-utilization", params).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn lock_conversion(&self, params: Query<'_>) -> ApiResult<Value> {
        self.0.get("/admin/reports/lock-conversion", params).await
    }

    /// Boss-only on the server side.
    ///
    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn dm_performance(&self, params: Query<'_>) -> ApiResult<Value> {
        self.0.get("/admin/reports/dm-performance", params).await
    }
}
