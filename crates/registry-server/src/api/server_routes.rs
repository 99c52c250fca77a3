//! Маршруты реестра серверов: список, чтение, создание, изменение, удаление, поиск.

use crate::api::form::FormParams;
use crate::api::middleware::BasicAuth;
use crate::api::response::JsonResponse;
use crate::api::AppState;
use crate::error::AppError;
use crate::services::server_store::{self, StoreError};
use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, RawQuery, State};
use axum::routing::{get, post};
use axum::Router;
use registry_entities::servers::Model as Server;
use serde::Serialize;
use serde_json::{Map, Value};

// ── Типы запросов/ответов ────────────────────────────────────────────────────

/// Тело POST/PUT/PATCH: `{"name": "..."}`. Отсутствующее имя считается пустым,
/// id из тела никогда не используется.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ServerPayload {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub result: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/servers", get(list_servers).post(create_server))
        .route(
            "/v1/servers/{id}",
            get(get_server)
                .put(modify_server)
                .patch(modify_server)
                .delete(delete_server),
        )
        .route("/v1/search/servers", post(search_servers))
}

// ── Обработчики ──────────────────────────────────────────────────────────────

/// GET /v1/servers?count=&start= — страница серверов по имени.
async fn list_servers(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<JsonResponse<Vec<Server>>, AppError> {
    let paging = FormParams::from_query(query.as_deref()).paging();
    let servers = server_store::get_servers(&state.db, paging.start, paging.count).await?;
    tracing::debug!(
        "Список серверов: {} шт. (start {}, count {})",
        servers.len(),
        paging.start,
        paging.count
    );
    Ok(JsonResponse::ok(servers))
}

/// GET /v1/servers/{id} — один сервер.
async fn get_server(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<JsonResponse<Server>, AppError> {
    let id = server_id_from_path(path)?;
    let server = server_store::get_server(&state.db, id).await?;
    Ok(JsonResponse::ok(server))
}

/// POST /v1/servers — создать сервер (Basic auth). Дубликат имени → 409.
async fn create_server(
    State(state): State<AppState>,
    BasicAuth(user): BasicAuth,
    body: Bytes,
) -> Result<JsonResponse<Server>, AppError> {
    let payload = decode_payload(&body)?;
    let name = payload.name.unwrap_or_default();

    let server = server_store::create_server(&state.db, name.clone())
        .await
        .inspect_err(|e| {
            if let StoreError::Duplicate(_) = e {
                tracing::info!("Отклонён дубликат имени сервера: {name}");
            }
        })?;

    tracing::info!(
        "Сервер создан: {} (id {}, пользователь {user})",
        server.name,
        server.id
    );
    Ok(JsonResponse::created(server))
}

/// PUT|PATCH /v1/servers/{id} — переименовать сервер (Basic auth).
///
/// id из пути перекрывает id из тела. Отсутствие строки с таким id ошибкой
/// не считается.
async fn modify_server(
    State(state): State<AppState>,
    BasicAuth(user): BasicAuth,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<JsonResponse<Server>, AppError> {
    let id = server_id_from_path(path)?;
    let payload = decode_payload(&body)?;
    if let Some(body_id) = payload.id.filter(|&body_id| body_id != id) {
        tracing::debug!("id {body_id} из тела заменён на {id} из пути");
    }
    let name = payload.name.unwrap_or_default();

    let affected = server_store::update_server(&state.db, id, name.clone()).await?;
    tracing::info!("Сервер {id} переименован в {name} (строк: {affected}, пользователь {user})");

    Ok(JsonResponse::ok(Server { id, name }))
}

/// DELETE /v1/servers/{id} — удалить сервер (Basic auth).
async fn delete_server(
    State(state): State<AppState>,
    BasicAuth(user): BasicAuth,
    path: Result<Path<String>, PathRejection>,
) -> Result<JsonResponse<DeleteResponse>, AppError> {
    let id = server_id_from_path(path)?;

    let affected = server_store::delete_server(&state.db, id).await?;
    tracing::info!("Сервер {id} удалён (строк: {affected}, пользователь {user})");

    Ok(JsonResponse::ok(DeleteResponse { result: "success" }))
}

/// POST /v1/search/servers — поиск по LIKE-шаблону имени.
///
/// `count`, `start`, `name` берутся из формы (urlencoded или multipart).
async fn search_servers(
    State(state): State<AppState>,
    form: FormParams,
) -> Result<JsonResponse<Vec<Server>>, AppError> {
    let paging = form.paging();
    let pattern = form.get("name").unwrap_or_default();

    let servers =
        server_store::search_servers(&state.db, paging.start, paging.count, pattern).await?;
    tracing::debug!("Поиск '{pattern}': найдено {}", servers.len());

    Ok(JsonResponse::ok(servers))
}

// ── Вспомогательные функции ──────────────────────────────────────────────────

/// id из пути. Сегмент, который не декодируется в UTF-8, тоже считается неверным id.
fn server_id_from_path(path: Result<Path<String>, PathRejection>) -> Result<i64, AppError> {
    match path {
        Ok(Path(raw)) => parse_server_id(&raw),
        Err(e) => {
            tracing::debug!("Некорректный сегмент id: {e}");
            Err(invalid_server_id())
        }
    }
}

fn parse_server_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| invalid_server_id())
}

fn invalid_server_id() -> AppError {
    AppError::BadRequest("Invalid server ID".into())
}

fn invalid_payload() -> AppError {
    AppError::BadRequest("Invalid request payload".into())
}

/// Разобрать первое JSON-значение тела; хвост после него игнорируется.
///
/// Принимается только объект или `null` (пустой payload). Ключи сравниваются
/// без учёта регистра, точное совпадение имеет приоритет.
fn decode_payload(body: &[u8]) -> Result<ServerPayload, AppError> {
    let value = serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
        .and_then(Result::ok)
        .ok_or_else(invalid_payload)?;

    match value {
        Value::Null => Ok(ServerPayload::default()),
        Value::Object(fields) => Ok(ServerPayload {
            id: payload_field(&fields, "id")?,
            name: payload_field(&fields, "name")?,
        }),
        _ => Err(invalid_payload()),
    }
}

fn payload_field<T: serde::de::DeserializeOwned>(
    fields: &Map<String, Value>,
    key: &str,
) -> Result<Option<T>, AppError> {
    let value = fields.get(key).or_else(|| {
        fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    });
    match value {
        None => Ok(None),
        Some(v) => serde_json::from_value::<Option<T>>(v.clone()).map_err(|_| invalid_payload()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_id() {
        assert_eq!(parse_server_id("11").unwrap(), 11);
        assert_eq!(parse_server_id("-1").unwrap(), -1);
        assert!(matches!(parse_server_id("a"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_server_id("1.5"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_decode_payload_variants() {
        let payload = decode_payload(br#"{"name":"srv.example.com"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("srv.example.com"));

        let payload = decode_payload(b"{}").unwrap();
        assert_eq!(payload.name, None);

        let payload = decode_payload(br#"{"id":7,"name":"x"} trailing"#).unwrap();
        assert_eq!(payload.id, Some(7));

        assert_eq!(decode_payload(b"null").unwrap(), ServerPayload::default());

        let payload = decode_payload(br#"{"Name":"x.y.z","ID":3}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("x.y.z"));
        assert_eq!(payload.id, Some(3));

        let payload = decode_payload(br#"{"NAME":"upper","name":"exact"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("exact"));

        let payload = decode_payload(br#"{"name":null}"#).unwrap();
        assert_eq!(payload.name, None);
    }

    #[test]
    fn test_decode_payload_rejects_garbage() {
        assert!(decode_payload(b"").is_err());
        assert!(decode_payload(b"not json").is_err());
        assert!(decode_payload(br#"{"name":5}"#).is_err());
        assert!(decode_payload(b"[]").is_err());
        assert!(decode_payload(br#"[null,"from.array"]"#).is_err());
        assert!(decode_payload(b"\"srv.example.com\"").is_err());
        assert!(decode_payload(br#"{"id":"7"}"#).is_err());
    }
}
