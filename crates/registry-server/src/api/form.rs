//! Параметры запроса: query-строка и тело формы (urlencoded или multipart),
//! а также ограничение страницы.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use std::convert::Infallible;

/// Размер страницы по умолчанию и максимальный.
pub const MAX_PAGE_SIZE: i64 = 25;

/// Окно выборки после нормализации `count` / `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub start: u64,
    pub count: u64,
}

impl Paging {
    /// Нечисловые и отсутствующие значения считаются нулём; `count` вне
    /// `1..=25` заменяется на 25, отрицательный `start` на 0.
    pub fn from_raw(count: Option<&str>, start: Option<&str>) -> Self {
        let count = parse_or_zero(count);
        let start = parse_or_zero(start);

        let count = if (1..=MAX_PAGE_SIZE).contains(&count) {
            count
        } else {
            MAX_PAGE_SIZE
        };

        Self {
            start: start.max(0).unsigned_abs(),
            count: count.unsigned_abs(),
        }
    }
}

fn parse_or_zero(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Значения формы в порядке приоритета: сначала тело, затем query-строка.
/// Ошибки разбора не отклоняют запрос, значение просто считается отсутствующим.
#[derive(Debug, Default, Clone)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    /// Первое значение поля с указанным именем.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn paging(&self) -> Paging {
        Paging::from_raw(self.get("count"), self.get("start"))
    }

    /// Параметры из query-строки (для GET-маршрутов).
    pub fn from_query(query: Option<&str>) -> Self {
        query
            .map(|q| Self::from_urlencoded(q.as_bytes()))
            .unwrap_or_default()
    }

    fn from_urlencoded(input: &[u8]) -> Self {
        Self(
            url::form_urlencoded::parse(input)
                .into_owned()
                .collect(),
        )
    }
}

impl<S> FromRequest<S> for FormParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = FormParams::from_query(req.uri().query());

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let mut params = if content_type.starts_with("multipart/form-data") {
            read_multipart(req, state).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            match Bytes::from_request(req, state).await {
                Ok(body) => FormParams::from_urlencoded(&body),
                Err(e) => {
                    tracing::debug!("Не удалось прочитать тело формы: {e}");
                    FormParams::default()
                }
            }
        } else {
            FormParams::default()
        };

        params.0.extend(query.0);
        Ok(params)
    }
}

/// Текстовые поля multipart-формы. Файловые части пропускаются.
async fn read_multipart<S: Send + Sync>(req: Request, state: &S) -> FormParams {
    let mut multipart = match Multipart::from_request(req, state).await {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!("Некорректная multipart-форма: {e}");
            return FormParams::default();
        }
    };

    let mut pairs = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(str::to_owned) else {
                    continue;
                };
                match field.text().await {
                    Ok(value) => pairs.push((name, value)),
                    Err(e) => {
                        tracing::debug!("Ошибка чтения поля {name}: {e}");
                        break;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("Ошибка разбора multipart: {e}");
                break;
            }
        }
    }
    FormParams(pairs)
}
