//! Проверка имени сервера перед отправкой: три ASCII-слова через точку.

use once_cell::sync::Lazy;
use regex::Regex;

static SERVER_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?-u:\w)*\.(?-u:\w)*\.(?-u:\w)*$").unwrap());

/// Имя вида `host.domain.tld`. Фильтр только на стороне клиента, сервис его не
/// проверяет.
pub fn server_name_valid(name: &str) -> bool {
    SERVER_NAME_REGEX.is_match(name)
}
