pub mod url_validator;
pub mod user_agent;

/// Token 的字母表：大小写字母加数字
const TOKEN_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 随机分配的 token 长度
pub const TOKEN_LENGTH: usize = 7;
/// 自定义 token 的长度上限
pub const MAX_TOKEN_LENGTH: usize = 64;

pub fn generate_random_token(length: usize) -> String {
    use std::iter;

    use rand::RngExt;

    iter::repeat_with(|| TOKEN_CHARS[rand::rng().random_range(0..TOKEN_CHARS.len())] as char)
        .take(length)
        .collect()
}

/// 校验 token 是否合法（仅字母数字；自定义 token 长度可变）
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LENGTH
        && token.bytes().all(|b| b.is_ascii_alphanumeric())
}
